use std::io;
use std::path::PathBuf;

use log::info;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use osm_wrangle::config::{create_output_dir, load_user_config};
use osm_wrangle::etl::audit_osm::AuditOsmEtl;
use osm_wrangle::etl::shape_osm::ShapeOsmEtl;
use osm_wrangle::etl::Etl;
use osm_wrangle::Result;

const DEFAULT_CONFIG_PATH: &str = "config.json";

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let user_config = load_user_config(&config_path)?;
    setup_logging(&user_config.log_level);

    let output_dir = create_output_dir(&user_config)?;
    info!(data_path = user_config.data_path.as_str(); "Processing map");

    if user_config.audit {
        AuditOsmEtl::new(&user_config).process(&output_dir)?;
    }
    ShapeOsmEtl::new(&user_config).process(&output_dir)?;

    Ok(())
}
