use std::fs::{create_dir_all, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::Result;

fn default_dest_path() -> String {
    "output".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// .osm or .osm.xz input.
    pub data_path: String,
    #[serde(default = "default_dest_path")]
    pub dest_path: String,
    #[serde(default)]
    pub pretty: bool,
    #[serde(default)]
    pub json_array: bool,
    #[serde(default = "default_true")]
    pub progress: bool,
    #[serde(default = "default_true")]
    pub audit: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl UserConfig {
    pub fn new(data_path: &str) -> Self {
        UserConfig {
            data_path: data_path.to_string(),
            dest_path: default_dest_path(),
            pretty: false,
            json_array: false,
            progress: true,
            audit: true,
            log_level: default_log_level(),
        }
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// `<dest_path>/<input file name>`, created if missing.
pub fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let input_fname = Path::new(&config.data_path)
        .file_name()
        .ok_or("Could not get input file name")?;
    let output_dir = Path::new(&config.dest_path).join(input_fname);
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}
