pub mod audit_osm;
pub mod parse_osm;
pub mod shape_osm;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::errors::{Error, Result};

/// One extract/transform/load step writing a single file into the output
/// directory. A step whose file already exists is skipped.
pub trait Etl {
    type Input;
    type Output;

    fn etl_name(&self) -> &str;
    fn output_file_name(&self) -> &str;

    fn extract(&mut self, dir: &Path) -> Result<Self::Input>;
    fn transform(&mut self, input: Self::Input) -> Result<Self::Output>;
    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()>;

    fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.output_file_name())
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(self.output_path(dir).try_exists()?)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        if self.is_cached(dir)? {
            fs::remove_file(self.output_path(dir))?;
        }
        Ok(())
    }

    fn process(&mut self, dir: &Path) -> Result<()> {
        info!(etl_name = self.etl_name(); "Starting ETL process");
        if self.is_cached(dir)? {
            info!(etl_name = self.etl_name(); "Using cached value");
        } else {
            info!(etl_name = self.etl_name(); "Extracting");
            let input = self.extract(dir);
            let input = log_failure(self.etl_name(), "Extraction", input)?;

            info!(etl_name = self.etl_name(); "Transforming");
            let output = self.transform(input);
            let output = log_failure(self.etl_name(), "Transformation", output)?;

            info!(etl_name = self.etl_name(); "Loading");
            let loaded = self.load(dir, output);
            log_failure(self.etl_name(), "Loading", loaded)?;
        }
        info!(etl_name = self.etl_name(); "Process finished");
        Ok(())
    }
}

fn log_failure<T>(etl_name: &str, phase: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        let message = err.to_string();
        error!(etl_name = etl_name, phase = phase, err = message.as_str(); "ETL phase failed with error");
    }
    result
}

/// Writes `path` through a hidden temp file next to it and renames it into
/// place once `write` succeeded, so a failed run never leaves a file that
/// [`Etl::is_cached`] would accept.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::from(format!("Output path {} has no file name", path.display())))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let written = File::create(&temp_path).map_err(Error::from).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}
