use crate::errors::AppError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};

pub const DATA_FILE: &str = "data.json";
pub const STATS_FILE: &str = "stats.json";
pub const LOCATIONS_FILE: &str = "locations.json";

#[derive(Debug, Clone)]
pub struct DataSource {
    root: PathBuf,
}

impl DataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn data_path(&self) -> PathBuf {
        self.root.join(DATA_FILE)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.root.join(STATS_FILE)
    }

    pub fn locations_path(&self) -> PathBuf {
        self.root.join(LOCATIONS_FILE)
    }
}

pub async fn load_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let bytes = load_raw(path).await?;
    match serde_json::from_slice(&bytes) {
        Ok(data) => {
            debug!("loaded {}", path.display());
            Ok(data)
        }
        Err(err) => {
            error!("failed to parse {}: {err}", path.display());
            Err(AppError::unavailable(format!(
                "{} is not valid: {err}",
                file_label(path)
            )))
        }
    }
}

pub async fn load_raw(path: &Path) -> Result<Vec<u8>, AppError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            error!("missing data file {}", path.display());
            Err(AppError::unavailable(format!(
                "{} is not available",
                file_label(path)
            )))
        }
        Err(err) => {
            error!("failed to read {}: {err}", path.display());
            Err(AppError::unavailable(format!(
                "{} could not be read",
                file_label(path)
            )))
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
