use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeatMapError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Input is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Input file is empty")]
    EmptyFile,
    #[error("Zoom level {0} is outside 1..=15")]
    InvalidZoom(i32),
    #[error("Unknown map style '{0}'")]
    UnknownMapStyle(String),
    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl HeatMapError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HeatMapError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HeatMapError>;
