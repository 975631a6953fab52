use slot_grid::SlotGridError;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeekViewError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Grid(#[from] SlotGridError),

    #[error("Failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create file {path}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open file {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for WeekViewError {
    fn from(err: toml::de::Error) -> Self {
        WeekViewError::InvalidConfiguration(format!("TOML parse error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, WeekViewError>;
