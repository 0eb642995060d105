use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("I/O failure at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed TOML input: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid input: {0}")]
    Input(String),
}

impl RunnerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
