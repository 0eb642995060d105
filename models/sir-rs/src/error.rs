use std::path::PathBuf;

use epi_runner::RunnerError;
use rand_distr::BinomialError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },
    #[error("binomial sampling failed: {0}")]
    Sampling(#[from] BinomialError),
}

impl SimulationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum PresentError {
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error("failed to render chart to {}: {message}", path.display())]
    Render { path: PathBuf, message: String },
}

/// Any failure of a command-line run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Present(#[from] PresentError),
    #[error(transparent)]
    Runner(#[from] RunnerError),
}
