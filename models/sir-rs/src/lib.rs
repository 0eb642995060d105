//! Discrete-time stochastic SIR epidemic simulation.
//!
//! [`model::SirModel`] advances susceptible, infected and recovered counts
//! with binomial draws; [`plot::Presenter`] turns the resulting
//! [`output::Trajectory`] into a chart.

pub mod cli;
pub mod error;
pub mod model;
pub mod output;
pub mod parameters;
pub mod plot;
mod run;

pub use error::{PresentError, RunError, SimulationError};
pub use model::{SirModel, simulate};
pub use output::{State, Trajectory};
pub use parameters::Parameters;
pub use run::{RunReport, run};
