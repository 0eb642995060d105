use std::path::PathBuf;

use tracing::info;

use crate::{cli::Args, error::RunError, model::SirModel, output::Trajectory, plot::Presenter};

/// What a command-line run produced.
#[derive(Debug)]
pub struct RunReport {
    pub seed: u64,
    pub trajectory: Trajectory,
    pub chart: PathBuf,
    pub table: Option<PathBuf>,
}

/// Resolves inputs, simulates, and writes the artifacts.
///
/// # Errors
///
/// Fails with [`RunError::Simulation`] on invalid parameters (before any
/// file is written) and with [`RunError::Runner`] or [`RunError::Present`]
/// on input or output failures.
pub fn run(args: &Args) -> Result<RunReport, RunError> {
    let environment = args.environment()?;
    let parameters = environment.input.clone().unwrap_or_default();
    let seed = environment.seed.unwrap_or_else(rand::random);
    info!(seed, "seeded random source");

    let trajectory = SirModel::seeded(seed).simulate(&parameters)?;
    if let Some((step, infected)) = trajectory.peak_infected() {
        info!(
            step,
            time = step as f64 * parameters.dt,
            infected,
            "infection peak"
        );
    }

    let presenter = Presenter::new(&environment);
    let chart = presenter.present(&trajectory, parameters.dt, Some(&parameters))?;
    let table = if args.csv {
        Some(presenter.export_csv(&trajectory, parameters.dt, Some(&parameters))?)
    } else {
        None
    };

    Ok(RunReport {
        seed,
        trajectory,
        chart,
        table,
    })
}
