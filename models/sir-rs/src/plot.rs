//! Renders trajectories as line charts and names them after their parameters.

use std::path::{Path, PathBuf};

use epi_runner::{ArtifactName, Environment};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::{error::PresentError, output::Trajectory, parameters::Parameters};

pub const DEFAULT_PREFIX: &str = "f";
pub const CHART_EXTENSION: &str = "svg";

const CHART_SIZE: (u32, u32) = (1280, 960);

/// Draws the three compartments against `step * dt` as an SVG image at `path`.
///
/// # Errors
///
/// Returns [`PresentError::Render`] if drawing or writing fails.
pub fn render_chart(trajectory: &Trajectory, dt: f64, path: &Path) -> Result<(), PresentError> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    draw_chart(root, trajectory, dt).map_err(|message| PresentError::Render {
        path: path.to_path_buf(),
        message,
    })
}

fn draw_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    trajectory: &Trajectory,
    dt: f64,
) -> Result<(), String> {
    let to_message = |e: DrawingAreaErrorKind<DB::ErrorType>| e.to_string();

    root.fill(&WHITE).map_err(to_message)?;

    let x_max = (trajectory.len() as f64 * dt).max(dt);
    let y_max = trajectory.states().map(|state| state.total()).max().unwrap_or(1) as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption("Epidemiological Model", ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max * 1.05)
        .map_err(to_message)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Population")
        .draw()
        .map_err(to_message)?;

    let series = [
        ("Susceptible", &trajectory.susceptible, BLUE),
        ("Infected", &trajectory.infected, RED),
        ("Recovered", &trajectory.recovered, GREEN),
    ];
    for (label, counts, color) in series {
        let points = trajectory
            .time_points(dt)
            .zip(counts.iter().map(|&count| count as f64));
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(to_message)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(to_message)?;

    root.present().map_err(to_message)
}

/// Writes charts (and optionally CSV tables) of finished runs into the
/// output directory of an [`Environment`].
pub struct Presenter<'a, I = ()> {
    environment: &'a Environment<I>,
    prefix: String,
}

impl<'a, I> Presenter<'a, I> {
    pub fn new(environment: &'a Environment<I>) -> Self {
        Self {
            environment,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Artifact name for a run. Without parameters the name is numbered.
    pub fn artifact_name(&self, parameters: Option<&Parameters>) -> ArtifactName {
        match parameters {
            Some(parameters) => {
                ArtifactName::described(&self.prefix, &parameters.file_stem(), CHART_EXTENSION)
            }
            None => ArtifactName::numbered(&self.prefix, CHART_EXTENSION),
        }
    }

    /// Renders the chart to the next free path and reports it on stdout.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::Runner`] if the output directory cannot be
    /// created and [`PresentError::Render`] if the chart cannot be written.
    pub fn present(
        &self,
        trajectory: &Trajectory,
        dt: f64,
        parameters: Option<&Parameters>,
    ) -> Result<PathBuf, PresentError> {
        let path = self
            .environment
            .artifact_path(&self.artifact_name(parameters))?;
        render_chart(trajectory, dt, &path)?;
        info!(path = %path.display(), steps = trajectory.len(), "rendered chart");

        println!("Visualization saved to: {}", path.display());
        if let Some(parameters) = parameters {
            println!("Parameters: {}", parameters.summary());
        }
        Ok(path)
    }

    /// Writes `step,time,susceptible,infected,recovered` rows next to the chart.
    pub fn export_csv(
        &self,
        trajectory: &Trajectory,
        dt: f64,
        parameters: Option<&Parameters>,
    ) -> Result<PathBuf, PresentError> {
        let name = self.artifact_name(parameters).with_extension("csv");
        let path = self.environment.write_csv(
            &name,
            &["step", "time", "susceptible", "infected", "recovered"],
            &trajectory.csv_rows(dt),
        )?;
        info!(path = %path.display(), "exported trajectory");
        Ok(path)
    }
}
