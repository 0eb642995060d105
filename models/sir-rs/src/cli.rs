use std::io;
use std::path::PathBuf;

use clap::Parser;
use epi_runner::{DEFAULT_OUTPUT_DIR, Environment, RunnerError};

use crate::parameters::Parameters;

/// Command-line surface. Unset options fall back to the run document
/// (`--config` or `--stdin`) and then to the defaults of [`Parameters`].
#[derive(Parser, Debug, Default)]
#[command(name = "sir")]
#[command(about = "Simulate a stochastic SIR epidemic and chart the trajectory")]
pub struct Args {
    /// Total population [default: 1000]
    #[arg(long = "N", visible_alias = "population")]
    pub population: Option<u64>,

    /// Infection rate per interaction [default: 10]
    #[arg(long, visible_alias = "infection-rate", allow_negative_numbers = true)]
    pub beta: Option<f64>,

    /// Recovery rate [default: 1]
    #[arg(long, visible_alias = "recovery-rate", allow_negative_numbers = true)]
    pub sigma: Option<f64>,

    /// Initial infected individuals [default: 10]
    #[arg(long = "init_infect", visible_alias = "initial-infected")]
    pub initial_infected: Option<u64>,

    /// Duration of each time step [default: 0.01]
    #[arg(long, visible_alias = "step-duration", allow_negative_numbers = true)]
    pub dt: Option<f64>,

    /// Number of simulation time steps [default: 500]
    #[arg(long = "sim_ts", visible_alias = "steps")]
    pub steps: Option<usize>,

    /// Output directory for the chart [default: output]
    #[arg(long = "output_dir", visible_alias = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Seed of the random source; drawn from the OS when absent
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run document (.toml or .json) with `input` and `output` sections
    #[arg(long, conflicts_with = "stdin")]
    pub config: Option<PathBuf>,

    /// Read the run document as JSON from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Also write the trajectory as CSV
    #[arg(long)]
    pub csv: bool,
}

impl Args {
    /// Resolves the run environment: document first, then explicit flags.
    pub fn environment(&self) -> Result<Environment<Parameters>, RunnerError> {
        let base = if let Some(path) = &self.config {
            Environment::from_path(path)?
        } else if self.stdin {
            Environment::from_reader(io::stdin().lock())?
        } else {
            Environment::new(DEFAULT_OUTPUT_DIR)
        };

        let mut environment = base.with_input_type::<Parameters>()?;
        if let Some(dir) = &self.output_dir {
            environment = environment.with_output_dir(dir);
        }
        if let Some(seed) = self.seed {
            environment = environment.with_seed(seed);
        }
        if let Some(parameters) = environment.input.as_mut() {
            self.apply(parameters);
        }
        Ok(environment)
    }

    fn apply(&self, parameters: &mut Parameters) {
        if let Some(population) = self.population {
            parameters.population = population;
        }
        if let Some(beta) = self.beta {
            parameters.beta = beta;
        }
        if let Some(sigma) = self.sigma {
            parameters.sigma = sigma;
        }
        if let Some(initial_infected) = self.initial_infected {
            parameters.initial_infected = initial_infected;
        }
        if let Some(dt) = self.dt {
            parameters.dt = dt;
        }
        if let Some(steps) = self.steps {
            parameters.steps = steps;
        }
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::Path;

    use clap::Parser;

    use crate::{cli::Args, parameters::Parameters};

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["sir"]).unwrap();
        let environment = args.environment().unwrap();
        assert_eq!(environment.input, Some(Parameters::default()));
        assert_eq!(environment.output_dir(), Path::new("output"));
        assert_eq!(environment.seed, None);
    }

    #[test]
    fn test_original_flag_names() {
        let args = Args::try_parse_from([
            "sir",
            "--N",
            "40000",
            "--beta",
            "4",
            "--sigma",
            "1",
            "--init_infect",
            "10",
            "--dt",
            "0.01",
            "--sim_ts",
            "500",
            "--output_dir",
            "charts",
        ])
        .unwrap();
        let environment = args.environment().unwrap();
        let parameters = environment.input.clone().unwrap();
        assert_eq!(parameters.population, 40000);
        assert_eq!(parameters.beta, 4.0);
        assert_eq!(parameters.steps, 500);
        assert_eq!(environment.output_dir(), Path::new("charts"));
    }

    #[test]
    fn test_aliases_and_negative_values_parse() {
        let args = Args::try_parse_from([
            "sir",
            "--population",
            "10",
            "--initial-infected",
            "2",
            "--dt",
            "-0.5",
        ])
        .unwrap();
        assert_eq!(args.population, Some(10));
        assert_eq!(args.initial_infected, Some(2));
        assert_eq!(args.dt, Some(-0.5));
    }

    #[test]
    fn test_config_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(
            &path,
            "[input]\nN = 500\nbeta = 0.2\nseed = 3\n\n[output]\nspec = \"filesystem\"\ndir = \"from-config\"\n",
        )
        .unwrap();

        let args = Args::try_parse_from([
            "sir",
            "--config",
            path.to_str().unwrap(),
            "--beta",
            "0.4",
        ])
        .unwrap();
        let environment = args.environment().unwrap();
        let parameters = environment.input.clone().unwrap();

        assert_eq!(parameters.population, 500);
        assert_eq!(parameters.beta, 0.4);
        assert_eq!(parameters.sigma, 1.0);
        assert_eq!(environment.seed, Some(3));
        assert_eq!(environment.output_dir(), Path::new("from-config"));
    }

    #[test]
    fn test_config_and_stdin_conflict() {
        assert!(Args::try_parse_from(["sir", "--config", "run.toml", "--stdin"]).is_err());
    }
}
