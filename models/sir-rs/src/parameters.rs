use serde::Deserialize;

use crate::error::SimulationError;

/// Inputs of one SIR run. Field names follow the command line; `N`,
/// `init_infect` and `sim_ts` are accepted as aliases in input documents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    #[serde(alias = "N")]
    pub population: u64,
    pub beta: f64,
    pub sigma: f64,
    #[serde(alias = "init_infect")]
    pub initial_infected: u64,
    pub dt: f64,
    #[serde(alias = "sim_ts")]
    pub steps: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            population: 1000,
            beta: 10.0,
            sigma: 1.0,
            initial_infected: 10,
            dt: 0.01,
            steps: 500,
        }
    }
}

impl Parameters {
    /// Checks every precondition of a run. Nothing is clamped.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] naming the first field
    /// that is out of range.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.population == 0 {
            return Err(SimulationError::invalid("population", "must be positive"));
        }
        if self.initial_infected > self.population {
            return Err(SimulationError::invalid(
                "initial_infected",
                format!(
                    "{} exceeds the population of {}",
                    self.initial_infected, self.population
                ),
            ));
        }
        non_negative_rate("beta", self.beta)?;
        non_negative_rate("sigma", self.sigma)?;
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimulationError::invalid(
                "dt",
                format!("must be a positive finite duration, got {}", self.dt),
            ));
        }
        if self.steps == 0 {
            return Err(SimulationError::invalid("steps", "must be at least 1"));
        }
        Ok(())
    }

    /// Parameter fragment of artifact names, e.g.
    /// `N1000_beta10_sigma1_initial10_dt0.01_ts500`.
    pub fn file_stem(&self) -> String {
        format!(
            "N{}_beta{}_sigma{}_initial{}_dt{}_ts{}",
            self.population, self.beta, self.sigma, self.initial_infected, self.dt, self.steps
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "N={}, beta={}, sigma={}, initial_infected_individuals={}, dt={}, sim_ts={}",
            self.population, self.beta, self.sigma, self.initial_infected, self.dt, self.steps
        )
    }
}

fn non_negative_rate(field: &'static str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid(
            field,
            format!("must be a non-negative finite rate, got {value}"),
        ))
    }
}
