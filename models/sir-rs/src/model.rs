use rand::{Rng, SeedableRng, distr::Distribution, rngs::StdRng};
use rand_distr::Binomial;
use tracing::{debug, trace};

use crate::{
    error::SimulationError,
    output::{State, Trajectory},
    parameters::Parameters,
};

/// Counts drawn for one step, all from the previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transitions {
    pub(crate) infections: u64,
    pub(crate) recoveries: u64,
}

impl Transitions {
    /// Only valid for counts produced by `draw` from `state`:
    /// `infections <= susceptible` and `recoveries <= infected`.
    pub(crate) fn apply(self, state: State) -> State {
        State {
            susceptible: state.susceptible - self.infections,
            infected: state.infected + self.infections - self.recoveries,
            recovered: state.recovered + self.recoveries,
        }
    }
}

/// Per-step probability of an event with constant hazard `rate` over `dt`,
/// `1 - exp(-rate * dt)`.
pub fn event_probability(rate: f64, dt: f64) -> f64 {
    -f64::exp_m1(-rate * dt)
}

/// Discrete-time stochastic SIR simulator. Owns its random source, so runs
/// are reproducible from a seed and independent across instances.
///
/// Per-step transition counts are internal; callers only see validated runs.
///
/// ```compile_fail
/// let _ = sir::model::Transitions { infections: 1, recoveries: 0 };
/// ```
pub struct SirModel<R = StdRng> {
    rng: R,
}

impl SirModel<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SirModel<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Runs `parameters.steps` updates from `(N - I0, I0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] before any step runs if
    /// the parameters are out of range.
    pub fn simulate(&mut self, parameters: &Parameters) -> Result<Trajectory, SimulationError> {
        parameters.validate()?;
        debug!(
            population = parameters.population,
            beta = parameters.beta,
            sigma = parameters.sigma,
            initial_infected = parameters.initial_infected,
            dt = parameters.dt,
            steps = parameters.steps,
            "starting SIR run"
        );

        let population = parameters.population as f64;
        let recovery_prob = event_probability(parameters.sigma, parameters.dt);

        let mut state = State {
            susceptible: parameters.population - parameters.initial_infected,
            infected: parameters.initial_infected,
            recovered: 0,
        };
        let mut trajectory = Trajectory::with_capacity(parameters.steps);
        for step in 0..parameters.steps {
            let infection_rate = parameters.beta * state.infected as f64 / population;
            let infection_prob = event_probability(infection_rate, parameters.dt);
            let transitions = self.draw(state, infection_prob, recovery_prob)?;
            state = transitions.apply(state);
            trace!(
                step,
                infections = transitions.infections,
                recoveries = transitions.recoveries,
                s = state.susceptible,
                i = state.infected,
                r = state.recovered
            );
            trajectory.push(state);
        }

        debug!(
            final_infected = state.infected,
            final_recovered = state.recovered,
            "finished SIR run"
        );
        Ok(trajectory)
    }

    /// Infections are drawn before recoveries, both from `state`. Newly
    /// infected individuals cannot recover in the same step.
    fn draw(
        &mut self,
        state: State,
        infection_prob: f64,
        recovery_prob: f64,
    ) -> Result<Transitions, SimulationError> {
        let infections = Binomial::new(state.susceptible, infection_prob)?.sample(&mut self.rng);
        let recoveries = Binomial::new(state.infected, recovery_prob)?.sample(&mut self.rng);
        Ok(Transitions {
            infections,
            recoveries,
        })
    }
}

/// One run with the positional contract `(N, beta, sigma, I0, dt, T)`.
///
/// # Errors
///
/// See [`SirModel::simulate`].
pub fn simulate<R: Rng>(
    population: u64,
    beta: f64,
    sigma: f64,
    initial_infected: u64,
    dt: f64,
    steps: usize,
    rng: &mut R,
) -> Result<Trajectory, SimulationError> {
    let parameters = Parameters {
        population,
        beta,
        sigma,
        initial_infected,
        dt,
        steps,
    };
    SirModel::new(rng).simulate(&parameters)
}

#[cfg(test)]
mod test {
    use rand::{SeedableRng, rngs::StdRng};

    use crate::{
        error::SimulationError,
        model::{SirModel, Transitions, event_probability, simulate},
        output::State,
        parameters::Parameters,
    };

    fn final_infected(parameters: &Parameters, seed: u64) -> u64 {
        SirModel::seeded(seed)
            .simulate(parameters)
            .unwrap()
            .final_state()
            .unwrap()
            .infected
    }

    #[test]
    fn test_event_probability() {
        assert_eq!(event_probability(0.0, 0.1), 0.0);
        assert!((event_probability(1.0, 0.01) - (1.0 - f64::exp(-0.01))).abs() < 1e-15);
        assert!(event_probability(1e6, 1.0) <= 1.0);
    }

    #[test]
    fn test_apply_moves_counts() {
        let state = State {
            susceptible: 990,
            infected: 10,
            recovered: 0,
        };
        let next = Transitions {
            infections: 3,
            recoveries: 2,
        }
        .apply(state);
        assert_eq!(
            next,
            State {
                susceptible: 987,
                infected: 11,
                recovered: 2,
            }
        );
    }

    #[test]
    fn test_extinction() {
        let parameters = Parameters {
            population: 1000,
            beta: 10.0,
            sigma: 1.0,
            initial_infected: 10,
            dt: 0.01,
            steps: 1500,
        };
        let trajectory = SirModel::seeded(9).simulate(&parameters).unwrap();
        assert_eq!(trajectory.len(), 1500);
        assert!(trajectory.infected[0] <= 15);
        assert_eq!(trajectory.final_state().unwrap().infected, 0);
    }

    #[test]
    fn test_fast_and_slow_spreading_epidemics() {
        let n_samples = 200;
        let fast = Parameters {
            population: 1000,
            beta: 0.2,
            sigma: 0.05,
            initial_infected: 10,
            dt: 0.1,
            steps: 50,
        };
        let slow = Parameters {
            beta: 0.02,
            ..fast.clone()
        };

        let mut fast_above = 0;
        let mut slow_within = 0;
        let mut fast_total = 0;
        let mut slow_total = 0;
        for seed in 0..n_samples {
            let fast_final = final_infected(&fast, seed);
            let slow_final = final_infected(&slow, seed);
            if fast_final > 10 {
                fast_above += 1;
            }
            if slow_final > 0 && slow_final < 13 {
                slow_within += 1;
            }
            fast_total += fast_final;
            slow_total += slow_final;
        }

        // Expected final infected is ~20.4 (fast) and ~8.6 (slow)
        assert!(fast_above as f64 / n_samples as f64 > 0.85);
        assert!(slow_within as f64 / n_samples as f64 > 0.9);
        let fast_mean = fast_total as f64 / n_samples as f64;
        let slow_mean = slow_total as f64 / n_samples as f64;
        assert!(f64::abs(fast_mean - 20.4) < 3.0);
        assert!(f64::abs(slow_mean - 8.6) < 1.5);
    }

    #[test]
    fn test_higher_beta_infects_more() {
        let n_samples = 200;
        let low = Parameters {
            population: 1000,
            beta: 0.5,
            sigma: 0.2,
            initial_infected: 10,
            dt: 0.1,
            steps: 100,
        };
        let high = Parameters {
            beta: 1.0,
            ..low.clone()
        };

        let mut high_wins = 0;
        for seed in 0..n_samples {
            let infected_ever = |parameters: &Parameters| {
                let state = SirModel::seeded(seed)
                    .simulate(parameters)
                    .unwrap()
                    .final_state()
                    .unwrap();
                state.infected + state.recovered
            };
            if infected_ever(&high) > infected_ever(&low) {
                high_wins += 1;
            }
        }
        assert!(high_wins as f64 / n_samples as f64 > 0.9);
    }

    #[test]
    fn test_zero_beta_never_infects() {
        let parameters = Parameters {
            population: 500,
            beta: 0.0,
            sigma: 0.5,
            initial_infected: 50,
            dt: 0.1,
            steps: 400,
        };
        let trajectory = SirModel::seeded(1).simulate(&parameters).unwrap();
        assert!(trajectory.susceptible.iter().all(|&s| s == 450));
        assert!(trajectory.infected.windows(2).all(|w| w[1] <= w[0]));
        // Each infected survives 400 steps with probability exp(-20)
        assert_eq!(trajectory.final_state().unwrap().infected, 0);
    }

    #[test]
    fn test_zero_beta_and_sigma_is_frozen() {
        let parameters = Parameters {
            population: 100,
            beta: 0.0,
            sigma: 0.0,
            initial_infected: 7,
            dt: 1.0,
            steps: 20,
        };
        let trajectory = SirModel::seeded(3).simulate(&parameters).unwrap();
        assert!(trajectory.infected.iter().all(|&i| i == 7));
    }

    #[test]
    fn test_zero_sigma_never_recovers() {
        let parameters = Parameters {
            sigma: 0.0,
            ..Parameters::default()
        };
        let trajectory = SirModel::seeded(5).simulate(&parameters).unwrap();
        assert!(trajectory.recovered.iter().all(|&r| r == 0));
        assert!(trajectory.infected.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_seed_reproducibility() {
        let parameters = Parameters::default();
        let a = SirModel::seeded(8675309).simulate(&parameters).unwrap();
        let b = SirModel::seeded(8675309).simulate(&parameters).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_positional_entry_point_matches_model() {
        let mut rng = StdRng::seed_from_u64(11);
        let positional = simulate(1000, 0.2, 0.05, 10, 0.1, 50, &mut rng).unwrap();
        let parameters = Parameters {
            population: 1000,
            beta: 0.2,
            sigma: 0.05,
            initial_infected: 10,
            dt: 0.1,
            steps: 50,
        };
        let owned = SirModel::seeded(11).simulate(&parameters).unwrap();
        assert_eq!(positional, owned);
    }

    #[test]
    fn test_invalid_parameters_consume_no_randomness() {
        let parameters = Parameters {
            population: 10,
            initial_infected: 11,
            ..Parameters::default()
        };
        let mut model = SirModel::seeded(2);
        let result = model.simulate(&parameters);
        assert!(matches!(
            result,
            Err(SimulationError::InvalidParameter {
                field: "initial_infected",
                ..
            })
        ));

        let after_error = model.simulate(&Parameters::default()).unwrap();
        let fresh = SirModel::seeded(2).simulate(&Parameters::default()).unwrap();
        assert_eq!(after_error, fresh);
    }
}
