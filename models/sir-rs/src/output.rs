use nalgebra::Matrix3xX;

/// Compartment counts at one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State {
    pub susceptible: u64,
    pub infected: u64,
    pub recovered: u64,
}

impl State {
    pub fn total(&self) -> u64 {
        self.susceptible + self.infected + self.recovered
    }
}

/// Post-update states of one run, one entry per step. The initial state is
/// not included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trajectory {
    pub susceptible: Vec<u64>,
    pub infected: Vec<u64>,
    pub recovered: Vec<u64>,
}

impl Trajectory {
    pub fn with_capacity(len: usize) -> Trajectory {
        Trajectory {
            susceptible: Vec::with_capacity(len),
            infected: Vec::with_capacity(len),
            recovered: Vec::with_capacity(len),
        }
    }

    pub(crate) fn push(&mut self, state: State) {
        self.susceptible.push(state.susceptible);
        self.infected.push(state.infected);
        self.recovered.push(state.recovered);
    }

    pub fn len(&self) -> usize {
        self.susceptible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.susceptible.is_empty()
    }

    pub fn state(&self, step: usize) -> Option<State> {
        Some(State {
            susceptible: *self.susceptible.get(step)?,
            infected: *self.infected.get(step)?,
            recovered: *self.recovered.get(step)?,
        })
    }

    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        (0..self.len()).filter_map(|step| self.state(step))
    }

    pub fn final_state(&self) -> Option<State> {
        self.len().checked_sub(1).and_then(|step| self.state(step))
    }

    /// Largest infected count and the step where it first occurs.
    pub fn peak_infected(&self) -> Option<(usize, u64)> {
        self.infected
            .iter()
            .copied()
            .enumerate()
            .fold(None, |peak, (step, count)| match peak {
                Some((_, best)) if best >= count => peak,
                _ => Some((step, count)),
            })
    }

    /// `step * dt` for every step.
    pub fn time_points(&self, dt: f64) -> impl Iterator<Item = f64> + use<> {
        (0..self.len()).map(move |step| step as f64 * dt)
    }

    /// Rows are S, I and R; columns are steps.
    pub fn to_matrix(&self) -> Matrix3xX<u64> {
        Matrix3xX::from_fn(self.len(), |row, step| match row {
            0 => self.susceptible[step],
            1 => self.infected[step],
            _ => self.recovered[step],
        })
    }

    /// `step,time,susceptible,infected,recovered` records.
    pub fn csv_rows(&self, dt: f64) -> Vec<Vec<String>> {
        self.states()
            .zip(self.time_points(dt))
            .enumerate()
            .map(|(step, (state, time))| {
                vec![
                    step.to_string(),
                    time.to_string(),
                    state.susceptible.to_string(),
                    state.infected.to_string(),
                    state.recovered.to_string(),
                ]
            })
            .collect()
    }
}
