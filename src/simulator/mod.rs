mod dopri;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};

use crate::{
    error::{Result, SimulationError},
    model::{Compartment, Parameters, State},
    settings::Solver,
};

/// Ordered time points (days) at which a trajectory is reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// `points` evenly spaced values from `start` to `end`, both included
    ///
    /// A single point yields `[start]`, zero points an empty grid.
    pub fn linspace(start: f64, end: f64, points: usize) -> Self {
        let times = match points {
            0 => vec![],
            1 => vec![start],
            _ => {
                let step = (end - start) / (points - 1) as f64;
                let mut times: Vec<f64> = (0..points).map(|k| start + k as f64 * step).collect();
                times[points - 1] = end;
                times
            }
        };
        Self { times }
    }

    pub fn from_times(times: Vec<f64>) -> Self {
        Self { times }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Requires at least one finite point and no step backwards in time
    ///
    /// Repeated points are allowed and reported with identical states.
    pub fn validate(&self) -> Result<()> {
        if self.times.is_empty() {
            return Err(SimulationError::Validation(
                "the time grid has no points".to_string(),
            ));
        }
        if let Some(t) = self.times.iter().find(|t| !t.is_finite()) {
            return Err(SimulationError::Validation(format!(
                "the time grid contains a non-finite point: {}",
                t
            )));
        }
        for (k, pair) in self.times.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(SimulationError::Validation(format!(
                    "the time grid must be non-decreasing, but t[{}] = {} > t[{}] = {}",
                    k,
                    pair[0],
                    k + 1,
                    pair[1]
                )));
            }
        }
        Ok(())
    }
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::linspace(0.0, 150.0, 50)
    }
}

/// Everything a single run needs, owned so that runs never share inputs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub parameters: Parameters,
    pub initial: State,
    pub grid: TimeGrid,
}

impl Scenario {
    pub fn new(parameters: Parameters, initial: State, grid: TimeGrid) -> Self {
        Self {
            parameters,
            initial,
            grid,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.parameters.validate()?;
        self.initial.validate()?;
        self.grid.validate()
    }
}

/// States sampled on a time grid
///
/// Row `k` of [Trajectory::states] holds (S, E, I, R, D) at `times[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Array1<f64>,
    states: Array2<f64>,
}

impl Trajectory {
    pub fn new(times: Array1<f64>, states: Array2<f64>) -> Result<Self> {
        if states.ncols() != Compartment::ALL.len() || states.nrows() != times.len() {
            return Err(SimulationError::Validation(format!(
                "a trajectory over {} time points needs a {}x{} state matrix, got {}x{}",
                times.len(),
                times.len(),
                Compartment::ALL.len(),
                states.nrows(),
                states.ncols()
            )));
        }
        Ok(Self { times, states })
    }

    pub fn times(&self) -> &Array1<f64> {
        &self.times
    }

    pub fn states(&self) -> &Array2<f64> {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Values of one compartment over time
    pub fn compartment(&self, compartment: Compartment) -> ArrayView1<'_, f64> {
        self.states.column(compartment.index())
    }

    pub fn state(&self, index: usize) -> Option<State> {
        if index >= self.len() {
            return None;
        }
        let row = self.states.row(index);
        Some(State::new(row[0], row[1], row[2], row[3], row[4]))
    }

    /// S + E + I + R + D at every time point
    pub fn totals(&self) -> Array1<f64> {
        self.states.sum_axis(Axis(1))
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, State)> + '_ {
        self.times
            .iter()
            .zip(self.states.rows())
            .map(|(t, row)| (*t, State::new(row[0], row[1], row[2], row[3], row[4])))
    }
}

/// Integrates the scenario and reports the state at every grid point
///
/// The first row is the initial state as given. Each following row is obtained by integrating
/// from the previous grid point, so the solver may take any number of internal steps in between.
pub fn simulate(scenario: &Scenario, solver: &Solver) -> Result<Trajectory> {
    scenario.validate()?;
    solver.validate()?;

    let times = scenario.grid.times();
    let mut states = Array2::<f64>::zeros((times.len(), Compartment::ALL.len()));
    let mut x = scenario.initial;
    states.row_mut(0).assign(&Array1::from(x.to_array().to_vec()));

    for (k, pair) in times.windows(2).enumerate() {
        x = dopri::simulate_segment(&scenario.parameters, x, pair[0], pair[1], solver)?;
        if !x.is_finite() {
            return Err(SimulationError::Domain(format!(
                "state became non-finite at t = {} (total population {})",
                pair[1],
                x.total()
            )));
        }
        states.row_mut(k + 1).assign(&Array1::from(x.to_array().to_vec()));
    }

    tracing::debug!(
        "Integrated {} grid points over [{}, {}]",
        times.len(),
        times[0],
        times[times.len() - 1]
    );
    Trajectory::new(Array1::from(times.to_vec()), states)
}

/// Runs independent scenarios in parallel, one result per scenario in input order
pub fn simulate_batch(scenarios: &[Scenario], solver: &Solver) -> Vec<Result<Trajectory>> {
    scenarios
        .par_iter()
        .map(|scenario| simulate(scenario, solver))
        .collect()
}
