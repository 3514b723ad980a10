//! Deterministic SEIRD (Susceptible-Exposed-Infectious-Recovered-Deceased) epidemic simulator
//!
//! A scenario (rates, initial compartment sizes and a time grid) is integrated with an adaptive
//! Runge-Kutta solver, and the resulting trajectory is summarised by its peak and by the first
//! time it falls back below a threshold.
//!
//! ```no_run
//! use seird::prelude::*;
//!
//! let settings = Settings::builder()
//!     .set_parameters(Parameters::new(0.8, 0.2, 0.1, 0.05))
//!     .set_initial(State::new(999.0, 0.0, 1.0, 0.0, 0.0))
//!     .set_grid(0.0, 150.0, 50)
//!     .build();
//! let result = run_internal(&settings).unwrap();
//! println!("{:?}", result.summary().crossing.time());
//! ```

pub mod analysis;
pub mod entrypoints;
pub mod error;
pub mod logger;
pub mod model;
pub mod output;
pub mod settings;
pub mod simulator;

pub mod prelude {
    pub use crate::analysis::{
        first_at_or_below, peak, peak_time, peak_value, summarize, threshold_crossing, Crossing,
        Peak, Summary,
    };
    pub use crate::entrypoints::{run, run_internal, SimulationResult};
    pub use crate::error::SimulationError;
    pub use crate::model::{derivatives, Compartment, Parameters, State};
    pub use crate::settings::{self, Settings};
    pub use crate::simulator::{simulate, simulate_batch, Scenario, TimeGrid, Trajectory};
}

//Tests
#[cfg(test)]
mod tests;
