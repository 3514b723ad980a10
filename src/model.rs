use ode_solvers::Vector5;
use serde_derive::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// The five compartments of the SEIRD model, in state-vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compartment {
    Susceptible,
    Exposed,
    Infectious,
    Recovered,
    Deceased,
}

impl Compartment {
    pub const ALL: [Compartment; 5] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Infectious,
        Compartment::Recovered,
        Compartment::Deceased,
    ];

    /// Column of this compartment in a state vector or trajectory matrix
    pub fn index(&self) -> usize {
        match self {
            Compartment::Susceptible => 0,
            Compartment::Exposed => 1,
            Compartment::Infectious => 2,
            Compartment::Recovered => 3,
            Compartment::Deceased => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Compartment::Susceptible => "Susceptible",
            Compartment::Exposed => "Exposed",
            Compartment::Infectious => "Infectious",
            Compartment::Recovered => "Recovered",
            Compartment::Deceased => "Deaths",
        }
    }
}

impl std::fmt::Display for Compartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Sub-population sizes at one instant
///
/// The same shape is used for the time-derivatives returned by [derivatives]. Compartments
/// missing from a configuration table start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(rename = "susceptible", default)]
    pub s: f64,
    #[serde(rename = "exposed", default)]
    pub e: f64,
    #[serde(rename = "infectious", default)]
    pub i: f64,
    #[serde(rename = "recovered", default)]
    pub r: f64,
    #[serde(rename = "deceased", default)]
    pub d: f64,
}

impl State {
    pub fn new(s: f64, e: f64, i: f64, r: f64, d: f64) -> Self {
        Self { s, e, i, r, d }
    }

    /// Total population N = S + E + I + R + D
    pub fn total(&self) -> f64 {
        self.s + self.e + self.i + self.r + self.d
    }

    pub fn get(&self, compartment: Compartment) -> f64 {
        self.to_array()[compartment.index()]
    }

    pub fn to_array(&self) -> [f64; 5] {
        [self.s, self.e, self.i, self.r, self.d]
    }

    pub fn from_array(values: [f64; 5]) -> Self {
        let [s, e, i, r, d] = values;
        Self { s, e, i, r, d }
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// Checks that every count is finite and non-negative, and that the total is positive
    pub fn validate(&self) -> Result<()> {
        for compartment in Compartment::ALL {
            let value = self.get(compartment);
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::Validation(format!(
                    "initial {} count must be a non-negative number, got {}",
                    compartment.label().to_lowercase(),
                    value
                )));
            }
        }
        if self.total() <= 0.0 {
            return Err(SimulationError::Domain(
                "total population is zero, the force of infection I/N is undefined".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn to_vector(self) -> Vector5<f64> {
        Vector5::new(self.s, self.e, self.i, self.r, self.d)
    }

    pub(crate) fn from_vector(y: &Vector5<f64>) -> Self {
        Self::new(y[0], y[1], y[2], y[3], y[4])
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new(999.0, 0.0, 1.0, 0.0, 0.0)
    }
}

/// Rates of the model, constant over a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Transmission rate
    pub rb: f64,
    /// Progression rate from exposed to infectious (1 / incubation period)
    pub epsilon: f64,
    /// Recovery rate
    pub gamma: f64,
    /// Mortality rate of the infectious
    pub delta: f64,
}

impl Parameters {
    pub fn new(rb: f64, epsilon: f64, gamma: f64, delta: f64) -> Self {
        Self {
            rb,
            epsilon,
            gamma,
            delta,
        }
    }

    /// Rejects negative or non-finite rates
    ///
    /// [derivatives] itself accepts any value, this check is only applied before a run.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("rb", self.rb),
            ("epsilon", self.epsilon),
            ("gamma", self.gamma),
            ("delta", self.delta),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::Validation(format!(
                    "parameter {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new(0.8, 0.2, 0.1, 0.05)
    }
}

/// Time-derivatives of the SEIRD system
///
/// ```text
/// N  = S + E + I + R + D
/// dS = -rB * S * I / N
/// dE = (rB * I / N) * S - epsilon * E
/// dI = epsilon * E - gamma * I - delta * I
/// dR = gamma * I
/// dD = delta * I
/// ```
///
/// No validation is performed. A zero total population yields non-finite rates.
#[inline(always)]
pub fn derivatives(state: &State, params: &Parameters) -> State {
    let State { s, e, i, r, d } = *state;
    let n = s + e + i + r + d;
    State {
        s: -params.rb * s * i / n,
        e: (params.rb * i / n) * s - params.epsilon * e,
        i: params.epsilon * e - params.gamma * i - params.delta * i,
        r: params.gamma * i,
        d: params.delta * i,
    }
}
