use thiserror::Error;

/// Errors raised while validating, integrating or analysing a scenario
///
/// A threshold that is never crossed is not an error, see [crate::analysis::Crossing].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// Negative or non-finite inputs, or a malformed time grid
    #[error("Validation error: {0}")]
    Validation(String),

    /// The model is undefined, e.g. the total population is zero
    #[error("Domain error: {0}")]
    Domain(String),

    /// The ODE solver failed to reach the end of a segment
    #[error("Integration error: {0}")]
    Integration(String),

    /// A trajectory query could not be answered
    #[error("Analysis error: {0}")]
    Analysis(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
