//! Error types for pipe heat transfer.

use thiserror::Error;

/// Errors raised at the pipe model boundary.
///
/// The numeric solvers themselves never fail: degenerate fluid states and
/// soil non-convergence are handled as fallbacks and diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipeError {
    #[error("Invalid configuration for pipe '{pipe}': {what}")]
    InvalidConfig { pipe: String, what: &'static str },

    #[error("Pipe '{pipe}' needs {what} from the host but none was supplied")]
    MissingAmbient { pipe: String, what: &'static str },

    #[error("Non-finite host input for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Fluid property error: {0}")]
    Fluid(#[from] tp_fluids::FluidError),

    #[error("Core error: {0}")]
    Core(tp_core::CoreError),
}

pub type PipeResult<T> = Result<T, PipeError>;

impl From<tp_core::CoreError> for PipeError {
    fn from(e: tp_core::CoreError) -> Self {
        match e {
            tp_core::CoreError::NonFinite { what, value } => PipeError::NonFinite { what, value },
            other => PipeError::Core(other),
        }
    }
}
