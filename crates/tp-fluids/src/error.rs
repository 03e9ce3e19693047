//! Fluid property errors.

use thiserror::Error;
use tp_core::CoreError;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative viscosity, conductivity, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value out of valid range.
    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<CoreError> for FluidError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NonFinite { what, value } => FluidError::OutOfRange { what, value },
            CoreError::InvalidArg { what } => FluidError::InvalidArg { what },
            CoreError::UnsortedTable { .. } => FluidError::InvalidArg {
                what: "property table abscissa must be increasing",
            },
        }
    }
}
