//! tp-core: stable foundation for thermopipe.
//!
//! Contains:
//! - units (uom SI types + constructors, Celsius helpers)
//! - numeric (Real + tolerances + float helpers + table interpolation)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
