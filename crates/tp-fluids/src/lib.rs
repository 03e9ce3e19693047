//! tp-fluids: fluid properties and convection correlations for thermopipe.
//!
//! Provides:
//! - `FluidProperties` trait, the boundary to whatever property source the host uses
//! - `FluidPropertyPack`, a per-step cache of the values the pipe solvers need
//! - Tabulated water and constant-property fluids
//! - Convection correlations: internal pipe flow, cylinder in cross flow,
//!   and the ASHRAE simple exterior surface model
//!
//! # Example
//!
//! ```
//! use tp_fluids::{FluidProperties, TabulatedWater, convection};
//!
//! let water = TabulatedWater::new();
//! let pack = water.property_pack(20.0).unwrap();
//! let inside =
//!     convection::internal_convection(0.5, pack.viscosity, pack.conductivity, pack.prandtl, 0.05);
//! assert!(inside.coefficient > 0.0);
//! ```

pub mod constant;
pub mod convection;
pub mod error;
pub mod model;
pub mod water;

// Re-exports for ergonomics
pub use constant::ConstantFluid;
pub use convection::{CrossFlowConvection, InternalConvection, SurfaceRoughness};
pub use error::{FluidError, FluidResult};
pub use model::{FluidProperties, FluidPropertyPack};
pub use water::TabulatedWater;
