//! Transient heat transfer for fluid-carrying pipes.
//!
//! Provides:
//! - Hanby lumped fluid/pipe-wall model marched along the pipe
//! - Implicit finite-difference soil grid around buried pipes
//! - Kusuda-Achenbach undisturbed ground temperature
//! - History management for hosts that re-evaluate the same instant
//!
//! A host owns one [`PipeHeatTransfer`] per pipe, calls
//! [`PipeHeatTransfer::begin_environment`] at the start of every design day or
//! run period, then [`PipeHeatTransfer::simulate`] once or more per time step.

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod ground;
pub mod near_pipe;
pub mod report;
pub mod slots;
pub mod soil;
pub mod state;

// Re-exports for public API
pub use config::{
    BuriedPipe, DEFAULT_DEPTH_NODES, Environment, GridLayout, GroundCoupling, MaterialLayer,
    PipeConfiguration, PipeGeometry, SoilProperties, SurfaceTemperatureSource,
};
pub use context::{AmbientConditions, StepContext, StepInputs};
pub use controller::{
    HistoryTransition, INITIAL_TEMPERATURE_C, PipeHeatTransfer, SUB_STEP_SECONDS, sub_step_count,
};
pub use error::{PipeError, PipeResult};
pub use ground::{GroundBoundaryModel, SurfaceTemperatureStats};
pub use near_pipe::{NearPipeSolver, StepAccumulators};
pub use report::PipeReport;
pub use slots::{SlotField, TimeSlot};
pub use soil::{BuriedSoilSolver, SoilSolverSettings, SoilSweepOutcome};
pub use state::{PipeProfile, SoilGrid, ThermalState};
