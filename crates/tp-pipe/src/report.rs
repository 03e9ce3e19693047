//! Per-step outputs of a pipe.

use crate::soil::SoilSweepOutcome;
use tp_core::numeric::Real;

/// Values reported at the end of an outer step.
///
/// Loss rates are positive when heat leaves the fluid (fluid loss) or the
/// pipe surface (environment loss).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipeReport {
    pub inlet_temperature_c: Real,
    pub outlet_temperature_c: Real,
    pub mass_flow_kgps: Real,
    /// Zero when the fluid density is not usable
    pub volume_flow_m3ps: Real,
    pub fluid_heat_loss_w: Real,
    pub fluid_heat_loss_j: Real,
    /// Surface loss averaged over the sub-steps of the outer step
    pub environment_heat_loss_w: Real,
    pub environment_heat_loss_j: Real,
    /// Heat delivered to the zone air; zero unless the pipe sits in a zone
    pub zone_heat_gain_w: Real,
    /// Accepted wall temperature of the first section
    pub wall_temperature_inlet_c: Real,
    /// Accepted wall temperature of the last section
    pub wall_temperature_outlet_c: Real,
    pub sub_steps: usize,
    /// Last soil iteration of the step, for buried pipes
    pub soil: Option<SoilSweepOutcome>,
}

impl PipeReport {
    /// Inlet minus outlet temperature [K].
    pub fn temperature_drop(&self) -> Real {
        self.inlet_temperature_c - self.outlet_temperature_c
    }
}
