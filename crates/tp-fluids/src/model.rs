//! Fluid property trait and the per-step property cache.

use crate::error::{FluidError, FluidResult};
use tp_core::numeric::{Real, ensure_finite};

/// Cached fluid properties evaluated at one temperature.
///
/// The pipe model queries its property source once per outer time step and
/// passes the pack to the solvers, so a host re-iterating the same instant
/// never triggers extra backend calls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidPropertyPack {
    /// Temperature the pack was evaluated at [°C]
    pub temperature_c: Real,

    /// Density [kg/m³]
    pub density: Real,

    /// Specific heat capacity [J/(kg·K)]
    pub specific_heat: Real,

    /// Dynamic viscosity [Pa·s]
    pub viscosity: Real,

    /// Thermal conductivity [W/(m·K)]
    pub conductivity: Real,

    /// Prandtl number
    pub prandtl: Real,
}

impl FluidPropertyPack {
    /// A pack with every property zeroed.
    ///
    /// This is the state before the first evaluation of an environment period;
    /// the near-pipe solver treats it as a degenerate fluid and skips its update.
    pub const fn unset() -> Self {
        Self {
            temperature_c: 0.0,
            density: 0.0,
            specific_heat: 0.0,
            viscosity: 0.0,
            conductivity: 0.0,
            prandtl: 0.0,
        }
    }

    /// True when density and specific heat both describe a real fluid.
    pub fn is_usable(&self) -> bool {
        self.density > 0.0 && self.specific_heat > 0.0
    }

    /// Volumetric flow [m³/s] for a mass flow, or zero when density is unusable.
    pub fn volume_flow(&self, mass_flow: Real) -> Real {
        if self.density > 0.0 {
            mass_flow / self.density
        } else {
            0.0
        }
    }

    /// Return a summary string of all contained properties (for debugging).
    pub fn summary(&self) -> String {
        format!(
            "Pack(T={:.2}°C,ρ={:.2}kg/m³,cp={:.1}J/kg·K,μ={:.3e}Pa·s,k={:.3}W/m·K,Pr={:.2})",
            self.temperature_c,
            self.density,
            self.specific_heat,
            self.viscosity,
            self.conductivity,
            self.prandtl
        )
    }
}

/// Source of liquid properties as functions of temperature.
///
/// Implementations must be thread-safe (Send + Sync) so independent pipes can
/// be evaluated in parallel against one shared property source.
pub trait FluidProperties: Send + Sync {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Density [kg/m³] at `t_c` [°C].
    fn density(&self, t_c: Real) -> FluidResult<Real>;

    /// Specific heat capacity [J/(kg·K)] at `t_c` [°C].
    fn specific_heat(&self, t_c: Real) -> FluidResult<Real>;

    /// Dynamic viscosity [Pa·s] at `t_c` [°C].
    fn viscosity(&self, t_c: Real) -> FluidResult<Real>;

    /// Thermal conductivity [W/(m·K)] at `t_c` [°C].
    fn conductivity(&self, t_c: Real) -> FluidResult<Real>;

    /// Prandtl number at `t_c` [°C].
    ///
    /// Defaults to μ·cp/k; sources with a measured table should override it.
    fn prandtl(&self, t_c: Real) -> FluidResult<Real> {
        Ok(self.viscosity(t_c)? * self.specific_heat(t_c)? / self.conductivity(t_c)?)
    }

    /// Evaluate every property in one call.
    ///
    /// Density and specific heat are passed through untouched so a source may
    /// report a degenerate (e.g. frozen) state; viscosity and conductivity must
    /// be positive because the convection correlations divide by them.
    fn property_pack(&self, t_c: Real) -> FluidResult<FluidPropertyPack> {
        ensure_finite(t_c, "fluid temperature")?;

        let viscosity = self.viscosity(t_c)?;
        if !(viscosity.is_finite() && viscosity > 0.0) {
            return Err(FluidError::NonPhysical { what: "viscosity" });
        }
        let conductivity = self.conductivity(t_c)?;
        if !(conductivity.is_finite() && conductivity > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "conductivity",
            });
        }

        Ok(FluidPropertyPack {
            temperature_c: t_c,
            density: ensure_finite(self.density(t_c)?, "density")?,
            specific_heat: ensure_finite(self.specific_heat(t_c)?, "specific heat")?,
            viscosity,
            conductivity,
            prandtl: ensure_finite(self.prandtl(t_c)?, "prandtl number")?,
        })
    }
}
