//! Temperature-independent fluid, mostly for tests and simple studies.

use crate::error::FluidResult;
use crate::model::FluidProperties;
use tp_core::numeric::Real;

/// Fluid whose properties do not vary with temperature.
#[derive(Clone, Debug)]
pub struct ConstantFluid {
    name: String,
    pub density: Real,
    pub specific_heat: Real,
    pub viscosity: Real,
    pub conductivity: Real,
}

impl ConstantFluid {
    pub fn new(
        name: impl Into<String>,
        density: Real,
        specific_heat: Real,
        viscosity: Real,
        conductivity: Real,
    ) -> Self {
        Self {
            name: name.into(),
            density,
            specific_heat,
            viscosity,
            conductivity,
        }
    }

    /// Liquid water near room temperature.
    pub fn water_like() -> Self {
        Self::new("constant-water", 998.0, 4182.0, 1.0e-3, 0.6)
    }

    pub fn with_specific_heat(mut self, specific_heat: Real) -> Self {
        self.specific_heat = specific_heat;
        self
    }

    pub fn with_density(mut self, density: Real) -> Self {
        self.density = density;
        self
    }

    pub fn with_viscosity(mut self, viscosity: Real) -> Self {
        self.viscosity = viscosity;
        self
    }
}

impl FluidProperties for ConstantFluid {
    fn name(&self) -> &str {
        &self.name
    }

    fn density(&self, _t_c: Real) -> FluidResult<Real> {
        Ok(self.density)
    }

    fn specific_heat(&self, _t_c: Real) -> FluidResult<Real> {
        Ok(self.specific_heat)
    }

    fn viscosity(&self, _t_c: Real) -> FluidResult<Real> {
        Ok(self.viscosity)
    }

    fn conductivity(&self, _t_c: Real) -> FluidResult<Real> {
        Ok(self.conductivity)
    }
}
