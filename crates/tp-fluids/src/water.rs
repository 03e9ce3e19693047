//! Liquid water from saturated-liquid property tables.
//!
//! Viscosity and conductivity follow Incropera & DeWitt, Table A.6, over
//! 1.85-61.85 °C; density and specific heat cover 0-100 °C. Lookups outside
//! a table clamp to its end values.

use crate::convection::water_prandtl;
use crate::error::FluidResult;
use crate::model::FluidProperties;
use tp_core::numeric::{LinearTable, Real, ensure_finite};

const BULK_TEMPS: [Real; 11] = [0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];

const DENSITY: LinearTable<11> = LinearTable::new(
    BULK_TEMPS,
    [
        999.8, 999.7, 998.2, 995.7, 992.2, 988.0, 983.2, 977.8, 971.8, 965.3, 958.4,
    ],
);

const SPECIFIC_HEAT: LinearTable<11> = LinearTable::new(
    BULK_TEMPS,
    [
        4217.0, 4192.0, 4182.0, 4178.0, 4179.0, 4181.0, 4185.0, 4190.0, 4197.0, 4205.0, 4216.0,
    ],
);

pub(crate) const TRANSPORT_TEMPS: [Real; 13] = [
    1.85, 6.85, 11.85, 16.85, 21.85, 26.85, 31.85, 36.85, 41.85, 46.85, 51.85, 56.85, 61.85,
];

const VISCOSITY: LinearTable<13> = LinearTable::new(
    TRANSPORT_TEMPS,
    [
        0.001652, 0.001422, 0.001225, 0.00108, 0.000959, 0.000855, 0.000769, 0.000695, 0.000631,
        0.000577, 0.000528, 0.000489, 0.000453,
    ],
);

const CONDUCTIVITY: LinearTable<13> = LinearTable::new(
    TRANSPORT_TEMPS,
    [
        0.574, 0.582, 0.590, 0.598, 0.606, 0.613, 0.620, 0.628, 0.634, 0.640, 0.645, 0.650, 0.656,
    ],
);

/// Tabulated liquid water.
#[derive(Clone, Copy, Debug, Default)]
pub struct TabulatedWater;

impl TabulatedWater {
    pub fn new() -> Self {
        Self
    }
}

impl FluidProperties for TabulatedWater {
    fn name(&self) -> &str {
        "water"
    }

    fn density(&self, t_c: Real) -> FluidResult<Real> {
        Ok(DENSITY.interpolate(ensure_finite(t_c, "water temperature")?))
    }

    fn specific_heat(&self, t_c: Real) -> FluidResult<Real> {
        Ok(SPECIFIC_HEAT.interpolate(ensure_finite(t_c, "water temperature")?))
    }

    fn viscosity(&self, t_c: Real) -> FluidResult<Real> {
        Ok(VISCOSITY.interpolate(ensure_finite(t_c, "water temperature")?))
    }

    fn conductivity(&self, t_c: Real) -> FluidResult<Real> {
        Ok(CONDUCTIVITY.interpolate(ensure_finite(t_c, "water temperature")?))
    }

    fn prandtl(&self, t_c: Real) -> FluidResult<Real> {
        Ok(water_prandtl(ensure_finite(t_c, "water temperature")?))
    }
}
