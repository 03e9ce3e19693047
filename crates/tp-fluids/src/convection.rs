//! Convection coefficient correlations.
//!
//! - Internal pipe flow: constant-wall-temperature laminar Nusselt number, Colburn
//!   equation when turbulent (Incropera & DeWitt).
//! - Cylinder in cross flow: Hilpert power law (Incropera & DeWitt, Eq. 7.55b)
//!   with a horizontal-cylinder natural convection floor.
//! - Horizontal ground surface: ASHRAE simple exterior model.

use crate::water::TRANSPORT_TEMPS;
use tp_core::numeric::{LinearTable, Real};

/// Largest Reynolds number treated as laminar pipe flow.
pub const MAX_LAMINAR_REYNOLDS: Real = 2300.0;

/// Fully developed laminar Nusselt number, constant wall temperature.
pub const LAMINAR_NUSSELT: Real = 3.66;

/// Nusselt number of a horizontal cylinder in still air.
pub const NATURAL_CONVECTION_NUSSELT: Real = 0.36;

/// Air velocity assumed around pipes inside a conditioned zone, 75 ft/min [m/s].
pub const ROOM_AIR_VELOCITY: Real = 0.381;

const AIR_PRANDTL: Real = 0.7;
const AIR_CONDUCTIVITY: Real = 0.025;

const WATER_PRANDTL: LinearTable<13> = LinearTable::new(
    TRANSPORT_TEMPS,
    [
        12.22, 10.26, 8.81, 7.56, 6.62, 5.83, 5.20, 4.62, 4.16, 3.77, 3.42, 3.15, 2.88,
    ],
);

/// Kinematic viscosity of air [m²/s] against temperature [°C].
const AIR_KINEMATIC_VISCOSITY: LinearTable<12> = LinearTable::new(
    [
        -73.0, -23.0, -10.0, 0.0, 10.0, 20.0, 27.0, 30.0, 40.0, 50.0, 76.85, 126.85,
    ],
    [
        75.52e-7, 11.37e-6, 12.44e-6, 13.3e-6, 14.18e-6, 15.08e-6, 15.75e-6, 16e-6, 16.95e-6,
        17.91e-6, 20.92e-6, 26.41e-6,
    ],
);

/// Hilpert correlation ranges: (Reynolds upper bound, C, m).
const CROSS_FLOW_RANGES: [(Real, Real, Real); 5] = [
    (4.0, 0.989, 0.33),
    (40.0, 0.911, 0.385),
    (4000.0, 0.683, 0.466),
    (40000.0, 0.193, 0.618),
    (400000.0, 0.027, 0.805),
];

/// Prandtl number of liquid water at `t_c` [°C], clamped to the table range.
pub fn water_prandtl(t_c: Real) -> Real {
    WATER_PRANDTL.interpolate(t_c)
}

/// Result of the internal flow correlation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InternalConvection {
    pub reynolds: Real,
    pub nusselt: Real,
    /// Fluid-to-wall coefficient [W/(m²·K)]
    pub coefficient: Real,
}

/// Nusselt number for fully developed pipe flow.
pub fn internal_flow_nusselt(reynolds: Real, prandtl: Real) -> Real {
    if reynolds >= MAX_LAMINAR_REYNOLDS {
        0.023 * reynolds.powf(0.8) * prandtl.powf(1.0 / 3.0)
    } else {
        // Also covers the no-flow case.
        LAMINAR_NUSSELT
    }
}

/// Fluid-to-pipe convection for a circular pipe.
///
/// # Arguments
/// * `mass_flow` - Mass flow rate [kg/s]
/// * `viscosity` - Dynamic viscosity [Pa·s], must be positive
/// * `conductivity` - Fluid conductivity [W/(m·K)]
/// * `prandtl` - Prandtl number
/// * `diameter` - Inner diameter [m]
pub fn internal_convection(
    mass_flow: Real,
    viscosity: Real,
    conductivity: Real,
    prandtl: Real,
    diameter: Real,
) -> InternalConvection {
    let reynolds = 4.0 * mass_flow.abs() / (std::f64::consts::PI * viscosity * diameter);
    let nusselt = internal_flow_nusselt(reynolds, prandtl);
    InternalConvection {
        reynolds,
        nusselt,
        coefficient: conductivity * nusselt / diameter,
    }
}

/// Result of the cross-flow correlation, with the range clamps that were applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossFlowConvection {
    pub reynolds: Real,
    pub nusselt: Real,
    /// Air-to-surface coefficient [W/(m²·K)]
    pub coefficient: Real,
    /// Air temperature was above the viscosity table.
    pub viscosity_clamped: bool,
    /// Reynolds number was above the last correlation range.
    pub reynolds_clamped: bool,
}

/// Convection from a cylinder of diameter `outer_diameter` [m] in air at
/// `air_temp_c` [°C] moving at `air_velocity` [m/s].
///
/// `name` only labels the diagnostics emitted when a table range is exceeded.
pub fn cross_flow_convection(
    name: &str,
    air_temp_c: Real,
    air_velocity: Real,
    outer_diameter: Real,
) -> CrossFlowConvection {
    let (viscosity, viscosity_clamped) = match AIR_KINEMATIC_VISCOSITY.step_at_or_above(air_temp_c)
    {
        Some(nu) => (nu, false),
        None => {
            tracing::warn!(
                pipe = name,
                air_temp_c,
                "air viscosity out of range, air temperature too high; using upper limit"
            );
            (AIR_KINEMATIC_VISCOSITY.last_value(), true)
        }
    };

    let reynolds = air_velocity.abs() * outer_diameter / viscosity;

    let (c, m, reynolds_clamped) = match CROSS_FLOW_RANGES
        .iter()
        .find(|(upper, _, _)| reynolds <= *upper)
    {
        Some(&(_, c, m)) => (c, m, false),
        None => {
            tracing::warn!(
                pipe = name,
                reynolds,
                "Reynolds number out of range; using coefficients of the last range"
            );
            let (_, c, m) = CROSS_FLOW_RANGES[CROSS_FLOW_RANGES.len() - 1];
            (c, m, true)
        }
    };

    let forced = c * reynolds.powf(m) * AIR_PRANDTL.powf(1.0 / 3.0);
    let nusselt = forced.max(NATURAL_CONVECTION_NUSSELT);

    CrossFlowConvection {
        reynolds,
        nusselt,
        coefficient: AIR_CONDUCTIVITY * nusselt / outer_diameter,
        viscosity_clamped,
        reynolds_clamped,
    }
}

/// Surface roughness classes of the ASHRAE simple exterior convection model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SurfaceRoughness {
    VeryRough,
    Rough,
    #[default]
    MediumRough,
    MediumSmooth,
    Smooth,
    VerySmooth,
}

impl SurfaceRoughness {
    /// Coefficients (D, E, F) of h = D + E·V + F·V².
    fn coefficients(self) -> (Real, Real, Real) {
        match self {
            SurfaceRoughness::VeryRough => (11.58, 5.894, 0.0),
            SurfaceRoughness::Rough => (12.49, 4.192, 0.0),
            SurfaceRoughness::MediumRough => (10.79, 4.192, 0.0),
            SurfaceRoughness::MediumSmooth => (8.23, 4.0, -0.057),
            SurfaceRoughness::Smooth => (10.22, 3.1, 0.0),
            SurfaceRoughness::VerySmooth => (8.23, 3.33, -0.036),
        }
    }
}

/// Combined exterior convection coefficient [W/(m²·K)] for a wind speed [m/s].
pub fn ashrae_simple_exterior(roughness: SurfaceRoughness, wind_speed: Real) -> Real {
    let (d, e, f) = roughness.coefficients();
    d + e * wind_speed + f * wind_speed * wind_speed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_well_formed() {
        WATER_PRANDTL.validate().unwrap();
        AIR_KINEMATIC_VISCOSITY.validate().unwrap();
    }

    #[test]
    fn prandtl_clamps_at_both_ends() {
        assert_eq!(water_prandtl(-5.0), 12.22);
        assert_eq!(water_prandtl(80.0), 2.88);
        let mid = water_prandtl(4.35);
        assert!((mid - (12.22 + 10.26) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn laminar_and_stagnant_flow_use_constant_nusselt() {
        assert_eq!(internal_flow_nusselt(0.0, 7.0), LAMINAR_NUSSELT);
        assert_eq!(internal_flow_nusselt(2299.0, 7.0), LAMINAR_NUSSELT);
        assert!(internal_flow_nusselt(2300.0, 7.0) > LAMINAR_NUSSELT);
    }

    #[test]
    fn zero_flow_gives_laminar_coefficient() {
        let conv = internal_convection(0.0, 1e-3, 0.6, 7.0, 0.05);
        assert_eq!(conv.reynolds, 0.0);
        assert!((conv.coefficient - 0.6 * LAMINAR_NUSSELT / 0.05).abs() < 1e-12);
    }

    #[test]
    fn still_air_hits_natural_convection_floor() {
        let conv = cross_flow_convection("test", 20.0, 0.0, 0.1);
        assert_eq!(conv.nusselt, NATURAL_CONVECTION_NUSSELT);
        assert!((conv.coefficient - 0.025 * 0.36 / 0.1).abs() < 1e-12);
        assert!(!conv.reynolds_clamped);
    }

    #[test]
    fn hot_air_clamps_viscosity() {
        let conv = cross_flow_convection("test", 200.0, 1.0, 0.1);
        assert!(conv.viscosity_clamped);
        assert!((conv.reynolds - 0.1 / 26.41e-6).abs() < 1e-6);
    }

    #[test]
    fn extreme_reynolds_clamps_to_last_range() {
        let conv = cross_flow_convection("test", 20.0, 200.0, 1.0);
        assert!(conv.reynolds > 400_000.0);
        assert!(conv.reynolds_clamped);
        let expected = 0.027 * conv.reynolds.powf(0.805) * 0.7_f64.powf(1.0 / 3.0);
        assert!((conv.nusselt - expected).abs() < 1e-9 * expected);
    }

    #[test]
    fn wind_increases_cross_flow_coefficient() {
        let calm = cross_flow_convection("test", 10.0, 0.5, 0.06).coefficient;
        let windy = cross_flow_convection("test", 10.0, 5.0, 0.06).coefficient;
        assert!(windy > calm);
    }

    #[test]
    fn ashrae_still_air_is_constant_term() {
        assert_eq!(ashrae_simple_exterior(SurfaceRoughness::MediumRough, 0.0), 10.79);
        let h = ashrae_simple_exterior(SurfaceRoughness::MediumSmooth, 2.0);
        assert!((h - (8.23 + 8.0 - 0.228)).abs() < 1e-12);
    }
}
