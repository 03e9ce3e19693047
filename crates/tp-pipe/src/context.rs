//! Host inputs for one outer step and the per-step solver context.

use crate::error::{PipeError, PipeResult};
use tp_core::numeric::{Real, ensure_finite};
use tp_core::units::{MassRate, Temperature, Time, Velocity, degc, mps, to_degc};
use tp_fluids::FluidPropertyPack;

/// Weather and zone conditions seen by the pipe during one outer step.
#[derive(Clone, Debug, PartialEq)]
pub struct AmbientConditions {
    pub outdoor_dry_bulb: Temperature,
    pub wind_speed: Velocity,
    pub sky_temperature: Temperature,
    /// Beam normal solar irradiance [W/m²]
    pub beam_solar: Real,
    /// Diffuse horizontal solar irradiance [W/m²]
    pub diffuse_solar: Real,
    pub cos_solar_zenith: Real,
    /// Mean air temperature of the zone holding the pipe, for zone pipes.
    pub zone_air_temperature: Option<Temperature>,
    pub schedule_temperature: Option<Temperature>,
    pub schedule_velocity: Option<Velocity>,
}

impl AmbientConditions {
    /// Calm, dark conditions at one air temperature with the sky at the same temperature.
    pub fn still_air(air: Temperature) -> Self {
        Self {
            outdoor_dry_bulb: air,
            wind_speed: mps(0.0),
            sky_temperature: air,
            beam_solar: 0.0,
            diffuse_solar: 0.0,
            cos_solar_zenith: 0.0,
            zone_air_temperature: None,
            schedule_temperature: None,
            schedule_velocity: None,
        }
    }

    pub fn with_wind(mut self, wind: Velocity) -> Self {
        self.wind_speed = wind;
        self
    }

    pub fn with_sky(mut self, sky: Temperature) -> Self {
        self.sky_temperature = sky;
        self
    }

    pub fn with_solar(mut self, beam: Real, diffuse: Real, cos_zenith: Real) -> Self {
        self.beam_solar = beam;
        self.diffuse_solar = diffuse;
        self.cos_solar_zenith = cos_zenith;
        self
    }

    pub fn with_zone_air(mut self, zone_air: Temperature) -> Self {
        self.zone_air_temperature = Some(zone_air);
        self
    }

    pub fn with_schedule(mut self, temperature: Temperature, velocity: Velocity) -> Self {
        self.schedule_temperature = Some(temperature);
        self.schedule_velocity = Some(velocity);
        self
    }

    fn validate(&self) -> PipeResult<()> {
        ensure_finite(to_degc(self.outdoor_dry_bulb), "outdoor dry-bulb temperature")?;
        ensure_finite(self.wind_speed.value, "wind speed")?;
        ensure_finite(to_degc(self.sky_temperature), "sky temperature")?;
        ensure_finite(self.beam_solar, "beam solar irradiance")?;
        ensure_finite(self.diffuse_solar, "diffuse solar irradiance")?;
        ensure_finite(self.cos_solar_zenith, "cosine of solar zenith")?;
        if let Some(t) = self.zone_air_temperature {
            ensure_finite(to_degc(t), "zone air temperature")?;
        }
        if let Some(t) = self.schedule_temperature {
            ensure_finite(to_degc(t), "schedule temperature")?;
        }
        if let Some(v) = self.schedule_velocity {
            ensure_finite(v.value, "schedule air velocity")?;
        }
        Ok(())
    }
}

impl Default for AmbientConditions {
    fn default() -> Self {
        Self::still_air(degc(20.0))
    }
}

/// Everything the host passes in for one evaluation of an outer step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepInputs {
    /// Simulated clock at the end of the outer step
    pub sim_time: Time,
    /// Outer step length
    pub step: Time,
    /// Day of the simulation, used by the ground boundary
    pub sim_day: Real,
    /// First host evaluation of this outer step
    pub first_iteration: bool,
    pub inlet_temperature: Temperature,
    pub mass_flow: MassRate,
    pub ambient: AmbientConditions,
}

impl StepInputs {
    /// Reject non-finite host values before any state is touched.
    pub fn validate(&self) -> PipeResult<()> {
        ensure_finite(self.sim_time.value, "simulation time")?;
        let step = ensure_finite(self.step.value, "outer step length")?;
        if step < 0.0 {
            return Err(PipeError::NonFinite {
                what: "outer step length must not be negative",
                value: step,
            });
        }
        ensure_finite(self.sim_day, "simulation day")?;
        ensure_finite(to_degc(self.inlet_temperature), "inlet temperature")?;
        ensure_finite(self.mass_flow.value, "mass flow")?;
        self.ambient.validate()
    }

    pub fn inlet_c(&self) -> Real {
        to_degc(self.inlet_temperature)
    }
}

/// Per-step scalars handed to the solvers, all in °C and SI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepContext {
    pub inlet_c: Real,
    /// [kg/s]
    pub mass_flow: Real,
    pub fluid: FluidPropertyPack,
    /// Sub-step length [s]
    pub sub_step_s: Real,
    /// Fluid-to-wall coefficient [W/(m²·K)]
    pub internal_coefficient: Real,
    /// Wall-to-environment coefficient [W/(m²·K)]
    pub environment_coefficient: Real,
    /// Driving temperature for pipes not coupled to the soil grid [°C]
    pub environment_c: Real,
    pub outdoor_air_c: Real,
    pub sky_c: Real,
    /// [m/s]
    pub wind_speed: Real,
    pub beam_solar: Real,
    pub diffuse_solar: Real,
    pub cos_solar_zenith: Real,
    /// Day of the simulation
    pub sim_day: Real,
}
