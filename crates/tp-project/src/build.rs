//! Turn validated project definitions into pipe models.

use crate::schema::{
    AmbientDef, EnvironmentDef, FluidDef, MaterialDef, PipeDef, Project, RoughnessDef,
    ScenarioDef, SurfaceTemperatureDef,
};
use crate::{ProjectError, ProjectResult};
use tp_core::units::{degc, kgps, m, mps, s};
use tp_fluids::{ConstantFluid, FluidProperties, SurfaceRoughness, TabulatedWater};
use tp_pipe::{
    AmbientConditions, Environment, GroundCoupling, MaterialLayer, PipeConfiguration,
    SoilProperties, StepInputs, SurfaceTemperatureSource,
};

pub fn build_fluid(fluid: &FluidDef) -> Box<dyn FluidProperties> {
    match fluid {
        FluidDef::Water => Box::new(TabulatedWater::new()),
        FluidDef::Constant {
            density,
            specific_heat,
            viscosity,
            conductivity,
        } => Box::new(ConstantFluid::new(
            "constant",
            *density,
            *specific_heat,
            *viscosity,
            *conductivity,
        )),
    }
}

/// Build the configuration of one pipe by id.
pub fn build_pipe(project: &Project, id: &str) -> ProjectResult<PipeConfiguration> {
    let pipe = project
        .pipes
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| ProjectError::UnknownReference {
            kind: "pipe",
            id: id.to_string(),
        })?;
    configure(project, pipe)
}

/// Build every pipe in file order.
pub fn build_pipes(project: &Project) -> ProjectResult<Vec<PipeConfiguration>> {
    project.pipes.iter().map(|p| configure(project, p)).collect()
}

fn find_material<'a>(project: &'a Project, name: &str) -> ProjectResult<&'a MaterialDef> {
    project
        .materials
        .iter()
        .find(|mat| mat.name == name)
        .ok_or_else(|| ProjectError::UnknownReference {
            kind: "material",
            id: name.to_string(),
        })
}

fn configure(project: &Project, pipe: &PipeDef) -> ProjectResult<PipeConfiguration> {
    let construction = project
        .constructions
        .iter()
        .find(|c| c.name == pipe.construction)
        .ok_or_else(|| ProjectError::UnknownReference {
            kind: "construction",
            id: pipe.construction.clone(),
        })?;

    let layers = construction
        .layers
        .iter()
        .map(|name| {
            find_material(project, name).map(|mat| {
                MaterialLayer::new(
                    &mat.name,
                    mat.thickness_m,
                    mat.conductivity,
                    mat.density,
                    mat.specific_heat,
                )
            })
        })
        .collect::<ProjectResult<Vec<_>>>()?;

    let environment = match &pipe.environment {
        EnvironmentDef::None => Environment::None,
        EnvironmentDef::Outdoor => Environment::OutdoorAir,
        EnvironmentDef::Zone { zone } => Environment::Zone { zone: zone.clone() },
        EnvironmentDef::Schedule {
            temperature,
            velocity,
        } => Environment::Schedule {
            temperature_schedule: temperature.clone(),
            velocity_schedule: velocity.clone(),
        },
        EnvironmentDef::Ground {
            soil_material,
            cover_depth_m,
            sun_exposed,
            depth_nodes,
            width_nodes,
            grid_spacing_m,
            surface_temperature,
        } => {
            let soil = find_material(project, soil_material)?;
            Environment::Ground(GroundCoupling {
                soil: SoilProperties {
                    conductivity: soil.conductivity,
                    density: soil.density,
                    specific_heat: soil.specific_heat,
                    thermal_absorptance: soil.thermal_absorptance,
                    solar_absorptance: soil.solar_absorptance,
                    roughness: roughness(soil.roughness),
                },
                cover_depth_m: *cover_depth_m,
                sun_exposed: *sun_exposed,
                depth_nodes: *depth_nodes,
                width_nodes: *width_nodes,
                grid_spacing_m: *grid_spacing_m,
                surface: surface_source(&pipe.id, surface_temperature)?,
            })
        }
    };

    Ok(PipeConfiguration::new(
        &pipe.id,
        m(pipe.inner_diameter_m),
        m(pipe.length_m),
        pipe.sections,
        &layers,
        environment,
    )?)
}

fn roughness(def: RoughnessDef) -> SurfaceRoughness {
    match def {
        RoughnessDef::VeryRough => SurfaceRoughness::VeryRough,
        RoughnessDef::Rough => SurfaceRoughness::Rough,
        RoughnessDef::MediumRough => SurfaceRoughness::MediumRough,
        RoughnessDef::MediumSmooth => SurfaceRoughness::MediumSmooth,
        RoughnessDef::Smooth => SurfaceRoughness::Smooth,
        RoughnessDef::VerySmooth => SurfaceRoughness::VerySmooth,
    }
}

fn surface_source(
    pipe: &str,
    def: &SurfaceTemperatureDef,
) -> ProjectResult<SurfaceTemperatureSource> {
    match def {
        SurfaceTemperatureDef::Annual {
            mean_c,
            amplitude_k,
            phase_shift_days,
        } => Ok(SurfaceTemperatureSource::Annual {
            mean_c: *mean_c,
            amplitude: *amplitude_k,
            phase_shift_days: *phase_shift_days,
        }),
        SurfaceTemperatureDef::Monthly { values_c } => {
            let monthly: [f64; 12] = values_c.as_slice().try_into().map_err(|_| {
                ProjectError::Pipe(tp_pipe::PipeError::InvalidConfig {
                    pipe: pipe.to_string(),
                    what: "monthly surface temperatures need 12 values",
                })
            })?;
            Ok(SurfaceTemperatureSource::Monthly(monthly))
        }
    }
}

pub fn ambient_conditions(def: &AmbientDef) -> AmbientConditions {
    let mut ambient = AmbientConditions::still_air(degc(def.outdoor_c))
        .with_wind(mps(def.wind_mps))
        .with_sky(degc(def.sky_c.unwrap_or(def.outdoor_c)))
        .with_solar(
            def.beam_solar_w_m2,
            def.diffuse_solar_w_m2,
            def.cos_solar_zenith,
        );
    if let Some(zone) = def.zone_air_c {
        ambient = ambient.with_zone_air(degc(zone));
    }
    if let (Some(t), Some(v)) = (def.schedule_temperature_c, def.schedule_velocity_mps) {
        ambient = ambient.with_schedule(degc(t), mps(v));
    }
    ambient
}

impl ScenarioDef {
    /// Number of whole outer steps in the run.
    pub fn step_count(&self) -> usize {
        (self.duration_h * 3600.0 / self.step_s).floor() as usize
    }

    /// Host inputs for outer step `n`, counted from 1.
    pub fn step_inputs(&self, n: usize, first_iteration: bool) -> StepInputs {
        let elapsed = n as f64 * self.step_s;
        StepInputs {
            sim_time: s(elapsed),
            step: s(self.step_s),
            sim_day: self.start_day + (elapsed / 86_400.0).floor(),
            first_iteration,
            inlet_temperature: degc(self.inlet_temperature_c),
            mass_flow: kgps(self.mass_flow_kgps),
            ambient: ambient_conditions(&self.ambient),
        }
    }
}
