//! Project schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub fluid: FluidDef,
    #[serde(default)]
    pub materials: Vec<MaterialDef>,
    #[serde(default)]
    pub constructions: Vec<ConstructionDef>,
    #[serde(default)]
    pub pipes: Vec<PipeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FluidDef {
    #[default]
    Water,
    Constant {
        density: f64,
        specific_heat: f64,
        viscosity: f64,
        conductivity: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialDef {
    pub name: String,
    pub thickness_m: f64,
    pub conductivity: f64,
    pub density: f64,
    pub specific_heat: f64,
    #[serde(default = "default_thermal_absorptance")]
    pub thermal_absorptance: f64,
    #[serde(default = "default_solar_absorptance")]
    pub solar_absorptance: f64,
    #[serde(default)]
    pub roughness: RoughnessDef,
}

fn default_thermal_absorptance() -> f64 {
    0.9
}

fn default_solar_absorptance() -> f64 {
    0.7
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoughnessDef {
    VeryRough,
    Rough,
    #[default]
    MediumRough,
    MediumSmooth,
    Smooth,
    VerySmooth,
}

/// Ordered layers, outermost first; the last layer is the pipe wall.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstructionDef {
    pub name: String,
    pub layers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipeDef {
    pub id: String,
    pub construction: String,
    pub inner_diameter_m: f64,
    pub length_m: f64,
    #[serde(default = "default_sections")]
    pub sections: usize,
    pub environment: EnvironmentDef,
}

fn default_sections() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentDef {
    None,
    Outdoor,
    Zone {
        zone: String,
    },
    Schedule {
        temperature: String,
        velocity: String,
    },
    Ground {
        soil_material: String,
        cover_depth_m: f64,
        #[serde(default)]
        sun_exposed: bool,
        #[serde(default = "default_depth_nodes")]
        depth_nodes: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width_nodes: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        grid_spacing_m: Option<f64>,
        surface_temperature: SurfaceTemperatureDef,
    },
}

fn default_depth_nodes() -> usize {
    tp_pipe::DEFAULT_DEPTH_NODES
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceTemperatureDef {
    Annual {
        mean_c: f64,
        amplitude_k: f64,
        phase_shift_days: f64,
    },
    Monthly {
        values_c: Vec<f64>,
    },
}

/// Host loop settings used by the command-line runner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    #[serde(default = "default_start_day")]
    pub start_day: f64,
    pub duration_h: f64,
    pub step_s: f64,
    pub inlet_temperature_c: f64,
    pub mass_flow_kgps: f64,
    pub ambient: AmbientDef,
}

fn default_start_day() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmbientDef {
    pub outdoor_c: f64,
    #[serde(default)]
    pub wind_mps: f64,
    /// Sky temperature; defaults to the outdoor temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sky_c: Option<f64>,
    #[serde(default)]
    pub beam_solar_w_m2: f64,
    #[serde(default)]
    pub diffuse_solar_w_m2: f64,
    #[serde(default)]
    pub cos_solar_zenith: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_air_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_temperature_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_velocity_mps: Option<f64>,
}
