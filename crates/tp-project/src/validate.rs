//! Project validation logic.

use crate::schema::{
    AmbientDef, ConstructionDef, EnvironmentDef, FluidDef, MaterialDef, PipeDef, Project,
    ScenarioDef, SurfaceTemperatureDef,
};
use std::collections::{HashMap, HashSet};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_fluid(&project.fluid)?;

    let mut materials = HashMap::new();
    for material in &project.materials {
        if materials.insert(&material.name, material).is_some() {
            return Err(ValidationError::DuplicateId {
                id: material.name.clone(),
                context: "materials".to_string(),
            });
        }
        validate_material(material)?;
    }

    let mut constructions = HashSet::new();
    for construction in &project.constructions {
        if !constructions.insert(&construction.name) {
            return Err(ValidationError::DuplicateId {
                id: construction.name.clone(),
                context: "constructions".to_string(),
            });
        }
        validate_construction(construction, &materials)?;
    }

    let mut pipe_ids = HashSet::new();
    for pipe in &project.pipes {
        if !pipe_ids.insert(&pipe.id) {
            return Err(ValidationError::DuplicateId {
                id: pipe.id.clone(),
                context: "pipes".to_string(),
            });
        }
        validate_pipe(pipe, &constructions, &materials)?;
    }

    if let Some(scenario) = &project.scenario {
        validate_scenario(scenario, &project.pipes)?;
    }

    Ok(())
}

fn invalid(field: String, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: impl FnOnce() -> String, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field(), value, "must be positive and finite"));
    }
    Ok(())
}

fn finite(field: impl FnOnce() -> String, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(invalid(field(), value, "must be finite"));
    }
    Ok(())
}

fn validate_fluid(fluid: &FluidDef) -> Result<(), ValidationError> {
    match fluid {
        FluidDef::Water => Ok(()),
        FluidDef::Constant {
            density,
            specific_heat,
            viscosity,
            conductivity,
        } => {
            positive(|| "fluid density".to_string(), *density)?;
            positive(|| "fluid specific_heat".to_string(), *specific_heat)?;
            positive(|| "fluid viscosity".to_string(), *viscosity)?;
            positive(|| "fluid conductivity".to_string(), *conductivity)
        }
    }
}

fn validate_material(material: &MaterialDef) -> Result<(), ValidationError> {
    let name = &material.name;
    positive(|| format!("material '{name}' thickness_m"), material.thickness_m)?;
    positive(|| format!("material '{name}' conductivity"), material.conductivity)?;
    positive(|| format!("material '{name}' density"), material.density)?;
    positive(|| format!("material '{name}' specific_heat"), material.specific_heat)?;

    for (field, value) in [
        ("thermal_absorptance", material.thermal_absorptance),
        ("solar_absorptance", material.solar_absorptance),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(
                format!("material '{name}' {field}"),
                value,
                "must be between 0 and 1",
            ));
        }
    }
    Ok(())
}

fn validate_construction(
    construction: &ConstructionDef,
    materials: &HashMap<&String, &MaterialDef>,
) -> Result<(), ValidationError> {
    if construction.layers.is_empty() {
        return Err(invalid(
            format!("construction '{}' layers", construction.name),
            "[]",
            "needs at least one layer",
        ));
    }
    for layer in &construction.layers {
        if !materials.contains_key(layer) {
            return Err(ValidationError::MissingReference {
                id: layer.clone(),
                context: format!("construction '{}' layers", construction.name),
            });
        }
    }
    Ok(())
}

fn validate_pipe(
    pipe: &PipeDef,
    constructions: &HashSet<&String>,
    materials: &HashMap<&String, &MaterialDef>,
) -> Result<(), ValidationError> {
    let id = &pipe.id;
    if !constructions.contains(&pipe.construction) {
        return Err(ValidationError::MissingReference {
            id: pipe.construction.clone(),
            context: format!("pipe '{id}' construction"),
        });
    }
    positive(|| format!("pipe '{id}' inner_diameter_m"), pipe.inner_diameter_m)?;
    positive(|| format!("pipe '{id}' length_m"), pipe.length_m)?;
    if pipe.sections < 1 {
        return Err(invalid(
            format!("pipe '{id}' sections"),
            pipe.sections,
            "must be at least 1",
        ));
    }

    if let EnvironmentDef::Ground {
        soil_material,
        cover_depth_m,
        depth_nodes,
        width_nodes,
        grid_spacing_m,
        surface_temperature,
        ..
    } = &pipe.environment
    {
        if !materials.contains_key(soil_material) {
            return Err(ValidationError::MissingReference {
                id: soil_material.clone(),
                context: format!("pipe '{id}' soil_material"),
            });
        }
        if !cover_depth_m.is_finite() || *cover_depth_m < 0.0 {
            return Err(invalid(
                format!("pipe '{id}' cover_depth_m"),
                cover_depth_m,
                "must be non-negative and finite",
            ));
        }
        if *depth_nodes < 2 {
            return Err(invalid(
                format!("pipe '{id}' depth_nodes"),
                depth_nodes,
                "must be at least 2",
            ));
        }
        if let Some(w) = width_nodes
            && *w < 2
        {
            return Err(invalid(
                format!("pipe '{id}' width_nodes"),
                w,
                "must be at least 2",
            ));
        }
        if width_nodes.is_none() && depth_nodes / 2 < 2 {
            return Err(invalid(
                format!("pipe '{id}' depth_nodes"),
                depth_nodes,
                "default width_nodes (depth_nodes / 2) must be at least 2",
            ));
        }
        if let Some(ds) = grid_spacing_m
            && (!ds.is_finite() || *ds <= pipe.inner_diameter_m / 2.0)
        {
            return Err(invalid(
                format!("pipe '{id}' grid_spacing_m"),
                ds,
                "must be larger than the pipe inner radius",
            ));
        }
        validate_surface(id, surface_temperature)?;
    }

    Ok(())
}

fn validate_surface(id: &str, surface: &SurfaceTemperatureDef) -> Result<(), ValidationError> {
    match surface {
        SurfaceTemperatureDef::Annual {
            mean_c,
            amplitude_k,
            phase_shift_days,
        } => {
            finite(|| format!("pipe '{id}' surface mean_c"), *mean_c)?;
            if !amplitude_k.is_finite() || *amplitude_k < 0.0 {
                return Err(invalid(
                    format!("pipe '{id}' surface amplitude_k"),
                    amplitude_k,
                    "must be non-negative and finite",
                ));
            }
            if !phase_shift_days.is_finite() || *phase_shift_days < 0.0 {
                return Err(invalid(
                    format!("pipe '{id}' surface phase_shift_days"),
                    phase_shift_days,
                    "must be non-negative and finite",
                ));
            }
        }
        SurfaceTemperatureDef::Monthly { values_c } => {
            if values_c.len() != 12 {
                return Err(invalid(
                    format!("pipe '{id}' surface values_c"),
                    values_c.len(),
                    "needs exactly 12 monthly values",
                ));
            }
            for v in values_c {
                finite(|| format!("pipe '{id}' surface values_c"), *v)?;
            }
        }
    }
    Ok(())
}

fn validate_scenario(scenario: &ScenarioDef, pipes: &[PipeDef]) -> Result<(), ValidationError> {
    finite(|| "scenario start_day".to_string(), scenario.start_day)?;
    positive(|| "scenario duration_h".to_string(), scenario.duration_h)?;
    positive(|| "scenario step_s".to_string(), scenario.step_s)?;
    finite(|| "scenario inlet_temperature_c".to_string(), scenario.inlet_temperature_c)?;
    if !scenario.mass_flow_kgps.is_finite() || scenario.mass_flow_kgps < 0.0 {
        return Err(invalid(
            "scenario mass_flow_kgps".to_string(),
            scenario.mass_flow_kgps,
            "must be non-negative and finite",
        ));
    }
    validate_ambient(&scenario.ambient)?;

    // Pipes that read host values need them in the scenario.
    for pipe in pipes {
        let needs = match &pipe.environment {
            EnvironmentDef::Zone { .. } if scenario.ambient.zone_air_c.is_none() => {
                Some("zone_air_c")
            }
            EnvironmentDef::Schedule { .. }
                if scenario.ambient.schedule_temperature_c.is_none()
                    || scenario.ambient.schedule_velocity_mps.is_none() =>
            {
                Some("schedule_temperature_c and schedule_velocity_mps")
            }
            _ => None,
        };
        if let Some(field) = needs {
            return Err(ValidationError::MissingReference {
                id: field.to_string(),
                context: format!("scenario ambient for pipe '{}'", pipe.id),
            });
        }
    }
    Ok(())
}

fn validate_ambient(ambient: &AmbientDef) -> Result<(), ValidationError> {
    let values = [
        ("outdoor_c", Some(ambient.outdoor_c)),
        ("wind_mps", Some(ambient.wind_mps)),
        ("sky_c", ambient.sky_c),
        ("beam_solar_w_m2", Some(ambient.beam_solar_w_m2)),
        ("diffuse_solar_w_m2", Some(ambient.diffuse_solar_w_m2)),
        ("cos_solar_zenith", Some(ambient.cos_solar_zenith)),
        ("zone_air_c", ambient.zone_air_c),
        ("schedule_temperature_c", ambient.schedule_temperature_c),
        ("schedule_velocity_mps", ambient.schedule_velocity_mps),
    ];
    for (field, value) in values {
        if let Some(v) = value {
            finite(|| format!("scenario ambient {field}"), v)?;
        }
    }
    if ambient.wind_mps < 0.0 {
        return Err(invalid(
            "scenario ambient wind_mps".to_string(),
            ambient.wind_mps,
            "must be non-negative",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        serde_yaml::from_str(
            r#"
version: 1
name: test
materials:
  - { name: steel, thickness_m: 0.003, conductivity: 45.0, density: 7800.0, specific_heat: 480.0 }
  - { name: clay, thickness_m: 1.0, conductivity: 1.2, density: 1800.0, specific_heat: 1000.0 }
constructions:
  - { name: bare, layers: [steel] }
pipes:
  - id: p1
    construction: bare
    inner_diameter_m: 0.05
    length_m: 10.0
    environment: { type: outdoor }
  - id: p2
    construction: bare
    inner_diameter_m: 0.05
    length_m: 10.0
    environment:
      type: ground
      soil_material: clay
      cover_depth_m: 1.0
      surface_temperature: { type: annual, mean_c: 12.0, amplitude_k: 8.0, phase_shift_days: 30.0 }
"#,
        )
        .unwrap()
    }

    #[test]
    fn valid_project_passes() {
        validate_project(&project()).unwrap();
    }

    #[test]
    fn duplicate_pipe_rejected() {
        let mut p = project();
        let dup = p.pipes[0].clone();
        p.pipes.push(dup);
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn unknown_layer_rejected() {
        let mut p = project();
        p.constructions[0].layers.push("unobtainium".to_string());
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn negative_amplitude_rejected() {
        let mut p = project();
        if let EnvironmentDef::Ground {
            surface_temperature,
            ..
        } = &mut p.pipes[1].environment
        {
            *surface_temperature = SurfaceTemperatureDef::Annual {
                mean_c: 12.0,
                amplitude_k: -1.0,
                phase_shift_days: 30.0,
            };
        }
        assert!(validate_project(&p).is_err());
    }

    #[test]
    fn short_monthly_list_rejected() {
        let mut p = project();
        if let EnvironmentDef::Ground {
            surface_temperature,
            ..
        } = &mut p.pipes[1].environment
        {
            *surface_temperature = SurfaceTemperatureDef::Monthly {
                values_c: vec![10.0; 11],
            };
        }
        let err = validate_project(&p).unwrap_err();
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn small_grids_rejected() {
        let mut p = project();
        if let EnvironmentDef::Ground { depth_nodes, .. } = &mut p.pipes[1].environment {
            *depth_nodes = 3;
        }
        // Default width would be 1.
        assert!(validate_project(&p).is_err());
    }

    #[test]
    fn zone_pipe_needs_zone_air_in_scenario() {
        let mut p = project();
        p.pipes[0].environment = EnvironmentDef::Zone {
            zone: "basement".to_string(),
        };
        p.scenario = Some(ScenarioDef {
            start_day: 1.0,
            duration_h: 1.0,
            step_s: 600.0,
            inlet_temperature_c: 50.0,
            mass_flow_kgps: 0.1,
            ambient: AmbientDef {
                outdoor_c: 5.0,
                wind_mps: 1.0,
                sky_c: None,
                beam_solar_w_m2: 0.0,
                diffuse_solar_w_m2: 0.0,
                cos_solar_zenith: 0.0,
                zone_air_c: None,
                schedule_temperature_c: None,
                schedule_velocity_mps: None,
            },
        });
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn future_version_rejected() {
        let mut p = project();
        p.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }
}
