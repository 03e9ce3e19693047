//! Pipe configuration: construction geometry, environment and soil grid layout.
//!
//! A [`PipeConfiguration`] is validated once at construction and is immutable
//! afterwards. Every derived quantity the solvers need (areas, capacities,
//! grid spacing) is computed here.

use crate::error::{PipeError, PipeResult};
use crate::ground::GroundBoundaryModel;
use tp_core::constants::SECONDS_PER_DAY;
use tp_core::numeric::Real;
use tp_core::units::Length;
use tp_fluids::SurfaceRoughness;

/// One material layer of a pipe construction.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialLayer {
    pub name: String,
    /// Layer thickness [m]
    pub thickness_m: Real,
    /// Thermal conductivity [W/(m·K)]
    pub conductivity: Real,
    /// Density [kg/m³]
    pub density: Real,
    /// Specific heat [J/(kg·K)]
    pub specific_heat: Real,
}

impl MaterialLayer {
    pub fn new(
        name: impl Into<String>,
        thickness_m: Real,
        conductivity: Real,
        density: Real,
        specific_heat: Real,
    ) -> Self {
        Self {
            name: name.into(),
            thickness_m,
            conductivity,
            density,
            specific_heat,
        }
    }

    /// Conduction resistance per unit area [m²·K/W].
    pub fn resistance(&self) -> Real {
        self.thickness_m / self.conductivity
    }

    fn validate(&self, pipe: &str) -> PipeResult<()> {
        let checks = [
            (self.thickness_m, "layer thickness must be positive"),
            (self.conductivity, "layer conductivity must be positive"),
            (self.density, "layer density must be positive"),
            (self.specific_heat, "layer specific heat must be positive"),
        ];
        for (value, what) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(pipe, what));
            }
        }
        Ok(())
    }
}

/// Geometry and wall properties derived from the construction.
///
/// Layers are listed outermost first. A single layer is a bare pipe wall;
/// with more layers, all but the last are insulation and the last is the wall.
#[derive(Clone, Debug, PartialEq)]
pub struct PipeGeometry {
    pub inner_diameter_m: Real,
    pub length_m: Real,
    pub sections: usize,
    pub wall_outer_diameter_m: Real,
    pub insulation_thickness_m: Real,
    pub insulation_outer_diameter_m: Real,
    /// Summed insulation resistance [m²·K/W]; zero for a bare pipe.
    pub insulation_resistance: Real,
    /// Σ t/k used to recover the outer surface temperature [m²·K/W]
    pub sum_tk: Real,
    pub wall_conductivity: Real,
    pub wall_density: Real,
    pub wall_specific_heat: Real,
}

impl PipeGeometry {
    fn from_layers(
        pipe: &str,
        inner_diameter_m: Real,
        length_m: Real,
        sections: usize,
        layers: &[MaterialLayer],
    ) -> PipeResult<Self> {
        let Some((wall, insulation)) = layers.split_last() else {
            return Err(invalid(pipe, "construction must have at least one layer"));
        };
        for layer in layers {
            layer.validate(pipe)?;
        }

        let wall_outer_diameter_m = inner_diameter_m + 2.0 * wall.thickness_m;
        let insulation_thickness_m: Real = insulation.iter().map(|l| l.thickness_m).sum();
        let insulation_resistance: Real = insulation.iter().map(MaterialLayer::resistance).sum();
        let sum_tk = if insulation.is_empty() {
            wall.resistance()
        } else {
            insulation_resistance
        };

        Ok(Self {
            inner_diameter_m,
            length_m,
            sections,
            wall_outer_diameter_m,
            insulation_thickness_m,
            insulation_outer_diameter_m: wall_outer_diameter_m + 2.0 * insulation_thickness_m,
            insulation_resistance,
            sum_tk,
            wall_conductivity: wall.conductivity,
            wall_density: wall.density,
            wall_specific_heat: wall.specific_heat,
        })
    }

    pub fn is_insulated(&self) -> bool {
        self.insulation_thickness_m > 0.0
    }

    pub fn section_length(&self) -> Real {
        self.length_m / self.sections as Real
    }

    /// Fluid-side area of one section [m²].
    pub fn inside_area(&self) -> Real {
        std::f64::consts::PI * self.inner_diameter_m * self.section_length()
    }

    /// Environment-side area of one section [m²].
    pub fn outside_area(&self) -> Real {
        std::f64::consts::PI * self.insulation_outer_diameter_m * self.section_length()
    }

    /// Flow cross-section [m²].
    pub fn flow_area(&self) -> Real {
        0.25 * std::f64::consts::PI * self.inner_diameter_m.powi(2)
    }

    /// Heat capacity of the pipe wall in one section [J/K].
    pub fn wall_heat_capacity(&self) -> Real {
        let metal_area =
            0.25 * std::f64::consts::PI * self.wall_outer_diameter_m.powi(2) - self.flow_area();
        self.wall_specific_heat * self.wall_density * metal_area * self.section_length()
    }

    /// Heat capacity of the fluid in one section [J/K].
    pub fn fluid_heat_capacity(&self, density: Real, specific_heat: Real) -> Real {
        self.flow_area() * self.section_length() * specific_heat * density
    }
}

/// Thermal and optical properties of the soil around a buried pipe.
#[derive(Clone, Debug, PartialEq)]
pub struct SoilProperties {
    /// [W/(m·K)]
    pub conductivity: Real,
    /// [kg/m³]
    pub density: Real,
    /// [J/(kg·K)]
    pub specific_heat: Real,
    /// Long-wave emissivity of the surface
    pub thermal_absorptance: Real,
    pub solar_absorptance: Real,
    pub roughness: SurfaceRoughness,
}

impl SoilProperties {
    /// Thermal diffusivity [m²/s].
    pub fn diffusivity(&self) -> Real {
        self.conductivity / (self.density * self.specific_heat)
    }

    /// Thermal diffusivity [m²/day].
    pub fn diffusivity_per_day(&self) -> Real {
        self.diffusivity() * SECONDS_PER_DAY
    }

    /// Volumetric heat capacity [J/(m³·K)].
    pub fn volumetric_heat_capacity(&self) -> Real {
        self.density * self.specific_heat
    }

    fn validate(&self, pipe: &str) -> PipeResult<()> {
        let positive = [
            (self.conductivity, "soil conductivity must be positive"),
            (self.density, "soil density must be positive"),
            (self.specific_heat, "soil specific heat must be positive"),
        ];
        for (value, what) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(pipe, what));
            }
        }
        let fractions = [
            (self.thermal_absorptance, "soil thermal absorptance must be in [0, 1]"),
            (self.solar_absorptance, "soil solar absorptance must be in [0, 1]"),
        ];
        for (value, what) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(pipe, what));
            }
        }
        Ok(())
    }
}

/// Where the annual ground surface temperature statistics come from.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceTemperatureSource {
    Annual {
        mean_c: Real,
        amplitude: Real,
        phase_shift_days: Real,
    },
    /// Twelve monthly mean surface temperatures [°C], January first.
    Monthly([Real; 12]),
}

impl SurfaceTemperatureSource {
    fn validate(&self, pipe: &str) -> PipeResult<()> {
        match self {
            SurfaceTemperatureSource::Annual {
                mean_c,
                amplitude,
                phase_shift_days,
            } => {
                if !mean_c.is_finite() {
                    return Err(invalid(pipe, "mean surface temperature must be finite"));
                }
                if !(amplitude.is_finite() && *amplitude >= 0.0) {
                    return Err(invalid(pipe, "surface temperature amplitude must be >= 0"));
                }
                if !(phase_shift_days.is_finite() && *phase_shift_days >= 0.0) {
                    return Err(invalid(pipe, "phase shift must be >= 0 days"));
                }
            }
            SurfaceTemperatureSource::Monthly(monthly) => {
                if monthly.iter().any(|t| !t.is_finite()) {
                    return Err(invalid(pipe, "monthly surface temperatures must be finite"));
                }
            }
        }
        Ok(())
    }
}

/// Input description of a buried pipe.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundCoupling {
    pub soil: SoilProperties,
    /// Soil cover above the pipe crown [m]
    pub cover_depth_m: Real,
    pub sun_exposed: bool,
    /// Nodes from the surface to the deep boundary (D)
    pub depth_nodes: usize,
    /// Nodes from the centerline to the far-field boundary (W); defaults to D/2
    pub width_nodes: Option<usize>,
    /// Regular grid spacing [m]; defaults to domain depth / (D - 1)
    pub grid_spacing_m: Option<Real>,
    pub surface: SurfaceTemperatureSource,
}

/// Default number of depth nodes in the soil grid.
pub const DEFAULT_DEPTH_NODES: usize = 8;

/// Resolved soil grid of a buried pipe.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    pub depth_nodes: usize,
    pub width_nodes: usize,
    /// Grid sections along the pipe; one per pipe section.
    pub length_nodes: usize,
    pub spacing_m: Real,
    /// Depth of the pipe centre [m]
    pub pipe_depth_m: Real,
    pub domain_depth_m: Real,
    /// Depth row of the node holding the pipe
    pub pipe_row: usize,
}

impl GridLayout {
    /// Depth of grid row `row` below the surface [m].
    pub fn row_depth(&self, row: usize) -> Real {
        row as Real * self.spacing_m
    }

    /// Flat index of a node; width varies fastest.
    #[inline]
    pub fn index(&self, width: usize, depth: usize, length: usize) -> usize {
        (length * self.depth_nodes + depth) * self.width_nodes + width
    }

    pub fn node_count(&self) -> usize {
        self.width_nodes * self.depth_nodes * self.length_nodes
    }
}

/// Validated buried-pipe data.
#[derive(Clone, Debug, PartialEq)]
pub struct BuriedPipe {
    pub soil: SoilProperties,
    pub sun_exposed: bool,
    pub layout: GridLayout,
    pub ground: GroundBoundaryModel,
}

/// What the outside of the pipe exchanges heat with.
#[derive(Clone, Debug, PartialEq)]
pub enum Environment {
    /// Adiabatic; the driving temperature is outdoor air but the coefficient is zero.
    None,
    /// Exposed to outdoor air and wind.
    OutdoorAir,
    /// Inside a conditioned zone; loss to the pipe is gain to the zone.
    Zone { zone: String },
    /// Ambient temperature and air velocity come from host schedules.
    Schedule {
        temperature_schedule: String,
        velocity_schedule: String,
    },
    /// Buried in soil.
    Ground(GroundCoupling),
}

impl Environment {
    pub fn kind(&self) -> &'static str {
        match self {
            Environment::None => "none",
            Environment::OutdoorAir => "outdoor",
            Environment::Zone { .. } => "zone",
            Environment::Schedule { .. } => "schedule",
            Environment::Ground(_) => "ground",
        }
    }
}

/// Immutable, validated description of one pipe.
#[derive(Clone, Debug, PartialEq)]
pub struct PipeConfiguration {
    name: String,
    geometry: PipeGeometry,
    environment: Environment,
    buried: Option<BuriedPipe>,
}

impl PipeConfiguration {
    /// Validate the inputs and derive geometry and, for buried pipes, the soil grid.
    pub fn new(
        name: impl Into<String>,
        inner_diameter: Length,
        length: Length,
        sections: usize,
        layers: &[MaterialLayer],
        environment: Environment,
    ) -> PipeResult<Self> {
        let name = name.into();
        let inner_diameter_m = inner_diameter.value;
        let length_m = length.value;

        if !(inner_diameter_m.is_finite() && inner_diameter_m > 0.0) {
            return Err(invalid(&name, "inner diameter must be positive"));
        }
        if !(length_m.is_finite() && length_m > 0.0) {
            return Err(invalid(&name, "length must be positive"));
        }
        if sections < 1 {
            return Err(invalid(&name, "at least one pipe section is required"));
        }

        let geometry = PipeGeometry::from_layers(&name, inner_diameter_m, length_m, sections, layers)?;

        let buried = match &environment {
            Environment::Ground(coupling) => Some(Self::resolve_buried(&name, &geometry, coupling)?),
            _ => None,
        };

        Ok(Self {
            name,
            geometry,
            environment,
            buried,
        })
    }

    fn resolve_buried(
        name: &str,
        geometry: &PipeGeometry,
        coupling: &GroundCoupling,
    ) -> PipeResult<BuriedPipe> {
        coupling.soil.validate(name)?;
        coupling.surface.validate(name)?;

        if !(coupling.cover_depth_m.is_finite() && coupling.cover_depth_m >= 0.0) {
            return Err(invalid(name, "cover depth must be >= 0"));
        }
        let depth_nodes = coupling.depth_nodes;
        if depth_nodes < 2 {
            return Err(invalid(name, "at least two depth nodes are required"));
        }
        let width_nodes = coupling.width_nodes.unwrap_or(depth_nodes / 2);
        if width_nodes < 2 {
            return Err(invalid(name, "at least two width nodes are required"));
        }

        let pipe_depth_m = coupling.cover_depth_m + geometry.inner_diameter_m / 2.0;
        let domain_depth_m = 2.0 * pipe_depth_m;
        let spacing_m = coupling
            .grid_spacing_m
            .unwrap_or(domain_depth_m / (depth_nodes - 1) as Real);
        if !(spacing_m.is_finite() && spacing_m > 0.0) {
            return Err(invalid(name, "grid spacing must be positive"));
        }
        if spacing_m <= geometry.inner_diameter_m / 2.0 {
            return Err(invalid(name, "grid spacing must exceed the pipe inner radius"));
        }

        let layout = GridLayout {
            depth_nodes,
            width_nodes,
            length_nodes: geometry.sections,
            spacing_m,
            pipe_depth_m,
            domain_depth_m,
            pipe_row: (depth_nodes - 1) / 2,
        };
        let ground =
            GroundBoundaryModel::from_source(&coupling.surface, coupling.soil.diffusivity_per_day());

        Ok(BuriedPipe {
            soil: coupling.soil.clone(),
            sun_exposed: coupling.sun_exposed,
            layout,
            ground,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &PipeGeometry {
        &self.geometry
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Soil data when the pipe is buried.
    pub fn buried(&self) -> Option<&BuriedPipe> {
        self.buried.as_ref()
    }

    pub fn sections(&self) -> usize {
        self.geometry.sections
    }

    /// Soil-side coefficient between the pipe and its grid node [W/(m²·K)].
    pub fn ground_coefficient(&self) -> Option<Real> {
        self.buried.as_ref().map(|b| {
            b.soil.conductivity / (b.layout.spacing_m - self.geometry.inner_diameter_m / 2.0)
        })
    }
}

fn invalid(pipe: &str, what: &'static str) -> PipeError {
    PipeError::InvalidConfig {
        pipe: pipe.to_string(),
        what,
    }
}
