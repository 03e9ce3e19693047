//! Time integration and history management for one pipe.
//!
//! A host may evaluate the same outer step several times while its system
//! iterates. The controller tells re-evaluation apart from real progress by
//! comparing the simulated clock with the last accepted time:
//! - clock moved: the previous step's tentative state becomes current (accept)
//! - clock unchanged: tentative is discarded and restarted from current (revert)
//!
//! The outer step is then split into fixed sub-steps, each solved by the soil
//! solver (buried pipes) or the near-pipe solver (everything else), followed
//! by copying current into previous.

use crate::config::{Environment, PipeConfiguration};
use crate::context::{AmbientConditions, StepContext, StepInputs};
use crate::error::{PipeError, PipeResult};
use crate::near_pipe::{NearPipeSolver, StepAccumulators};
use crate::report::PipeReport;
use crate::slots::TimeSlot;
use crate::soil::{BuriedSoilSolver, SoilSolverSettings, SoilSweepOutcome};
use crate::state::ThermalState;
use tp_core::numeric::Real;
use tp_core::units::to_degc;
use tp_fluids::convection::{ROOM_AIR_VELOCITY, cross_flow_convection, internal_convection};
use tp_fluids::{FluidProperties, FluidPropertyPack};

/// Inner time step [s].
pub const SUB_STEP_SECONDS: Real = 60.0;

/// Temperature of every pipe node at the start of an environment period [°C].
pub const INITIAL_TEMPERATURE_C: Real = 21.0;

/// Clock differences at or below this are the same instant [s].
const SAME_INSTANT_S: Real = 1e-6;

/// Number of whole sub-steps in an outer step of `step_s` seconds.
pub fn sub_step_count(step_s: Real) -> usize {
    if step_s > 0.0 {
        (step_s / SUB_STEP_SECONDS).floor() as usize
    } else {
        0
    }
}

/// What `begin_step` did with the history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryTransition {
    /// Tentative state promoted to current.
    Accept,
    /// Tentative state reset from current.
    Revert,
}

/// Ambient driving temperature and wall-to-environment coefficient.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
struct EnvironmentDrive {
    temperature_c: Real,
    coefficient: Real,
}

/// Transient heat transfer model of one pipe.
#[derive(Debug)]
pub struct PipeHeatTransfer {
    config: PipeConfiguration,
    settings: SoilSolverSettings,
    state: ThermalState,
    last_accepted_s: Real,
    drive: EnvironmentDrive,
    fluid: FluidPropertyPack,
    report: PipeReport,
    unconverged_sub_steps: usize,
}

impl PipeHeatTransfer {
    pub fn new(config: PipeConfiguration) -> Self {
        let state = ThermalState::new(&config, INITIAL_TEMPERATURE_C);
        Self {
            config,
            settings: SoilSolverSettings::default(),
            state,
            last_accepted_s: 0.0,
            drive: EnvironmentDrive::default(),
            fluid: FluidPropertyPack::unset(),
            report: PipeReport::default(),
            unconverged_sub_steps: 0,
        }
    }

    /// Override the soil iteration controls.
    pub fn with_soil_settings(mut self, settings: SoilSolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn config(&self) -> &PipeConfiguration {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn state(&self) -> &ThermalState {
        &self.state
    }

    /// Report of the latest evaluation.
    pub fn report(&self) -> &PipeReport {
        &self.report
    }

    /// Soil sub-steps that hit the iteration cap since the period started.
    pub fn unconverged_sub_steps(&self) -> usize {
        self.unconverged_sub_steps
    }

    /// Reset all state at the start of a design day or run period.
    ///
    /// Pipe nodes go to 21 °C; soil nodes go to the undisturbed ground
    /// temperature at their depth on `sim_day`.
    pub fn begin_environment(&mut self, sim_day: Real) {
        self.state.pipe.fill(INITIAL_TEMPERATURE_C);
        if let (Some(grid), Some(buried)) = (self.state.soil.as_mut(), self.config.buried()) {
            grid.fill_undisturbed(&buried.ground, sim_day);
        }
        self.last_accepted_s = 0.0;
        self.drive = EnvironmentDrive::default();
        self.fluid = FluidPropertyPack::unset();
        self.report = PipeReport::default();
        self.unconverged_sub_steps = 0;
        tracing::debug!(pipe = self.config.name(), sim_day, "environment period started");
    }

    /// Accept or revert the tentative state for an outer step ending at `sim_time_s`.
    pub fn begin_step(&mut self, sim_time_s: Real) -> HistoryTransition {
        if (sim_time_s - self.last_accepted_s).abs() > SAME_INSTANT_S {
            self.state.copy_slot(TimeSlot::Tentative, TimeSlot::Current);
            self.last_accepted_s = sim_time_s;
            tracing::debug!(pipe = self.config.name(), sim_time_s, "accepted tentative state");
            HistoryTransition::Accept
        } else {
            self.state.copy_slot(TimeSlot::Current, TimeSlot::Tentative);
            tracing::debug!(pipe = self.config.name(), sim_time_s, "reverted tentative state");
            HistoryTransition::Revert
        }
    }

    fn environment_drive(&self, ambient: &AmbientConditions) -> PipeResult<EnvironmentDrive> {
        let name = self.config.name();
        let outdoor_c = to_degc(ambient.outdoor_dry_bulb);

        let (temperature_c, air_velocity) = match self.config.environment() {
            Environment::None => {
                return Ok(EnvironmentDrive {
                    temperature_c: outdoor_c,
                    coefficient: 0.0,
                });
            }
            Environment::Ground(_) => {
                return Ok(EnvironmentDrive {
                    temperature_c: outdoor_c,
                    coefficient: self.config.ground_coefficient().unwrap_or(0.0),
                });
            }
            Environment::OutdoorAir => (outdoor_c, ambient.wind_speed.value),
            Environment::Zone { .. } => {
                let zone = ambient
                    .zone_air_temperature
                    .ok_or_else(|| missing(name, "zone air temperature"))?;
                (to_degc(zone), ROOM_AIR_VELOCITY)
            }
            Environment::Schedule { .. } => {
                let temperature = ambient
                    .schedule_temperature
                    .ok_or_else(|| missing(name, "schedule temperature"))?;
                let velocity = ambient
                    .schedule_velocity
                    .ok_or_else(|| missing(name, "schedule air velocity"))?;
                (to_degc(temperature), velocity.value)
            }
        };

        let geometry = self.config.geometry();
        let outside = cross_flow_convection(
            name,
            temperature_c,
            air_velocity,
            geometry.insulation_outer_diameter_m,
        );
        Ok(EnvironmentDrive {
            temperature_c,
            coefficient: 1.0 / (1.0 / outside.coefficient + geometry.insulation_resistance),
        })
    }

    fn internal_coefficient(&self, mass_flow: Real) -> Real {
        if !(self.fluid.viscosity > 0.0 && self.fluid.conductivity > 0.0) {
            return 0.0;
        }
        internal_convection(
            mass_flow,
            self.fluid.viscosity,
            self.fluid.conductivity,
            self.fluid.prandtl,
            self.config.geometry().inner_diameter_m,
        )
        .coefficient
    }

    /// Evaluate one outer step.
    ///
    /// Host inputs, the environment drive and fluid properties are checked
    /// before any history is touched, so an error leaves the state as it was.
    pub fn simulate(
        &mut self,
        fluid: &dyn FluidProperties,
        inputs: &StepInputs,
    ) -> PipeResult<PipeReport> {
        inputs.validate()?;
        let inlet_c = inputs.inlet_c();
        let mass_flow = inputs.mass_flow.value;

        if inputs.first_iteration {
            let drive = self.environment_drive(&inputs.ambient)?;
            let pack = fluid.property_pack(inlet_c)?;
            tracing::trace!(pipe = self.config.name(), pack = %pack.summary(), "fluid properties");
            self.drive = drive;
            self.fluid = pack;
        }

        self.begin_step(inputs.sim_time.value);

        let step_s = inputs.step.value;
        let sub_steps = sub_step_count(step_s);
        let ctx = StepContext {
            inlet_c,
            mass_flow,
            fluid: self.fluid,
            sub_step_s: SUB_STEP_SECONDS,
            internal_coefficient: self.internal_coefficient(mass_flow),
            environment_coefficient: self.drive.coefficient,
            environment_c: self.drive.temperature_c,
            outdoor_air_c: to_degc(inputs.ambient.outdoor_dry_bulb),
            sky_c: to_degc(inputs.ambient.sky_temperature),
            wind_speed: inputs.ambient.wind_speed.value,
            beam_solar: inputs.ambient.beam_solar,
            diffuse_solar: inputs.ambient.diffuse_solar,
            cos_solar_zenith: inputs.ambient.cos_solar_zenith,
            sim_day: inputs.sim_day,
        };

        let mut acc = StepAccumulators::starting_at(self.state.pipe.outlet(TimeSlot::Tentative));
        let mut soil_outcome: Option<SoilSweepOutcome> = None;

        for _ in 0..sub_steps {
            match (self.state.soil.as_mut(), self.config.buried()) {
                (Some(grid), Some(buried)) => {
                    let solver = BuriedSoilSolver::new(
                        self.config.name(),
                        buried,
                        self.config.geometry(),
                        self.settings,
                    );
                    let outcome =
                        solver.solve_sub_step(grid, &mut self.state.pipe, &ctx, &mut acc);
                    if !outcome.converged {
                        self.unconverged_sub_steps += 1;
                    }
                    soil_outcome = Some(outcome);
                }
                _ => {
                    NearPipeSolver::new(self.config.geometry(), &ctx)
                        .solve_all(&mut self.state.pipe, &mut acc);
                }
            }
            self.state.copy_slot(TimeSlot::Current, TimeSlot::Previous);
        }

        self.report = self.build_report(inputs, step_s, sub_steps, &acc, soil_outcome);
        Ok(self.report)
    }

    fn build_report(
        &self,
        inputs: &StepInputs,
        step_s: Real,
        sub_steps: usize,
        acc: &StepAccumulators,
        soil: Option<SoilSweepOutcome>,
    ) -> PipeReport {
        let environment_w = if sub_steps > 0 {
            acc.environment_loss / sub_steps as Real
        } else {
            0.0
        };
        let zone_heat_gain_w = match self.config.environment() {
            Environment::Zone { .. } => environment_w,
            _ => 0.0,
        };
        let wall = &self.state.pipe.wall;
        let mass_flow = inputs.mass_flow.value;

        PipeReport {
            inlet_temperature_c: inputs.inlet_c(),
            outlet_temperature_c: acc.outlet_c,
            mass_flow_kgps: mass_flow,
            volume_flow_m3ps: self.fluid.volume_flow(mass_flow),
            fluid_heat_loss_w: acc.fluid_loss,
            fluid_heat_loss_j: acc.fluid_loss * step_s,
            environment_heat_loss_w: environment_w,
            environment_heat_loss_j: environment_w * step_s,
            zone_heat_gain_w,
            wall_temperature_inlet_c: wall.get(1, TimeSlot::Current),
            wall_temperature_outlet_c: wall.get(self.config.sections(), TimeSlot::Current),
            sub_steps,
            soil,
        }
    }
}

fn missing(pipe: &str, what: &'static str) -> PipeError {
    PipeError::MissingAmbient {
        pipe: pipe.to_string(),
        what,
    }
}
