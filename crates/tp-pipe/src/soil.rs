//! Implicit finite-difference soil grid around a buried pipe.
//!
//! The grid is a symmetric half-domain: width 0 is the vertical centerline
//! through the pipe, the last width column and the deepest row are held at
//! the undisturbed ground temperature. Each sub-step is solved by Gauss-Seidel
//! sweeps until the largest node change falls below the tolerance.
//!
//! Node roles (first match wins):
//! - pipe node: coupled to the near-pipe balance of its section
//! - surface row: convection, sky radiation and solar gain
//! - centerline: mirrored outward neighbor
//! - interior: five-point stencil

use crate::config::{BuriedPipe, PipeGeometry};
use crate::context::StepContext;
use crate::near_pipe::{NearPipeSolver, StepAccumulators};
use crate::slots::TimeSlot;
use crate::state::{PipeProfile, SoilGrid};
use tp_core::constants::{KELVIN_OFFSET, STEFAN_BOLTZMANN};
use tp_core::numeric::Real;
use tp_fluids::convection::ashrae_simple_exterior;

/// Iteration controls of the soil solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoilSolverSettings {
    /// Sweep cap per sub-step
    pub max_iterations: usize,
    /// Largest node change accepted as converged [K]
    pub tolerance: Real,
}

impl Default for SoilSolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 0.05,
        }
    }
}

/// How one sub-step's iteration ended.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoilSweepOutcome {
    pub iterations: usize,
    pub converged: bool,
    /// Largest node change of the last sweep [K]
    pub max_change: Real,
}

/// Surface-row drivers, constant over a sub-step.
#[derive(Clone, Copy, Debug)]
struct SurfaceDrive {
    solar_gain: Real,
    sky_c: Real,
    air_c: Real,
    convection: Real,
    conduction: Real,
    storage: Real,
    radiating: bool,
    emissivity: Real,
}

impl SurfaceDrive {
    /// Linearized sky radiation coefficient from the node's past temperature.
    fn radiation_coefficient(&self, past_c: Real) -> Real {
        if !self.radiating {
            return 0.0;
        }
        let node_k = past_c + KELVIN_OFFSET;
        let sky_k = self.sky_c + KELVIN_OFFSET;
        if (node_k - sky_k).abs() > Real::EPSILON {
            STEFAN_BOLTZMANN * self.emissivity * (node_k.powi(4) - sky_k.powi(4)) / (node_k - sky_k)
        } else {
            0.0
        }
    }

    fn update(&self, neighbors: Real, past_c: Real) -> Real {
        let h_r = self.radiation_coefficient(past_c);
        (self.solar_gain
            + h_r * self.sky_c
            + self.convection * self.air_c
            + self.conduction * neighbors
            + self.storage * past_c)
            / (h_r + self.convection + 3.0 * self.conduction + self.storage)
    }
}

/// Solves the soil grid of one buried pipe for one sub-step.
#[derive(Debug)]
pub struct BuriedSoilSolver<'a> {
    name: &'a str,
    buried: &'a BuriedPipe,
    geometry: &'a PipeGeometry,
    settings: SoilSolverSettings,
}

impl<'a> BuriedSoilSolver<'a> {
    pub fn new(
        name: &'a str,
        buried: &'a BuriedPipe,
        geometry: &'a PipeGeometry,
        settings: SoilSolverSettings,
    ) -> Self {
        Self {
            name,
            buried,
            geometry,
            settings,
        }
    }

    fn surface_drive(&self, ctx: &StepContext) -> SurfaceDrive {
        let soil = &self.buried.soil;
        let solar_gain = if self.buried.sun_exposed {
            soil.solar_absorptance
                * (ctx.cos_solar_zenith.max(0.0) * ctx.beam_solar + ctx.diffuse_solar)
        } else {
            0.0
        };
        SurfaceDrive {
            solar_gain,
            sky_c: ctx.sky_c,
            air_c: ctx.outdoor_air_c,
            convection: ashrae_simple_exterior(soil.roughness, ctx.wind_speed),
            conduction: soil.conductivity / self.buried.layout.spacing_m,
            storage: soil.volumetric_heat_capacity() / ctx.sub_step_s,
            radiating: self.buried.sun_exposed,
            emissivity: soil.thermal_absorptance,
        }
    }

    /// Advance the grid and the pipe profile by one sub-step.
    ///
    /// Boundary nodes are refreshed first. Environment losses of the last
    /// sweep are added to `acc`; fluid loss and outlet are recorded once the
    /// iteration stops.
    pub fn solve_sub_step(
        &self,
        grid: &mut SoilGrid,
        profile: &mut PipeProfile,
        ctx: &StepContext,
        acc: &mut StepAccumulators,
    ) -> SoilSweepOutcome {
        grid.refresh_boundaries(&self.buried.ground, ctx.sim_day);

        let layout = grid.layout().clone();
        let near = NearPipeSolver::new(self.geometry, ctx);
        let pipe_active = near.can_update();
        if pipe_active {
            near.prime_inlet(profile);
        }

        let fourier = self.buried.soil.diffusivity() * ctx.sub_step_s / layout.spacing_m.powi(2);
        let a1 = fourier / (1.0 + 4.0 * fourier);
        let a2 = 1.0 / (1.0 + 4.0 * fourier);
        let surface = self.surface_drive(ctx);

        let mut section_losses = vec![0.0; layout.length_nodes];

        let mut outcome = SoilSweepOutcome {
            iterations: 0,
            converged: false,
            max_change: 0.0,
        };

        for iteration in 1..=self.settings.max_iterations {
            let mut max_change: Real = 0.0;

            for length in 0..layout.length_nodes {
                for depth in 0..layout.depth_nodes {
                    for width in 0..layout.width_nodes {
                        if grid.is_boundary(width, depth) {
                            continue;
                        }
                        let at = |w: usize, d: usize| grid.get(w, d, length, TimeSlot::Tentative);
                        let old = at(width, depth);
                        let past = grid.get(width, depth, length, TimeSlot::Previous);

                        let new = if width == 0 && depth == layout.pipe_row {
                            let mut sum = at(0, depth + 1) + at(1, depth);
                            let mut count = 2.0;
                            if depth > 0 {
                                sum += at(0, depth - 1);
                                count += 1.0;
                            }
                            if pipe_active {
                                let sol = near.solve_section(profile, length + 1, sum / count);
                                section_losses[length] = sol.environment_loss;
                                sol.wall_c
                            } else {
                                profile.wall.get(length + 1, TimeSlot::Tentative)
                            }
                        } else if depth == 0 {
                            let neighbors = if width == 0 {
                                at(0, 1) + 2.0 * at(1, 0)
                            } else {
                                at(width, 1) + at(width + 1, 0) + at(width - 1, 0)
                            };
                            surface.update(neighbors, past)
                        } else if width == 0 {
                            a1 * (at(0, depth + 1) + at(0, depth - 1) + 2.0 * at(1, depth))
                                + a2 * past
                        } else {
                            a1 * (at(width, depth + 1)
                                + at(width, depth - 1)
                                + at(width + 1, depth)
                                + at(width - 1, depth))
                                + a2 * past
                        };

                        grid.set(width, depth, length, TimeSlot::Tentative, new);
                        max_change = max_change.max((new - old).abs());
                    }
                }
            }

            outcome.iterations = iteration;
            outcome.max_change = max_change;
            tracing::trace!(pipe = self.name, iteration, max_change, "soil sweep");

            if max_change <= self.settings.tolerance {
                outcome.converged = true;
                break;
            }
        }

        if !outcome.converged {
            tracing::warn!(
                pipe = self.name,
                iterations = outcome.iterations,
                max_change = outcome.max_change,
                "soil temperatures did not converge; keeping the last iterate"
            );
        }

        if pipe_active {
            acc.environment_loss += section_losses.iter().sum::<Real>();
            near.finish(profile, acc);
        } else {
            near.hold(profile, acc);
        }

        outcome
    }
}
