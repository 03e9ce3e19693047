//! Lumped fluid/pipe-wall heat balance (Hanby model).
//!
//! Each section holds one fluid node and one wall node. Both balances are
//! implicit in the new temperatures and are solved in closed form, marching
//! from the inlet to the outlet. History terms come from the previous slot and
//! results land in the tentative slot.

use crate::config::PipeGeometry;
use crate::context::StepContext;
use crate::slots::TimeSlot;
use crate::state::PipeProfile;
use tp_core::numeric::Real;

/// Running totals for one evaluation of an outer step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepAccumulators {
    /// Environment loss summed over sections and sub-steps [W]
    pub environment_loss: Real,
    /// Fluid loss of the latest sub-step [W]
    pub fluid_loss: Real,
    /// Outlet temperature of the latest sub-step [°C]
    pub outlet_c: Real,
}

impl StepAccumulators {
    /// Zeroed rates with the outlet held at `outlet_c` until a sub-step runs.
    pub fn starting_at(outlet_c: Real) -> Self {
        Self {
            environment_loss: 0.0,
            fluid_loss: 0.0,
            outlet_c,
        }
    }
}

/// New temperatures of one section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionSolution {
    pub fluid_c: Real,
    pub wall_c: Real,
    /// Heat flow from the outer surface to the environment [W]
    pub environment_loss: Real,
}

/// Section coefficients, fixed for one sub-step.
#[derive(Clone, Copy, Debug)]
struct Coefficients {
    a1: Real,
    a2: Real,
    a3: Real,
    a4: Real,
    b1: Real,
    b2: Real,
    b3: Real,
    b4: Real,
}

/// Marches the near-pipe balance for one sub-step.
#[derive(Debug)]
pub struct NearPipeSolver<'a> {
    geometry: &'a PipeGeometry,
    ctx: &'a StepContext,
    coef: Coefficients,
}

impl<'a> NearPipeSolver<'a> {
    pub fn new(geometry: &'a PipeGeometry, ctx: &'a StepContext) -> Self {
        let dt = ctx.sub_step_s;
        let cp = ctx.fluid.specific_heat;
        let fluid_capacity = geometry.fluid_heat_capacity(ctx.fluid.density, cp);
        let wall_capacity = geometry.wall_heat_capacity();
        let inside = ctx.internal_coefficient * geometry.inside_area() * dt;
        let outside = ctx.environment_coefficient * geometry.outside_area() * dt;
        let advection = ctx.mass_flow * cp * dt;

        let coef = Coefficients {
            a1: fluid_capacity + advection + inside,
            a2: advection,
            a3: inside,
            a4: fluid_capacity,
            b1: wall_capacity + inside + outside,
            b2: inside,
            b3: outside,
            b4: wall_capacity,
        };

        Self {
            geometry,
            ctx,
            coef,
        }
    }

    /// False when the fluid state is degenerate (e.g. frozen) and no update may run.
    pub fn can_update(&self) -> bool {
        self.ctx.fluid.is_usable()
    }

    /// Apply the degenerate-fluid fallback: hold the outlet, zero both rates.
    pub fn hold(&self, profile: &PipeProfile, acc: &mut StepAccumulators) {
        acc.outlet_c = profile.outlet(TimeSlot::Tentative);
        acc.environment_loss = 0.0;
        acc.fluid_loss = 0.0;
    }

    /// Set the inlet entry of the tentative profile.
    pub fn prime_inlet(&self, profile: &mut PipeProfile) {
        profile.fluid.set(0, TimeSlot::Tentative, self.ctx.inlet_c);
        let first_wall = profile.wall.get(1, TimeSlot::Current);
        profile.wall.set(0, TimeSlot::Tentative, first_wall);
    }

    /// Solve section `section` (1-based) against `environment_c` and store the result.
    pub fn solve_section(
        &self,
        profile: &mut PipeProfile,
        section: usize,
        environment_c: Real,
    ) -> SectionSolution {
        let c = &self.coef;
        let upstream = profile.fluid.get(section - 1, TimeSlot::Tentative);
        let fluid_past = profile.fluid.get(section, TimeSlot::Previous);
        let wall_past = profile.wall.get(section, TimeSlot::Previous);

        let fluid_c = (c.a2 * upstream
            + c.a3 / c.b1 * (c.b3 * environment_c + c.b4 * wall_past)
            + c.a4 * fluid_past)
            / (c.a1 - c.a3 * c.b2 / c.b1);
        let wall_c = (c.b2 * fluid_c + c.b3 * environment_c + c.b4 * wall_past) / c.b1;

        profile.fluid.set(section, TimeSlot::Tentative, fluid_c);
        profile.wall.set(section, TimeSlot::Tentative, wall_c);

        SectionSolution {
            fluid_c,
            wall_c,
            environment_loss: self.surface_loss(fluid_c, environment_c),
        }
    }

    /// Heat flow through the outer surface, recovered from a series-resistance balance.
    fn surface_loss(&self, fluid_c: Real, environment_c: Real) -> Real {
        let u = self.ctx.environment_coefficient;
        if u == 0.0 {
            return 0.0;
        }
        let surface_c = environment_c - (environment_c - fluid_c) / (u * (1.0 / u + self.geometry.sum_tk));
        u * self.geometry.outside_area() * (surface_c - environment_c)
    }

    /// Record the fluid loss and outlet of the tentative profile.
    pub fn finish(&self, profile: &PipeProfile, acc: &mut StepAccumulators) {
        let inlet = profile.fluid.get(0, TimeSlot::Tentative);
        let outlet = profile.outlet(TimeSlot::Tentative);
        acc.fluid_loss = self.ctx.mass_flow * self.ctx.fluid.specific_heat * (inlet - outlet);
        acc.outlet_c = outlet;
    }

    /// March every section against the context's environment temperature.
    pub fn solve_all(&self, profile: &mut PipeProfile, acc: &mut StepAccumulators) {
        if !self.can_update() {
            self.hold(profile, acc);
            return;
        }

        self.prime_inlet(profile);
        let environment_c = self.ctx.environment_c;
        for section in 1..=profile.sections() {
            acc.environment_loss += self
                .solve_section(profile, section, environment_c)
                .environment_loss;
        }
        self.finish(profile, acc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, MaterialLayer, PipeConfiguration};
    use tp_core::units::m;
    use tp_fluids::FluidPropertyPack;

    fn config() -> PipeConfiguration {
        PipeConfiguration::new(
            "test",
            m(0.05),
            m(20.0),
            4,
            &[MaterialLayer::new("steel", 0.003, 45.0, 7800.0, 480.0)],
            Environment::OutdoorAir,
        )
        .unwrap()
    }

    fn ctx(u: Real, cp: Real) -> StepContext {
        StepContext {
            inlet_c: 60.0,
            mass_flow: 0.1,
            fluid: FluidPropertyPack {
                temperature_c: 60.0,
                density: 998.0,
                specific_heat: cp,
                viscosity: 1e-3,
                conductivity: 0.6,
                prandtl: 7.0,
            },
            sub_step_s: 60.0,
            internal_coefficient: 500.0,
            environment_coefficient: u,
            environment_c: 10.0,
            outdoor_air_c: 10.0,
            sky_c: 10.0,
            wind_speed: 0.0,
            beam_solar: 0.0,
            diffuse_solar: 0.0,
            cos_solar_zenith: 0.0,
            sim_day: 1.0,
        }
    }

    #[test]
    fn hot_fluid_cools_along_the_pipe() {
        let cfg = config();
        let ctx = ctx(8.0, 4180.0);
        let solver = NearPipeSolver::new(cfg.geometry(), &ctx);
        let mut profile = PipeProfile::new(4, 21.0);
        let mut acc = StepAccumulators::starting_at(21.0);
        solver.solve_all(&mut profile, &mut acc);

        assert_eq!(profile.fluid.get(0, TimeSlot::Tentative), 60.0);
        for i in 1..=4 {
            let t = profile.fluid.get(i, TimeSlot::Tentative);
            assert!(t > 21.0 && t < 60.0);
        }
        // The pipe starts cold, so heat flows from the fluid into the wall and
        // the outlet temperature reports the loss.
        assert_eq!(acc.outlet_c, profile.outlet(TimeSlot::Tentative));
        let expected = 0.1 * 4180.0 * (60.0 - acc.outlet_c);
        assert!((acc.fluid_loss - expected).abs() < 1e-9);
        assert!(acc.environment_loss.is_finite());
    }

    #[test]
    fn adiabatic_pipe_reports_no_environment_loss() {
        let cfg = config();
        let ctx = ctx(0.0, 4180.0);
        let solver = NearPipeSolver::new(cfg.geometry(), &ctx);
        let mut profile = PipeProfile::new(4, 60.0);
        let mut acc = StepAccumulators::starting_at(60.0);
        solver.solve_all(&mut profile, &mut acc);
        assert_eq!(acc.environment_loss, 0.0);
        for i in 0..=4 {
            assert!((profile.fluid.get(i, TimeSlot::Tentative) - 60.0).abs() < 1e-9);
        }
    }

    #[test]
    fn degenerate_fluid_holds_outlet() {
        let cfg = config();
        let ctx = ctx(8.0, 0.0);
        let solver = NearPipeSolver::new(cfg.geometry(), &ctx);
        let mut profile = PipeProfile::new(4, 21.0);
        profile.fluid.set(4, TimeSlot::Tentative, 33.0);
        let before = profile.clone();
        let mut acc = StepAccumulators {
            environment_loss: 12.0,
            fluid_loss: 5.0,
            outlet_c: 0.0,
        };
        solver.solve_all(&mut profile, &mut acc);
        assert_eq!(profile, before);
        assert_eq!(acc.outlet_c, 33.0);
        assert_eq!(acc.environment_loss, 0.0);
        assert_eq!(acc.fluid_loss, 0.0);
    }

    #[test]
    fn wall_sits_between_fluid_and_environment() {
        let cfg = config();
        let ctx = ctx(8.0, 4180.0);
        let solver = NearPipeSolver::new(cfg.geometry(), &ctx);
        let mut profile = PipeProfile::new(4, 60.0);
        solver.prime_inlet(&mut profile);
        let sol = solver.solve_section(&mut profile, 1, 10.0);
        assert!(sol.wall_c < sol.fluid_c);
        assert!(sol.wall_c > 10.0);
        assert!(sol.environment_loss > 0.0);
    }
}
