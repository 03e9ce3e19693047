//! Integration test: buried pipe coupled to the soil grid.
//!
//! Checks that:
//! - environment start puts every soil node on the undisturbed profile
//! - a uniform, undriven domain converges in one sweep
//! - an unattainable tolerance stops at the iteration cap, counted once
//! - warm fluid heats the soil around the pipe while boundaries stay fixed

use tp_core::units::{degc, kgps, m, mps, s};
use tp_fluids::{ConstantFluid, SurfaceRoughness, TabulatedWater};
use tp_pipe::{
    AmbientConditions, Environment, GroundCoupling, MaterialLayer, PipeConfiguration,
    PipeHeatTransfer, SoilProperties, SoilSolverSettings, StepInputs, SurfaceTemperatureSource,
    TimeSlot,
};

fn buried_config(surface: SurfaceTemperatureSource, sun_exposed: bool) -> PipeConfiguration {
    PipeConfiguration::new(
        "district main",
        m(0.1),
        m(40.0),
        4,
        &[MaterialLayer::new("hdpe", 0.008, 0.45, 950.0, 1900.0)],
        Environment::Ground(GroundCoupling {
            soil: SoilProperties {
                conductivity: 1.5,
                density: 1900.0,
                specific_heat: 900.0,
                thermal_absorptance: 0.9,
                solar_absorptance: 0.6,
                roughness: SurfaceRoughness::Rough,
            },
            cover_depth_m: 0.95,
            sun_exposed,
            depth_nodes: 8,
            width_nodes: None,
            grid_spacing_m: None,
            surface,
        }),
    )
    .unwrap()
}

fn flat_surface() -> SurfaceTemperatureSource {
    SurfaceTemperatureSource::Annual {
        mean_c: 21.0,
        amplitude: 0.0,
        phase_shift_days: 0.0,
    }
}

fn seasonal_surface() -> SurfaceTemperatureSource {
    SurfaceTemperatureSource::Monthly([
        -2.0, -1.0, 3.0, 8.0, 13.0, 17.0, 20.0, 19.0, 15.0, 9.0, 4.0, 0.0,
    ])
}

fn step(t: f64, day: f64, inlet_c: f64, ambient: AmbientConditions) -> StepInputs {
    StepInputs {
        sim_time: s(t),
        step: s(600.0),
        sim_day: day,
        first_iteration: true,
        inlet_temperature: degc(inlet_c),
        mass_flow: kgps(0.5),
        ambient,
    }
}

#[test]
fn environment_start_matches_ground_model() {
    let mut model = PipeHeatTransfer::new(buried_config(seasonal_surface(), true));
    model.begin_environment(45.0);

    let buried = model.config().buried().unwrap().clone();
    let grid = model.state().soil.as_ref().unwrap();
    let layout = grid.layout();
    for length in 0..layout.length_nodes {
        for depth in 0..layout.depth_nodes {
            let expected = buried.ground.temperature(layout.row_depth(depth), 45.0);
            for width in 0..layout.width_nodes {
                for slot in TimeSlot::ALL {
                    assert_eq!(grid.get(width, depth, length, slot), expected);
                }
            }
        }
    }
}

#[test]
fn uniform_domain_converges_in_one_sweep() {
    let fluid = ConstantFluid::water_like();
    let mut model = PipeHeatTransfer::new(buried_config(flat_surface(), false));
    model.begin_environment(1.0);

    let ambient = AmbientConditions::still_air(degc(21.0));
    let report = model.simulate(&fluid, &step(600.0, 1.0, 21.0, ambient)).unwrap();

    let soil = report.soil.unwrap();
    assert!(soil.converged);
    assert_eq!(soil.iterations, 1);
    assert!((report.outlet_temperature_c - 21.0).abs() < 1e-9);
    assert_eq!(model.unconverged_sub_steps(), 0);
}

#[test]
fn unattainable_tolerance_stops_at_cap() {
    let fluid = ConstantFluid::water_like();
    let settings = SoilSolverSettings {
        max_iterations: 5,
        tolerance: -1.0,
    };
    let mut model =
        PipeHeatTransfer::new(buried_config(seasonal_surface(), true)).with_soil_settings(settings);
    model.begin_environment(15.0);

    let ambient = AmbientConditions::still_air(degc(-15.0))
        .with_wind(mps(8.0))
        .with_sky(degc(-30.0));
    // One outer step of exactly one sub-step.
    let mut inputs = step(60.0, 15.0, 80.0, ambient);
    inputs.step = s(60.0);
    let report = model.simulate(&fluid, &inputs).unwrap();

    assert_eq!(report.sub_steps, 1);
    let soil = report.soil.unwrap();
    assert!(!soil.converged);
    assert_eq!(soil.iterations, settings.max_iterations);
    assert_eq!(model.unconverged_sub_steps(), 1);
}

#[test]
fn warm_fluid_heats_surrounding_soil() {
    let water = TabulatedWater::new();
    let mut model = PipeHeatTransfer::new(buried_config(seasonal_surface(), true));
    model.begin_environment(200.0);

    let buried = model.config().buried().unwrap().clone();
    let layout = buried.layout.clone();
    let undisturbed = buried.ground.temperature(layout.row_depth(layout.pipe_row), 200.0);

    let ambient = AmbientConditions::still_air(degc(18.0))
        .with_wind(mps(2.0))
        .with_sky(degc(8.0))
        .with_solar(600.0, 120.0, 0.7);

    let mut report = None;
    for n in 1..=24 {
        let r = model
            .simulate(&water, &step(600.0 * n as f64, 200.0, 55.0, ambient.clone()))
            .unwrap();
        report = Some(r);
    }
    let report = report.unwrap();

    let grid = model.state().soil.as_ref().unwrap();
    for length in 0..layout.length_nodes {
        let pipe_node = grid.get(0, layout.pipe_row, length, TimeSlot::Current);
        assert!(pipe_node > undisturbed + 1.0);
        assert!(pipe_node < 55.0);
    }

    // Downstream sections see cooler fluid.
    let first = grid.get(0, layout.pipe_row, 0, TimeSlot::Current);
    let last = grid.get(0, layout.pipe_row, layout.length_nodes - 1, TimeSlot::Current);
    assert!(first >= last);

    // Boundaries never move away from the ground model.
    let deep = layout.depth_nodes - 1;
    let deep_t = buried.ground.temperature(layout.row_depth(deep), 200.0);
    for width in 0..layout.width_nodes {
        assert_eq!(grid.get(width, deep, 0, TimeSlot::Current), deep_t);
    }

    assert!(report.outlet_temperature_c < 55.0);
    assert!(report.environment_heat_loss_w > 0.0);
    assert!(report.fluid_heat_loss_w > 0.0);
    assert!(report.wall_temperature_inlet_c >= report.wall_temperature_outlet_c);
}

#[test]
fn shaded_surface_ignores_solar() {
    let fluid = ConstantFluid::water_like();
    let run = |solar: f64| {
        let mut model = PipeHeatTransfer::new(buried_config(flat_surface(), false));
        model.begin_environment(1.0);
        let ambient = AmbientConditions::still_air(degc(21.0)).with_solar(solar, solar, 1.0);
        model
            .simulate(&fluid, &step(600.0, 1.0, 21.0, ambient))
            .unwrap();
        model.state().soil.as_ref().unwrap().field().snapshot(TimeSlot::Tentative)
    };
    assert_eq!(run(0.0), run(800.0));
}
