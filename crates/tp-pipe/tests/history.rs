//! Integration test: accept/revert history protocol.
//!
//! Checks that:
//! - re-evaluating the same instant never changes the accepted state
//! - advancing the clock promotes the last tentative result
//! - history rotation leaves previous equal to current after every step
//! - soil grid nodes follow the same accept/revert rules as the pipe

use tp_core::units::{degc, kgps, m, mps, s};
use tp_fluids::{SurfaceRoughness, TabulatedWater};
use tp_pipe::{
    AmbientConditions, Environment, GroundCoupling, HistoryTransition, MaterialLayer,
    PipeConfiguration, PipeHeatTransfer, SoilProperties, StepInputs, SurfaceTemperatureSource,
    ThermalState, TimeSlot,
};

fn outdoor_pipe() -> PipeHeatTransfer {
    let config = PipeConfiguration::new(
        "roof run",
        m(0.04),
        m(15.0),
        6,
        &[
            MaterialLayer::new("mineral wool", 0.025, 0.045, 100.0, 840.0),
            MaterialLayer::new("steel", 0.0035, 45.0, 7850.0, 480.0),
        ],
        Environment::OutdoorAir,
    )
    .unwrap();
    let mut model = PipeHeatTransfer::new(config);
    model.begin_environment(1.0);
    model
}

fn buried_pipe() -> PipeHeatTransfer {
    let config = PipeConfiguration::new(
        "service line",
        m(0.05),
        m(20.0),
        4,
        &[MaterialLayer::new("pe", 0.005, 0.4, 950.0, 1900.0)],
        Environment::Ground(GroundCoupling {
            soil: SoilProperties {
                conductivity: 1.3,
                density: 1800.0,
                specific_heat: 950.0,
                thermal_absorptance: 0.9,
                solar_absorptance: 0.7,
                roughness: SurfaceRoughness::MediumRough,
            },
            cover_depth_m: 0.8,
            sun_exposed: true,
            depth_nodes: 6,
            width_nodes: None,
            grid_spacing_m: None,
            surface: SurfaceTemperatureSource::Annual {
                mean_c: 10.0,
                amplitude: 8.0,
                phase_shift_days: 30.0,
            },
        }),
    )
    .unwrap();
    let mut model = PipeHeatTransfer::new(config);
    model.begin_environment(1.0);
    model
}

fn soil_snapshot(state: &ThermalState, slot: TimeSlot) -> Vec<f64> {
    state.soil.as_ref().unwrap().field().snapshot(slot)
}

fn step(t: f64, first: bool, inlet_c: f64) -> StepInputs {
    StepInputs {
        sim_time: s(t),
        step: s(600.0),
        sim_day: 1.0,
        first_iteration: first,
        inlet_temperature: degc(inlet_c),
        mass_flow: kgps(0.15),
        ambient: AmbientConditions::still_air(degc(-5.0)).with_wind(mps(4.0)),
    }
}

#[test]
fn revert_is_idempotent() {
    let water = TabulatedWater::new();
    let mut model = outdoor_pipe();
    model.simulate(&water, &step(600.0, true, 55.0)).unwrap();
    model.simulate(&water, &step(1200.0, true, 55.0)).unwrap();

    let current = model.state().pipe.fluid.snapshot(TimeSlot::Current);

    assert_eq!(model.begin_step(1200.0), HistoryTransition::Revert);
    assert_eq!(model.begin_step(1200.0), HistoryTransition::Revert);

    let state = model.state();
    assert_eq!(state.pipe.fluid.snapshot(TimeSlot::Current), current);
    assert!(state.slots_identical(TimeSlot::Tentative, TimeSlot::Current));
}

#[test]
fn accept_promotes_last_tentative() {
    let water = TabulatedWater::new();
    let mut model = outdoor_pipe();
    model.simulate(&water, &step(600.0, true, 55.0)).unwrap();
    let tentative_fluid = model.state().pipe.fluid.snapshot(TimeSlot::Tentative);
    let tentative_wall = model.state().pipe.wall.snapshot(TimeSlot::Tentative);

    assert_eq!(model.begin_step(1200.0), HistoryTransition::Accept);
    assert_eq!(model.state().pipe.fluid.snapshot(TimeSlot::Current), tentative_fluid);
    assert_eq!(model.state().pipe.wall.snapshot(TimeSlot::Current), tentative_wall);
}

#[test]
fn host_iterations_at_one_instant_keep_current() {
    let water = TabulatedWater::new();
    let mut model = outdoor_pipe();
    model.simulate(&water, &step(600.0, true, 55.0)).unwrap();
    model.simulate(&water, &step(1200.0, true, 55.0)).unwrap();
    let accepted = model.state().pipe.fluid.snapshot(TimeSlot::Current);

    // The host iterates with different guesses for the inlet temperature.
    for inlet in [40.0, 70.0, 50.0] {
        model.simulate(&water, &step(1200.0, false, inlet)).unwrap();
        assert_eq!(model.state().pipe.fluid.snapshot(TimeSlot::Current), accepted);
    }

    // Only the final iterate survives into the next step.
    let last = model.simulate(&water, &step(1200.0, false, 50.0)).unwrap();
    let tentative = model.state().pipe.fluid.snapshot(TimeSlot::Tentative);
    assert_eq!(last.inlet_temperature_c, 50.0);
    model.begin_step(1800.0);
    assert_eq!(model.state().pipe.fluid.snapshot(TimeSlot::Current), tentative);
}

#[test]
fn rotation_leaves_previous_equal_to_current() {
    let water = TabulatedWater::new();
    let mut model = outdoor_pipe();
    for n in 1..=4 {
        let report = model
            .simulate(&water, &step(600.0 * n as f64, true, 55.0))
            .unwrap();
        assert_eq!(report.sub_steps, 10);
        assert!(model.state().slots_identical(TimeSlot::Previous, TimeSlot::Current));
    }
}

#[test]
fn environment_restart_resets_everything() {
    let water = TabulatedWater::new();
    let mut model = outdoor_pipe();
    model.simulate(&water, &step(600.0, true, 55.0)).unwrap();
    model.begin_environment(1.0);

    for slot in TimeSlot::ALL {
        assert!(model.state().pipe.fluid.slot_values(slot).all(|t| t == 21.0));
        assert!(model.state().pipe.wall.slot_values(slot).all(|t| t == 21.0));
    }
    assert_eq!(model.report().outlet_temperature_c, 0.0);
    // The clock restarts at zero, so the first step accepts again.
    assert_eq!(model.begin_step(600.0), HistoryTransition::Accept);
}

#[test]
fn soil_grid_follows_accept_and_revert() {
    let water = TabulatedWater::new();
    let mut model = buried_pipe();
    model.simulate(&water, &step(600.0, true, 55.0)).unwrap();
    let accepted = soil_snapshot(model.state(), TimeSlot::Current);

    // Same instant, different inlet guess.
    model.simulate(&water, &step(600.0, false, 70.0)).unwrap();
    assert_eq!(soil_snapshot(model.state(), TimeSlot::Current), accepted);
    let guess = soil_snapshot(model.state(), TimeSlot::Tentative);
    assert_ne!(guess, accepted);

    assert_eq!(model.begin_step(600.0), HistoryTransition::Revert);
    assert!(model.state().soil.is_some());
    assert!(model.state().slots_identical(TimeSlot::Tentative, TimeSlot::Current));
    assert_eq!(soil_snapshot(model.state(), TimeSlot::Tentative), accepted);

    // Re-solving from the restored state reproduces the same iterate.
    model.simulate(&water, &step(600.0, false, 70.0)).unwrap();
    let tentative = soil_snapshot(model.state(), TimeSlot::Tentative);
    assert_eq!(tentative, guess);

    assert_eq!(model.begin_step(1200.0), HistoryTransition::Accept);
    assert_eq!(soil_snapshot(model.state(), TimeSlot::Current), tentative);
}
