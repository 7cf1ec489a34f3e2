//! Full sessions against the simulation backend.

use std::cell::RefCell;
use std::rc::Rc;

use vservo_common::tracker::config::TrackerConfig;
use vservo_common::tracker::state::TerminationReason;
use vservo_common::vehicle::driver::Backend;
use vservo_control_unit::cycle::{ManualClock, Supervisor};
use vservo_hal::default_registry;
use vservo_hal::drivers::simulation::{GroundTruthPerception, SimWorld, SimulatedVehicle};

use super::common::{config_with_timers, launch};

fn sim_config(track_s: f64) -> TrackerConfig {
    config_with_timers(2.0, 5.0, track_s, 3.0)
}

/// Backend over a world the test keeps a handle to.
fn sim_backend(config: &TrackerConfig) -> (Backend, Rc<RefCell<SimWorld>>) {
    let world = SimWorld::new(config.driver.simulation)
        .with_frame_period(config.timing.frame_period());
    let world = Rc::new(RefCell::new(world));
    let backend = Backend {
        vehicle: Box::new(SimulatedVehicle::new(world.clone())),
        perception: Box::new(GroundTruthPerception::new(world.clone())),
    };
    (backend, world)
}

#[test]
fn registry_backend_centres_target() {
    let config = sim_config(8.0);
    let backend = default_registry().create_backend(&config).unwrap();
    let mut sup = Supervisor::with_clock(&config, backend, Box::new(launch()), ManualClock::new());

    let report = sup.run().unwrap();
    assert_eq!(report.reason, Some(TerminationReason::MaxDuration));
    assert_eq!(report.stats.frames_missing, 0);
    assert!(report.stats.detections > 200);

    // Target starts right of centre: yaw right until centred.
    assert!(report.yaw.rise_time.is_some());
    assert!(sup.h_tracking().is_done());
    let (_, first_yaw) = sup.yaw_monitor().samples().next().unwrap();
    assert!(first_yaw > 0.0);

    // Target starts above the camera: climb.
    let (_, first_throttle) = sup.throttle_monitor().samples().next().unwrap();
    assert!(first_throttle > 0.0);
}

#[test]
fn vehicle_turns_toward_target_and_lands() {
    let config = sim_config(6.0);
    let (backend, world) = sim_backend(&config);
    let mut sup = Supervisor::with_clock(&config, backend, Box::new(launch()), ManualClock::new());

    sup.run().unwrap();

    let world = world.borrow();
    let bearing = config.driver.simulation.target_bearing_deg;
    assert!(
        (world.heading_deg() - bearing).abs() < 1.0,
        "heading {} bearing {bearing}",
        world.heading_deg()
    );
    assert!(!world.is_airborne());
    assert!(!world.is_streaming());
    assert_eq!(world.altitude_m(), 0.0);
}

#[test]
fn slow_frame_rate_keeps_world_in_step_with_loop() {
    let mut config = sim_config(6.0);
    config.timing.frame_period_ms = 100;
    let (backend, world) = sim_backend(&config);
    let mut sup = Supervisor::with_clock(&config, backend, Box::new(launch()), ManualClock::new());

    let report = sup.run().unwrap();
    assert_eq!(report.reason, Some(TerminationReason::MaxDuration));

    let world = world.borrow();
    assert_eq!(world.frame_dt_s(), 0.1);
    let bearing = config.driver.simulation.target_bearing_deg;
    assert!(
        (world.heading_deg() - bearing).abs() < 1.0,
        "heading {} bearing {bearing}",
        world.heading_deg()
    );
}

#[test]
fn dropped_frames_are_counted_and_tolerated() {
    let mut config = sim_config(4.0);
    config.driver.simulation.drop_every_n_frames = 4;
    let (backend, _world) = sim_backend(&config);
    let mut sup = Supervisor::with_clock(&config, backend, Box::new(launch()), ManualClock::new());

    let report = sup.run().unwrap();
    assert_eq!(report.reason, Some(TerminationReason::MaxDuration));
    assert!(report.stats.frames_missing > 0);
    assert!(report.stats.detections > report.stats.frames_missing);
    assert!(sup.h_tracking().is_done());
}

#[test]
fn target_outside_field_of_view_is_never_detected() {
    let mut config = sim_config(30.0);
    config.driver.simulation.target_bearing_deg = 120.0;
    let (backend, world) = sim_backend(&config);
    let mut sup = Supervisor::with_clock(&config, backend, Box::new(launch()), ManualClock::new());

    let report = sup.run().unwrap();
    assert_eq!(report.reason, Some(TerminationReason::NoDetection));
    assert_eq!(report.stats.detections, 0);
    // Nothing seen, nothing commanded: the heading never moved.
    assert_eq!(world.borrow().heading_deg(), 0.0);
    assert!(report.to_string().contains("target never within tol"));
}
