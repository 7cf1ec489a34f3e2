//! Configuration loading, backend selection and startup failures.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use vservo_common::config::ConfigError;
use vservo_common::tracker::state::{Phase, TerminationReason};
use vservo_common::vehicle::driver::{Backend, Perception, Vehicle, VehicleError};
use vservo_common::vehicle::types::{Detection, Frame, RcCommand};
use vservo_control_unit::config::{
    LoadedConfig, load_config, load_config_from_str, load_config_or_default,
};
use vservo_control_unit::cycle::{ManualClock, Supervisor};
use vservo_control_unit::error::SupervisorError;
use vservo_control_unit::input::ScriptedKeys;
use vservo_hal::default_registry;

use super::common::launch;

const SESSION_TOML: &str = r#"
[shared]
session_name = "bench-hover"
log_level = "debug"

[timing]
stabilize_time = 0.5
track_duration = 3.0

[keys]
launch = "g"
quit = "x"

[driver.simulation]
target_bearing_deg = -15.0
battery_percent = 12
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn session_runs_from_config_file() {
    let file = write_config(SESSION_TOML);
    let loaded = load_config(file.path()).unwrap();
    assert_eq!(loaded.source.as_deref(), Some(file.path()));

    let tracker = &loaded.tracker;
    assert_eq!(tracker.keys.launch, 'g');
    let backend = default_registry().create_backend(tracker).unwrap();
    let keys = ScriptedKeys::new().key('g');
    let mut sup = Supervisor::with_clock(tracker, backend, Box::new(keys), ManualClock::new());

    // Low battery only warns.
    let report = sup.run().unwrap();
    assert_eq!(report.session_name, "bench-hover");
    assert_eq!(report.reason, Some(TerminationReason::MaxDuration));

    // Target on the left: yaw left.
    let (_, first_yaw) = sup.yaw_monitor().samples().next().unwrap();
    assert!(first_yaw < 0.0);
    assert!(report.to_string().starts_with("=== SESSION bench-hover ==="));
}

#[test]
fn default_launch_key_is_ignored_when_rebound() {
    let loaded = load_config_from_str(SESSION_TOML).unwrap();
    let backend = default_registry()
        .create_backend(&loaded.tracker)
        .unwrap();
    let mut sup = Supervisor::with_clock(
        &loaded.tracker,
        backend,
        Box::new(launch()),
        ManualClock::new(),
    );
    sup.startup().unwrap();
    for _ in 0..5 {
        sup.tick().unwrap();
    }
    assert_eq!(sup.phase(), Phase::AwaitingLaunch);
}

#[test]
fn shipped_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/tracker.toml");
    let loaded = load_config_or_default(&path).unwrap();
    assert!(loaded.source.is_some(), "{} not found", path.display());

    let defaults = LoadedConfig::defaults().tracker;
    let shipped = loaded.tracker;
    assert_eq!(shipped.timing, defaults.timing);
    assert_eq!(shipped.camera, defaults.camera);
    assert_eq!(shipped.controller, defaults.controller);
    assert_eq!(shipped.monitor, defaults.monitor);
    assert_eq!(shipped.keys, defaults.keys);
    assert_eq!(shipped.driver, defaults.driver);
    assert_eq!(shipped.shared.session_name, defaults.shared.session_name);
}

#[test]
fn out_of_range_values_are_rejected_at_load() {
    let file = write_config("[driver.simulation]\nhfov_deg = 200.0\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)), "{err}");
}

#[test]
fn timeout_beyond_duration_range_is_rejected_at_load() {
    let err = load_config_from_str("[timing]\ntrack_duration = 1e20\nstabilize_time = 0.0\n")
        .unwrap_err();
    assert!(
        matches!(&err, ConfigError::ValidationError(msg) if msg.contains("track_duration")),
        "{err}"
    );
}

#[test]
fn unknown_driver_is_not_found() {
    let loaded = LoadedConfig::defaults().with_driver("tello-udp").unwrap();
    let result = default_registry().create_backend(&loaded.tracker);
    match result {
        Err(VehicleError::DriverNotFound(name)) => assert_eq!(name, "tello-udp"),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("unknown driver created a backend"),
    }
}

struct Unreachable;

impl Vehicle for Unreachable {
    fn name(&self) -> &'static str {
        "unreachable"
    }
    fn connect(&mut self) -> Result<(), VehicleError> {
        Err(VehicleError::ConnectionFailed("no route to host".to_string()))
    }
    fn battery(&mut self) -> Result<u8, VehicleError> {
        panic!("battery queried without a link")
    }
    fn stream_on(&mut self) -> Result<(), VehicleError> {
        panic!("stream started without a link")
    }
    fn stream_off(&mut self) -> Result<(), VehicleError> {
        panic!("stream stopped though it never started")
    }
    fn latest_frame(&mut self) -> Option<Frame> {
        None
    }
    fn takeoff(&mut self) -> Result<(), VehicleError> {
        panic!("takeoff without a link")
    }
    fn land(&mut self) -> Result<(), VehicleError> {
        panic!("land though never airborne")
    }
    fn send_rc_control(&mut self, _command: RcCommand) -> Result<(), VehicleError> {
        panic!("rc without a link")
    }
}

struct Blind;

impl Perception for Blind {
    fn process_frame(&mut self, _frame: &Frame) -> Detection {
        Detection::NONE
    }
}

#[test]
fn connection_failure_aborts_before_the_loop() {
    let backend = Backend {
        vehicle: Box::new(Unreachable),
        perception: Box::new(Blind),
    };
    let mut sup = Supervisor::with_clock(
        &LoadedConfig::defaults().tracker,
        backend,
        Box::new(launch()),
        ManualClock::new(),
    );

    let err = sup.run().unwrap_err();
    assert!(matches!(
        err,
        SupervisorError::Vehicle(VehicleError::ConnectionFailed(_))
    ));
    assert!(err.to_string().contains("no route to host"));
    assert_eq!(sup.phase(), Phase::Terminated);
    assert_eq!(sup.termination_reason(), Some(TerminationReason::VehicleFault));
    assert_eq!(sup.stats().tick_count, 0);
}
