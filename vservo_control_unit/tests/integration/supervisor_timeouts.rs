//! Supervisor exit conditions under a manual clock.
//!
//! With a zero-cost tick and a manual clock, `run()` advances time by exactly
//! one frame period per tick, so every exit must land within one period after
//! its threshold.

use std::time::{Duration, Instant};

use vservo_common::tracker::state::{Phase, TerminationReason};
use vservo_common::vehicle::types::{Detection, RcCommand};
use vservo_control_unit::cycle::Clock;
use vservo_control_unit::error::SupervisorError;
use vservo_control_unit::input::ScriptedKeys;

use super::common::{Harness, config_with_timers, frame_period, launch};

fn assert_within_one_period(elapsed: Duration, threshold: Duration, period: Duration) {
    assert!(elapsed > threshold, "{elapsed:?} not past {threshold:?}");
    assert!(
        elapsed <= threshold + period,
        "{elapsed:?} later than one period after {threshold:?}"
    );
}

#[test]
fn no_detection_ends_session_after_timeout() {
    // lost_timeout shorter than no_detect_timeout must not matter.
    let config = config_with_timers(0.5, 3.0, 60.0, 1.0);
    let mut h = Harness::new(&config, launch(), |_| Detection::NONE);

    let report = h.supervisor.run().unwrap();
    assert_eq!(report.reason, Some(TerminationReason::NoDetection));

    let tracking_start = h.supervisor.tracking_started_at().unwrap();
    let ended = h.clock.now();
    assert_within_one_period(
        ended - tracking_start,
        Duration::from_secs(3),
        frame_period(&config),
    );

    let log = h.log.borrow();
    assert_eq!(log.count("takeoff"), 1);
    assert_eq!(log.count("land"), 1);
    assert_eq!(log.landed_at, Some(ended));
    // Not detected: only neutral commands.
    assert!(log.commands.iter().all(|(_, c)| c.is_hold()));
    assert!(report.yaw.rise_time.is_none());
    assert_eq!(report.yaw.samples, 0);
}

#[test]
fn lost_target_ends_session_after_lost_timeout() {
    let config = config_with_timers(0.5, 3.0, 60.0, 1.5);
    let start = Instant::now();
    // Detected until 2 s after start, then gone.
    let cutoff = start + Duration::from_secs(2);
    let mut h = Harness::starting_at(start, &config, launch(), move |now| {
        if now < cutoff {
            Detection::at(0.2, 0.0)
        } else {
            Detection::NONE
        }
    });

    let report = h.supervisor.run().unwrap();
    assert_eq!(report.reason, Some(TerminationReason::TargetLost));

    let last_seen = h.supervisor.last_detection_at().unwrap();
    assert!(last_seen < cutoff);
    assert_within_one_period(
        h.clock.now() - last_seen,
        Duration::from_secs_f64(1.5),
        frame_period(&config),
    );
    assert!(report.stats.detections > 0);
}

#[test]
fn max_duration_ends_continuous_tracking() {
    let config = config_with_timers(0.2, 10.0, 1.0, 10.0);
    let mut h = Harness::new(&config, launch(), |_| Detection::at(-0.3, 0.1));

    let report = h.supervisor.run().unwrap();
    assert_eq!(report.reason, Some(TerminationReason::MaxDuration));

    let tracking_start = h.supervisor.tracking_started_at().unwrap();
    assert_within_one_period(
        h.clock.now() - tracking_start,
        Duration::from_secs(1),
        frame_period(&config),
    );

    // Every tracking tick saw the target, so every monitor has samples.
    assert_eq!(report.yaw.samples as u64, report.stats.detections);
    assert_eq!(report.throttle.samples as u64, report.stats.detections);

    // Target left of centre: yaw left.
    let log = h.log.borrow();
    let (_, last) = log.commands.last().copied().unwrap();
    assert!(last.yaw < 0, "{last:?}");
}

#[test]
fn quit_key_during_tracking_lands() {
    let config = config_with_timers(0.1, 10.0, 60.0, 10.0);
    let keys = ScriptedKeys::new().key('t').idle(20).key('q');
    let mut h = Harness::new(&config, keys, |_| Detection::at(0.1, -0.1));

    let report = h.supervisor.run().unwrap();
    assert_eq!(report.reason, Some(TerminationReason::QuitRequested));
    assert_eq!(h.supervisor.phase(), Phase::Terminated);

    // Tick 0 launches, tick 21 quits.
    assert_eq!(report.stats.tick_count, 22);
    let log = h.log.borrow();
    assert_eq!(
        log.calls,
        vec!["connect", "stream_on", "takeoff", "land", "stream_off"]
    );
}

#[test]
fn quit_before_launch_never_takes_off() {
    let config = config_with_timers(0.1, 10.0, 60.0, 10.0);
    let keys = ScriptedKeys::new().idle(3).key('q');
    let mut h = Harness::new(&config, keys, |_| Detection::at(0.0, 0.0));

    let report = h.supervisor.run().unwrap();
    assert_eq!(report.reason, Some(TerminationReason::QuitRequested));
    let log = h.log.borrow();
    assert_eq!(log.count("takeoff"), 0);
    assert_eq!(log.count("land"), 0);
    assert_eq!(log.count("stream_off"), 1);
    assert!(log.commands.is_empty());
}

#[test]
fn vehicle_fault_terminates_and_returns_error() {
    let config = config_with_timers(0.1, 10.0, 60.0, 10.0);
    let mut h = Harness::new(&config, launch(), |_| Detection::at(0.4, 0.4));
    h.log.borrow_mut().fail_rc_after = Some(10);

    let err = h.supervisor.run().unwrap_err();
    assert!(matches!(err, SupervisorError::Vehicle(_)));
    assert_eq!(
        h.supervisor.termination_reason(),
        Some(TerminationReason::VehicleFault)
    );

    let log = h.log.borrow();
    assert_eq!(log.commands.len(), 10);
    assert!(log.calls.ends_with(&["land", "stream_off"]), "{:?}", log.calls);

    // Metrics gathered before the fault are still reportable.
    let report = h.supervisor.report();
    assert_eq!(report.reason, Some(TerminationReason::VehicleFault));
}

#[test]
fn missing_frames_still_run_exit_timers() {
    let config = config_with_timers(0.1, 2.0, 60.0, 10.0);
    let mut h = Harness::new(&config, launch(), |_| Detection::at(0.5, 0.5));
    h.log.borrow_mut().no_frames = true;

    let report = h.supervisor.run().unwrap();
    assert_eq!(report.reason, Some(TerminationReason::NoDetection));
    assert!(report.stats.frames_missing > 0);
    assert_eq!(report.stats.detections, 0);

    // Only the stabilizing HOLDs were sent; tracking ticks skipped actuation.
    let log = h.log.borrow();
    let tracking_start = h.supervisor.tracking_started_at().unwrap();
    assert!(log.commands.iter().all(|(t, c)| *t <= tracking_start && *c == RcCommand::HOLD));
}
