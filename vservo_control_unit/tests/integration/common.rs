//! Scripted collaborators sharing a manual clock.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use vservo_common::tracker::config::TrackerConfig;
use vservo_common::vehicle::driver::{Backend, Perception, Vehicle, VehicleError};
use vservo_common::vehicle::types::{Detection, Frame, RcCommand};
use vservo_control_unit::cycle::{Clock, ManualClock, Supervisor};
use vservo_control_unit::input::ScriptedKeys;

/// Everything the fake vehicle was asked to do.
#[derive(Debug, Default)]
pub struct VehicleLog {
    pub calls: Vec<&'static str>,
    pub commands: Vec<(Instant, RcCommand)>,
    pub landed_at: Option<Instant>,
    /// Fail `send_rc_control` once this many commands have been accepted.
    pub fail_rc_after: Option<usize>,
    /// Report no frames at all.
    pub no_frames: bool,
    frame_seq: u64,
}

impl VehicleLog {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

pub struct ScriptedVehicle {
    log: Rc<RefCell<VehicleLog>>,
    clock: ManualClock,
}

impl Vehicle for ScriptedVehicle {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn connect(&mut self) -> Result<(), VehicleError> {
        self.log.borrow_mut().calls.push("connect");
        Ok(())
    }

    fn battery(&mut self) -> Result<u8, VehicleError> {
        Ok(64)
    }

    fn stream_on(&mut self) -> Result<(), VehicleError> {
        self.log.borrow_mut().calls.push("stream_on");
        Ok(())
    }

    fn stream_off(&mut self) -> Result<(), VehicleError> {
        self.log.borrow_mut().calls.push("stream_off");
        Ok(())
    }

    fn latest_frame(&mut self) -> Option<Frame> {
        let mut log = self.log.borrow_mut();
        if log.no_frames {
            return None;
        }
        log.frame_seq += 1;
        Some(Frame::empty(log.frame_seq, 640, 480))
    }

    fn takeoff(&mut self) -> Result<(), VehicleError> {
        self.log.borrow_mut().calls.push("takeoff");
        Ok(())
    }

    fn land(&mut self) -> Result<(), VehicleError> {
        let mut log = self.log.borrow_mut();
        log.calls.push("land");
        log.landed_at = Some(self.clock.now());
        Ok(())
    }

    fn send_rc_control(&mut self, command: RcCommand) -> Result<(), VehicleError> {
        let mut log = self.log.borrow_mut();
        let limit = log.fail_rc_after;
        if limit.is_some_and(|n| log.commands.len() >= n) {
            return Err(VehicleError::command("rc", "link lost"));
        }
        log.commands.push((self.clock.now(), command));
        Ok(())
    }
}

/// Perception answering from a function of the current (manual) time.
pub struct TimedPerception<F> {
    clock: ManualClock,
    detect: F,
}

impl<F: FnMut(Instant) -> Detection> Perception for TimedPerception<F> {
    fn process_frame(&mut self, _frame: &Frame) -> Detection {
        (self.detect)(self.clock.now())
    }
}

/// Supervisor wired to scripted collaborators.
pub struct Harness {
    pub supervisor: Supervisor<ManualClock>,
    pub clock: ManualClock,
    pub log: Rc<RefCell<VehicleLog>>,
}

impl Harness {
    pub fn new(
        config: &TrackerConfig,
        keys: ScriptedKeys,
        detect: impl FnMut(Instant) -> Detection + 'static,
    ) -> Self {
        Self::starting_at(Instant::now(), config, keys, detect)
    }

    pub fn starting_at(
        start: Instant,
        config: &TrackerConfig,
        keys: ScriptedKeys,
        detect: impl FnMut(Instant) -> Detection + 'static,
    ) -> Self {
        let clock = ManualClock::starting_at(start);
        let log = Rc::new(RefCell::new(VehicleLog::default()));
        let backend = Backend {
            vehicle: Box::new(ScriptedVehicle {
                log: log.clone(),
                clock: clock.clone(),
            }),
            perception: Box::new(TimedPerception {
                clock: clock.clone(),
                detect,
            }),
        };
        let supervisor = Supervisor::with_clock(config, backend, Box::new(keys), clock.clone());
        Self {
            supervisor,
            clock,
            log,
        }
    }
}

/// Default config with shortened timers [s].
pub fn config_with_timers(
    stabilize: f64,
    no_detect: f64,
    track: f64,
    lost: f64,
) -> TrackerConfig {
    let mut config = TrackerConfig::default();
    config.timing.stabilize_time = stabilize;
    config.timing.no_detect_timeout = no_detect;
    config.timing.track_duration = track;
    config.timing.lost_timeout = lost;
    config
}

pub fn frame_period(config: &TrackerConfig) -> Duration {
    config.timing.frame_period()
}

/// Launch on the first tick, then nothing.
pub fn launch() -> ScriptedKeys {
    ScriptedKeys::new().key('t')
}
