//! Supervisory tracking loop: perceive → decide → actuate → check exits.
//!
//! One [`Supervisor::tick`] is one full iteration. [`Supervisor::run`] paces
//! ticks at the configured frame period until the session terminates.
//!
//! ## Phases
//! - **AwaitingLaunch**: poll keys; launch key → takeoff → Stabilizing,
//!   quit key → Terminated without takeoff.
//! - **Stabilizing**: neutral RC command each tick until `stabilize_time`.
//! - **Tracking**: detected → fuzzy compute, feed monitors, send command;
//!   not detected → neutral command. A missing frame skips perception and
//!   actuation for that tick, exit timers are still evaluated.
//! - **Terminated**: report the session metrics, then land (if airborne)
//!   and stream off, best effort.
//!
//! Exit conditions compare elapsed time with strict `>`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use vservo_common::consts::LOW_BATTERY_PERCENT;
use vservo_common::tracker::config::{CameraConfig, KeyBindings, TimingConfig, TrackerConfig};
use vservo_common::tracker::state::{Phase, TerminationReason};
use vservo_common::vehicle::driver::{Backend, KeySource, Perception, Vehicle, VehicleError};
use vservo_common::vehicle::types::RcCommand;

use crate::control::fuzzy::FuzzyController;
use crate::error::SupervisorError;
use crate::monitor::response::{ResponseMonitor, ResponseSummary};
use crate::monitor::tracking::{TrackingResponse, TrackingSummary};
use crate::state::machine::{PhaseEvent, PhaseMachine, TransitionResult};

// ─── Clock ──────────────────────────────────────────────────────────

/// Monotonic time source and sleeper for the loop.
pub trait Clock {
    fn now(&self) -> Instant;

    /// Block for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock `Instant` with `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Manually driven clock; `sleep` advances time instantly.
///
/// Clones share the same time, so a test can keep a handle and advance the
/// clock the supervisor owns.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Per-tick timing and perception counters.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleStats {
    /// Total ticks executed.
    pub tick_count: u64,
    /// Last tick duration [ns].
    pub last_tick_ns: u64,
    /// Minimum tick duration [ns].
    pub min_tick_ns: u64,
    /// Maximum tick duration [ns].
    pub max_tick_ns: u64,
    /// Running sum for average computation.
    pub sum_tick_ns: u128,
    /// Ticks that took longer than the frame period.
    pub overruns: u64,
    /// Tracking ticks with no frame available.
    pub frames_missing: u64,
    /// Tracking ticks with a detected target.
    pub detections: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            tick_count: 0,
            last_tick_ns: 0,
            min_tick_ns: u64::MAX,
            max_tick_ns: 0,
            sum_tick_ns: 0,
            overruns: 0,
            frames_missing: 0,
            detections: 0,
        }
    }

    #[inline]
    pub fn record(&mut self, duration: Duration, budget: Duration) {
        let ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.tick_count += 1;
        self.last_tick_ns = ns;
        self.min_tick_ns = self.min_tick_ns.min(ns);
        self.max_tick_ns = self.max_tick_ns.max(ns);
        self.sum_tick_ns += u128::from(ns);
        if duration > budget {
            self.overruns += 1;
        }
    }

    /// Average tick time [ns] (0 if no ticks).
    #[inline]
    pub fn avg_tick_ns(&self) -> u64 {
        if self.tick_count == 0 {
            0
        } else {
            u64::try_from(self.sum_tick_ns / u128::from(self.tick_count)).unwrap_or(u64::MAX)
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Session Report ─────────────────────────────────────────────────

/// Metrics read out at the end of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub session_name: String,
    pub reason: Option<TerminationReason>,
    pub yaw: ResponseSummary,
    pub throttle: ResponseSummary,
    pub h_offset: TrackingSummary,
    pub v_offset: TrackingSummary,
    pub stats: CycleStats,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SESSION {} ===", self.session_name)?;
        match self.reason {
            Some(reason) => writeln!(f, "Ended by      : {reason}")?,
            None => writeln!(f, "Ended by      : N/A")?,
        }
        writeln!(f)?;
        writeln!(f, "{}", self.yaw)?;
        writeln!(f)?;
        writeln!(f, "{}", self.throttle)?;
        writeln!(f)?;
        writeln!(f, "{}", self.h_offset)?;
        writeln!(f)?;
        write!(f, "{}", self.v_offset)
    }
}

/// What a single tick concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session continues in the given phase.
    Running(Phase),
    /// Session ended (now or earlier).
    Terminated(TerminationReason),
}

// ─── Supervisor ─────────────────────────────────────────────────────

/// Owns the controller, the four monitors and the collaborators of one session.
pub struct Supervisor<C: Clock = MonotonicClock> {
    session_name: String,
    timing: TimingConfig,
    camera: CameraConfig,
    bindings: KeyBindings,

    vehicle: Box<dyn Vehicle>,
    perception: Box<dyn Perception>,
    keys: Box<dyn KeySource>,
    clock: C,
    /// Cleared by the signal handler to request shutdown.
    running: Option<Arc<AtomicBool>>,
    /// Receives the final report before the vehicle is landed.
    report_sink: Option<Box<dyn FnMut(&SessionReport)>>,

    machine: PhaseMachine,
    controller: FuzzyController,
    yaw_mon: ResponseMonitor,
    thr_mon: ResponseMonitor,
    track_h: TrackingResponse,
    track_v: TrackingResponse,

    stabilize_start: Option<Instant>,
    tracking_start: Option<Instant>,
    last_seen: Option<Instant>,
    last_command: Option<RcCommand>,
    streaming: bool,
    airborne: bool,
    stats: CycleStats,
}

impl Supervisor<MonotonicClock> {
    pub fn new(config: &TrackerConfig, backend: Backend, keys: Box<dyn KeySource>) -> Self {
        Self::with_clock(config, backend, keys, MonotonicClock)
    }
}

impl<C: Clock> Supervisor<C> {
    pub fn with_clock(
        config: &TrackerConfig,
        backend: Backend,
        keys: Box<dyn KeySource>,
        clock: C,
    ) -> Self {
        let monitor = &config.monitor;
        Self {
            session_name: config.shared.session_name.clone(),
            timing: config.timing,
            camera: config.camera,
            bindings: config.keys,
            vehicle: backend.vehicle,
            perception: backend.perception,
            keys,
            clock,
            running: None,
            report_sink: None,
            machine: PhaseMachine::new(),
            controller: FuzzyController::new(&config.controller),
            yaw_mon: ResponseMonitor::from_config("yaw", monitor),
            thr_mon: ResponseMonitor::from_config("throttle", monitor),
            track_h: TrackingResponse::with_tol("h_offset", monitor.tracking_tol),
            track_v: TrackingResponse::with_tol("v_offset", monitor.tracking_tol),
            stabilize_start: None,
            tracking_start: None,
            last_seen: None,
            last_command: None,
            streaming: false,
            airborne: false,
            stats: CycleStats::new(),
        }
    }

    /// Terminate with [`TerminationReason::Shutdown`] once `running` is cleared.
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }

    /// Deliver the final report to `sink` on termination, ahead of teardown.
    pub fn with_report_sink(mut self, sink: impl FnMut(&SessionReport) + 'static) -> Self {
        self.report_sink = Some(Box::new(sink));
        self
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    #[inline]
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.machine.reason()
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// When the Tracking phase began.
    #[inline]
    pub fn tracking_started_at(&self) -> Option<Instant> {
        self.tracking_start
    }

    /// Time of the most recent detection.
    #[inline]
    pub fn last_detection_at(&self) -> Option<Instant> {
        self.last_seen
    }

    /// Last RC command successfully sent.
    #[inline]
    pub fn last_command(&self) -> Option<RcCommand> {
        self.last_command
    }

    pub fn yaw_monitor(&self) -> &ResponseMonitor {
        &self.yaw_mon
    }

    pub fn throttle_monitor(&self) -> &ResponseMonitor {
        &self.thr_mon
    }

    pub fn h_tracking(&self) -> &TrackingResponse {
        &self.track_h
    }

    pub fn v_tracking(&self) -> &TrackingResponse {
        &self.track_v
    }

    /// Connect, report battery and start the video stream.
    ///
    /// On failure the session is terminated with `VehicleFault`.
    pub fn startup(&mut self) -> Result<(), SupervisorError> {
        let result = self.startup_sequence();
        if let Err(e) = result {
            return Err(self.fault(e));
        }
        Ok(())
    }

    fn startup_sequence(&mut self) -> Result<(), VehicleError> {
        info!(
            session = %self.session_name,
            backend = self.vehicle.name(),
            "Connecting to vehicle"
        );
        self.vehicle.connect()?;

        let battery = self.vehicle.battery()?;
        if battery < LOW_BATTERY_PERCENT {
            warn!(battery, "Battery low");
        } else {
            info!(battery, "Battery level");
        }

        self.vehicle.stream_on()?;
        self.streaming = true;
        info!(
            "Video stream on; press '{}' to launch, '{}' to quit",
            self.bindings.launch, self.bindings.quit
        );
        Ok(())
    }

    /// Execute one loop iteration.
    ///
    /// # Errors
    /// A vehicle command failure terminates the session with `VehicleFault`,
    /// runs teardown and is returned.
    pub fn tick(&mut self) -> Result<TickOutcome, SupervisorError> {
        if let Some(reason) = self.machine.reason() {
            return Ok(TickOutcome::Terminated(reason));
        }

        let tick_start = self.clock.now();
        let result = self.step(tick_start);
        let duration = self.clock.now().saturating_duration_since(tick_start);
        self.stats.record(duration, self.timing.frame_period());

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(self.fault(e)),
        }
    }

    /// Run from startup to termination, pacing ticks at the frame period.
    pub fn run(&mut self) -> Result<SessionReport, SupervisorError> {
        self.startup()?;

        let period = self.timing.frame_period();
        loop {
            let tick_start = self.clock.now();
            if let TickOutcome::Terminated(_) = self.tick()? {
                break;
            }
            let elapsed = self.clock.now().saturating_duration_since(tick_start);
            if let Some(remaining) = period.checked_sub(elapsed) {
                self.clock.sleep(remaining);
            }
        }

        Ok(self.report())
    }

    /// Snapshot of all monitor summaries; does not mutate state.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            session_name: self.session_name.clone(),
            reason: self.machine.reason(),
            yaw: self.yaw_mon.summary(),
            throttle: self.thr_mon.summary(),
            h_offset: self.track_h.summary(),
            v_offset: self.track_v.summary(),
            stats: self.stats.clone(),
        }
    }

    fn emit_report(&mut self) {
        let report = self.report();
        info!(
            session = %report.session_name,
            reason = report.reason.map(|r| r.as_str()),
            detections = report.stats.detections,
            yaw_rise_s = report.yaw.rise_time.map(|t| t.as_secs_f64()),
            yaw_settling_s = report.yaw.settling_time.map(|t| t.as_secs_f64()),
            yaw_overshoot_pct = report.yaw.overshoot,
            throttle_rise_s = report.throttle.rise_time.map(|t| t.as_secs_f64()),
            throttle_settling_s = report.throttle.settling_time.map(|t| t.as_secs_f64()),
            throttle_overshoot_pct = report.throttle.overshoot,
            h_response_s = report.h_offset.response_time.map(|t| t.as_secs_f64()),
            v_response_s = report.v_offset.response_time.map(|t| t.as_secs_f64()),
            "Session metrics"
        );
        if let Some(sink) = self.report_sink.as_mut() {
            sink(&report);
        }
    }

    /// Land (if airborne) and stop the stream. Failures are logged only.
    ///
    /// Idempotent.
    pub fn teardown(&mut self) {
        if self.airborne {
            info!("Landing");
            match self.vehicle.land() {
                Ok(()) => self.airborne = false,
                Err(e) => error!("Land failed: {e}"),
            }
        }
        if self.streaming {
            if let Err(e) = self.vehicle.stream_off() {
                error!("Stream off failed: {e}");
            }
            self.streaming = false;
        }
        debug!(
            ticks = self.stats.tick_count,
            avg_tick_ns = self.stats.avg_tick_ns(),
            max_tick_ns = self.stats.max_tick_ns,
            overruns = self.stats.overruns,
            frames_missing = self.stats.frames_missing,
            "Teardown complete"
        );
    }

    // ── Internals ──

    fn step(&mut self, now: Instant) -> Result<TickOutcome, VehicleError> {
        let key = self.keys.poll_key();
        let quit = self.quit_requested(key);

        match self.machine.phase() {
            Phase::AwaitingLaunch => {
                if let Some(reason) = quit {
                    return Ok(self.terminate(reason));
                }
                if key == Some(self.bindings.launch) {
                    info!("Launch requested, taking off");
                    self.vehicle.takeoff()?;
                    self.airborne = true;
                    self.stabilize_start = Some(now);
                    self.transition(PhaseEvent::Launch);
                }
            }
            Phase::Stabilizing => {
                if let Some(reason) = quit {
                    return Ok(self.terminate(reason));
                }
                self.send(RcCommand::HOLD)?;
                let since = *self.stabilize_start.get_or_insert(now);
                if now.saturating_duration_since(since) >= self.timing.stabilize() {
                    self.tracking_start = Some(now);
                    self.transition(PhaseEvent::Stabilized);
                }
            }
            Phase::Tracking => {
                self.track(now)?;
                if let Some(reason) = quit.or_else(|| self.expired(now)) {
                    return Ok(self.terminate(reason));
                }
            }
            Phase::Terminated => {}
        }

        Ok(match self.machine.reason() {
            Some(reason) => TickOutcome::Terminated(reason),
            None => TickOutcome::Running(self.machine.phase()),
        })
    }

    fn track(&mut self, now: Instant) -> Result<(), VehicleError> {
        let Some(frame) = self.vehicle.latest_frame() else {
            self.stats.frames_missing += 1;
            debug!("No frame available, skipping perception");
            return Ok(());
        };

        let detection = self.perception.process_frame(&frame);
        if !detection.detected {
            debug!(seq = frame.seq, "Target not detected, holding");
            return self.send(RcCommand::HOLD);
        }

        let (h_px, v_px) = self
            .camera
            .to_pixels(detection.h_offset, detection.v_offset);
        let (yaw, vert) = self.controller.compute(h_px, v_px);

        self.yaw_mon.update(f64::from(yaw), now);
        self.thr_mon.update(f64::from(vert), now);
        self.track_h.update(detection.h_offset, now);
        self.track_v.update(detection.v_offset, now);
        self.last_seen = Some(now);
        self.stats.detections += 1;

        debug!(
            seq = frame.seq,
            h_offset = detection.h_offset,
            v_offset = detection.v_offset,
            yaw,
            vert,
            "Tracking"
        );
        self.send(RcCommand::yaw_vertical(yaw, vert))
    }

    /// First exit timer that has expired, if any.
    fn expired(&self, now: Instant) -> Option<TerminationReason> {
        let start = self.tracking_start?;
        let elapsed = now.saturating_duration_since(start);

        if elapsed > self.timing.track() {
            return Some(TerminationReason::MaxDuration);
        }
        match self.last_seen {
            None if elapsed > self.timing.no_detect() => Some(TerminationReason::NoDetection),
            Some(seen) if now.saturating_duration_since(seen) > self.timing.lost() => {
                Some(TerminationReason::TargetLost)
            }
            _ => None,
        }
    }

    fn quit_requested(&self, key: Option<char>) -> Option<TerminationReason> {
        if key == Some(self.bindings.quit) {
            return Some(TerminationReason::QuitRequested);
        }
        match &self.running {
            Some(running) if !running.load(Ordering::SeqCst) => Some(TerminationReason::Shutdown),
            _ => None,
        }
    }

    fn send(&mut self, command: RcCommand) -> Result<(), VehicleError> {
        self.vehicle.send_rc_control(command)?;
        self.last_command = Some(command);
        Ok(())
    }

    fn transition(&mut self, event: PhaseEvent) {
        let from = self.machine.phase();
        match self.machine.handle_event(event) {
            TransitionResult::Ok(to) => info!("Phase {from} → {to}"),
            TransitionResult::Rejected(reason) => warn!("Phase event {event:?} rejected: {reason}"),
        }
    }

    fn terminate(&mut self, reason: TerminationReason) -> TickOutcome {
        info!(reason = reason.as_str(), "Terminating session");
        let first = self.machine.reason().is_none();
        self.transition(PhaseEvent::Terminate(reason));
        // Metrics go out while the vehicle is still airborne.
        if first {
            self.emit_report();
        }
        self.teardown();
        TickOutcome::Terminated(self.machine.reason().unwrap_or(reason))
    }

    fn fault(&mut self, e: VehicleError) -> SupervisorError {
        error!("Vehicle fault: {e}");
        self.terminate(TerminationReason::VehicleFault);
        SupervisorError::Vehicle(e)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
