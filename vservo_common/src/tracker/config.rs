//! Tracker configuration structures.
//!
//! All sections use `#[serde(default)]` so an empty file yields the tuned
//! flight defaults from [`crate::consts`]. Bounds are checked by
//! [`Validate`] after loading.
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! session_name = "hangar-run-03"
//!
//! [timing]
//! stabilize_time = 2.0
//! lost_timeout = 5.0
//!
//! [keys]
//! launch = "t"
//! quit = "q"
//!
//! [driver]
//! name = "simulation"
//!
//! [driver.simulation]
//! target_bearing_deg = 25.0
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::fuzzy::FuzzyParameters;
use crate::config::{ConfigError, SharedConfig, Validate};
use crate::consts::{
    DEFAULT_DRIVER, FRAME_HALF_HEIGHT_PX, FRAME_HALF_WIDTH_PX, FRAME_PERIOD_MS, LAUNCH_KEY,
    LOST_TIMEOUT_S, NO_DETECT_TIMEOUT_S, QUIT_KEY, RESPONSE_TOL, RISE_FRACTION, SETTLE_WINDOW,
    STABILIZE_TIME_S, TRACK_DURATION_S, TRACKING_TOL, VERTICAL_DEADBAND_PX,
};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level tracker configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub shared: SharedConfig,
    pub timing: TimingConfig,
    pub camera: CameraConfig,
    pub controller: ControllerConfig,
    pub monitor: MonitorConfig,
    pub keys: KeyBindings,
    pub driver: DriverConfig,
}

impl Validate for TrackerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.timing.validate()?;
        self.camera.validate()?;
        self.controller.validate()?;
        self.monitor.validate()?;
        self.keys.validate()?;
        self.driver.validate()?;
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

fn check_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be finite and > 0 (got {value})")))
    }
}

/// The accessors convert with `Duration::from_secs_f64`, which panics on
/// values a `Duration` cannot hold.
fn check_duration(name: &str, value: f64) -> Result<(), ConfigError> {
    Duration::try_from_secs_f64(value)
        .map(|_| ())
        .map_err(|e| invalid(format!("{name} {value} s is not a valid duration: {e}")))
}

fn check_fraction(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} {value} out of range (0, 1]")))
    }
}

// ─── Timing ─────────────────────────────────────────────────────────

/// Phase timers, all in seconds except the frame period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Neutral hold after takeoff [s].
    pub stabilize_time: f64,
    /// Abort if nothing was ever detected within this time [s].
    pub no_detect_timeout: f64,
    /// Maximum tracking duration [s].
    pub track_duration: f64,
    /// Abort if the target has been unseen for this long [s].
    pub lost_timeout: f64,
    /// Tick period [ms].
    pub frame_period_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            stabilize_time: STABILIZE_TIME_S,
            no_detect_timeout: NO_DETECT_TIMEOUT_S,
            track_duration: TRACK_DURATION_S,
            lost_timeout: LOST_TIMEOUT_S,
            frame_period_ms: FRAME_PERIOD_MS,
        }
    }
}

impl TimingConfig {
    pub fn stabilize(&self) -> Duration {
        Duration::from_secs_f64(self.stabilize_time)
    }

    pub fn no_detect(&self) -> Duration {
        Duration::from_secs_f64(self.no_detect_timeout)
    }

    pub fn track(&self) -> Duration {
        Duration::from_secs_f64(self.track_duration)
    }

    pub fn lost(&self) -> Duration {
        Duration::from_secs_f64(self.lost_timeout)
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_period_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Zero stabilize time is allowed: tracking starts on the next tick.
        if !(self.stabilize_time.is_finite() && self.stabilize_time >= 0.0) {
            return Err(invalid(format!(
                "timing.stabilize_time must be >= 0 (got {})",
                self.stabilize_time
            )));
        }
        check_duration("timing.stabilize_time", self.stabilize_time)?;
        for (name, value) in [
            ("timing.no_detect_timeout", self.no_detect_timeout),
            ("timing.track_duration", self.track_duration),
            ("timing.lost_timeout", self.lost_timeout),
        ] {
            check_positive(name, value)?;
            check_duration(name, value)?;
        }
        if self.frame_period_ms == 0 {
            return Err(invalid("timing.frame_period_ms must be > 0".to_string()));
        }
        Ok(())
    }
}

// ─── Camera ─────────────────────────────────────────────────────────

/// Scale from normalised offsets in [-1, 1] to pixel error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub half_width_px: f64,
    pub half_height_px: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            half_width_px: FRAME_HALF_WIDTH_PX,
            half_height_px: FRAME_HALF_HEIGHT_PX,
        }
    }
}

impl CameraConfig {
    /// Convert normalised offsets to pixel errors.
    #[inline]
    pub fn to_pixels(&self, h_offset: f64, v_offset: f64) -> (f64, f64) {
        (h_offset * self.half_width_px, v_offset * self.half_height_px)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("camera.half_width_px", self.half_width_px)?;
        check_positive("camera.half_height_px", self.half_height_px)
    }
}

// ─── Controller ─────────────────────────────────────────────────────

/// Fuzzy controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// `|v_error| < deadband` forces zero vertical output [px].
    pub vertical_deadband_px: f64,
    /// Membership sets; defaults are the tuned flight sets.
    #[serde(flatten)]
    pub fuzzy: FuzzyParameters,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            vertical_deadband_px: VERTICAL_DEADBAND_PX,
            fuzzy: FuzzyParameters::default(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.vertical_deadband_px.is_finite() && self.vertical_deadband_px >= 0.0) {
            return Err(invalid(format!(
                "controller.vertical_deadband_px must be >= 0 (got {})",
                self.vertical_deadband_px
            )));
        }
        self.fuzzy
            .validate()
            .map_err(|e| invalid(format!("controller.{e}")))
    }
}

// ─── Monitor ────────────────────────────────────────────────────────

/// Response and tracking monitor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Desired final actuator value.
    pub target: f64,
    /// Settling band as a fraction of the step reference.
    pub tol: f64,
    /// Consecutive in-band samples required to settle.
    pub settle_window: usize,
    /// Rise band as a fraction of the step reference.
    pub rise_fraction: f64,
    /// Normalised offset magnitude that counts as centred.
    pub tracking_tol: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target: 0.0,
            tol: RESPONSE_TOL,
            settle_window: SETTLE_WINDOW,
            rise_fraction: RISE_FRACTION,
            tracking_tol: TRACKING_TOL,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target.is_finite() {
            return Err(invalid("monitor.target must be finite".to_string()));
        }
        check_fraction("monitor.tol", self.tol)?;
        check_fraction("monitor.rise_fraction", self.rise_fraction)?;
        check_fraction("monitor.tracking_tol", self.tracking_tol)?;
        if self.settle_window == 0 {
            return Err(invalid("monitor.settle_window must be >= 1".to_string()));
        }
        Ok(())
    }
}

// ─── Keys ───────────────────────────────────────────────────────────

/// Operator key bindings (single characters, matched case-sensitively).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub launch: char,
    pub quit: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            launch: LAUNCH_KEY,
            quit: QUIT_KEY,
        }
    }
}

impl KeyBindings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.launch == self.quit {
            return Err(invalid(format!(
                "keys.launch and keys.quit must differ (both '{}')",
                self.launch
            )));
        }
        if self.launch.is_whitespace() || self.quit.is_whitespace() {
            return Err(invalid("keys must not be whitespace".to_string()));
        }
        Ok(())
    }
}

// ─── Driver ─────────────────────────────────────────────────────────

/// Backend selection and backend-specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Registered backend name.
    pub name: String,
    /// Settings for the `simulation` backend.
    pub simulation: SimulationConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DRIVER.to_string(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(invalid("driver.name cannot be empty".to_string()));
        }
        self.simulation.validate()
    }
}

/// Kinematic world used by the simulation backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Initial target bearing relative to the vehicle heading [deg], positive right.
    pub target_bearing_deg: f64,
    /// Target bearing drift [deg/s].
    pub target_drift_dps: f64,
    /// Target height above ground [m].
    pub target_height_m: f64,
    /// Horizontal distance to the target [m].
    pub target_distance_m: f64,
    /// Altitude reached by takeoff [m].
    pub takeoff_altitude_m: f64,
    /// Horizontal field of view [deg].
    pub hfov_deg: f64,
    /// Vertical field of view [deg].
    pub vfov_deg: f64,
    /// Yaw rate at full RC deflection [deg/s].
    pub max_yaw_rate_dps: f64,
    /// Vertical speed at full RC deflection [m/s].
    pub max_vertical_speed_mps: f64,
    /// Reported battery level [%].
    pub battery_percent: u8,
    /// Drop every N-th frame (0 disables).
    pub drop_every_n_frames: u64,
    /// Simulated frame width [px].
    pub frame_width: u32,
    /// Simulated frame height [px].
    pub frame_height: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            target_bearing_deg: 20.0,
            target_drift_dps: 0.0,
            target_height_m: 1.4,
            target_distance_m: 3.0,
            takeoff_altitude_m: 0.9,
            hfov_deg: 82.6,
            vfov_deg: 62.0,
            max_yaw_rate_dps: 100.0,
            max_vertical_speed_mps: 1.0,
            battery_percent: 87,
            drop_every_n_frames: 0,
            frame_width: (FRAME_HALF_WIDTH_PX * 2.0) as u32,
            frame_height: (FRAME_HALF_HEIGHT_PX * 2.0) as u32,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("driver.simulation.target_distance_m", self.target_distance_m)?;
        check_positive("driver.simulation.max_yaw_rate_dps", self.max_yaw_rate_dps)?;
        check_positive(
            "driver.simulation.max_vertical_speed_mps",
            self.max_vertical_speed_mps,
        )?;
        for (name, fov) in [("hfov_deg", self.hfov_deg), ("vfov_deg", self.vfov_deg)] {
            if !(fov.is_finite() && fov > 0.0 && fov < 180.0) {
                return Err(invalid(format!(
                    "driver.simulation.{name} {fov} out of range (0, 180)"
                )));
            }
        }
        if self.battery_percent > 100 {
            return Err(invalid(format!(
                "driver.simulation.battery_percent {} > 100",
                self.battery_percent
            )));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(invalid("driver.simulation frame size must be non-zero".to_string()));
        }
        Ok(())
    }
}
