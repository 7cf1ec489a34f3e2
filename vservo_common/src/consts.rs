//! System-wide constants for the visual-servo workspace.
//!
//! Single source of truth for default timings, frame geometry and monitor
//! tolerances. Configuration defaults are derived from these values.

/// Hold time after takeoff before tracking starts [s].
pub const STABILIZE_TIME_S: f64 = 2.0;

/// Abort tracking if nothing was ever detected within this time [s].
pub const NO_DETECT_TIMEOUT_S: f64 = 10.0;

/// Maximum tracking phase duration [s].
pub const TRACK_DURATION_S: f64 = 60.0;

/// Abort tracking if the target has not been seen for this long [s].
pub const LOST_TIMEOUT_S: f64 = 10.0;

/// Tick period, one video frame at ~30 fps [ms].
pub const FRAME_PERIOD_MS: u64 = 33;

/// Half frame width; scales a normalised horizontal offset to pixels.
pub const FRAME_HALF_WIDTH_PX: f64 = 320.0;

/// Half frame height; scales a normalised vertical offset to pixels.
pub const FRAME_HALF_HEIGHT_PX: f64 = 240.0;

/// Vertical pixel errors strictly below this magnitude command no climb/descent.
pub const VERTICAL_DEADBAND_PX: f64 = 5.0;

/// Settling tolerance as a fraction of the step reference.
pub const RESPONSE_TOL: f64 = 0.02;

/// Fraction of the step reference that counts as "risen".
pub const RISE_FRACTION: f64 = 0.1;

/// Consecutive in-band samples required before settling is declared.
pub const SETTLE_WINDOW: usize = 5;

/// Normalised offset magnitude that counts as "centred".
pub const TRACKING_TOL: f64 = 0.05;

/// Actuator command saturation (RC units).
pub const RC_LIMIT: i32 = 100;

/// Battery level below which a warning is logged at connect [%].
pub const LOW_BATTERY_PERCENT: u8 = 20;

/// Default key that requests takeoff.
pub const LAUNCH_KEY: char = 't';

/// Default key that requests termination.
pub const QUIT_KEY: char = 'q';

/// Default backend driver name.
pub const DEFAULT_DRIVER: &str = "simulation";

/// Default session identifier.
pub const DEFAULT_SESSION_NAME: &str = "vservo";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/tracker.toml";
