//! Prelude module for common re-exports.
//!
//! ```rust
//! use vservo_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, Validate};
pub use crate::tracker::config::{
    CameraConfig, ControllerConfig, DriverConfig, KeyBindings, MonitorConfig, SimulationConfig,
    TimingConfig, TrackerConfig,
};

// ─── Fuzzy Parameters ───────────────────────────────────────────────
pub use crate::tracker::fuzzy::{FuzzyParameters, GaussianParams, Term, VariableParams};

// ─── Supervisory State ──────────────────────────────────────────────
pub use crate::tracker::state::{Phase, TerminationReason};

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::vehicle::driver::{
    Backend, BackendFactory, KeySource, Perception, Vehicle, VehicleError,
};
pub use crate::vehicle::types::{Detection, Frame, RcCommand};
