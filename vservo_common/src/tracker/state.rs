//! Supervisory phase and termination enums.
//!
//! Session lifecycle: AwaitingLaunch → Stabilizing → Tracking → Terminated.

use std::fmt;

/// Supervisory loop phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Streaming, waiting for the launch key.
    #[default]
    AwaitingLaunch,
    /// Airborne, holding neutral commands for the stabilize time.
    Stabilizing,
    /// Closed-loop fuzzy tracking.
    Tracking,
    /// Absorbing: teardown done or in progress.
    Terminated,
}

impl Phase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingLaunch => "AWAITING_LAUNCH",
            Self::Stabilizing => "STABILIZING",
            Self::Tracking => "TRACKING",
            Self::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// Operator pressed the quit key.
    QuitRequested,
    /// Process signal (Ctrl-C).
    Shutdown,
    /// Tracking phase exceeded its maximum duration.
    MaxDuration,
    /// Nothing was ever detected within the no-detection timeout.
    NoDetection,
    /// Target not seen for longer than the lost-target timeout.
    TargetLost,
    /// A vehicle command failed.
    VehicleFault,
}

impl TerminationReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::QuitRequested => "quit requested",
            Self::Shutdown => "shutdown signal",
            Self::MaxDuration => "max tracking duration reached",
            Self::NoDetection => "no detection timeout",
            Self::TargetLost => "target lost",
            Self::VehicleFault => "vehicle fault",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
