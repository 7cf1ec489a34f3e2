//! Collaborator traits and error types.
//!
//! This module defines:
//! - `Vehicle` trait - transport to the airframe (commands + video stream)
//! - `Perception` trait - frame → normalised target offsets
//! - `KeySource` trait - non-blocking operator key poll
//! - `VehicleError` enum - collaborator failures
//! - `Backend` / `BackendFactory` - a matched vehicle + perception pair

use thiserror::Error;

use crate::tracker::config::TrackerConfig;
use crate::vehicle::types::{Detection, Frame, RcCommand};

/// Error types for vehicle and backend operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VehicleError {
    /// Could not establish the command link.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A command was sent but rejected or not acknowledged.
    #[error("Command '{command}' failed: {reason}")]
    CommandFailed {
        command: &'static str,
        reason: String,
    },

    /// Video stream could not be started or stopped.
    #[error("Video stream error: {0}")]
    StreamError(String),

    /// No backend registered under that name.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Backend rejected its configuration.
    #[error("Invalid driver configuration: {0}")]
    InvalidConfig(String),
}

impl VehicleError {
    pub fn command(command: &'static str, reason: impl Into<String>) -> Self {
        Self::CommandFailed {
            command,
            reason: reason.into(),
        }
    }
}

/// Transport to the vehicle.
///
/// # Lifecycle
///
/// 1. `connect()` then `stream_on()` - before the supervisory loop
/// 2. `takeoff()` - on the launch signal
/// 3. `latest_frame()` / `send_rc_control()` - once per tick
/// 4. `land()` then `stream_off()` - on termination (best effort)
///
/// Every command is synchronous; a returned error is fatal to the session.
pub trait Vehicle {
    /// Backend identifier (e.g. "simulation").
    fn name(&self) -> &'static str;

    fn connect(&mut self) -> Result<(), VehicleError>;

    /// Battery level [%].
    fn battery(&mut self) -> Result<u8, VehicleError>;

    fn stream_on(&mut self) -> Result<(), VehicleError>;

    fn stream_off(&mut self) -> Result<(), VehicleError>;

    /// Most recent decoded frame, `None` while the stream has nothing new.
    fn latest_frame(&mut self) -> Option<Frame>;

    fn takeoff(&mut self) -> Result<(), VehicleError>;

    fn land(&mut self) -> Result<(), VehicleError>;

    fn send_rc_control(&mut self, command: RcCommand) -> Result<(), VehicleError>;
}

/// Target segmentation: locates the tracked object in a frame.
pub trait Perception {
    fn process_frame(&mut self, frame: &Frame) -> Detection;
}

/// Operator input polled once per tick, never blocking.
pub trait KeySource {
    /// Next pending key press, if any.
    fn poll_key(&mut self) -> Option<char>;
}

impl<K: KeySource + ?Sized> KeySource for Box<K> {
    fn poll_key(&mut self) -> Option<char> {
        (**self).poll_key()
    }
}

/// A vehicle and the perception stage matched to its video stream.
pub struct Backend {
    pub vehicle: Box<dyn Vehicle>,
    pub perception: Box<dyn Perception>,
}

/// Factory function type for creating backends from configuration.
///
/// Receives the whole validated tracker config: `driver` selects and
/// configures the backend, `timing` sets the frame period.
pub type BackendFactory = fn(&TrackerConfig) -> Result<Backend, VehicleError>;
