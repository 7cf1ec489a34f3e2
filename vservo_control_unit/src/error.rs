//! Supervisor error type.
//!
//! Controller and monitor edge cases are absorbed where they occur; only
//! collaborator failures and configuration errors reach the caller.

use thiserror::Error;
use vservo_common::config::ConfigError;
use vservo_common::vehicle::driver::VehicleError;

/// Errors that end a tracking session.
#[derive(Debug, Clone, Error)]
pub enum SupervisorError {
    /// A vehicle command failed; the session was torn down.
    #[error("vehicle fault: {0}")]
    Vehicle(#[from] VehicleError),

    /// Configuration could not be loaded or validated.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
}
