//! # VServo HAL Library
//!
//! Collaborator backends for the tracking loop. A backend is a matched
//! [`Vehicle`](vservo_common::vehicle::driver::Vehicle) and
//! [`Perception`](vservo_common::vehicle::driver::Perception) pair, created by
//! name through a [`DriverRegistry`].
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Backend factory registration
//! - [`drivers`] - Backend implementations
//!
//! # Usage
//!
//! ```rust
//! use vservo_common::tracker::config::TrackerConfig;
//! use vservo_common::vehicle::driver::Vehicle;
//! use vservo_hal::default_registry;
//!
//! let registry = default_registry();
//! let backend = registry.create_backend(&TrackerConfig::default()).unwrap();
//! assert_eq!(backend.vehicle.name(), "simulation");
//! ```

pub mod driver_registry;
pub mod drivers;

pub use crate::driver_registry::DriverRegistry;

/// Registry with every built-in backend registered.
pub fn default_registry() -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    drivers::register_all_drivers(&mut registry);
    registry
}
