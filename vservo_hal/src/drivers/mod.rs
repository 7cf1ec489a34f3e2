//! Backend implementations.
//!
//! - [`simulation`] - Kinematic vehicle with ground-truth perception
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `Vehicle` and `Perception` from `vservo_common::vehicle::driver`
//! 3. Expose a `create_backend(&TrackerConfig)` factory
//! 4. Register it in [`register_all_drivers`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in backends.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register(simulation::DRIVER_NAME, simulation::create_backend);
}
