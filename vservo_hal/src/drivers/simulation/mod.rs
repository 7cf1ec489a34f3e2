//! Simulation backend.
//!
//! A kinematic vehicle and a ground-truth perception stage sharing one
//! [`SimWorld`], for running the tracking loop without hardware.

mod driver;
mod perception;
mod world;

pub use driver::SimulatedVehicle;
pub use perception::GroundTruthPerception;
pub use world::SimWorld;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use vservo_common::tracker::config::TrackerConfig;
use vservo_common::vehicle::driver::{Backend, VehicleError};

/// Registry name of this backend.
pub const DRIVER_NAME: &str = "simulation";

/// Factory: build the simulated vehicle and perception over a fresh world.
pub fn create_backend(config: &TrackerConfig) -> Result<Backend, VehicleError> {
    let sim = config.driver.simulation;
    sim.validate()
        .map_err(|e| VehicleError::InvalidConfig(e.to_string()))?;
    let period = config.timing.frame_period();
    debug!(?sim, ?period, "Creating simulation world");

    let world = SimWorld::new(sim).with_frame_period(period);
    let world = Rc::new(RefCell::new(world));
    Ok(Backend {
        vehicle: Box::new(SimulatedVehicle::new(world.clone())),
        perception: Box::new(GroundTruthPerception::new(world)),
    })
}
