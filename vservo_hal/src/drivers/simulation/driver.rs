//! Simulated vehicle implementing the `Vehicle` trait.
//!
//! Each `latest_frame` call advances the shared world by one frame period,
//! so simulated flight time follows the stream rather than the wall clock.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};
use vservo_common::vehicle::driver::{Vehicle, VehicleError};
use vservo_common::vehicle::types::{Frame, RcCommand};

use super::world::SimWorld;

pub struct SimulatedVehicle {
    world: Rc<RefCell<SimWorld>>,
}

impl SimulatedVehicle {
    pub fn new(world: Rc<RefCell<SimWorld>>) -> Self {
        Self { world }
    }

    fn require_link(&self, command: &'static str) -> Result<(), VehicleError> {
        if self.world.borrow().is_connected() {
            Ok(())
        } else {
            Err(VehicleError::command(command, "not connected"))
        }
    }
}

impl Vehicle for SimulatedVehicle {
    fn name(&self) -> &'static str {
        super::DRIVER_NAME
    }

    fn connect(&mut self) -> Result<(), VehicleError> {
        self.world.borrow_mut().set_connected(true);
        info!("Simulated vehicle connected");
        Ok(())
    }

    fn battery(&mut self) -> Result<u8, VehicleError> {
        self.require_link("battery")?;
        Ok(self.world.borrow().config().battery_percent)
    }

    fn stream_on(&mut self) -> Result<(), VehicleError> {
        if !self.world.borrow().is_connected() {
            return Err(VehicleError::StreamError("not connected".to_string()));
        }
        self.world.borrow_mut().set_streaming(true);
        Ok(())
    }

    fn stream_off(&mut self) -> Result<(), VehicleError> {
        self.world.borrow_mut().set_streaming(false);
        Ok(())
    }

    fn latest_frame(&mut self) -> Option<Frame> {
        let mut world = self.world.borrow_mut();
        if !world.is_streaming() {
            return None;
        }
        world.step_frame();
        let seq = world.next_frame_seq();

        let drop_every = world.config().drop_every_n_frames;
        if drop_every > 0 && seq % drop_every == 0 {
            debug!(seq, "Dropping simulated frame");
            return None;
        }
        let config = world.config();
        Some(Frame::empty(seq, config.frame_width, config.frame_height))
    }

    fn takeoff(&mut self) -> Result<(), VehicleError> {
        self.require_link("takeoff")?;
        let mut world = self.world.borrow_mut();
        if world.is_airborne() {
            return Err(VehicleError::command("takeoff", "already airborne"));
        }
        world.take_off();
        info!(altitude_m = world.altitude_m(), "Simulated takeoff");
        Ok(())
    }

    fn land(&mut self) -> Result<(), VehicleError> {
        self.require_link("land")?;
        self.world.borrow_mut().land();
        info!("Simulated landing");
        Ok(())
    }

    fn send_rc_control(&mut self, command: RcCommand) -> Result<(), VehicleError> {
        self.require_link("rc")?;
        self.world.borrow_mut().set_command(command);
        Ok(())
    }
}
