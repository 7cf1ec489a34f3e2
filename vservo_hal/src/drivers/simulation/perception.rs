//! Ground-truth perception: reads the target position from the shared world
//! instead of segmenting pixels.

use std::cell::RefCell;
use std::rc::Rc;

use vservo_common::vehicle::driver::Perception;
use vservo_common::vehicle::types::{Detection, Frame};

use super::world::SimWorld;

pub struct GroundTruthPerception {
    world: Rc<RefCell<SimWorld>>,
}

impl GroundTruthPerception {
    pub fn new(world: Rc<RefCell<SimWorld>>) -> Self {
        Self { world }
    }
}

impl Perception for GroundTruthPerception {
    fn process_frame(&mut self, _frame: &Frame) -> Detection {
        let world = self.world.borrow();
        if !world.is_streaming() {
            return Detection::NONE;
        }
        world.project()
    }
}
