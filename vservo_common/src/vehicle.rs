//! Collaborator contracts: vehicle transport, perception and key input.
//!
//! The control unit consumes these traits; concrete backends live in
//! `vservo_hal` (simulation) or in test doubles.

pub mod driver;
pub mod types;
