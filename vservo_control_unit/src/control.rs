//! Control engine root.
//!
//! Fuzzy visual-servo controller: Gaussian membership model, Mamdani
//! inference over a fixed rule base, and the deadband facade used by the
//! supervisory loop.

pub mod fuzzy;
pub mod inference;
pub mod membership;
