//! # VServo Control Unit Library
//!
//! Visual-servo tracking core: a fuzzy controller that maps the target's
//! pixel error to yaw and vertical rate commands, step-response monitors that
//! grade the closed loop, and the supervisory loop that sequences launch,
//! stabilization, tracking and termination.
//!
//! ## Layers
//!
//! 1. **Membership model** - Gaussian sets over sampled linguistic variables
//! 2. **Inference engine** - six fixed rules, min/max, centroid
//! 3. **Fuzzy controller** - vertical deadband and integer truncation
//! 4. **Monitors** - rise/settling/overshoot and first-lock latency
//! 5. **Supervisor** - phase machine, exit timers, collaborator calls
//!
//! ## Single-Threaded Loop
//!
//! The supervisor owns its controller, monitors and collaborators. Every
//! tick runs to completion before the next; nothing is shared across ticks
//! except through the supervisor itself.

pub mod config;
pub mod control;
pub mod cycle;
pub mod error;
pub mod input;
pub mod monitor;
pub mod state;
