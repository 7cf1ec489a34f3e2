//! VServo Common Library
//!
//! Shared constants, configuration loading and collaborator contracts for
//! all crates of the visual-servo tracking workspace.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Default timings, frame geometry and monitor tolerances
//! - [`tracker`] - Tracker configuration, fuzzy parameter sets, phase enums
//! - [`vehicle`] - Vehicle, perception and key-input contracts
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use vservo_common::prelude::*;
//!
//! let config = TrackerConfig::default();
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
pub mod tracker;
pub mod vehicle;
