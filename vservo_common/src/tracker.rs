//! Tracker domain types shared between the control unit and its backends.

pub mod config;
pub mod fuzzy;
pub mod state;
