//! Closed-loop performance monitors.
//!
//! [`response::ResponseMonitor`] derives step-response metrics (rise time,
//! settling time, overshoot) from actuator outputs;
//! [`tracking::TrackingResponse`] measures detection-to-lock latency from
//! perception offsets. Both are fed only on ticks with a detection.

pub mod response;
pub mod tracking;
