//! Kinematic world shared by the simulated vehicle and perception.
//!
//! The vehicle yaws and climbs at rates proportional to the last RC command.
//! The target sits at a fixed horizontal distance and height, at a bearing
//! that may drift. Projection uses a pinhole camera with the configured FOV.

use std::time::Duration;

use vservo_common::consts::{FRAME_PERIOD_MS, RC_LIMIT};
use vservo_common::tracker::config::SimulationConfig;
use vservo_common::vehicle::types::{Detection, RcCommand};

/// World state.
#[derive(Debug, Clone)]
pub struct SimWorld {
    config: SimulationConfig,
    /// Simulated time advanced per captured frame [s].
    frame_dt_s: f64,
    /// Vehicle heading relative to its heading at power-on [deg].
    heading_deg: f64,
    altitude_m: f64,
    /// Target bearing in the same frame as `heading_deg` [deg].
    target_bearing_deg: f64,
    command: RcCommand,
    connected: bool,
    streaming: bool,
    airborne: bool,
    frame_seq: u64,
}

impl SimWorld {
    /// World advancing one default frame period per captured frame.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            frame_dt_s: Duration::from_millis(FRAME_PERIOD_MS).as_secs_f64(),
            heading_deg: 0.0,
            altitude_m: 0.0,
            target_bearing_deg: config.target_bearing_deg,
            command: RcCommand::HOLD,
            connected: false,
            streaming: false,
            airborne: false,
            frame_seq: 0,
            config,
        }
    }

    /// Advance by `period` per captured frame, matching the loop's tick.
    pub fn with_frame_period(mut self, period: Duration) -> Self {
        self.frame_dt_s = period.as_secs_f64();
        self
    }

    #[inline]
    pub fn frame_dt_s(&self) -> f64 {
        self.frame_dt_s
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    #[inline]
    pub fn altitude_m(&self) -> f64 {
        self.altitude_m
    }

    #[inline]
    pub fn command(&self) -> RcCommand {
        self.command
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    #[inline]
    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub(crate) fn set_streaming(&mut self, streaming: bool) {
        self.streaming = streaming;
    }

    pub(crate) fn set_command(&mut self, command: RcCommand) {
        self.command = command;
    }

    pub(crate) fn take_off(&mut self) {
        self.airborne = true;
        self.altitude_m = self.config.takeoff_altitude_m;
    }

    pub(crate) fn land(&mut self) {
        self.airborne = false;
        self.altitude_m = 0.0;
        self.command = RcCommand::HOLD;
    }

    /// Next frame sequence number (starts at 1).
    pub(crate) fn next_frame_seq(&mut self) -> u64 {
        self.frame_seq += 1;
        self.frame_seq
    }

    /// Integrate one frame period under the current command.
    pub(crate) fn step_frame(&mut self) {
        self.step(self.frame_dt_s);
    }

    /// Integrate `dt` seconds under the current command.
    pub fn step(&mut self, dt: f64) {
        self.target_bearing_deg += self.config.target_drift_dps * dt;
        if !self.airborne {
            return;
        }
        let limit = f64::from(RC_LIMIT);
        self.heading_deg += f64::from(self.command.yaw) / limit * self.config.max_yaw_rate_dps * dt;
        self.altitude_m = (self.altitude_m
            + f64::from(self.command.vertical) / limit * self.config.max_vertical_speed_mps * dt)
            .max(0.0);
    }

    /// Target bearing relative to the camera axis, wrapped to (-180, 180] [deg].
    pub fn relative_bearing_deg(&self) -> f64 {
        wrap_deg(self.target_bearing_deg - self.heading_deg)
    }

    /// Ground-truth detection as seen by the camera.
    ///
    /// Positive `v_offset` means the target is below the image centre.
    pub fn project(&self) -> Detection {
        let rel = self.relative_bearing_deg();
        let half_h = self.config.hfov_deg / 2.0;
        if rel.abs() > half_h {
            return Detection::NONE;
        }

        let h = rel.to_radians().tan() / half_h.to_radians().tan();
        let below = (self.altitude_m - self.config.target_height_m) / self.config.target_distance_m;
        let v = below / (self.config.vfov_deg / 2.0).to_radians().tan();
        if v.abs() > 1.0 {
            return Detection::NONE;
        }
        Detection::at(h, v)
    }
}

fn wrap_deg(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}
