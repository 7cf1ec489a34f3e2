//! Controller and monitors wired together without a supervisor.
//!
//! The plant is a first-order integrator: each tick the pixel error moves by
//! half the commanded rate, which is enough to close the loop.

use std::time::{Duration, Instant};

use vservo_common::tracker::config::{CameraConfig, ControllerConfig};
use vservo_control_unit::control::fuzzy::FuzzyController;
use vservo_control_unit::monitor::response::ResponseMonitor;
use vservo_control_unit::monitor::tracking::TrackingResponse;

const TICK: Duration = Duration::from_millis(33);
const PLANT_GAIN: f64 = 0.5;

struct Loop {
    controller: FuzzyController,
    camera: CameraConfig,
    yaw: ResponseMonitor,
    throttle: ResponseMonitor,
    h: TrackingResponse,
    yaw_log: Vec<i32>,
    vert_log: Vec<i32>,
}

impl Loop {
    fn new() -> Self {
        Self {
            controller: FuzzyController::new(&ControllerConfig::default()),
            camera: CameraConfig::default(),
            yaw: ResponseMonitor::new("yaw"),
            throttle: ResponseMonitor::new("throttle"),
            h: TrackingResponse::new("h_offset"),
            yaw_log: Vec::new(),
            vert_log: Vec::new(),
        }
    }

    /// Run `ticks` iterations from normalised offsets `(h, v)`.
    fn run(&mut self, mut h_px: f64, mut v_px: f64, ticks: u32) {
        let base = Instant::now();
        for k in 0..ticks {
            let now = base + TICK * k;
            let (yaw, vert) = self.controller.compute(h_px, v_px);
            self.yaw.update(f64::from(yaw), now);
            self.throttle.update(f64::from(vert), now);
            self.h.update(h_px / self.camera.half_width_px, now);
            self.yaw_log.push(yaw);
            self.vert_log.push(vert);

            h_px -= PLANT_GAIN * f64::from(yaw);
            v_px += PLANT_GAIN * f64::from(vert);
        }
    }
}

#[test]
fn yaw_step_rises_then_settles() {
    let mut l = Loop::new();
    l.run(-320.0, 0.0, 90);

    // Target on the left edge: yaw left, never reversing.
    assert!(l.yaw_log.iter().all(|&y| y <= 0), "{:?}", l.yaw_log);
    assert_eq!(l.yaw_log.last(), Some(&0));

    let rise = l.yaw.rise_time().unwrap();
    let settle = l.yaw.settling_time().unwrap();
    assert!(rise < settle, "rise {rise:?} settle {settle:?}");
    // First sample is the reference peak at target 0.
    assert_eq!(l.yaw.overshoot(), Some(0.0));

    let response = l.h.response_time().unwrap();
    assert!(response > Duration::ZERO && response < settle);
}

#[test]
fn vertical_step_decays_to_zero() {
    let mut l = Loop::new();
    l.run(0.0, 100.0, 90);

    // Target below centre: descend.
    assert!(l.vert_log[0] < 0);
    assert!(l.vert_log.iter().all(|&z| z <= 0), "{:?}", l.vert_log);
    assert_eq!(l.vert_log.last(), Some(&0));
    assert!(l.throttle.rise_time().is_some());
    assert!(l.throttle.is_settled());

    // No horizontal error: yaw stays zero and the h tracker responds at once.
    assert!(l.yaw_log.iter().all(|&y| y == 0));
    assert_eq!(l.h.response_time(), Some(Duration::ZERO));
}

#[test]
fn out_of_frame_errors_are_clipped() {
    let mut c = FuzzyController::default();
    assert_eq!(c.compute(-5000.0, 0.0), c.compute(-320.0, 0.0));
    assert_eq!(c.compute(0.0, 900.0), c.compute(0.0, 240.0));
}

#[test]
fn summary_lines_reflect_monitor_state() {
    let mut l = Loop::new();
    l.run(-320.0, 0.0, 90);

    let text = l.yaw.summary().to_string();
    assert!(text.starts_with("--- YAW RESPONSE METRICS ---"));
    assert!(!text.contains("N/A"), "{text}");
    assert!(text.contains("Overshoot     : 0.00 %"));

    let h_text = l.h.summary().to_string();
    assert!(h_text.contains("Response time : "));
    assert!(h_text.contains("(tol ±0.05)"), "{h_text}");
}
