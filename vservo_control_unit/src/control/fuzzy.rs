//! Fuzzy yaw/vertical controller facade.
//!
//! `compute(h_error_px, v_error_px) -> (yaw, vert)` in integer RC units.
//! Vertical deadband: `|v_error_px| < deadband` binds the vertical error to
//! exactly 0 and forces the vertical output to 0.

use vservo_common::consts::VERTICAL_DEADBAND_PX;
use vservo_common::tracker::config::ControllerConfig;
use vservo_common::tracker::fuzzy::FuzzyParameters;

use super::inference::{InferenceEngine, InferenceSession, Input};

/// Owned controller instance, one per session.
#[derive(Debug, Clone)]
pub struct FuzzyController {
    session: InferenceSession,
    deadband_px: f64,
}

impl FuzzyController {
    pub fn new(config: &ControllerConfig) -> Self {
        Self::from_parameters(&config.fuzzy, config.vertical_deadband_px)
    }

    pub fn from_parameters(params: &FuzzyParameters, deadband_px: f64) -> Self {
        Self {
            session: InferenceSession::new(InferenceEngine::new(params)),
            deadband_px,
        }
    }

    #[inline]
    pub fn deadband_px(&self) -> f64 {
        self.deadband_px
    }

    /// Map pixel error to `(yaw, vert)` actuator commands.
    ///
    /// Both inputs are rebound on every call, so results never depend on
    /// earlier calls. Outputs are truncated toward zero.
    pub fn compute(&mut self, h_error_px: f64, v_error_px: f64) -> (i32, i32) {
        self.session.bind(Input::ErrorX, h_error_px);

        if v_error_px.abs() < self.deadband_px {
            self.session.bind(Input::ErrorY, 0.0);
            let out = self.session.compute();
            return (truncate(out.yaw), 0);
        }

        self.session.bind(Input::ErrorY, v_error_px);
        let out = self.session.compute();
        (truncate(out.yaw), truncate(out.vert))
    }

    pub fn session(&self) -> &InferenceSession {
        &self.session
    }
}

impl Default for FuzzyController {
    fn default() -> Self {
        Self::from_parameters(&FuzzyParameters::default(), VERTICAL_DEADBAND_PX)
    }
}

#[inline]
fn truncate(value: f64) -> i32 {
    // `as` saturates and maps NaN to 0.
    value.trunc() as i32
}
