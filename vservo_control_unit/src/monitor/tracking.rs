//! First-entry-into-band timer for a normalized tracking error.

use std::fmt;
use std::time::{Duration, Instant};

use vservo_common::consts::TRACKING_TOL;

/// Records the first time `|value| <= tol`, measured from the first update.
#[derive(Debug, Clone)]
pub struct TrackingResponse {
    name: String,
    tol: f64,
    start: Option<Instant>,
    response_time: Option<Duration>,
}

impl TrackingResponse {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_tol(name, TRACKING_TOL)
    }

    pub fn with_tol(name: impl Into<String>, tol: f64) -> Self {
        Self {
            name: name.into(),
            tol,
            start: None,
            response_time: None,
        }
    }

    pub fn update(&mut self, value: f64, now: Instant) {
        let start = *self.start.get_or_insert(now);
        if self.response_time.is_none() && value.abs() <= self.tol {
            self.response_time = Some(now.saturating_duration_since(start));
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tol(&self) -> f64 {
        self.tol
    }

    #[inline]
    pub fn response_time(&self) -> Option<Duration> {
        self.response_time
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.response_time.is_some()
    }

    pub fn summary(&self) -> TrackingSummary {
        TrackingSummary {
            name: self.name.clone(),
            tol: self.tol,
            response_time: self.response_time,
        }
    }
}

/// Snapshot of a [`TrackingResponse`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSummary {
    pub name: String,
    pub tol: f64,
    pub response_time: Option<Duration>,
}

impl fmt::Display for TrackingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} TRACKING RESPONSE ---", self.name.to_uppercase())?;
        match self.response_time {
            Some(t) => write!(
                f,
                "Response time : {:.3} s (tol ±{})",
                t.as_secs_f64(),
                self.tol
            ),
            None => write!(
                f,
                "Response time : N/A (target never within tol ±{})",
                self.tol
            ),
        }
    }
}
