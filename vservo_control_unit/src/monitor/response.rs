//! Step-response monitor: rise time, settling time and overshoot.
//!
//! Samples are timestamped relative to the first `update`. Metric rules:
//!
//! - **Rise time**: first elapsed time with `|v - target| <= rise_fraction * step`,
//!   where `step = |target|`, or the running max `|v|` when `target == 0`.
//!   The running max is re-read on every call until rise time is set.
//! - **Overshoot**: evaluated once, on the first update, from the sample with
//!   the largest `|v - target|` at that moment, and never revisited.
//!   [`ResponseMonitor::peak_overshoot`] reports the same formula against the
//!   running peak for diagnostics.
//! - **Settling time**: set when the current sample and the trailing
//!   `settle_window` samples all lie within `tol * ref` of target
//!   (`ref = |target|`, or `|peak|` when `target == 0`). Irreversible.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::trace;
use vservo_common::consts::{RESPONSE_TOL, RISE_FRACTION, SETTLE_WINDOW};
use vservo_common::tracker::config::MonitorConfig;

/// Accumulates a time-stamped scalar series and derives step metrics.
#[derive(Debug, Clone)]
pub struct ResponseMonitor {
    name: String,
    target: f64,
    tol: f64,
    rise_fraction: f64,
    settle_window: usize,

    start: Option<Instant>,
    times: Vec<Duration>,
    values: Vec<f64>,
    /// Running max of `|v|`, the step reference when `target == 0`.
    max_abs: f64,
    /// Sample with the largest `|v - target|`; earliest wins ties.
    peak: Option<f64>,

    rise_time: Option<Duration>,
    settling_time: Option<Duration>,
    overshoot: Option<f64>,
    settled: bool,
}

impl ResponseMonitor {
    /// Monitor with `target = 0` and default tolerances.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_target(name, 0.0, RESPONSE_TOL)
    }

    pub fn with_target(name: impl Into<String>, target: f64, tol: f64) -> Self {
        Self {
            name: name.into(),
            target,
            tol,
            rise_fraction: RISE_FRACTION,
            settle_window: SETTLE_WINDOW,
            start: None,
            times: Vec::new(),
            values: Vec::new(),
            max_abs: 0.0,
            peak: None,
            rise_time: None,
            settling_time: None,
            overshoot: None,
            settled: false,
        }
    }

    pub fn from_config(name: impl Into<String>, config: &MonitorConfig) -> Self {
        let mut monitor = Self::with_target(name, config.target, config.tol);
        monitor.rise_fraction = config.rise_fraction;
        monitor.settle_window = config.settle_window.max(1);
        monitor
    }

    /// Append one sample observed at `now`.
    ///
    /// Non-finite values are ignored.
    pub fn update(&mut self, value: f64, now: Instant) {
        if !value.is_finite() {
            trace!(monitor = %self.name, "ignoring non-finite sample");
            return;
        }

        let start = *self.start.get_or_insert(now);
        let t = now.saturating_duration_since(start);
        self.times.push(t);
        self.values.push(value);

        let err = (value - self.target).abs();
        self.max_abs = self.max_abs.max(value.abs());
        let peak = match self.peak {
            Some(p) if (p - self.target).abs() >= err => p,
            _ => value,
        };
        self.peak = Some(peak);

        // ── Rise time ──
        if self.rise_time.is_none() {
            let step = if self.target != 0.0 {
                self.target.abs()
            } else {
                self.max_abs
            };
            if err <= self.rise_fraction * step {
                self.rise_time = Some(t);
            }
        }

        // ── Overshoot (first update only) ──
        if self.overshoot.is_none() {
            self.overshoot = Some(overshoot_percent(peak, self.target));
        }

        // ── Settling time ──
        if !self.settled {
            let reference = if self.target != 0.0 {
                self.target.abs()
            } else {
                peak.abs()
            };
            let band = self.tol * reference;
            if err <= band && self.values.len() >= self.settle_window {
                let tail = &self.values[self.values.len() - self.settle_window..];
                if tail.iter().all(|v| (v - self.target).abs() <= band) {
                    self.settling_time = Some(t);
                    self.settled = true;
                }
            }
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn rise_time(&self) -> Option<Duration> {
        self.rise_time
    }

    #[inline]
    pub fn settling_time(&self) -> Option<Duration> {
        self.settling_time
    }

    /// Overshoot [%] as fixed on the first update.
    #[inline]
    pub fn overshoot(&self) -> Option<f64> {
        self.overshoot
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Overshoot [%] against the running peak (not part of the summary).
    pub fn peak_overshoot(&self) -> Option<f64> {
        self.peak.map(|p| overshoot_percent(p, self.target))
    }

    /// Elapsed time of the last sample.
    pub fn duration(&self) -> Option<Duration> {
        self.times.last().copied()
    }

    /// Recorded `(elapsed, value)` pairs in arrival order.
    pub fn samples(&self) -> impl Iterator<Item = (Duration, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Read-only snapshot of the current metrics.
    pub fn summary(&self) -> ResponseSummary {
        ResponseSummary {
            name: self.name.clone(),
            rise_time: self.rise_time,
            settling_time: self.settling_time,
            overshoot: self.overshoot,
            duration: self.duration(),
            samples: self.values.len(),
        }
    }
}

/// `(|peak - target| - |target or peak|) / (|target| or |peak|) * 100`.
///
/// With `target == 0` both terms use `|peak|`; a zero denominator yields 0.
fn overshoot_percent(peak: f64, target: f64) -> f64 {
    let reference = if target != 0.0 { target.abs() } else { peak.abs() };
    if reference == 0.0 {
        return 0.0;
    }
    ((peak - target).abs() - reference) / reference * 100.0
}

/// Snapshot of a [`ResponseMonitor`]'s metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSummary {
    pub name: String,
    pub rise_time: Option<Duration>,
    pub settling_time: Option<Duration>,
    pub overshoot: Option<f64>,
    pub duration: Option<Duration>,
    pub samples: usize,
}

impl fmt::Display for ResponseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} RESPONSE METRICS ---", self.name.to_uppercase())?;
        match self.rise_time {
            Some(t) => writeln!(f, "Rise time     : {:.3} s", t.as_secs_f64())?,
            None => writeln!(f, "Rise time     : N/A")?,
        }
        match self.settling_time {
            Some(t) => writeln!(f, "Settling time : {:.3} s", t.as_secs_f64())?,
            None => writeln!(f, "Settling time : N/A")?,
        }
        match self.overshoot {
            Some(o) => writeln!(f, "Overshoot     : {o:.2} %")?,
            None => writeln!(f, "Overshoot     : N/A")?,
        }
        match self.duration {
            Some(t) => write!(f, "Duration      : {:.2} s", t.as_secs_f64()),
            None => write!(f, "Duration      : N/A"),
        }
    }
}
