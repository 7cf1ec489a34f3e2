//! Fuzzy set parameters for the yaw/vertical controller.
//!
//! Pure data: Gaussian membership parameters per linguistic term and the
//! sampled universe of each variable. Evaluation lives in the control unit.
//! [`FuzzyParameters::default`] reproduces the tuned flight sets.

use serde::{Deserialize, Serialize};

/// Linguistic term label shared by all four variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    Neg,
    Zero,
    Pos,
}

impl Term {
    /// All labels in universe order.
    pub const ALL: [Term; 3] = [Term::Neg, Term::Zero, Term::Pos];

    /// Index into per-term arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Term::Neg => 0,
            Term::Zero => 1,
            Term::Pos => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Term::Neg => "neg",
            Term::Zero => "zero",
            Term::Pos => "pos",
        }
    }
}

/// Gaussian membership function `exp(-(x - mean)² / (2·sigma²))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianParams {
    pub mean: f64,
    pub sigma: f64,
}

impl GaussianParams {
    pub const fn new(mean: f64, sigma: f64) -> Self {
        Self { mean, sigma }
    }
}

/// One Gaussian per term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermSetParams {
    pub neg: GaussianParams,
    pub zero: GaussianParams,
    pub pos: GaussianParams,
}

impl TermSetParams {
    /// Parameters for a given label.
    #[inline]
    pub const fn get(&self, term: Term) -> GaussianParams {
        match term {
            Term::Neg => self.neg,
            Term::Zero => self.zero,
            Term::Pos => self.pos,
        }
    }
}

/// A linguistic variable: inclusive universe `[min, max]` sampled every `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableParams {
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    pub terms: TermSetParams,
}

fn default_step() -> f64 {
    1.0
}

impl VariableParams {
    /// Symmetric integer universe `[-half_range, half_range]` with unit step.
    pub fn symmetric(
        half_range: f64,
        neg: GaussianParams,
        zero: GaussianParams,
        pos: GaussianParams,
    ) -> Self {
        Self {
            min: -half_range,
            max: half_range,
            step: 1.0,
            terms: TermSetParams { neg, zero, pos },
        }
    }

    /// Validate universe bounds and membership widths.
    pub fn validate(&self, name: &str) -> Result<(), String> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min >= self.max {
            return Err(format!(
                "{name}: universe [{}, {}] must be finite with min < max",
                self.min, self.max
            ));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(format!("{name}: step {} must be > 0", self.step));
        }
        if self.step > self.max - self.min {
            return Err(format!(
                "{name}: step {} larger than universe span {}",
                self.step,
                self.max - self.min
            ));
        }
        for term in Term::ALL {
            let g = self.terms.get(term);
            if !(g.sigma.is_finite() && g.sigma > 0.0) {
                return Err(format!(
                    "{name}.{}: sigma {} must be > 0",
                    term.as_str(),
                    g.sigma
                ));
            }
            if !g.mean.is_finite() {
                return Err(format!("{name}.{}: mean must be finite", term.as_str()));
            }
        }
        Ok(())
    }
}

/// Complete parameter set for the two-input, two-output controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyParameters {
    /// Horizontal pixel error (antecedent).
    pub error_x: VariableParams,
    /// Vertical pixel error (antecedent).
    pub error_y: VariableParams,
    /// Yaw rate command (consequent).
    pub yaw: VariableParams,
    /// Vertical rate command (consequent).
    pub vert: VariableParams,
}

impl Default for FuzzyParameters {
    fn default() -> Self {
        use GaussianParams as G;
        Self {
            error_x: VariableParams::symmetric(320.0, G::new(-160.0, 80.0), G::new(0.0, 30.0), G::new(160.0, 80.0)),
            error_y: VariableParams::symmetric(240.0, G::new(-120.0, 60.0), G::new(0.0, 30.0), G::new(120.0, 60.0)),
            yaw: VariableParams::symmetric(100.0, G::new(-60.0, 25.0), G::new(0.0, 10.0), G::new(60.0, 25.0)),
            vert: VariableParams::symmetric(40.0, G::new(-35.0, 15.0), G::new(0.0, 20.0), G::new(35.0, 15.0)),
        }
    }
}

impl FuzzyParameters {
    pub fn validate(&self) -> Result<(), String> {
        self.error_x.validate("error_x")?;
        self.error_y.validate("error_y")?;
        self.yaw.validate("yaw")?;
        self.vert.validate("vert")?;
        Ok(())
    }
}
