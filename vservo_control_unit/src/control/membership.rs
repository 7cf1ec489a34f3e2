//! Membership model: Gaussian fuzzy sets over sampled linguistic variables.
//!
//! `μ(term, x)` is defined over all reals; the sampled universe is only used
//! for aggregation and centroid defuzzification of consequents.

use vservo_common::tracker::fuzzy::{GaussianParams, Term, VariableParams};

/// Gaussian membership function, pure in `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianMf {
    mean: f64,
    /// Precomputed `2·sigma²`.
    two_sigma_sq: f64,
}

impl GaussianMf {
    pub fn new(params: GaussianParams) -> Self {
        Self {
            mean: params.mean,
            two_sigma_sq: 2.0 * params.sigma * params.sigma,
        }
    }

    /// Degree of membership in [0, 1].
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        let d = x - self.mean;
        (-(d * d) / self.two_sigma_sq).exp()
    }
}

/// A linguistic variable: name, sampled universe and one set per [`Term`].
#[derive(Debug, Clone)]
pub struct LinguisticVariable {
    name: &'static str,
    universe: Vec<f64>,
    sets: [GaussianMf; 3],
    /// `sets[t]` sampled at every universe point.
    sampled: [Vec<f64>; 3],
}

impl LinguisticVariable {
    /// Build the variable from validated parameters.
    ///
    /// The universe includes both bounds when `max - min` is a multiple of `step`.
    pub fn new(name: &'static str, params: &VariableParams) -> Self {
        let universe = sample_universe(params.min, params.max, params.step);
        let sets = Term::ALL.map(|t| GaussianMf::new(params.terms.get(t)));
        let sampled = sets.map(|mf| universe.iter().map(|&x| mf.eval(x)).collect());
        Self {
            name,
            universe,
            sets,
            sampled,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn universe(&self) -> &[f64] {
        &self.universe
    }

    /// `(first, last)` universe sample.
    pub fn bounds(&self) -> (f64, f64) {
        match (self.universe.first(), self.universe.last()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => (0.0, 0.0),
        }
    }

    /// Clamp a crisp value into the sampled universe.
    #[inline]
    pub fn clip(&self, x: f64) -> f64 {
        let (lo, hi) = self.bounds();
        x.clamp(lo, hi)
    }

    /// `μ(term, x)`, evaluated directly (no interpolation).
    #[inline]
    pub fn membership(&self, term: Term, x: f64) -> f64 {
        self.sets[term.index()].eval(x)
    }

    /// Membership degree of `x` in each term, indexed by [`Term::index`].
    #[inline]
    pub fn fuzzify(&self, x: f64) -> [f64; 3] {
        self.sets.map(|mf| mf.eval(x))
    }

    /// Membership of `term` sampled over the universe.
    #[inline]
    pub fn sampled(&self, term: Term) -> &[f64] {
        &self.sampled[term.index()]
    }
}

fn sample_universe(min: f64, max: f64, step: f64) -> Vec<f64> {
    // Small epsilon keeps `max` when the span is an exact multiple of `step`.
    let n = ((max - min) / step + 1e-9).floor() as usize;
    (0..=n).map(|i| min + i as f64 * step).collect()
}
