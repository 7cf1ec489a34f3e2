//! Mamdani inference over the fixed six-rule base.
//!
//! Pipeline per consequent: fuzzify antecedents → rule firing strength
//! (single antecedent, no conjunction) → min-implication clip of the
//! consequent set → max aggregation → centroid defuzzification.
//!
//! The engine is immutable after construction; [`InferenceSession`] adds the
//! bound-input context used by the controller facade.

use vservo_common::tracker::fuzzy::{FuzzyParameters, Term};

use super::membership::LinguisticVariable;

/// Antecedent (input) variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Horizontal pixel error.
    ErrorX,
    /// Vertical pixel error, positive when the target is below centre.
    ErrorY,
}

/// Consequent (output) variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Yaw,
    Vert,
}

/// `IF input IS when THEN output IS then`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub input: Input,
    pub when: Term,
    pub output: Output,
    pub then: Term,
}

impl Rule {
    const fn new(input: Input, when: Term, output: Output, then: Term) -> Self {
        Self {
            input,
            when,
            output,
            then,
        }
    }
}

/// The rule base. Vertical rules are inverted: a target below centre
/// (positive pixel error) commands a negative vertical rate and vice versa.
pub const RULES: [Rule; 6] = [
    Rule::new(Input::ErrorX, Term::Neg, Output::Yaw, Term::Neg),
    Rule::new(Input::ErrorX, Term::Zero, Output::Yaw, Term::Zero),
    Rule::new(Input::ErrorX, Term::Pos, Output::Yaw, Term::Pos),
    Rule::new(Input::ErrorY, Term::Neg, Output::Vert, Term::Pos),
    Rule::new(Input::ErrorY, Term::Zero, Output::Vert, Term::Zero),
    Rule::new(Input::ErrorY, Term::Pos, Output::Vert, Term::Neg),
];

/// Crisp antecedent values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Inputs {
    pub error_x: f64,
    pub error_y: f64,
}

/// Crisp (defuzzified, not yet truncated) consequent values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Outputs {
    pub yaw: f64,
    pub vert: f64,
}

/// Immutable fuzzy system: four variables plus [`RULES`].
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    error_x: LinguisticVariable,
    error_y: LinguisticVariable,
    yaw: LinguisticVariable,
    vert: LinguisticVariable,
}

impl InferenceEngine {
    pub fn new(params: &FuzzyParameters) -> Self {
        Self {
            error_x: LinguisticVariable::new("error_x", &params.error_x),
            error_y: LinguisticVariable::new("error_y", &params.error_y),
            yaw: LinguisticVariable::new("yaw", &params.yaw),
            vert: LinguisticVariable::new("vert", &params.vert),
        }
    }

    pub fn input(&self, input: Input) -> &LinguisticVariable {
        match input {
            Input::ErrorX => &self.error_x,
            Input::ErrorY => &self.error_y,
        }
    }

    pub fn output(&self, output: Output) -> &LinguisticVariable {
        match output {
            Output::Yaw => &self.yaw,
            Output::Vert => &self.vert,
        }
    }

    /// Per-term activation of one consequent, indexed by [`Term::index`].
    ///
    /// Inputs are clipped to their universes before fuzzification.
    pub fn activations(&self, inputs: &Inputs, output: Output) -> [f64; 3] {
        let mu_x = self.error_x.fuzzify(self.error_x.clip(inputs.error_x));
        let mu_y = self.error_y.fuzzify(self.error_y.clip(inputs.error_y));

        let mut act = [0.0f64; 3];
        for rule in RULES.iter().filter(|r| r.output == output) {
            let strength = match rule.input {
                Input::ErrorX => mu_x[rule.when.index()],
                Input::ErrorY => mu_y[rule.when.index()],
            };
            let slot = &mut act[rule.then.index()];
            *slot = slot.max(strength);
        }
        act
    }

    /// Evaluate both consequents. Pure: same inputs, same outputs.
    pub fn evaluate(&self, inputs: &Inputs) -> Outputs {
        Outputs {
            yaw: self.defuzzify(inputs, Output::Yaw),
            vert: self.defuzzify(inputs, Output::Vert),
        }
    }

    /// Centroid of the aggregated output set; 0 when the set is empty.
    pub fn defuzzify(&self, inputs: &Inputs, output: Output) -> f64 {
        let act = self.activations(inputs, output);
        let var = self.output(output);
        let sets = Term::ALL.map(|t| var.sampled(t));

        centroid(var.universe(), |i| {
            Term::ALL
                .iter()
                .map(|t| act[t.index()].min(sets[t.index()][i]))
                .fold(0.0, f64::max)
        })
    }
}

/// Centre of gravity of a sampled membership curve.
///
/// Integrates piecewise-linearly between samples (exact trapezoid moments).
/// Returns 0 when the total area is zero.
pub fn centroid(xs: &[f64], mu: impl Fn(usize) -> f64) -> f64 {
    match xs.len() {
        0 => return 0.0,
        1 => return if mu(0) > 0.0 { xs[0] } else { 0.0 },
        _ => {}
    }

    let mut sum_moment = 0.0;
    let mut sum_area = 0.0;
    let mut y1 = mu(0);
    for i in 1..xs.len() {
        let (x1, x2) = (xs[i - 1], xs[i]);
        let y2 = mu(i);
        if !(y1 == 0.0 && y2 == 0.0) && x1 != x2 {
            let w = x2 - x1;
            let (moment, area) = if y1 == y2 {
                (0.5 * (x1 + x2), w * y1)
            } else if y1 == 0.0 {
                (x1 + 2.0 / 3.0 * w, 0.5 * w * y2)
            } else if y2 == 0.0 {
                (x1 + 1.0 / 3.0 * w, 0.5 * w * y1)
            } else {
                (
                    x1 + (2.0 / 3.0 * w * (y2 + 0.5 * y1)) / (y1 + y2),
                    0.5 * w * (y1 + y2),
                )
            };
            sum_moment += moment * area;
            sum_area += area;
        }
        y1 = y2;
    }

    if sum_area > 0.0 {
        sum_moment / sum_area
    } else {
        0.0
    }
}

/// Mutable evaluation context: the last bound crisp inputs plus the engine.
#[derive(Debug, Clone)]
pub struct InferenceSession {
    engine: InferenceEngine,
    bound: Inputs,
}

impl InferenceSession {
    pub fn new(engine: InferenceEngine) -> Self {
        Self {
            engine,
            bound: Inputs::default(),
        }
    }

    /// Bind one antecedent; non-finite values bind as 0.
    pub fn bind(&mut self, input: Input, value: f64) {
        let value = if value.is_finite() { value } else { 0.0 };
        match input {
            Input::ErrorX => self.bound.error_x = value,
            Input::ErrorY => self.bound.error_y = value,
        }
    }

    /// Currently bound inputs.
    #[inline]
    pub fn bound(&self) -> Inputs {
        self.bound
    }

    /// Evaluate both consequents at the bound inputs.
    pub fn compute(&self) -> Outputs {
        self.engine.evaluate(&self.bound)
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }
}
