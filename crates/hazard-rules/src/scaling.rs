//! Scaling curves mapping an exposure value to an action magnitude

use serde::{Deserialize, Serialize};

/// Curve evaluated against the current exposure value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScalingCurve {
    Constant { value: f64 },
    /// `clamp((v - min) / (max - min), 0, 1)`, a step at `min` when the span is empty
    Linear01 { min: f64, max: f64 },
    Clamp { inner: Box<ScalingCurve>, min: f64, max: f64 },
    Power { inner: Box<ScalingCurve>, exponent: f64 },
}

impl Default for ScalingCurve {
    fn default() -> Self {
        ScalingCurve::Constant { value: 1.0 }
    }
}

impl ScalingCurve {
    pub fn eval(&self, v: f64) -> f64 {
        match self {
            ScalingCurve::Constant { value } => *value,
            ScalingCurve::Linear01 { min, max } => {
                let span = max - min;
                if span <= 0.0 {
                    return if v >= *min { 1.0 } else { 0.0 };
                }
                ((v - min) / span).clamp(0.0, 1.0)
            }
            ScalingCurve::Clamp { inner, min, max } => inner.eval(v).max(*min).min(*max),
            ScalingCurve::Power { inner, exponent } => inner.eval(v).powf(*exponent),
        }
    }
}
