//! Tolerance-based reward shaping.
//!
//! [`tolerance`] returns 1 when a quantity lies inside `bounds` and decays towards 0
//! outside of them. The decay is controlled by a [`Sigmoid`], the `margin` (distance at
//! which the sigmoid reaches `value_at_margin`) and `value_at_margin` itself. These four
//! options are exactly the ones held in each group of a reward-parameter tree.
use crate::{error::ParamError, param::ParamTree};
use serde::{Deserialize, Serialize};
use std::{f64::consts::PI, fmt, str::FromStr};

/// Value at the margin when a group does not set one.
pub const DEFAULT_VALUE_AT_MARGIN: f64 = 0.1;

/// Shape of the decay outside of the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sigmoid {
    /// `exp(-0.5 (x s)^2)`.
    Gaussian,
    /// `1 / cosh(x s)`.
    Hyperbolic,
    /// `1 / ((x s)^2 + 1)`.
    LongTail,
    /// `1 / (|x| s + 1)`.
    Reciprocal,
    /// `(1 + cos(pi x s)) / 2`, zero beyond `|x s| >= 1`.
    Cosine,
    /// `1 - x s`, zero beyond `|x s| >= 1`.
    Linear,
    /// `1 - (x s)^2`, zero beyond `|x s| >= 1`.
    Quadratic,
    /// `1 - tanh(x s)^2`.
    TanhSquared,
}

impl Sigmoid {
    /// Name used in parameter trees.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gaussian => "gaussian",
            Self::Hyperbolic => "hyperbolic",
            Self::LongTail => "long_tail",
            Self::Reciprocal => "reciprocal",
            Self::Cosine => "cosine",
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::TanhSquared => "tanh_squared",
        }
    }

    /// Sigmoids that reach exactly zero and therefore accept `value_at_margin == 0`.
    fn is_bounded(&self) -> bool {
        matches!(self, Self::Cosine | Self::Linear | Self::Quadratic)
    }

    /// Evaluates the sigmoid at normalized distance `x`, scaled so that the value at
    /// `x == 1` is `value_at_1`.
    pub fn eval(&self, x: f64, value_at_1: f64) -> Result<f64, ParamError> {
        let admissible = if self.is_bounded() {
            (0.0..1.0).contains(&value_at_1)
        } else {
            value_at_1 > 0.0 && value_at_1 < 1.0
        };
        if !admissible {
            let range = if self.is_bounded() { "[0, 1)" } else { "(0, 1)" };
            return Err(ParamError::InvalidParameterValue {
                key: "value_at_margin".to_string(),
                message: format!(
                    "{} must be in {} for the {} sigmoid",
                    value_at_1,
                    range,
                    self.as_str()
                ),
            });
        }

        let y = match self {
            Self::Gaussian => {
                let scale = (-2.0 * value_at_1.ln()).sqrt();
                (-0.5 * (x * scale).powi(2)).exp()
            }
            Self::Hyperbolic => {
                let scale = (1.0 / value_at_1).acosh();
                1.0 / (x * scale).cosh()
            }
            Self::LongTail => {
                let scale = (1.0 / value_at_1 - 1.0).sqrt();
                1.0 / ((x * scale).powi(2) + 1.0)
            }
            Self::Reciprocal => {
                let scale = 1.0 / value_at_1 - 1.0;
                1.0 / (x.abs() * scale + 1.0)
            }
            Self::Cosine => {
                let scale = (2.0 * value_at_1 - 1.0).acos() / PI;
                let scaled = x * scale;
                if scaled.abs() < 1.0 {
                    (1.0 + (PI * scaled).cos()) / 2.0
                } else {
                    0.0
                }
            }
            Self::Linear => {
                let scaled = x * (1.0 - value_at_1);
                if scaled.abs() < 1.0 {
                    1.0 - scaled
                } else {
                    0.0
                }
            }
            Self::Quadratic => {
                let scaled = x * (1.0 - value_at_1).sqrt();
                if scaled.abs() < 1.0 {
                    1.0 - scaled * scaled
                } else {
                    0.0
                }
            }
            Self::TanhSquared => {
                let scale = (1.0 - value_at_1).sqrt().atanh();
                1.0 - (x * scale).tanh().powi(2)
            }
        };
        Ok(y)
    }
}

impl FromStr for Sigmoid {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gaussian" => Ok(Self::Gaussian),
            "hyperbolic" => Ok(Self::Hyperbolic),
            "long_tail" => Ok(Self::LongTail),
            "reciprocal" => Ok(Self::Reciprocal),
            "cosine" => Ok(Self::Cosine),
            "linear" => Ok(Self::Linear),
            "quadratic" => Ok(Self::Quadratic),
            "tanh_squared" => Ok(Self::TanhSquared),
            _ => Err(ParamError::UnknownSigmoid(s.to_string())),
        }
    }
}

impl fmt::Display for Sigmoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed view of one group of a reward-parameter tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceParams {
    /// Interval in which the reward is 1.
    pub bounds: (f64, f64),

    /// Distance from the bounds at which the reward equals `value_at_margin`.
    pub margin: f64,

    /// Decay shape.
    pub sigmoid: Sigmoid,

    /// Reward at `margin` distance from the bounds.
    pub value_at_margin: f64,
}

impl Default for ToleranceParams {
    fn default() -> Self {
        Self {
            bounds: (0.0, 0.0),
            margin: 0.0,
            sigmoid: Sigmoid::Gaussian,
            value_at_margin: DEFAULT_VALUE_AT_MARGIN,
        }
    }
}

impl ToleranceParams {
    /// Sets the bounds.
    pub fn bounds(mut self, lower: f64, upper: f64) -> Self {
        self.bounds = (lower, upper);
        self
    }

    /// Sets the margin.
    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the sigmoid.
    pub fn sigmoid(mut self, sigmoid: Sigmoid) -> Self {
        self.sigmoid = sigmoid;
        self
    }

    /// Sets the value at the margin.
    pub fn value_at_margin(mut self, v: f64) -> Self {
        self.value_at_margin = v;
        self
    }

    /// Reads the options of `group` in `tree`.
    ///
    /// Options that are absent keep their [`Default`] value, so a wildcard override
    /// that only sets `sigmoid` and `margin` still resolves.
    pub fn from_group(tree: &ParamTree, group: &str) -> Result<Self, ParamError> {
        Self::from_options(tree.get_map(group)?)
    }

    /// Reads a single option mapping.
    pub fn from_options(options: &ParamTree) -> Result<Self, ParamError> {
        let mut params = Self::default();
        if options.contains_key("bounds") {
            match options.get_numbers("bounds")?.as_slice() {
                [lower, upper] => params.bounds = (*lower, *upper),
                other => {
                    return Err(ParamError::InvalidParameterValue {
                        key: "bounds".to_string(),
                        message: format!("expected 2 values, got {}", other.len()),
                    })
                }
            }
        }
        if options.contains_key("margin") {
            params.margin = options.get_number("margin")?;
        }
        if options.contains_key("sigmoid") {
            params.sigmoid = options.get_text("sigmoid")?.parse()?;
        }
        if options.contains_key("value_at_margin") {
            params.value_at_margin = options.get_number("value_at_margin")?;
        }
        Ok(params)
    }

    /// Converts back to an option mapping.
    pub fn to_options(&self) -> ParamTree {
        crate::param_tree! {
            "bounds" => vec![self.bounds.0, self.bounds.1],
            "margin" => self.margin,
            "sigmoid" => self.sigmoid.as_str(),
            "value_at_margin" => self.value_at_margin,
        }
    }
}

/// Returns 1 when `x` is within bounds, a sigmoid-shaped value in `[0, 1]` otherwise.
///
/// # Errors
///
/// If the lower bound exceeds the upper bound, the margin is negative, or
/// `value_at_margin` is outside the range admitted by the sigmoid.
pub fn tolerance(x: f64, params: &ToleranceParams) -> Result<f64, ParamError> {
    let (lower, upper) = params.bounds;
    if lower > upper {
        return Err(ParamError::InvalidParameterValue {
            key: "bounds".to_string(),
            message: "lower bound must be <= upper bound".to_string(),
        });
    }
    if params.margin < 0.0 {
        return Err(ParamError::InvalidParameterValue {
            key: "margin".to_string(),
            message: "margin must be non-negative".to_string(),
        });
    }

    let in_bounds = lower <= x && x <= upper;
    if params.margin == 0.0 {
        return Ok(if in_bounds { 1.0 } else { 0.0 });
    }
    // Validate value_at_margin even for in-bounds inputs.
    let d = (if x < lower { lower - x } else { x - upper }) / params.margin;
    let value = params.sigmoid.eval(d, params.value_at_margin)?;
    Ok(if in_bounds { 1.0 } else { value })
}

/// Applies [`tolerance`] to each element of `xs`.
pub fn tolerance_all(xs: &[f64], params: &ToleranceParams) -> Result<Vec<f64>, ParamError> {
    xs.iter().map(|&x| tolerance(x, params)).collect()
}

/// Minimum of [`tolerance`] over `xs`, 1 for an empty slice.
pub fn tolerance_min(xs: &[f64], params: &ToleranceParams) -> Result<f64, ParamError> {
    Ok(tolerance_all(xs, params)?
        .into_iter()
        .fold(1.0, f64::min))
}

/// Mean of [`tolerance`] over `xs`, 1 for an empty slice.
pub fn tolerance_mean(xs: &[f64], params: &ToleranceParams) -> Result<f64, ParamError> {
    if xs.is_empty() {
        return Ok(1.0);
    }
    let values = tolerance_all(xs, params)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param_tree;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_in_bounds_is_one() {
        let params = ToleranceParams::default().bounds(-1.0, 1.0).margin(1.0);
        assert_eq!(tolerance(0.5, &params), Ok(1.0));
        assert_eq!(tolerance(-1.0, &params), Ok(1.0));
    }

    #[test]
    fn test_zero_margin_is_indicator() {
        let params = ToleranceParams::default().bounds(0.6, 2.0);
        assert_eq!(tolerance(1.0, &params), Ok(1.0));
        assert_eq!(tolerance(0.59, &params), Ok(0.0));
        assert_eq!(tolerance(2.1, &params), Ok(0.0));
    }

    #[test]
    fn test_value_at_margin_is_reached() {
        for sigmoid in [
            Sigmoid::Gaussian,
            Sigmoid::Hyperbolic,
            Sigmoid::LongTail,
            Sigmoid::Reciprocal,
            Sigmoid::Cosine,
            Sigmoid::Linear,
            Sigmoid::Quadratic,
            Sigmoid::TanhSquared,
        ] {
            let params = ToleranceParams::default()
                .margin(2.0)
                .sigmoid(sigmoid)
                .value_at_margin(0.25);
            let y = tolerance(2.0, &params).unwrap();
            assert_abs_diff_eq!(y, 0.25, epsilon = 1e-9);
            let y = tolerance(-2.0, &params).unwrap();
            assert_abs_diff_eq!(y, 0.25, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_linear_reaches_zero() {
        let params = ToleranceParams::default()
            .bounds(10.0, f64::INFINITY)
            .margin(10.0)
            .sigmoid(Sigmoid::Linear)
            .value_at_margin(0.0);
        assert_abs_diff_eq!(tolerance(5.0, &params).unwrap(), 0.5, epsilon = 1e-12);
        assert_eq!(tolerance(0.0, &params), Ok(0.0));
        assert_eq!(tolerance(-3.0, &params), Ok(0.0));
        assert_eq!(tolerance(12.0, &params), Ok(1.0));
    }

    #[test]
    fn test_invalid_inputs() {
        let params = ToleranceParams::default().bounds(1.0, 0.0);
        assert!(tolerance(0.0, &params).is_err());

        let params = ToleranceParams::default().margin(-1.0);
        assert!(tolerance(0.0, &params).is_err());

        let params = ToleranceParams::default().margin(1.0).value_at_margin(0.0);
        assert!(matches!(
            tolerance(2.0, &params),
            Err(ParamError::InvalidParameterValue { .. })
        ));
        let params = params.sigmoid(Sigmoid::Quadratic);
        assert_eq!(tolerance(2.0, &params), Ok(0.0));
    }

    #[test]
    fn test_from_group_defaults_missing_options() {
        let tree = param_tree! {
            "speed" => param_tree! { "sigmoid" => "linear", "margin" => 10.0 },
        };
        let params = ToleranceParams::from_group(&tree, "speed").unwrap();
        assert_eq!(
            params,
            ToleranceParams::default()
                .sigmoid(Sigmoid::Linear)
                .margin(10.0)
        );
        assert_eq!(ToleranceParams::from_options(&params.to_options()), Ok(params));
    }

    #[test]
    fn test_from_group_errors() {
        let tree = param_tree! {
            "a" => param_tree! { "sigmoid" => "sawtooth" },
            "b" => param_tree! { "bounds" => vec![1.0] },
            "c" => 3.0,
        };
        assert_eq!(
            ToleranceParams::from_group(&tree, "a"),
            Err(ParamError::UnknownSigmoid("sawtooth".to_string()))
        );
        assert!(ToleranceParams::from_group(&tree, "b").is_err());
        assert_eq!(
            ToleranceParams::from_group(&tree, "c"),
            Err(ParamError::NotAMapping("c".to_string()))
        );
    }

    #[test]
    fn test_vector_helpers() {
        let params = ToleranceParams::default()
            .margin(1.0)
            .sigmoid(Sigmoid::Linear)
            .value_at_margin(0.0);
        let xs = [0.0, 0.5, 0.25];
        assert_abs_diff_eq!(tolerance_min(&xs, &params).unwrap(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(tolerance_mean(&xs, &params).unwrap(), 0.75, epsilon = 1e-12);
        assert_eq!(tolerance_min(&[], &params), Ok(1.0));
    }
}
