//! Percentages that may have no meaning.

use serde::{Deserialize, Serialize};

/// A percentage that is undefined when its denominator is zero.
///
/// Serializes as `null` or a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    /// Denominator was zero
    NotApplicable,
    /// Value in `0.0..=100.0`
    Percent(f64),
}

impl Score {
    /// `numerator / denominator × 100`, or [`Score::NotApplicable`] for a zero denominator.
    pub fn ratio(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            Score::NotApplicable
        } else {
            Score::Percent(numerator as f64 / denominator as f64 * 100.0)
        }
    }

    /// The percentage, if defined.
    pub fn value(&self) -> Option<f64> {
        match self {
            Score::NotApplicable => None,
            Score::Percent(p) => Some(*p),
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Score::NotApplicable => write!(f, "N/A"),
            Score::Percent(p) => write!(f, "{:.1}%", p),
        }
    }
}

/// `numerator / denominator × 100`, or `0.0` for a zero denominator.
pub fn percent(numerator: usize, denominator: usize) -> f64 {
    Score::ratio(numerator, denominator).value().unwrap_or(0.0)
}
