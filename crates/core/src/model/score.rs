use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("quiz score must be between 0 and 100, got {0}")]
pub struct ScoreError(pub i64);

/// Percentage score of a quiz attempt, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct QuizScore(u8);

impl QuizScore {
    pub const MIN: QuizScore = QuizScore(0);
    pub const MAX: QuizScore = QuizScore(100);

    /// Creates a score from a percentage.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError` if the value is above 100.
    pub fn new(percent: u8) -> Result<Self, ScoreError> {
        if percent > 100 {
            return Err(ScoreError(i64::from(percent)));
        }
        Ok(Self(percent))
    }

    /// Score for `correct` out of `total`, rounded half away from zero.
    ///
    /// Returns `None` when `total` is zero or `correct > total`.
    #[must_use]
    pub fn from_ratio(correct: usize, total: usize) -> Option<Self> {
        if total == 0 || correct > total {
            return None;
        }
        let percent = round_percent(correct as u128, total as u128);
        u8::try_from(percent).ok().map(Self)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Feedback band shown with a finished quiz.
    #[must_use]
    pub fn tier(self) -> ResultTier {
        ResultTier::for_score(self)
    }
}

impl TryFrom<i64> for QuizScore {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(ScoreError(value))
    }
}

impl From<QuizScore> for u8 {
    fn from(value: QuizScore) -> Self {
        value.0
    }
}

impl fmt::Display for QuizScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// `round(numerator / denominator * 100)` with ties rounded up.
///
/// Inputs are non-negative, so rounding up on ties is rounding half away
/// from zero. Callers guarantee `denominator > 0`.
#[must_use]
pub fn round_percent(numerator: u128, denominator: u128) -> u128 {
    (numerator * 200 + denominator) / (denominator * 2)
}

/// Feedback band for a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultTier {
    /// 70 and above.
    Excellent,
    /// 50 to 69.
    Good,
    KeepLearning,
}

impl ResultTier {
    #[must_use]
    pub fn for_score(score: QuizScore) -> Self {
        match score.value() {
            70.. => Self::Excellent,
            50..=69 => Self::Good,
            _ => Self::KeepLearning,
        }
    }

    #[must_use]
    pub fn headline(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent Work!",
            Self::Good => "Good Job!",
            Self::KeepLearning => "Keep Learning!",
        }
    }
}
