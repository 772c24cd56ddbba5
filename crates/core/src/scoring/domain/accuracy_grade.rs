use crate::shared::constants::{DEFAULT_ACCURACY_THRESHOLD, DEFAULT_PERFECT_THRESHOLD};

/// Score cut-offs used to grade an attempt, both in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeThresholds {
    /// Minimum score for an attempt to count as correct.
    pub accuracy: f64,
    /// Minimum score for an attempt to count as perfect.
    pub perfect: f64,
}

impl GradeThresholds {
    pub fn new(accuracy: f64, perfect: f64) -> Self {
        Self { accuracy, perfect }
    }
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            accuracy: DEFAULT_ACCURACY_THRESHOLD,
            perfect: DEFAULT_PERFECT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccuracyGrade {
    Perfect,
    MinorErrors,
    Incorrect,
}

impl AccuracyGrade {
    pub fn classify(score: f64, thresholds: &GradeThresholds) -> Self {
        if score >= thresholds.perfect {
            AccuracyGrade::Perfect
        } else if score >= thresholds.accuracy {
            AccuracyGrade::MinorErrors
        } else {
            AccuracyGrade::Incorrect
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AccuracyGrade::Perfect => "✅",
            AccuracyGrade::MinorErrors => "🟡",
            AccuracyGrade::Incorrect => "❌",
        }
    }

    /// One-line feedback for a single attempt at `expected`.
    pub fn feedback(&self, score: f64, expected: &str) -> String {
        match self {
            AccuracyGrade::Perfect => format!("{self}! Score: {score:.2}%."),
            _ => format!("{self}. Score: {score:.2}%. (Expected: '{expected}')"),
        }
    }
}

impl std::fmt::Display for AccuracyGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccuracyGrade::Perfect => write!(f, "Perfect"),
            AccuracyGrade::MinorErrors => write!(f, "Correct"),
            AccuracyGrade::Incorrect => write!(f, "Incorrect"),
        }
    }
}
