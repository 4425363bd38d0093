use super::super::domain::ScoreBreakdown;
use super::config::EvaluationWeights;

pub const GRADE_SCALE_MAX: f64 = 10.0;

/// A grade is usable when it is a real number on the 0..=10 scale.
pub fn grade_in_scale(value: f64) -> bool {
    value.is_finite() && (0.0..=GRADE_SCALE_MAX).contains(&value)
}

/// Collapse component marks into one grade, rounded to two decimals.
pub fn weighted_final(scores: &ScoreBreakdown, weights: &EvaluationWeights) -> f64 {
    let weighted = scores.discipline_grade * f64::from(weights.discipline_grade)
        + scores.selection_grade * f64::from(weights.selection_grade)
        + scores.academic_index * f64::from(weights.academic_index);
    round_hundredths(weighted / f64::from(weights.total()))
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
