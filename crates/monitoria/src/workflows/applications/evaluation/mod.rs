//! Grading rubric shared by the single-grade and component evaluation paths.

mod config;
mod rules;

pub use config::EvaluationWeights;
pub use rules::{grade_in_scale, weighted_final, GRADE_SCALE_MAX};
