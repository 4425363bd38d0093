use serde::{Deserialize, Serialize};

/// Rubric weights applied to the component marks of an evaluation.
///
/// The weighted grade is `sum(mark * weight) / total()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationWeights {
    pub discipline_grade: u32,
    pub selection_grade: u32,
    pub academic_index: u32,
}

impl EvaluationWeights {
    pub const fn total(self) -> u32 {
        self.discipline_grade + self.selection_grade + self.academic_index
    }
}

impl Default for EvaluationWeights {
    fn default() -> Self {
        Self {
            discipline_grade: 5,
            selection_grade: 3,
            academic_index: 2,
        }
    }
}
