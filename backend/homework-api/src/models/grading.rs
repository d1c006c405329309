use serde::{Deserialize, Serialize};

use super::question::QuestionId;

/// One entry of the grader's payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradingResult {
    pub question_id: QuestionId,
    pub feedback: String,
    /// Ignored for multiple choice questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

impl GradingResult {
    pub fn new(question_id: impl Into<QuestionId>, feedback: impl Into<String>, correct: Option<bool>) -> Self {
        Self {
            question_id: question_id.into(),
            feedback: feedback.into(),
            correct,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub results: Vec<GradingResult>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CorrectnessSource {
    /// Derived from the model (multiple choice)
    Engine,
    /// Taken from the grader's `correct` flag
    Grader,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub correct: bool,
    pub source: CorrectnessSource,
}
