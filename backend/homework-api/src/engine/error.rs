use thiserror::Error;

use crate::models::question::{AnswerShapeError, QuestionId};
use crate::models::AssignmentStatus;

/// Rejections produced by the lifecycle engine. All of them leave the
/// input snapshot untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("assignment is {actual}, command requires {expected}")]
    InvalidState {
        expected: AssignmentStatus,
        actual: AssignmentStatus,
    },

    #[error("unknown question {0}")]
    UnknownQuestion(QuestionId),

    #[error("invalid answer for question {question_id}: {reason}")]
    InvalidAnswerShape {
        question_id: QuestionId,
        #[source]
        reason: AnswerShapeError,
    },

    #[error("incomplete grading set: {reason}")]
    IncompleteGradingSet { reason: String },

    #[error("{answered} answers recorded, at least {required} required to submit")]
    InsufficientAnswers { required: usize, answered: usize },
}

impl EngineError {
    /// Stable label for metrics and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidState { .. } => "invalid_state",
            EngineError::UnknownQuestion(_) => "unknown_question",
            EngineError::InvalidAnswerShape { .. } => "invalid_answer_shape",
            EngineError::IncompleteGradingSet { .. } => "incomplete_grading_set",
            EngineError::InsufficientAnswers { .. } => "insufficient_answers",
        }
    }
}
