use serde::{Deserialize, Serialize};

use super::error::EngineError;
use crate::models::{Assignment, AssignmentStatus, Question};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Unanswered,
    Answered,
}

/// Exact `answered / total` ratio; `0/0` reads as zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionRatio {
    pub answered: usize,
    pub total: usize,
}

impl CompletionRatio {
    pub fn as_f64(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.answered as f64 / self.total as f64
        }
    }

    pub fn percent(&self) -> f64 {
        self.as_f64() * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.answered == self.total
    }
}

/// Returns a copy of `assignment` with exactly one answer slot changed.
/// An empty value clears the slot.
pub fn record_answer(
    assignment: &Assignment,
    question_id: &str,
    value: &str,
) -> Result<Assignment, EngineError> {
    if assignment.status != AssignmentStatus::Assigned {
        return Err(EngineError::InvalidState {
            expected: AssignmentStatus::Assigned,
            actual: assignment.status,
        });
    }

    let question = assignment
        .question(question_id)
        .ok_or_else(|| EngineError::UnknownQuestion(question_id.to_string()))?;

    let normalized =
        question
            .normalize_answer(value)
            .map_err(|reason| EngineError::InvalidAnswerShape {
                question_id: question_id.to_string(),
                reason,
            })?;

    let mut next = assignment.clone();
    if normalized.trim().is_empty() {
        next.answers.remove(question_id);
    } else {
        next.answers.insert(question_id.to_string(), normalized);
    }
    Ok(next)
}

pub fn completion_ratio(assignment: &Assignment) -> CompletionRatio {
    CompletionRatio {
        answered: assignment.answered_count(),
        total: assignment.questions.len(),
    }
}

pub fn question_status(assignment: &Assignment, question: &Question) -> QuestionStatus {
    if assignment.student_answer(&question.id).is_some() {
        QuestionStatus::Answered
    } else {
        QuestionStatus::Unanswered
    }
}

pub fn status_of(assignment: &Assignment, question_id: &str) -> Result<QuestionStatus, EngineError> {
    let question = assignment
        .question(question_id)
        .ok_or_else(|| EngineError::UnknownQuestion(question_id.to_string()))?;
    Ok(question_status(assignment, question))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{assignment_with, mc};
    use crate::models::question::AnswerShapeError;
    use crate::models::Question;

    fn three_questions() -> Assignment {
        assignment_with(vec![
            mc("q1", 3, 0),
            Question::short_answer("q2", "Explain osmosis"),
            Question::diagram("q3", "Draw a neuron"),
        ])
    }

    #[test]
    fn first_answer_raises_ratio_by_one_share() {
        let a = three_questions();
        assert_eq!(completion_ratio(&a), CompletionRatio { answered: 0, total: 3 });

        let b = record_answer(&a, "q2", "Water moves across a membrane").unwrap();
        assert_eq!(completion_ratio(&b), CompletionRatio { answered: 1, total: 3 });
        assert!((completion_ratio(&b).as_f64() - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn repeating_identical_answer_is_idempotent() {
        let a = record_answer(&three_questions(), "q1", "B").unwrap();
        let b = record_answer(&a, "q1", "B").unwrap();
        assert_eq!(a, b);
        assert_eq!(completion_ratio(&b).answered, 1);
    }

    #[test]
    fn changes_only_the_addressed_slot() {
        let a = record_answer(&three_questions(), "q1", "c").unwrap();
        let b = record_answer(&a, "q3", "artifact-123").unwrap();
        assert_eq!(b.student_answer("q1"), Some("C"));
        assert_eq!(b.student_answer("q3"), Some("artifact-123"));
        assert_eq!(b.student_answer("q2"), None);
        assert_eq!(b.status, a.status);
        assert_eq!(b.questions, a.questions);
    }

    #[test]
    fn empty_value_clears_the_answer() {
        let a = record_answer(&three_questions(), "q2", "something").unwrap();
        let b = record_answer(&a, "q2", "").unwrap();
        assert_eq!(status_of(&b, "q2").unwrap(), QuestionStatus::Unanswered);
        assert_eq!(completion_ratio(&b).answered, 0);
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let a = three_questions();
        let err = record_answer(&a, "q1", "D").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAnswerShape {
                question_id: "q1".to_string(),
                reason: AnswerShapeError::ChoiceOutOfRange {
                    letter: 'D',
                    choices: 3
                },
            }
        );
        assert_eq!(a, three_questions());
    }

    #[test]
    fn unknown_question_is_rejected() {
        let err = record_answer(&three_questions(), "q9", "A").unwrap_err();
        assert_eq!(err, EngineError::UnknownQuestion("q9".to_string()));
        assert!(status_of(&three_questions(), "q9").is_err());
    }

    #[test]
    fn answers_are_frozen_after_submission() {
        let mut a = three_questions();
        a.status = AssignmentStatus::Submitted;
        let err = record_answer(&a, "q1", "A").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidState {
                expected: AssignmentStatus::Assigned,
                actual: AssignmentStatus::Submitted,
            }
        );
    }

    #[test]
    fn empty_assignment_has_zero_ratio() {
        let a = assignment_with(Vec::new());
        let ratio = completion_ratio(&a);
        assert_eq!(ratio.as_f64(), 0.0);
        assert!(!ratio.is_complete());
    }
}
