use std::collections::HashSet;

use super::error::EngineError;
use super::scoring;
use crate::models::{Assignment, AssignmentStatus, GradingResult};

/// Gate applied on `assigned -> submitted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionPolicy {
    pub min_answers_to_submit: usize,
}

fn require_status(assignment: &Assignment, expected: AssignmentStatus) -> Result<(), EngineError> {
    if assignment.status == expected {
        Ok(())
    } else {
        Err(EngineError::InvalidState {
            expected,
            actual: assignment.status,
        })
    }
}

fn transition(assignment: &mut Assignment, next: AssignmentStatus) {
    debug_assert!(assignment.status.can_transition_to(next));
    tracing::debug!(
        "Assignment {} transition {} -> {}",
        assignment.id,
        assignment.status,
        next
    );
    assignment.status = next;
}

/// `assigned -> submitted`. Answers are frozen by virtue of the status;
/// nothing else changes.
pub fn submit(assignment: &Assignment, policy: &SubmissionPolicy) -> Result<Assignment, EngineError> {
    require_status(assignment, AssignmentStatus::Assigned)?;

    let answered = assignment.answered_count();
    if answered < policy.min_answers_to_submit {
        return Err(EngineError::InsufficientAnswers {
            required: policy.min_answers_to_submit,
            answered,
        });
    }

    let mut next = assignment.clone();
    transition(&mut next, AssignmentStatus::Submitted);
    Ok(next)
}

/// `submitted -> graded`. Feedback for every question and the score are
/// written together or not at all.
pub fn grade(assignment: &Assignment, results: &[GradingResult]) -> Result<Assignment, EngineError> {
    require_status(assignment, AssignmentStatus::Submitted)?;
    check_grading_set(assignment, results)?;

    let score = scoring::compute_score(&assignment.questions, &assignment.answers, results);

    let mut next = assignment.clone();
    next.feedback = results
        .iter()
        .map(|r| (r.question_id.clone(), r.feedback.clone()))
        .collect();
    next.score = Some(score);
    transition(&mut next, AssignmentStatus::Graded);
    Ok(next)
}

fn check_grading_set(assignment: &Assignment, results: &[GradingResult]) -> Result<(), EngineError> {
    if results.len() != assignment.questions.len() {
        return Err(EngineError::IncompleteGradingSet {
            reason: format!(
                "{} results for {} questions",
                results.len(),
                assignment.questions.len()
            ),
        });
    }

    let mut seen = HashSet::new();
    for result in results {
        if assignment.question(&result.question_id).is_none() {
            return Err(EngineError::IncompleteGradingSet {
                reason: format!("result for unknown question {}", result.question_id),
            });
        }
        if !seen.insert(result.question_id.as_str()) {
            return Err(EngineError::IncompleteGradingSet {
                reason: format!("duplicate result for question {}", result.question_id),
            });
        }
    }

    Ok(())
}
