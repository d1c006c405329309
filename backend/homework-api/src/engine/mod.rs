//! Assignment lifecycle engine.
//!
//! Every command is a pure function of the snapshot it is given and returns
//! either the next snapshot or an [`EngineError`]. Persisting the result is
//! up to the caller (see `services::assignment_service`).

pub mod answer_capture;
pub mod error;
pub mod lifecycle;
pub mod scoring;

pub use answer_capture::{CompletionRatio, QuestionStatus};
pub use error::EngineError;
pub use lifecycle::SubmissionPolicy;

use crate::models::{Assignment, GradingResult, QuestionOutcome};

#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentEngine {
    policy: SubmissionPolicy,
}

impl AssignmentEngine {
    pub fn new(policy: SubmissionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SubmissionPolicy {
        &self.policy
    }

    pub fn record_answer(
        &self,
        assignment: &Assignment,
        question_id: &str,
        value: &str,
    ) -> Result<Assignment, EngineError> {
        answer_capture::record_answer(assignment, question_id, value)
    }

    pub fn submit(&self, assignment: &Assignment) -> Result<Assignment, EngineError> {
        lifecycle::submit(assignment, &self.policy)
    }

    pub fn grade(
        &self,
        assignment: &Assignment,
        results: &[GradingResult],
    ) -> Result<Assignment, EngineError> {
        lifecycle::grade(assignment, results)
    }

    /// Per-question verdicts for a graded (or about to be graded) snapshot.
    pub fn outcomes(&self, assignment: &Assignment, results: &[GradingResult]) -> Vec<QuestionOutcome> {
        scoring::judge(&assignment.questions, &assignment.answers, results)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{assignment_with, mc};
    use super::*;
    use crate::models::{AssignmentStatus, CorrectnessSource, Question};
    use chrono::{Duration, Utc};

    #[test]
    fn overdue_scenario_walks_the_lifecycle() {
        let engine = AssignmentEngine::default();
        let mut a = assignment_with(vec![
            mc("q1", 4, 1),
            Question::short_answer("q2", "Define momentum"),
            Question::document_reference("q3", "Quote the definition", Some(12)),
        ]);
        a.due_at = Utc::now() - Duration::days(1);

        assert!(a.is_overdue(Utc::now()));
        assert_eq!(answer_capture::completion_ratio(&a).answered, 0);

        let a = engine.record_answer(&a, "q1", "B").unwrap();
        assert_eq!(
            answer_capture::completion_ratio(&a),
            CompletionRatio {
                answered: 1,
                total: 3
            }
        );

        let a = engine.submit(&a).unwrap();
        assert_eq!(a.status, AssignmentStatus::Submitted);
        assert!(!a.is_overdue(Utc::now()));
        assert!(matches!(
            engine.record_answer(&a, "q2", "p = mv"),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn mixed_assignment_scores_two() {
        let engine = AssignmentEngine::default();
        let a = assignment_with(vec![
            mc("q1", 3, 0),
            mc("q2", 3, 0),
            Question::short_answer("q3", "Explain"),
        ]);
        let a = engine.record_answer(&a, "q1", "A").unwrap();
        let a = engine.record_answer(&a, "q2", "B").unwrap();
        let a = engine.record_answer(&a, "q3", "Because of friction").unwrap();
        let a = engine.submit(&a).unwrap();

        let results = vec![
            GradingResult::new("q1", "Right", None),
            GradingResult::new("q2", "Try again", None),
            GradingResult::new("q3", "Well argued", Some(true)),
        ];
        let graded = engine.grade(&a, &results).unwrap();
        assert_eq!(graded.score, Some(2));

        let outcomes = engine.outcomes(&graded, &results);
        assert_eq!(outcomes[0].source, CorrectnessSource::Engine);
        assert_eq!(outcomes[2].source, CorrectnessSource::Grader);
    }

    #[test]
    fn engine_uses_configured_policy() {
        let engine = AssignmentEngine::new(SubmissionPolicy {
            min_answers_to_submit: 1,
        });
        let a = assignment_with(vec![mc("q1", 2, 0)]);
        assert!(matches!(
            engine.submit(&a),
            Err(EngineError::InsufficientAnswers { .. })
        ));
        assert_eq!(engine.policy().min_answers_to_submit, 1);
    }
}
