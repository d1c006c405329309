use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use crate::engine::{AssignmentEngine, EngineError};
use crate::metrics::{record_answer_recorded, record_conflict, record_rejection, record_transition};
use crate::models::{
    Assignment, AssignmentView, AuthoringError, GradingResult, NewAssignment, QuestionVariant,
};
use crate::store::{AssignmentStore, StoreError};
use crate::utils::retry::{retry_async_with_config, RetryConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Authoring(#[from] AuthoringError),
}

impl ServiceError {
    fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Store(StoreError::Conflict(_)))
    }
}

/// Drives engine commands through one load -> apply -> save cycle against
/// the store. Only `Conflict` is retried; each retry reloads the snapshot.
pub struct AssignmentService {
    store: Arc<dyn AssignmentStore>,
    engine: AssignmentEngine,
    retry: RetryConfig,
}

impl AssignmentService {
    pub fn new(store: Arc<dyn AssignmentStore>, engine: AssignmentEngine, retry: RetryConfig) -> Self {
        Self {
            store,
            engine,
            retry,
        }
    }

    pub fn store(&self) -> &Arc<dyn AssignmentStore> {
        &self.store
    }

    pub async fn create(&self, draft: NewAssignment) -> Result<Assignment, ServiceError> {
        let assignment = Assignment::new(draft)?;
        self.store.insert(&assignment).await?;

        tracing::info!(
            "Assignment created: id={}, questions={}, due_at={}",
            assignment.id,
            assignment.questions.len(),
            assignment.due_at
        );
        Ok(assignment)
    }

    pub async fn get(&self, assignment_id: &str) -> Result<AssignmentView, ServiceError> {
        let assignment = self.store.load(assignment_id).await?;
        Ok(AssignmentView::derive(assignment, Utc::now()))
    }

    pub async fn record_answer(
        &self,
        assignment_id: &str,
        question_id: &str,
        value: &str,
    ) -> Result<Assignment, ServiceError> {
        tracing::info!(
            "Recording answer: assignment={}, question={}",
            assignment_id,
            question_id
        );

        let saved = self
            .apply(assignment_id, |engine, current| {
                engine.record_answer(current, question_id, value)
            })
            .await?;

        if let Some(variant) = answered_variant(&saved, question_id) {
            record_answer_recorded(variant);
        }
        Ok(saved)
    }

    pub async fn submit(&self, assignment_id: &str) -> Result<Assignment, ServiceError> {
        let saved = self
            .apply(assignment_id, |engine, current| {
                let mut next = engine.submit(current)?;
                next.submitted_at = Some(Utc::now());
                Ok(next)
            })
            .await?;

        record_transition(saved.status);
        tracing::info!(
            "Assignment submitted: id={}, answered={}/{}",
            saved.id,
            saved.answered_count(),
            saved.questions.len()
        );
        Ok(saved)
    }

    pub async fn grade(
        &self,
        assignment_id: &str,
        results: &[GradingResult],
    ) -> Result<Assignment, ServiceError> {
        let saved = self
            .apply(assignment_id, |engine, current| {
                let mut next = engine.grade(current, results)?;
                next.graded_at = Some(Utc::now());
                Ok(next)
            })
            .await?;

        record_transition(saved.status);
        for outcome in self.engine.outcomes(&saved, results) {
            tracing::debug!(
                "Graded question {}: correct={}, source={:?}",
                outcome.question_id,
                outcome.correct,
                outcome.source
            );
        }
        tracing::info!(
            "Assignment graded: id={}, score={:?}/{}",
            saved.id,
            saved.score,
            saved.questions.len()
        );
        Ok(saved)
    }

    async fn apply<C>(&self, assignment_id: &str, command: C) -> Result<Assignment, ServiceError>
    where
        C: Fn(&AssignmentEngine, &Assignment) -> Result<Assignment, EngineError>,
    {
        retry_async_with_config(self.retry.clone(), ServiceError::is_conflict, || async {
            let current = self.store.load(assignment_id).await?;

            let next = command(&self.engine, &current).map_err(|e| {
                record_rejection(&e);
                tracing::warn!("Command rejected for assignment {}: {}", assignment_id, e);
                e
            })?;

            self.store.save(&next).await.map_err(|e| {
                if let StoreError::Conflict(_) = e {
                    record_conflict();
                    tracing::warn!(
                        "Concurrent modification of assignment {}, reloading",
                        assignment_id
                    );
                }
                ServiceError::from(e)
            })
        })
        .await
    }
}

/// Variant of `question_id` when it now holds an answer; `None` after a clear.
fn answered_variant(saved: &Assignment, question_id: &str) -> Option<QuestionVariant> {
    saved.student_answer(question_id)?;
    saved.question(question_id).map(|q| q.variant())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{assignment_with, mc};
    use crate::engine::SubmissionPolicy;
    use crate::models::Question;

    #[test]
    fn cleared_answer_is_not_counted_as_recorded() {
        let engine = AssignmentEngine::new(SubmissionPolicy::default());
        let assignment = assignment_with(vec![mc("q1", 3, 0), Question::short_answer("q2", "Why?")]);

        let answered = engine.record_answer(&assignment, "q1", "b").unwrap();
        assert_eq!(
            answered_variant(&answered, "q1"),
            Some(QuestionVariant::MultipleChoice)
        );

        let cleared = engine.record_answer(&answered, "q1", "  ").unwrap();
        assert_eq!(answered_variant(&cleared, "q1"), None);
        assert_eq!(answered_variant(&cleared, "q2"), None);
    }
}
