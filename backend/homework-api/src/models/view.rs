use chrono::{DateTime, Utc};
use serde::Serialize;

use super::assignment::{Assignment, AssignmentStatus};
use super::question::QuestionId;
use crate::engine::answer_capture::{self, CompletionRatio, QuestionStatus};

/// Assignment snapshot plus the values display collaborators derive from it.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub assignment: Assignment,
    pub completion: CompletionRatio,
    pub completion_percent: f64,
    pub question_statuses: Vec<QuestionStatusEntry>,
    pub is_overdue: bool,
    pub as_of: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionStatusEntry {
    pub question_id: QuestionId,
    pub status: QuestionStatus,
}

impl AssignmentView {
    pub fn derive(assignment: Assignment, now: DateTime<Utc>) -> Self {
        let completion = answer_capture::completion_ratio(&assignment);
        let question_statuses = assignment
            .questions
            .iter()
            .map(|q| QuestionStatusEntry {
                question_id: q.id.clone(),
                status: answer_capture::question_status(&assignment, q),
            })
            .collect();

        Self {
            is_overdue: assignment.is_overdue(now),
            completion_percent: completion.percent(),
            completion,
            question_statuses,
            assignment,
            as_of: now,
        }
    }

    pub fn status(&self) -> AssignmentStatus {
        self.assignment.status
    }
}
