use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::question::{Question, QuestionId, QuestionKind, MAX_CHOICES};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Submitted,
    Graded,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Graded => "graded",
        }
    }

    /// Forward-only lifecycle: assigned -> submitted -> graded.
    pub fn can_transition_to(&self, next: AssignmentStatus) -> bool {
        matches!(
            (self, next),
            (AssignmentStatus::Assigned, AssignmentStatus::Submitted)
                | (AssignmentStatus::Submitted, AssignmentStatus::Graded)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AssignmentStatus::Graded)
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "assigned" => Ok(AssignmentStatus::Assigned),
            "submitted" => Ok(AssignmentStatus::Submitted),
            "graded" => Ok(AssignmentStatus::Graded),
            _ => Err(format!("Invalid assignment status: {}", value)),
        }
    }
}

/// Snapshot of one homework assignment.
///
/// `answers` and `feedback` are keyed by question id. `version` belongs to
/// the store and is never changed by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub due_at: DateTime<Utc>,
    pub status: AssignmentStatus,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: BTreeMap<QuestionId, String>,
    #[serde(default)]
    pub feedback: BTreeMap<QuestionId, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_document_ref: Option<String>,
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<DateTime<Utc>>,
}

/// Request to author a new assignment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAssignment {
    /// Optional id; a UUID is generated when absent
    #[serde(default)]
    pub id: Option<String>,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[validate(length(min = 1, max = 100, message = "Subject must not be empty"))]
    pub subject: String,

    pub due_at: DateTime<Utc>,

    #[validate(length(min = 1, message = "Assignment needs at least one question"))]
    pub questions: Vec<Question>,

    #[serde(default)]
    pub reference_document_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthoringError {
    #[error("question id must not be empty")]
    EmptyQuestionId,
    #[error("duplicate question id {0}")]
    DuplicateQuestionId(QuestionId),
    #[error("question {question_id} has {count} choices, expected 1..={max}", max = MAX_CHOICES)]
    ChoiceCount { question_id: QuestionId, count: usize },
    #[error("question {question_id}: correct choice {index} is outside {choices} choices")]
    CorrectChoiceOutOfRange {
        question_id: QuestionId,
        index: usize,
        choices: usize,
    },
}

impl Assignment {
    /// Builds a fresh `assigned` snapshot with no answers.
    pub fn new(draft: NewAssignment) -> Result<Self, AuthoringError> {
        validate_questions(&draft.questions)?;

        Ok(Self {
            id: draft.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: draft.title,
            description: draft.description,
            subject: draft.subject,
            due_at: draft.due_at,
            status: AssignmentStatus::Assigned,
            questions: draft.questions,
            answers: BTreeMap::new(),
            feedback: BTreeMap::new(),
            score: None,
            reference_document_ref: draft.reference_document_ref,
            version: 0,
            submitted_at: None,
            graded_at: None,
        })
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Recorded answer, `None` when the question is unanswered.
    pub fn student_answer(&self, question_id: &str) -> Option<&str> {
        self.answers
            .get(question_id)
            .map(String::as_str)
            .filter(|answer| !answer.trim().is_empty())
    }

    pub fn feedback_for(&self, question_id: &str) -> Option<&str> {
        self.feedback.get(question_id).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.student_answer(&q.id).is_some())
            .count()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.due_at && self.status == AssignmentStatus::Assigned
    }

    /// Sanity check for records coming back from persistent storage.
    pub fn check_consistency(&self) -> Result<(), String> {
        validate_questions(&self.questions).map_err(|e| e.to_string())?;

        match (self.status, self.score) {
            (AssignmentStatus::Graded, None) => {
                return Err("graded assignment has no score".to_string())
            }
            (AssignmentStatus::Assigned | AssignmentStatus::Submitted, Some(_)) => {
                return Err(format!("{} assignment carries a score", self.status))
            }
            (AssignmentStatus::Graded, Some(score)) if score as usize > self.questions.len() => {
                return Err(format!(
                    "score {} exceeds {} questions",
                    score,
                    self.questions.len()
                ))
            }
            _ => {}
        }

        if self.status != AssignmentStatus::Graded && !self.feedback.is_empty() {
            return Err(format!("{} assignment carries feedback", self.status));
        }

        let known: HashSet<&str> = self.questions.iter().map(|q| q.id.as_str()).collect();
        if let Some(stray) = self
            .answers
            .keys()
            .chain(self.feedback.keys())
            .find(|id| !known.contains(id.as_str()))
        {
            return Err(format!("entry for unknown question {}", stray));
        }

        Ok(())
    }
}

fn validate_questions(questions: &[Question]) -> Result<(), AuthoringError> {
    let mut seen = HashSet::new();
    for question in questions {
        if question.id.trim().is_empty() {
            return Err(AuthoringError::EmptyQuestionId);
        }
        if !seen.insert(question.id.as_str()) {
            return Err(AuthoringError::DuplicateQuestionId(question.id.clone()));
        }
        match &question.kind {
            QuestionKind::MultipleChoice {
                choices,
                correct_choice_index,
            } => {
                if choices.is_empty() || choices.len() > MAX_CHOICES {
                    return Err(AuthoringError::ChoiceCount {
                        question_id: question.id.clone(),
                        count: choices.len(),
                    });
                }
                if *correct_choice_index >= choices.len() {
                    return Err(AuthoringError::CorrectChoiceOutOfRange {
                        question_id: question.id.clone(),
                        index: *correct_choice_index,
                        choices: choices.len(),
                    });
                }
            }
            QuestionKind::ShortAnswer
            | QuestionKind::Diagram
            | QuestionKind::DocumentReference { .. } => {}
        }
    }
    Ok(())
}
