use async_trait::async_trait;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AssignmentStore, StoreError};
use crate::metrics::track_store_operation;
use crate::models::{Assignment, AssignmentStatus, Question, QuestionId};
use crate::utils::time::{bson_to_chrono, chrono_to_bson};

const COLLECTION: &str = "assignments";
const DUPLICATE_KEY: i32 = 11000;

/// Shape of an assignment in the `assignments` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssignmentDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    subject: String,
    #[serde(rename = "dueAt")]
    due_at: BsonDateTime,
    status: AssignmentStatus,
    questions: Vec<Question>,
    #[serde(default)]
    answers: BTreeMap<QuestionId, String>,
    #[serde(default)]
    feedback: BTreeMap<QuestionId, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<i32>,
    #[serde(
        rename = "referenceDocumentRef",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    reference_document_ref: Option<String>,
    version: i64,
    #[serde(rename = "submittedAt", default, skip_serializing_if = "Option::is_none")]
    submitted_at: Option<BsonDateTime>,
    #[serde(rename = "gradedAt", default, skip_serializing_if = "Option::is_none")]
    graded_at: Option<BsonDateTime>,
}

impl From<&Assignment> for AssignmentDocument {
    fn from(a: &Assignment) -> Self {
        Self {
            id: a.id.clone(),
            title: a.title.clone(),
            description: a.description.clone(),
            subject: a.subject.clone(),
            due_at: chrono_to_bson(a.due_at),
            status: a.status,
            questions: a.questions.clone(),
            answers: a.answers.clone(),
            feedback: a.feedback.clone(),
            score: a.score.map(|s| s as i32),
            reference_document_ref: a.reference_document_ref.clone(),
            version: a.version as i64,
            submitted_at: a.submitted_at.map(chrono_to_bson),
            graded_at: a.graded_at.map(chrono_to_bson),
        }
    }
}

impl AssignmentDocument {
    fn into_assignment(self) -> Result<Assignment, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: self.id.clone(),
            reason,
        };

        let score = self
            .score
            .map(|s| u32::try_from(s).map_err(|_| corrupt(format!("negative score {}", s))))
            .transpose()?;
        let version = u64::try_from(self.version)
            .map_err(|_| corrupt(format!("negative version {}", self.version)))?;

        let assignment = Assignment {
            id: self.id.clone(),
            title: self.title,
            description: self.description,
            subject: self.subject,
            due_at: bson_to_chrono(self.due_at),
            status: self.status,
            questions: self.questions,
            answers: self.answers,
            feedback: self.feedback,
            score,
            reference_document_ref: self.reference_document_ref,
            version,
            submitted_at: self.submitted_at.map(bson_to_chrono),
            graded_at: self.graded_at.map(bson_to_chrono),
        };

        assignment
            .check_consistency()
            .map_err(|reason| StoreError::Corrupt {
                id: assignment.id.clone(),
                reason,
            })?;

        Ok(assignment)
    }
}

fn backend_error(e: mongodb::error::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        *e.kind,
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(ref we))
            if we.code == DUPLICATE_KEY
    )
}

pub struct MongoAssignmentStore {
    db: Database,
    collection: Collection<AssignmentDocument>,
}

impl MongoAssignmentStore {
    pub fn new(db: Database) -> Self {
        let collection = db.collection(COLLECTION);
        Self { db, collection }
    }
}

#[async_trait]
impl AssignmentStore for MongoAssignmentStore {
    async fn load(&self, assignment_id: &str) -> Result<Assignment, StoreError> {
        let document = track_store_operation("load", async {
            self.collection
                .find_one(doc! { "_id": assignment_id })
                .await
                .map_err(backend_error)
        })
        .await?
        .ok_or_else(|| StoreError::NotFound(assignment_id.to_string()))?;

        document.into_assignment()
    }

    async fn save(&self, assignment: &Assignment) -> Result<Assignment, StoreError> {
        let expected_version = assignment.version as i64;
        let mut document = AssignmentDocument::from(assignment);
        document.version = expected_version + 1;

        let result = track_store_operation("save", async {
            self.collection
                .replace_one(
                    doc! { "_id": assignment.id.as_str(), "version": expected_version },
                    &document,
                )
                .await
                .map_err(backend_error)
        })
        .await?;

        if result.matched_count == 0 {
            let exists = self
                .collection
                .count_documents(doc! { "_id": assignment.id.as_str() })
                .await
                .map_err(backend_error)?;

            return Err(if exists > 0 {
                StoreError::Conflict(assignment.id.clone())
            } else {
                StoreError::NotFound(assignment.id.clone())
            });
        }

        tracing::debug!(
            "Saved assignment {} at version {}",
            assignment.id,
            document.version
        );

        let mut saved = assignment.clone();
        saved.version += 1;
        Ok(saved)
    }

    async fn insert(&self, assignment: &Assignment) -> Result<(), StoreError> {
        let document = AssignmentDocument::from(assignment);
        track_store_operation("insert", async {
            self.collection
                .insert_one(&document)
                .await
                .map(|_| ())
                .map_err(|e| {
                    if is_duplicate_key(&e) {
                        StoreError::AlreadyExists(assignment.id.clone())
                    } else {
                        backend_error(e)
                    }
                })
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        tokio::time::timeout(
            std::time::Duration::from_secs(1),
            self.db.run_command(doc! { "ping": 1 }),
        )
        .await
        .map_err(|_| StoreError::Backend("MongoDB timeout after 1s".to_string()))?
        .map(|_| ())
        .map_err(backend_error)
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
