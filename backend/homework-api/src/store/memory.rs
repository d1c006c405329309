use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{AssignmentStore, StoreError};
use crate::models::Assignment;

/// Process-local store, used for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryAssignmentStore {
    records: RwLock<HashMap<String, Assignment>>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn load(&self, assignment_id: &str) -> Result<Assignment, StoreError> {
        self.records
            .read()
            .await
            .get(assignment_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(assignment_id.to_string()))
    }

    async fn save(&self, assignment: &Assignment) -> Result<Assignment, StoreError> {
        let mut records = self.records.write().await;
        let current = records
            .get(&assignment.id)
            .ok_or_else(|| StoreError::NotFound(assignment.id.clone()))?;

        if current.version != assignment.version {
            tracing::warn!(
                "Version mismatch for assignment {}: stored={}, snapshot={}",
                assignment.id,
                current.version,
                assignment.version
            );
            return Err(StoreError::Conflict(assignment.id.clone()));
        }

        let mut stored = assignment.clone();
        stored.version += 1;
        records.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn insert(&self, assignment: &Assignment) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&assignment.id) {
            return Err(StoreError::AlreadyExists(assignment.id.clone()));
        }
        records.insert(assignment.id.clone(), assignment.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewAssignment, Question};
    use chrono::Utc;

    fn sample() -> Assignment {
        Assignment::new(NewAssignment {
            id: Some("hw-mem".to_string()),
            title: "Fractions".to_string(),
            description: String::new(),
            subject: "Maths".to_string(),
            due_at: Utc::now(),
            questions: vec![Question::short_answer("q1", "What is 1/2 + 1/4?")],
            reference_document_ref: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn save_bumps_version() {
        let store = InMemoryAssignmentStore::new();
        store.insert(&sample()).await.unwrap();

        let loaded = store.load("hw-mem").await.unwrap();
        let saved = store.save(&loaded).await.unwrap();
        assert_eq!(saved.version, 1);
        assert_eq!(store.load("hw-mem").await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn stale_snapshot_conflicts() {
        let store = InMemoryAssignmentStore::new();
        store.insert(&sample()).await.unwrap();

        let first = store.load("hw-mem").await.unwrap();
        let second = first.clone();
        store.save(&first).await.unwrap();

        assert_eq!(
            store.save(&second).await.unwrap_err(),
            StoreError::Conflict("hw-mem".to_string())
        );
    }

    #[tokio::test]
    async fn missing_and_duplicate_records() {
        let store = InMemoryAssignmentStore::new();
        assert!(store.is_empty().await);
        assert_eq!(
            store.load("nope").await.unwrap_err(),
            StoreError::NotFound("nope".to_string())
        );

        store.insert(&sample()).await.unwrap();
        assert_eq!(
            store.insert(&sample()).await.unwrap_err(),
            StoreError::AlreadyExists("hw-mem".to_string())
        );
        assert_eq!(store.len().await, 1);
    }
}
