use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::engine::{AssignmentEngine, SubmissionPolicy};
use crate::store::{AssignmentStore, InMemoryAssignmentStore, MongoAssignmentStore};
use crate::utils::retry::RetryConfig;

pub mod assignment_service;

use assignment_service::AssignmentService;

pub struct AppState {
    pub config: Config,
    pub assignments: AssignmentService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn AssignmentStore> = match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory assignment store; data is lost on restart");
                Arc::new(InMemoryAssignmentStore::new())
            }
            StoreBackend::Mongo => {
                tracing::info!("Connecting to MongoDB...");
                let client = mongodb::Client::with_uri_str(&config.mongo_uri).await?;
                let store = MongoAssignmentStore::new(client.database(&config.mongo_database));
                store
                    .ping()
                    .await
                    .map_err(|e| anyhow::anyhow!("MongoDB is unreachable: {}", e))?;
                tracing::info!("MongoDB connection established successfully");
                Arc::new(store)
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn AssignmentStore>) -> Self {
        let engine = AssignmentEngine::new(SubmissionPolicy {
            min_answers_to_submit: config.min_answers_to_submit,
        });
        let retry = RetryConfig::with_max_attempts(config.retry_max_attempts);

        Self {
            assignments: AssignmentService::new(store, engine, retry),
            config,
        }
    }
}
