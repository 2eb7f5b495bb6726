//! The attempt store trait.
//!
//! The external data service is an injected collaborator behind this async
//! trait, so the scoring path stays testable without network access.
//! Implementations live in the `bandmark-store` crate.

use async_trait::async_trait;

use crate::model::{AnswerKey, AttemptRecord};

/// Trait for the external store that holds answer keys and attempt records.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Human-readable backend name (e.g. "rest").
    fn name(&self) -> &str;

    /// Durably insert one attempt record. Exactly one insert per call; the
    /// caller decides what to do on failure.
    async fn insert_attempt(&self, record: &AttemptRecord) -> anyhow::Result<()>;

    /// Fetch the answer key for a test.
    async fn fetch_answer_key(&self, test_id: &str) -> anyhow::Result<AnswerKey>;

    /// Fetch stored attempts, optionally restricted to one learner.
    async fn fetch_attempts(&self, learner_id: Option<&str>)
        -> anyhow::Result<Vec<AttemptRecord>>;
}
