//! In-memory store for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use bandmark_core::error::StoreError;
use bandmark_core::model::{AnswerKey, AttemptRecord};
use bandmark_core::traits::AttemptStore;

/// An in-memory attempt store for exercising the submission pipeline without
/// a network.
///
/// Records call counts and supports failure injection for the
/// persistence-failure path.
pub struct MemoryStore {
    keys: Mutex<HashMap<String, AnswerKey>>,
    attempts: Mutex<Vec<AttemptRecord>>,
    insert_count: AtomicU32,
    fail_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
            attempts: Mutex::new(Vec::new()),
            insert_count: AtomicU32::new(0),
            fail_inserts: AtomicBool::new(false),
        }
    }

    /// Register an answer key, returning self for chaining.
    pub fn with_answer_key(self, key: AnswerKey) -> Self {
        self.keys.lock().unwrap().insert(key.test_id.clone(), key);
        self
    }

    /// Make subsequent inserts fail as if the store were unreachable.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::Relaxed);
    }

    /// Number of insert calls made, including failed ones.
    pub fn insert_count(&self) -> u32 {
        self.insert_count.load(Ordering::Relaxed)
    }

    /// Snapshot of the stored attempts.
    pub fn attempts(&self) -> Vec<AttemptRecord> {
        self.attempts.lock().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert_attempt(&self, record: &AttemptRecord) -> anyhow::Result<()> {
        self.insert_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_inserts.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("injected failure".into()).into());
        }
        self.attempts.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn fetch_answer_key(&self, test_id: &str) -> anyhow::Result<AnswerKey> {
        self.keys
            .lock()
            .unwrap()
            .get(test_id)
            .cloned()
            .ok_or_else(|| StoreError::TestNotFound(test_id.to_string()).into())
    }

    async fn fetch_attempts(
        &self,
        learner_id: Option<&str>,
    ) -> anyhow::Result<Vec<AttemptRecord>> {
        let attempts = self.attempts.lock().unwrap();
        Ok(match learner_id {
            Some(learner) => attempts
                .iter()
                .filter(|a| a.learner_id == learner)
                .cloned()
                .collect(),
            None => attempts.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandmark_core::band::band_for_raw;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn key() -> AnswerKey {
        AnswerKey {
            test_id: "t1".into(),
            answers: BTreeMap::from([("q1".to_string(), "yes".to_string())]),
        }
    }

    fn record(learner: &str) -> AttemptRecord {
        AttemptRecord {
            id: Uuid::new_v4(),
            learner_id: learner.into(),
            test_id: "t1".into(),
            raw_score: 15,
            band: band_for_raw(15),
            answers: BTreeMap::new(),
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch() {
        let store = MemoryStore::new();
        store.insert_attempt(&record("amy")).await.unwrap();
        store.insert_attempt(&record("ben")).await.unwrap();

        assert_eq!(store.insert_count(), 2);
        assert_eq!(store.fetch_attempts(None).await.unwrap().len(), 2);
        assert_eq!(store.fetch_attempts(Some("amy")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn answer_key_lookup() {
        let store = MemoryStore::new().with_answer_key(key());
        assert!(store.fetch_answer_key("t1").await.is_ok());
        assert!(store.fetch_answer_key("missing").await.is_err());
    }

    #[tokio::test]
    async fn failure_injection() {
        let store = MemoryStore::new();
        store.fail_inserts(true);

        let err = store.insert_attempt(&record("amy")).await.unwrap_err();
        assert!(err.to_string().contains("unavailable"));
        assert_eq!(store.insert_count(), 1);
        assert!(store.attempts().is_empty());
    }
}
