//! The submission engine.
//!
//! Scores a submission, writes exactly one attempt record to the store, and
//! returns the outcome with any persistence failure carried as a value rather
//! than an error. Batch submission fans out independent calls bounded by a
//! semaphore; there is no shared state between concurrent submissions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::model::{AnswerKey, AttemptRecord, Submission, SubmissionOutcome};
use crate::scoring::score_submission;
use crate::traits::AttemptStore;

/// Configuration for the submission engine.
#[derive(Debug, Clone)]
pub struct SubmitEngineConfig {
    /// Maximum concurrent submissions in a batch.
    pub parallelism: usize,
}

impl Default for SubmitEngineConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// Progress reporting trait for batch submission.
pub trait ProgressReporter: Send + Sync {
    fn on_submit_start(&self, learner_id: &str, test_id: &str);
    fn on_submit_complete(&self, learner_id: &str, test_id: &str, outcome: &SubmissionOutcome);
    fn on_submit_failed(&self, learner_id: &str, test_id: &str, error: &str);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_submit_start(&self, _: &str, _: &str) {}
    fn on_submit_complete(&self, _: &str, _: &str, _: &SubmissionOutcome) {}
    fn on_submit_failed(&self, _: &str, _: &str, _: &str) {}
}

/// Result of a batch submission run.
#[derive(Debug)]
pub struct SubmitReport {
    /// Outcomes for submissions that reached the scoring stage.
    pub outcomes: Vec<SubmissionOutcome>,
    /// Submissions that failed before scoring (e.g. no answer key).
    pub failed: usize,
    /// Wall-clock duration of the batch.
    pub duration: Duration,
}

/// The submission engine.
pub struct SubmitEngine {
    store: Arc<dyn AttemptStore>,
    config: SubmitEngineConfig,
}

impl SubmitEngine {
    pub fn new(store: Arc<dyn AttemptStore>, config: SubmitEngineConfig) -> Self {
        Self { store, config }
    }

    /// Score a submission against a key already in hand and persist it.
    ///
    /// Total: a failed insert is reported on the outcome's `error` field, and
    /// the computed raw/band score is present either way.
    pub async fn submit_with_key(
        &self,
        submission: &Submission,
        key: &AnswerKey,
    ) -> SubmissionOutcome {
        let scored = score_submission(&submission.answers, key);

        let record = AttemptRecord {
            id: Uuid::new_v4(),
            learner_id: submission.learner_id.clone(),
            test_id: submission.test_id.clone(),
            raw_score: scored.raw_score,
            band: scored.band,
            answers: submission.answers.clone(),
            submitted_at: chrono::Utc::now(),
        };

        let error = match self.store.insert_attempt(&record).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    learner = %record.learner_id,
                    test = %record.test_id,
                    "attempt not persisted: {e:#}"
                );
                Some(format!("{e:#}"))
            }
        };

        SubmissionOutcome {
            raw_score: scored.raw_score,
            band: scored.band,
            attempt_id: record.id,
            error,
        }
    }

    /// Fetch the answer key for the submission's test, then score and persist.
    ///
    /// Returns `Err` only when the key cannot be obtained; once scoring is
    /// possible, store failures are values on the outcome.
    pub async fn submit(&self, submission: &Submission) -> Result<SubmissionOutcome> {
        let key = self.store.fetch_answer_key(&submission.test_id).await?;
        Ok(self.submit_with_key(submission, &key).await)
    }

    /// Run a batch of independent submissions with bounded concurrency.
    pub async fn submit_batch(
        &self,
        submissions: &[Submission],
        progress: &dyn ProgressReporter,
    ) -> SubmitReport {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));

        let mut futures = FuturesUnordered::new();
        for submission in submissions {
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                progress.on_submit_start(&submission.learner_id, &submission.test_id);
                (submission, self.submit(submission).await)
            });
        }

        let mut outcomes = Vec::new();
        let mut failed = 0usize;

        while let Some((submission, result)) = futures.next().await {
            match result {
                Ok(outcome) => {
                    progress.on_submit_complete(
                        &submission.learner_id,
                        &submission.test_id,
                        &outcome,
                    );
                    outcomes.push(outcome);
                }
                Err(e) => {
                    tracing::error!(
                        "submission failed for {}/{}: {e:#}",
                        submission.learner_id,
                        submission.test_id
                    );
                    progress.on_submit_failed(
                        &submission.learner_id,
                        &submission.test_id,
                        &e.to_string(),
                    );
                    failed += 1;
                }
            }
        }

        SubmitReport {
            outcomes,
            failed,
            duration: start.elapsed(),
        }
    }
}
