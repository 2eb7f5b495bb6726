//! Core data model types for bandmark.
//!
//! These are the fundamental types the whole system uses to represent
//! practice tests, answer keys, submissions, and persisted attempts.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::band::Band;

/// The exam skill a practice test belongs to.
///
/// Only reading and listening tests carry an answer key the scorer can mark;
/// writing and speaking are assessed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Reading,
    Listening,
    Writing,
    Speaking,
}

impl Skill {
    /// Whether attempts at this skill can be marked against an answer key.
    pub fn is_scorable(self) -> bool {
        matches!(self, Skill::Reading | Skill::Listening)
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skill::Reading => write!(f, "reading"),
            Skill::Listening => write!(f, "listening"),
            Skill::Writing => write!(f, "writing"),
            Skill::Speaking => write!(f, "speaking"),
        }
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reading" => Ok(Skill::Reading),
            "listening" => Ok(Skill::Listening),
            "writing" => Ok(Skill::Writing),
            "speaking" => Ok(Skill::Speaking),
            other => Err(format!("unknown skill: {other}")),
        }
    }
}

/// A single question inside a practice test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the test (e.g. "q1").
    pub id: String,
    /// The question text shown to the learner.
    pub prompt: String,
    /// The expected answer.
    pub answer: String,
}

/// A complete practice test definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeTest {
    /// Unique identifier for this test.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of the test.
    #[serde(default)]
    pub description: String,
    /// The exam skill this test covers.
    pub skill: Skill,
    /// The questions in order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl PracticeTest {
    /// Build the immutable answer key for this test.
    pub fn answer_key(&self) -> AnswerKey {
        AnswerKey {
            test_id: self.id.clone(),
            answers: self
                .questions
                .iter()
                .map(|q| (q.id.clone(), q.answer.clone()))
                .collect(),
        }
    }
}

/// Mapping from question id to expected answer text for one test.
///
/// Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerKey {
    pub test_id: String,
    pub answers: BTreeMap<String, String>,
}

/// A learner's submitted answers for one test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// The learner making the attempt.
    pub learner_id: String,
    /// The test being attempted.
    pub test_id: String,
    /// Question id to free-text response.
    pub answers: BTreeMap<String, String>,
}

/// The output of scoring a submission: raw correct count plus its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredAttempt {
    pub raw_score: u32,
    pub band: Band,
}

/// One persisted test attempt.
///
/// Created exactly once per submission and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Generated identifier for this attempt.
    pub id: Uuid,
    pub learner_id: String,
    pub test_id: String,
    pub raw_score: u32,
    pub band: Band,
    /// Snapshot of the submitted answers.
    pub answers: BTreeMap<String, String>,
    pub submitted_at: DateTime<Utc>,
}

/// What the caller gets back from a submission.
///
/// A store failure shows up in `error`; the score fields are always populated
/// because scoring happens in-process before the insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub raw_score: u32,
    pub band: Band,
    /// Identifier of the attempt record, whether or not the insert succeeded.
    pub attempt_id: Uuid,
    /// Store error message when the attempt was not durably saved.
    pub error: Option<String>,
}

impl SubmissionOutcome {
    /// Whether the attempt was durably saved.
    pub fn persisted(&self) -> bool {
        self.error.is_none()
    }
}
