//! The attempt scorer.
//!
//! Compares submitted answers against an answer key and produces a raw score
//! plus its band. Matching is case- and whitespace-insensitive. Question ids
//! present on only one side never count, so the scorer is total: malformed or
//! missing entries simply score zero.

use std::collections::BTreeMap;

use crate::band::band_for_raw;
use crate::model::{AnswerKey, ScoredAttempt};

/// Normalize an answer for comparison: trim surrounding whitespace and
/// lowercase.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Score a set of submitted answers against an answer key.
///
/// The raw score is the number of question ids present in both maps whose
/// normalized values are equal. Deterministic for identical inputs.
pub fn score_submission(
    submitted: &BTreeMap<String, String>,
    key: &AnswerKey,
) -> ScoredAttempt {
    let raw_score = key
        .answers
        .iter()
        .filter(|(id, expected)| {
            submitted
                .get(*id)
                .is_some_and(|given| normalize_answer(given) == normalize_answer(expected))
        })
        .count() as u32;

    ScoredAttempt {
        raw_score,
        band: band_for_raw(i64::from(raw_score)),
    }
}
