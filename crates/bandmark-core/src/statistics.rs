//! Aggregate progress statistics over stored attempts.
//!
//! Groups attempt records per learner and per test, builds the band
//! distribution, and computes practice streaks for the dashboard.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::band::Band;
use crate::model::AttemptRecord;

/// Aggregate statistics across all attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Per-learner statistics.
    pub per_learner: HashMap<String, LearnerStats>,
    /// Per-test statistics.
    pub per_test: HashMap<String, TestStats>,
    /// Attempt count per band, keyed by band display (e.g. "6.5").
    pub band_histogram: BTreeMap<String, usize>,
}

/// Statistics for a single learner across all their attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerStats {
    pub learner_id: String,
    /// Total attempts made.
    pub attempts: usize,
    /// Best band achieved.
    pub best_band: Band,
    /// Band of the most recent attempt.
    pub latest_band: Band,
    /// Average raw score.
    pub avg_raw_score: f64,
    /// Consecutive days of practice ending on the most recent attempt day.
    pub streak_days: u32,
}

/// Statistics for a single test across all learners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestStats {
    pub test_id: String,
    pub attempts: usize,
    pub avg_raw_score: f64,
    /// Average band as a float; not necessarily a half-band step.
    pub avg_band: f64,
}

/// Count consecutive practice days ending at the most recent day.
///
/// Duplicate dates count once; a gap of more than one day breaks the streak.
pub fn practice_streak(dates: &[NaiveDate]) -> u32 {
    let unique: HashSet<NaiveDate> = dates.iter().copied().collect();
    let Some(&latest) = unique.iter().max() else {
        return 0;
    };

    let mut streak = 1u32;
    let mut day = latest;
    while unique.contains(&(day - Duration::days(1))) {
        streak += 1;
        day = day - Duration::days(1);
    }
    streak
}

/// Compute aggregate statistics from attempt records.
pub fn compute_aggregate_stats(attempts: &[AttemptRecord]) -> AggregateStats {
    let mut per_learner_records: HashMap<String, Vec<&AttemptRecord>> = HashMap::new();
    let mut per_test_records: HashMap<String, Vec<&AttemptRecord>> = HashMap::new();
    for record in attempts {
        per_learner_records
            .entry(record.learner_id.clone())
            .or_default()
            .push(record);
        per_test_records
            .entry(record.test_id.clone())
            .or_default()
            .push(record);
    }

    let mut per_learner = HashMap::new();
    for (learner_id, records) in &per_learner_records {
        let n = records.len();
        let best_band = records.iter().map(|r| r.band).max().unwrap_or(Band::MIN);
        let latest_band = records
            .iter()
            .max_by_key(|r| r.submitted_at)
            .map(|r| r.band)
            .unwrap_or(Band::MIN);
        let avg_raw_score =
            records.iter().map(|r| f64::from(r.raw_score)).sum::<f64>() / n.max(1) as f64;
        let dates: Vec<NaiveDate> = records
            .iter()
            .map(|r| r.submitted_at.date_naive())
            .collect();

        per_learner.insert(
            learner_id.clone(),
            LearnerStats {
                learner_id: learner_id.clone(),
                attempts: n,
                best_band,
                latest_band,
                avg_raw_score,
                streak_days: practice_streak(&dates),
            },
        );
    }

    let mut per_test = HashMap::new();
    for (test_id, records) in &per_test_records {
        let n = records.len();
        let avg_raw_score =
            records.iter().map(|r| f64::from(r.raw_score)).sum::<f64>() / n.max(1) as f64;
        let avg_band =
            records.iter().map(|r| r.band.as_f64()).sum::<f64>() / n.max(1) as f64;

        per_test.insert(
            test_id.clone(),
            TestStats {
                test_id: test_id.clone(),
                attempts: n,
                avg_raw_score,
                avg_band,
            },
        );
    }

    let mut band_histogram = BTreeMap::new();
    for record in attempts {
        *band_histogram.entry(record.band.to_string()).or_insert(0) += 1;
    }

    AggregateStats {
        per_learner,
        per_test,
        band_histogram,
    }
}
