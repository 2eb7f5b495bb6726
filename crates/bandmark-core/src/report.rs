//! Progress report types with JSON persistence and baseline comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::band::Band;
use crate::model::AttemptRecord;
use crate::statistics::AggregateStats;

/// A complete progress report over a set of attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The attempts the report covers.
    pub attempts: Vec<AttemptRecord>,
    /// Aggregate statistics.
    pub aggregate: AggregateStats,
}

impl ProgressReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ProgressReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline.
    ///
    /// Looks at the best band per (learner, test) pair; a change larger than
    /// `threshold` band points counts as an improvement or decline.
    pub fn compare(&self, baseline: &ProgressReport, threshold: f64) -> ProgressDelta {
        let best_bands = |report: &ProgressReport| -> HashMap<(String, String), Band> {
            let mut map: HashMap<(String, String), Band> = HashMap::new();
            for attempt in &report.attempts {
                let key = (attempt.learner_id.clone(), attempt.test_id.clone());
                map.entry(key)
                    .and_modify(|best| {
                        if attempt.band > *best {
                            *best = attempt.band;
                        }
                    })
                    .or_insert(attempt.band);
            }
            map
        };

        let baseline_bands = best_bands(baseline);
        let current_bands = best_bands(self);

        let mut improvements = Vec::new();
        let mut declines = Vec::new();
        let mut unchanged = 0usize;
        let mut new_pairs = 0usize;

        for (key, &current) in &current_bands {
            if let Some(&base) = baseline_bands.get(key) {
                let delta = current.as_f64() - base.as_f64();
                let change = BandChange {
                    learner_id: key.0.clone(),
                    test_id: key.1.clone(),
                    baseline_band: base,
                    current_band: current,
                    delta,
                };
                if delta > threshold {
                    improvements.push(change);
                } else if delta < -threshold {
                    declines.push(change);
                } else {
                    unchanged += 1;
                }
            } else {
                new_pairs += 1;
            }
        }

        let removed_pairs = baseline_bands
            .keys()
            .filter(|k| !current_bands.contains_key(k))
            .count();

        ProgressDelta {
            improvements,
            declines,
            unchanged,
            new_pairs,
            removed_pairs,
        }
    }
}

/// Result of comparing two progress reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressDelta {
    /// Pairs where the best band went up.
    pub improvements: Vec<BandChange>,
    /// Pairs where the best band went down.
    pub declines: Vec<BandChange>,
    /// Pairs with no significant change.
    pub unchanged: usize,
    /// Pairs in current but not baseline.
    pub new_pairs: usize,
    /// Pairs in baseline but not current.
    pub removed_pairs: usize,
}

/// A band change for one (learner, test) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandChange {
    pub learner_id: String,
    pub test_id: String,
    pub baseline_band: Band,
    pub current_band: Band,
    pub delta: f64,
}

impl ProgressDelta {
    /// Format the delta as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} improved, {} declined, {} unchanged\n\n",
            self.improvements.len(),
            self.declines.len(),
            self.unchanged
        ));

        if !self.improvements.is_empty() {
            md.push_str("### Improvements\n\n");
            md.push_str("| Learner | Test | Baseline | Current | Delta |\n");
            md.push_str("|---------|------|----------|---------|-------|\n");
            for c in &self.improvements {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | +{:.1} |\n",
                    c.learner_id, c.test_id, c.baseline_band, c.current_band, c.delta
                ));
            }
            md.push('\n');
        }

        if !self.declines.is_empty() {
            md.push_str("### Declines\n\n");
            md.push_str("| Learner | Test | Baseline | Current | Delta |\n");
            md.push_str("|---------|------|----------|---------|-------|\n");
            for c in &self.declines {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {:.1} |\n",
                    c.learner_id, c.test_id, c.baseline_band, c.current_band, c.delta
                ));
            }
        }

        md
    }

    /// Returns true if any pair declined.
    pub fn has_declines(&self) -> bool {
        !self.declines.is_empty()
    }
}
