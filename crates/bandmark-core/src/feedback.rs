//! Fixed feedback text for each band tier.

use crate::band::Band;

const TIER_9: &str =
    "Expert user. You have fully operational command of the language: appropriate, accurate and fluent.";
const TIER_8: &str =
    "Very good user. You handle complex, detailed argumentation well, with only occasional unsystematic inaccuracies.";
const TIER_7: &str =
    "Good user. You have operational command of the language, with occasional inaccuracies in unfamiliar situations.";
const TIER_6: &str =
    "Competent user. You have generally effective command despite some inaccuracies and misunderstandings.";
const TIER_5: &str =
    "Modest user. You have partial command and cope with overall meaning in most situations.";
const TIER_4: &str =
    "Limited user. Basic competence is limited to familiar situations; keep working on comprehension.";
const TIER_BELOW: &str =
    "Keep practising. Frequent breakdowns in communication occur at this level; focus on core vocabulary and short texts.";

/// Feedback tiers, highest band first. A band maps to the first tier it reaches.
const FEEDBACK_TIERS: &[(f64, &str)] = &[
    (9.0, TIER_9),
    (8.0, TIER_8),
    (7.0, TIER_7),
    (6.0, TIER_6),
    (5.0, TIER_5),
    (4.0, TIER_4),
];

/// Select the feedback string for a band score.
pub fn feedback_for_band(band: Band) -> &'static str {
    FEEDBACK_TIERS
        .iter()
        .find(|(threshold, _)| band.as_f64() >= *threshold)
        .map(|(_, text)| *text)
        .unwrap_or(TIER_BELOW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::band_for_raw;

    fn band(value: f64) -> Band {
        Band::try_from(value).unwrap()
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(feedback_for_band(band(9.0)), TIER_9);
        assert_eq!(feedback_for_band(band(8.5)), TIER_8);
        assert_eq!(feedback_for_band(band(8.0)), TIER_8);
        assert_eq!(feedback_for_band(band(7.5)), TIER_7);
        assert_eq!(feedback_for_band(band(6.0)), TIER_6);
        assert_eq!(feedback_for_band(band(5.5)), TIER_5);
        assert_eq!(feedback_for_band(band(4.0)), TIER_4);
        assert_eq!(feedback_for_band(band(3.5)), TIER_BELOW);
        assert_eq!(feedback_for_band(band(1.0)), TIER_BELOW);
    }

    #[test]
    fn every_raw_score_has_feedback() {
        for raw in 0..=40 {
            let text = feedback_for_band(band_for_raw(raw));
            assert!(!text.is_empty());
        }
    }
}
