//! Aggregate risk scoring over a finding set.
//!
//! Each present finding contributes `weight x confidence`; the sum is mapped
//! onto a 0-100 scale with a saturating curve so one severe clause cannot be
//! diluted by many absent trivial ones, while every additional risky clause
//! still raises the score.

use shared_types::{ClauseFinding, RiskAssessment, RiskLevel, TierCounts};

use crate::taxonomy::Taxonomy;

/// Normalization constant for the saturating curve
/// `100 x (1 - e^(-sum / K))`. Tuned so a lone CRITICAL-tier finding at the
/// minimum single-match confidence of 0.5 still lands above 60. A policy
/// placeholder pending calibration against a labeled contract corpus.
const SCORE_NORMALIZATION_K: f64 = 13.0;

/// Score a complete finding set. Pure and deterministic: identical finding
/// sets always produce bit-identical scores, regardless of input order.
pub fn score(findings: &[ClauseFinding], taxonomy: &Taxonomy) -> RiskAssessment {
    let mut contributions: Vec<(&str, f64)> = Vec::new();
    let mut tier_counts = TierCounts::default();

    for finding in findings {
        if !finding.present {
            continue;
        }
        tier_counts.bump(finding.severity);
        let weight = taxonomy.weight_for(&finding.category_id).unwrap_or(0.0);
        contributions.push((finding.category_id.as_str(), weight * finding.confidence));
    }

    // Fixed summation order keeps the float result independent of the
    // order findings were handed in.
    contributions.sort_by(|a, b| a.0.cmp(b.0));
    let sum: f64 = contributions.iter().map(|(_, c)| c).sum();

    let score = saturate(sum);

    let mut sorted = findings.to_vec();
    sorted.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });

    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        tier_counts,
        findings: sorted,
    }
}

fn saturate(sum: f64) -> f64 {
    100.0 * (1.0 - (-sum / SCORE_NORMALIZATION_K).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{detect, DetectorConfig};
    use crate::normalize::normalize;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use shared_types::Severity;

    fn taxonomy() -> Taxonomy {
        Taxonomy::load().unwrap()
    }

    fn findings_for(raw: &str) -> Vec<ClauseFinding> {
        let taxonomy = taxonomy();
        let units = normalize(raw).unwrap();
        detect(&units, &taxonomy, &DetectorConfig::default())
    }

    fn absent_findings() -> Vec<ClauseFinding> {
        let taxonomy = taxonomy();
        detect(&[], &taxonomy, &DetectorConfig::default())
    }

    #[test]
    fn empty_document_scores_zero() {
        let assessment = score(&absent_findings(), &taxonomy());
        assert_eq!(assessment.score, 0.0);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert_eq!(assessment.tier_counts.total(), 0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let taxonomy = taxonomy();
        let findings = findings_for("A late fee applies. The plan has a lock-in period.");
        let first = score(&findings, &taxonomy);
        let second = score(&findings, &taxonomy);
        assert_eq!(first.score, second.score);
        assert_eq!(first, second);
    }

    #[test]
    fn score_is_independent_of_finding_order() {
        let taxonomy = taxonomy();
        let findings = findings_for(
            "A late fee applies. Data goes to third parties. Binding arbitration governs.",
        );
        let mut reversed = findings.clone();
        reversed.reverse();
        assert_eq!(score(&findings, &taxonomy).score, score(&reversed, &taxonomy).score);
    }

    #[test]
    fn single_critical_clause_scores_above_sixty() {
        let taxonomy = taxonomy();
        let findings = findings_for("This plan has a lock-in of twelve months.");
        let lock_in = findings.iter().find(|f| f.category_id == "lock_in").unwrap();
        assert!(lock_in.present);
        assert_eq!(lock_in.severity, Severity::Critical);

        let assessment = score(&findings, &taxonomy);
        assert!(
            assessment.score > 60.0,
            "critical clause alone scored {}",
            assessment.score
        );
    }

    #[test]
    fn flipping_a_finding_present_never_lowers_the_score() {
        let taxonomy = taxonomy();
        let base = absent_findings();
        let base_score = score(&base, &taxonomy).score;

        for i in 0..base.len() {
            let mut flipped = base.clone();
            flipped[i].present = true;
            flipped[i].confidence = 0.5;
            let flipped_score = score(&flipped, &taxonomy).score;
            assert!(
                flipped_score >= base_score,
                "{} lowered the score",
                flipped[i].category_id
            );
        }
    }

    #[test]
    fn tier_counts_tally_present_findings() {
        let taxonomy = taxonomy();
        let findings =
            findings_for("A late fee applies. Your data is shared with third parties.");
        let assessment = score(&findings, &taxonomy);

        assert_eq!(assessment.tier_counts.high, 1); // penalty
        assert_eq!(assessment.tier_counts.medium, 1); // data_sharing
        assert_eq!(assessment.tier_counts.critical, 0);
    }

    #[test]
    fn findings_sorted_by_severity_then_id() {
        let taxonomy = taxonomy();
        let findings = findings_for("Sample text without any clauses of note.");
        let assessment = score(&findings, &taxonomy);

        let pairs: Vec<(Severity, &str)> = assessment
            .findings
            .iter()
            .map(|f| (f.severity, f.category_id.as_str()))
            .collect();
        let mut expected = pairs.clone();
        expected.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        assert_eq!(pairs, expected);
        assert_eq!(assessment.findings[0].severity, Severity::Critical);
    }

    proptest! {
        /// Adding one present finding on top of an arbitrary confidence
        /// assignment is monotone.
        #[test]
        fn score_is_monotone_in_each_contribution(
            confidences in proptest::collection::vec(0.0f64..=1.0, 12),
            flip_index in 0usize..12,
        ) {
            let taxonomy = taxonomy();
            let mut findings = absent_findings();
            for (finding, confidence) in findings.iter_mut().zip(&confidences) {
                finding.present = *confidence > 0.5;
                finding.confidence = if finding.present { *confidence } else { 0.0 };
            }

            let before = score(&findings, &taxonomy).score;
            if !findings[flip_index].present {
                findings[flip_index].present = true;
                findings[flip_index].confidence = 0.5;
            }
            let after = score(&findings, &taxonomy).score;
            prop_assert!(after >= before);
        }

        /// The saturating curve stays within the 0-100 scale.
        #[test]
        fn score_is_bounded(
            confidences in proptest::collection::vec(0.0f64..=1.0, 12),
        ) {
            let taxonomy = taxonomy();
            let mut findings = absent_findings();
            for (finding, confidence) in findings.iter_mut().zip(&confidences) {
                finding.present = true;
                finding.confidence = *confidence;
            }
            let assessment = score(&findings, &taxonomy);
            prop_assert!(assessment.score >= 0.0);
            prop_assert!(assessment.score <= 100.0);
        }
    }
}
