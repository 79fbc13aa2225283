//! Final report assembly.
//!
//! Pure data composition: the extracted text, the risk assessment, and an
//! optional externally produced summary are bundled into one immutable
//! report. A missing summary degrades the report, it never invalidates it.

use shared_types::{AnalysisReport, RiskAssessment, RiskLevel};

/// Bundle pipeline outputs into the report returned to the caller.
pub fn assemble(
    raw_text: &str,
    assessment: RiskAssessment,
    external_summary: Option<String>,
) -> AnalysisReport {
    let advisory = compose_advisory(&assessment);
    AnalysisReport {
        extracted_text: raw_text.to_string(),
        assessment,
        summary: external_summary,
        advisory,
    }
}

/// Deterministic plain-language paragraph derived from the assessment.
fn compose_advisory(assessment: &RiskAssessment) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(
        match assessment.level {
            RiskLevel::High => {
                "This document has HIGH risk. It contains clauses that can lock you in or \
                 cause significant extra costs."
            }
            RiskLevel::Medium => {
                "This document has MEDIUM risk. It contains some clauses you should review \
                 carefully before signing."
            }
            RiskLevel::Low => {
                "This document appears to have LOW risk based on our checks, but you should \
                 still read it once before signing."
            }
        }
        .to_string(),
    );

    let severe = assessment.tier_counts.critical + assessment.tier_counts.high;
    if severe > 0 {
        parts.push(format!(
            "We found {} high-severity clause(s) (e.g., heavy penalties or long lock-in periods).",
            severe
        ));
    }
    if assessment.tier_counts.medium > 0 {
        parts.push(format!(
            "We also found {} medium-severity clause(s) (such as extra charges or data sharing).",
            assessment.tier_counts.medium
        ));
    }

    parts.push("Review each flagged clause before you decide to sign.".to_string());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{detect, DetectorConfig};
    use crate::normalize::normalize;
    use crate::score::score;
    use crate::taxonomy::Taxonomy;

    fn assessment_for(raw: &str) -> RiskAssessment {
        let taxonomy = Taxonomy::load().unwrap();
        let units = normalize(raw).unwrap();
        let findings = detect(&units, &taxonomy, &DetectorConfig::default());
        score(&findings, &taxonomy)
    }

    #[test]
    fn report_is_complete_without_summary() {
        let raw = "A late fee of $50 applies to overdue payments.";
        let report = assemble(raw, assessment_for(raw), None);

        assert_eq!(report.extracted_text, raw);
        assert!(report.summary.is_none());
        assert!(!report.advisory.is_empty());
    }

    #[test]
    fn external_summary_passes_through() {
        let raw = "A late fee of $50 applies to overdue payments.";
        let summary = "Short plain-language summary.".to_string();
        let report = assemble(raw, assessment_for(raw), Some(summary.clone()));
        assert_eq!(report.summary, Some(summary));
    }

    #[test]
    fn advisory_reflects_risk_level_and_counts() {
        let raw = "This plan has a lock-in of twelve months and a heavy late fee penalty.";
        let report = assemble(raw, assessment_for(raw), None);

        assert!(report.advisory.contains("HIGH risk"));
        assert!(report.advisory.contains("high-severity"));
    }

    #[test]
    fn advisory_for_clean_document_is_reassuring() {
        let raw = "The parties will meet quarterly to discuss the roadmap.";
        let report = assemble(raw, assessment_for(raw), None);
        assert!(report.advisory.contains("LOW risk"));
    }
}
