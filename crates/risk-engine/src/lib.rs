//! Clause detection and risk scoring engine.
//!
//! Takes raw extracted contract text and produces a structured map of which
//! risky clause categories are present plus an aggregate 0-100 risk score.
//! Text extraction and summarization are external collaborators; this crate
//! is the pipeline between them: normalize, detect, score, assemble.

pub mod detect;
pub mod error;
pub mod normalize;
pub mod report;
pub mod rule;
pub mod score;
pub mod taxonomy;

use tracing::debug;

use shared_types::{AnalysisReport, RiskAssessment};

pub use detect::{detect, detect_parallel, DetectorConfig};
pub use error::{MalformedInputError, TaxonomyError};
pub use normalize::{normalize, TextUnit};
pub use report::assemble;
pub use score::score;
pub use taxonomy::{ClauseCategory, Taxonomy};

/// RiskEngine entry point: owns the loaded taxonomy and detector settings
/// and runs the per-document pipeline. No state is shared between documents,
/// so one engine can serve concurrent analyses.
pub struct RiskEngine {
    taxonomy: Taxonomy,
    config: DetectorConfig,
}

impl RiskEngine {
    /// Load and validate the built-in taxonomy. Fails only on a malformed
    /// category definition, which is a startup configuration error.
    pub fn new() -> Result<Self, TaxonomyError> {
        Ok(Self {
            taxonomy: Taxonomy::load()?,
            config: DetectorConfig::default(),
        })
    }

    pub fn with_config(config: DetectorConfig) -> Result<Self, TaxonomyError> {
        Ok(Self {
            taxonomy: Taxonomy::load()?,
            config,
        })
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Run normalize -> detect -> score over raw extracted text.
    pub fn assess(&self, raw_text: &str) -> Result<RiskAssessment, MalformedInputError> {
        let units = normalize::normalize(raw_text)?;
        debug!(units = units.len(), "document normalized");
        let findings = detect::detect_parallel(&units, &self.taxonomy, &self.config);
        Ok(score::score(&findings, &self.taxonomy))
    }

    /// Full pipeline including report assembly. The summary, if any, comes
    /// from the external summarization collaborator.
    pub fn analyze(
        &self,
        raw_text: &str,
        external_summary: Option<String>,
    ) -> Result<AnalysisReport, MalformedInputError> {
        let assessment = self.assess(raw_text)?;
        Ok(report::assemble(raw_text, assessment, external_summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::RiskLevel;

    #[test]
    fn engine_detects_multiple_clause_categories() {
        let engine = RiskEngine::new().unwrap();
        let text = "The plan has a lock-in of twelve months. A non-refundable processing fee \
                    applies. Your data may be shared with third parties.";
        let assessment = engine.assess(text).unwrap();

        let present: Vec<&str> = assessment
            .findings
            .iter()
            .filter(|f| f.present)
            .map(|f| f.category_id.as_str())
            .collect();
        assert!(present.contains(&"lock_in"));
        assert!(present.contains(&"hidden_charges"));
        assert!(present.contains(&"data_sharing"));
        assert!(assessment.score > 60.0);
    }

    #[test]
    fn engine_accepts_benign_document() {
        let engine = RiskEngine::new().unwrap();
        let text = "The parties will meet quarterly to review the project roadmap and agree \
                    on the next milestones together.";
        let assessment = engine.assess(text).unwrap();
        assert_eq!(assessment.level, RiskLevel::Low);
    }

    #[test]
    fn engine_rejects_empty_document() {
        let engine = RiskEngine::new().unwrap();
        assert!(matches!(engine.assess("  \n "), Err(MalformedInputError::Empty)));
    }

    #[test]
    fn analyze_produces_report_without_summary() {
        let engine = RiskEngine::new().unwrap();
        let report = engine
            .analyze("A late fee of $50 applies to overdue payments.", None)
            .unwrap();
        assert!(report.summary.is_none());
        assert_eq!(
            report.assessment.findings.len(),
            engine.taxonomy().len()
        );
    }

    #[test]
    fn assessments_are_reproducible() {
        let engine = RiskEngine::new().unwrap();
        let text = "This agreement automatically renews unless cancelled.";
        let a = engine.assess(text).unwrap();
        let b = engine.assess(text).unwrap();
        assert_eq!(a, b);
    }
}
