pub mod types;

pub use types::{
    AnalysisReport, ClauseFinding, EvidenceSnippet, RiskAssessment, RiskLevel, Severity,
    TextPosition, TierCounts,
};
