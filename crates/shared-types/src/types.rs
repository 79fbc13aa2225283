/// Severity tier assigned to each clause category.
///
/// Variant order matters: derived `Ord` ranks `Low < Medium < High < Critical`,
/// which the scorer relies on when sorting findings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextPosition {
    pub start_offset: usize, // Character offset into the original document
    pub end_offset: usize,   // End character offset
}

/// A span of source text supporting a finding, traceable to the original
/// document via its position.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EvidenceSnippet {
    pub unit_index: usize,
    /// Label of the strongest rule that matched this unit.
    pub rule: String,
    pub text: String,
    pub position: TextPosition,
}

/// Result of evaluating one clause category against a whole document.
///
/// Absence is represented explicitly (`present = false`), never by omission:
/// a detection pass yields exactly one finding per taxonomy category.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClauseFinding {
    pub category_id: String,
    pub category_name: String,
    pub present: bool,
    pub confidence: f64,
    pub severity: Severity,
    pub evidence: Vec<EvidenceSnippet>,
}

/// Tally of present findings per severity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TierCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl TierCounts {
    pub fn bump(&mut self, tier: Severity) {
        match tier {
            Severity::Low => self.low += 1,
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
            Severity::Critical => self.critical += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.critical
    }
}

/// Coarse overall risk bucket derived from the 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Thresholds: score < 30 is low, < 70 is medium, otherwise high.
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            RiskLevel::Low
        } else if score < 70.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Terminal artifact of the scoring stage for one document.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskAssessment {
    /// Overall risk score on a 0-100 scale, higher = riskier.
    pub score: f64,
    pub level: RiskLevel,
    pub tier_counts: TierCounts,
    /// Findings sorted by severity (descending), then category id.
    pub findings: Vec<ClauseFinding>,
}

/// Final report returned to the caller: the assessment plus the extracted
/// text it was derived from, an optional externally produced summary, and a
/// locally composed advisory paragraph.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisReport {
    pub extracted_text: String,
    pub assessment: RiskAssessment,
    /// Absent when the summarization service failed, timed out, or was not
    /// configured. Absence degrades the report, it does not invalidate it.
    pub summary: Option<String>,
    pub advisory: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_tiers_are_ordered() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(29.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(69.9), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(70.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::High);
    }

    #[test]
    fn tier_counts_tally() {
        let mut counts = TierCounts::default();
        counts.bump(Severity::Critical);
        counts.bump(Severity::Medium);
        counts.bump(Severity::Medium);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.medium, 2);
        assert_eq!(counts.total(), 3);
    }
}
