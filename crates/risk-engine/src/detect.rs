//! Clause detection over normalized text units.
//!
//! Each taxonomy category is evaluated independently against every unit, so
//! the detector always emits exactly one finding per category and categories
//! can be checked in parallel without cross-talk.

use shared_types::{ClauseFinding, EvidenceSnippet, TextPosition};
use tracing::debug;

use crate::normalize::TextUnit;
use crate::rule::DetectionRule;
use crate::taxonomy::{ClauseCategory, Taxonomy};

/// Confidence contributed by one matching unit at full rule strength.
/// A single strong match lands at 0.5; further matching units push the
/// confidence toward the 1.0 cap.
const UNIT_CONFIDENCE_STEP: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Maximum evidence snippets recorded per category.
    pub max_evidence: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self { max_evidence: 3 }
    }
}

/// Evaluate every category sequentially. One finding per category,
/// in taxonomy order.
pub fn detect(
    units: &[TextUnit],
    taxonomy: &Taxonomy,
    config: &DetectorConfig,
) -> Vec<ClauseFinding> {
    taxonomy
        .categories()
        .iter()
        .map(|category| evaluate_category(category, units, config))
        .collect()
}

/// Evaluate categories on scoped worker threads, bounded by available cores.
///
/// Findings merge back into taxonomy order only after every worker has
/// joined, so callers never observe a partial finding set.
pub fn detect_parallel(
    units: &[TextUnit],
    taxonomy: &Taxonomy,
    config: &DetectorConfig,
) -> Vec<ClauseFinding> {
    let categories = taxonomy.categories();
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(categories.len());

    if workers <= 1 || units.is_empty() {
        return detect(units, taxonomy, config);
    }

    let chunk_size = categories.len().div_ceil(workers);
    let mut findings: Vec<Option<ClauseFinding>> = vec![None; categories.len()];

    std::thread::scope(|scope| {
        let handles: Vec<_> = categories
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|category| evaluate_category(category, units, config))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for (chunk_idx, handle) in handles.into_iter().enumerate() {
            let results = handle.join().expect("detector worker panicked");
            for (offset, finding) in results.into_iter().enumerate() {
                findings[chunk_idx * chunk_size + offset] = Some(finding);
            }
        }
    });

    debug!(categories = categories.len(), workers, "parallel detection merged");

    findings
        .into_iter()
        .map(|f| f.expect("finding missing after worker merge"))
        .collect()
}

fn evaluate_category(
    category: &ClauseCategory,
    units: &[TextUnit],
    config: &DetectorConfig,
) -> ClauseFinding {
    let mut strength_sum = 0.0;
    let mut matched_units = 0usize;
    let mut evidence = Vec::new();

    for unit in units {
        let Some(rule) = best_matching_rule(category.rules(), &unit.text) else {
            continue;
        };
        matched_units += 1;
        strength_sum += rule.strength;
        if evidence.len() < config.max_evidence {
            evidence.push(EvidenceSnippet {
                unit_index: unit.index,
                rule: rule.label.to_string(),
                text: unit.text.clone(),
                position: TextPosition {
                    start_offset: unit.start_offset,
                    end_offset: unit.end_offset,
                },
            });
        }
    }

    let present = matched_units > 0;
    let confidence = if present {
        (UNIT_CONFIDENCE_STEP * strength_sum).min(1.0)
    } else {
        0.0
    };

    ClauseFinding {
        category_id: category.id.to_string(),
        category_name: category.name.to_string(),
        present,
        confidence,
        severity: category.tier,
        evidence,
    }
}

/// Strongest rule matching the unit; ties go to declaration order.
fn best_matching_rule<'a>(
    rules: &'a [DetectionRule],
    unit_text: &str,
) -> Option<&'a DetectionRule> {
    let mut best: Option<&DetectionRule> = None;
    for rule in rules {
        if rule.matches(unit_text) && best.map_or(true, |b| rule.strength > b.strength) {
            best = Some(rule);
        }
    }
    best
}
