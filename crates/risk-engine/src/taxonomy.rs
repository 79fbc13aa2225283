//! Static registry of clause categories.
//!
//! Categories are declarative records: id, display name, plain-language
//! explanation, severity tier, risk weight, and a list of detection rules.
//! Adding a category means adding a record here; the detector and scorer
//! never change. `Taxonomy::load()` validates and compiles every rule once
//! at process start.

use std::collections::HashSet;

use shared_types::Severity;

use crate::error::TaxonomyError;
use crate::rule::{all, any, near, not, pattern, Condition, DetectionRule};

/// Phrases that negate a liability clause outright.
const LIABILITY_NEGATIONS: &[&str] = &["no liability shall arise", "shall have no liability"];

const LIABILITY_KEYWORDS: &[&str] = &["liability", "liable"];

const LIMITATION_KEYWORDS: &[&str] = &[
    "limit",
    "limited",
    "cap",
    "capped",
    "exclude",
    "excluded",
    "waive",
    "waives",
];

/// One clause category, immutable after load.
#[derive(Debug, Clone)]
pub struct ClauseCategory {
    pub id: &'static str,
    pub name: &'static str,
    /// Plain-language explanation shown alongside findings.
    pub explanation: &'static str,
    pub tier: Severity,
    pub weight: f64,
    rules: Vec<DetectionRule>,
}

impl ClauseCategory {
    pub fn rules(&self) -> &[DetectionRule] {
        &self.rules
    }
}

/// Read-only clause category registry.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<ClauseCategory>,
}

impl Taxonomy {
    /// Compile and validate the built-in category set.
    pub fn load() -> Result<Self, TaxonomyError> {
        Self::compile(category_defs())
    }

    fn compile(defs: Vec<CategoryDef>) -> Result<Self, TaxonomyError> {
        let mut seen: HashSet<&'static str> = HashSet::new();
        let mut categories = Vec::with_capacity(defs.len());

        for def in defs {
            if !seen.insert(def.id) {
                return Err(TaxonomyError::DuplicateCategory(def.id.to_string()));
            }
            if !(def.weight.is_finite() && def.weight > 0.0) {
                return Err(TaxonomyError::InvalidWeight {
                    category: def.id.to_string(),
                    weight: def.weight,
                });
            }
            if def.rules.is_empty() {
                return Err(TaxonomyError::EmptyRules {
                    category: def.id.to_string(),
                });
            }

            let mut rules = Vec::with_capacity(def.rules.len());
            for rule in def.rules {
                if !(rule.strength > 0.0 && rule.strength <= 1.0) {
                    return Err(TaxonomyError::InvalidStrength {
                        category: def.id.to_string(),
                        rule: rule.label.to_string(),
                        strength: rule.strength,
                    });
                }
                let predicate =
                    rule.when
                        .compile()
                        .map_err(|source| TaxonomyError::InvalidPattern {
                            category: def.id.to_string(),
                            rule: rule.label.to_string(),
                            source,
                        })?;
                rules.push(DetectionRule::new(rule.label, rule.strength, predicate));
            }

            categories.push(ClauseCategory {
                id: def.id,
                name: def.name,
                explanation: def.explanation,
                tier: def.tier,
                weight: def.weight,
                rules,
            });
        }

        Ok(Self { categories })
    }

    /// Categories in stable registry order.
    pub fn categories(&self) -> &[ClauseCategory] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&ClauseCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn rules_for(&self, id: &str) -> Option<&[DetectionRule]> {
        self.get(id).map(ClauseCategory::rules)
    }

    pub fn weight_for(&self, id: &str) -> Option<f64> {
        self.get(id).map(|c| c.weight)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

struct CategoryDef {
    id: &'static str,
    name: &'static str,
    explanation: &'static str,
    tier: Severity,
    weight: f64,
    rules: Vec<RuleDef>,
}

struct RuleDef {
    label: &'static str,
    strength: f64,
    when: Condition,
}

fn rule(label: &'static str, strength: f64, when: Condition) -> RuleDef {
    RuleDef {
        label,
        strength,
        when,
    }
}

/// The built-in category set.
///
/// Weights are per-category policy values pending calibration against a
/// labeled contract corpus; the scorer only assumes they are positive.
fn category_defs() -> Vec<CategoryDef> {
    vec![
        CategoryDef {
            id: "termination",
            name: "Termination",
            explanation:
                "Either side may end this agreement; check how much notice you are owed before \
                 that happens.",
            tier: Severity::Medium,
            weight: 10.0,
            rules: vec![
                rule(
                    "termination-for-convenience",
                    1.0,
                    any(&[
                        "terminate this agreement",
                        "termination of this agreement",
                        "right to terminate",
                        "terminate without cause",
                        "termination for convenience",
                    ]),
                ),
                rule("termination-keyword", 0.6, any(&["terminate", "termination"])),
            ],
        },
        CategoryDef {
            id: "confidentiality",
            name: "Confidentiality",
            explanation:
                "You are agreeing to keep certain information secret, sometimes indefinitely.",
            tier: Severity::Low,
            weight: 5.0,
            rules: vec![
                rule(
                    "confidentiality-clause",
                    1.0,
                    any(&[
                        "confidential information",
                        "non-disclosure",
                        "nondisclosure",
                        "shall keep confidential",
                    ]),
                ),
                rule(
                    "confidentiality-keyword",
                    0.6,
                    any(&["confidential", "confidentiality"]),
                ),
            ],
        },
        CategoryDef {
            id: "payment_terms",
            name: "Payment Terms",
            explanation: "Sets when and how you must pay, including due dates and invoicing.",
            tier: Severity::Medium,
            weight: 10.0,
            rules: vec![
                rule(
                    "payment-obligation",
                    1.0,
                    pattern(r"\b(?:payment|fee|charge)s?\s+(?:is|are|shall be|will be)\s+due\b"),
                ),
                rule(
                    "payment-keyword",
                    0.7,
                    any(&["payment terms", "due date", "payable within", "net 30", "net 45"]),
                ),
            ],
        },
        CategoryDef {
            id: "liability",
            name: "Liability",
            explanation:
                "Limits what you can recover from the provider if something goes wrong, or \
                 shifts losses onto you.",
            tier: Severity::High,
            weight: 20.0,
            rules: vec![
                rule(
                    "liability-limitation",
                    1.0,
                    all([
                        any(LIABILITY_KEYWORDS),
                        any(LIMITATION_KEYWORDS),
                        not(any(LIABILITY_NEGATIONS)),
                    ]),
                ),
                rule(
                    "indemnification",
                    0.9,
                    all([
                        any(&["indemnify", "indemnifies", "indemnification", "hold harmless"]),
                        not(any(LIABILITY_NEGATIONS)),
                    ]),
                ),
                rule(
                    "liability-keyword",
                    0.6,
                    all([any(LIABILITY_KEYWORDS), not(any(LIABILITY_NEGATIONS))]),
                ),
            ],
        },
        CategoryDef {
            id: "dispute_resolution",
            name: "Dispute Resolution",
            explanation:
                "Disagreements go to arbitration or a specific court, which can limit your \
                 options.",
            tier: Severity::Medium,
            weight: 10.0,
            rules: vec![
                rule(
                    "binding-arbitration",
                    1.0,
                    any(&[
                        "binding arbitration",
                        "arbitration",
                        "jury trial waiver",
                        "waive the right to a jury trial",
                        "class action waiver",
                    ]),
                ),
                rule(
                    "governing-law",
                    0.6,
                    any(&["governing law", "exclusive jurisdiction", "courts of"]),
                ),
            ],
        },
        CategoryDef {
            id: "lock_in",
            name: "Lock-in Period",
            explanation: "You may not be able to easily exit or cancel this plan for some time.",
            tier: Severity::Critical,
            weight: 30.0,
            rules: vec![
                rule(
                    "lock-in-period",
                    1.0,
                    any(&[
                        "lock-in",
                        "lock in period",
                        "minimum tenure",
                        "min tenure",
                        "cannot cancel",
                        "minimum commitment period",
                    ]),
                ),
                rule(
                    "early-exit-restriction",
                    0.7,
                    near(
                        any(&["cancel", "cancellation", "exit"]),
                        any(&["not permitted", "prohibited", "shall not be"]),
                        80,
                    ),
                ),
            ],
        },
        CategoryDef {
            id: "foreclosure_fee",
            name: "Foreclosure / Prepayment Charges",
            explanation:
                "If you close the loan or plan early, you may have to pay extra foreclosure or \
                 prepayment charges.",
            tier: Severity::High,
            weight: 18.0,
            rules: vec![rule(
                "foreclosure-charges",
                1.0,
                any(&[
                    "foreclosure",
                    "prepayment",
                    "pre-closure",
                    "pre closure",
                    "early repayment charge",
                ]),
            )],
        },
        CategoryDef {
            id: "penalty",
            name: "Penalty & Late Fees",
            explanation: "If your payment is late, you may need to pay penalty or late fees.",
            tier: Severity::High,
            weight: 18.0,
            rules: vec![
                rule(
                    "late-fees",
                    1.0,
                    any(&[
                        "late fee",
                        "late payment",
                        "penalty",
                        "overdue interest",
                        "default interest",
                    ]),
                ),
                rule(
                    "punitive-interest-rate",
                    0.8,
                    pattern(r"\binterest\s+(?:at|of)\s+\d+(?:\.\d+)?\s*%"),
                ),
            ],
        },
        CategoryDef {
            id: "auto_renewal",
            name: "Automatic Renewal",
            explanation: "The plan may renew automatically unless you cancel it in time.",
            tier: Severity::High,
            weight: 18.0,
            rules: vec![
                rule(
                    "automatic-renewal",
                    1.0,
                    any(&[
                        "automatically renew",
                        "automatically renews",
                        "automatically renewed",
                        "automatic renewal",
                        "auto renewal",
                        "auto-renewal",
                    ]),
                ),
                rule(
                    "renewal-without-notice",
                    0.8,
                    all([
                        any(&["renew", "renews", "renewal"]),
                        not(any(&["written notice"])),
                    ]),
                ),
            ],
        },
        CategoryDef {
            id: "data_sharing",
            name: "Data Sharing & Third-Party Consent",
            explanation: "Your personal data may be shared with other companies or partners.",
            tier: Severity::Medium,
            weight: 12.0,
            rules: vec![
                rule(
                    "third-party-sharing",
                    1.0,
                    any(&[
                        "third party",
                        "third parties",
                        "share your data",
                        "share your information",
                        "marketing purposes",
                        "partners and affiliates",
                    ]),
                ),
                rule(
                    "consent-to-disclosure",
                    0.7,
                    all([
                        any(&["personal data", "personal information"]),
                        any(&["disclose", "disclosure", "transfer"]),
                    ]),
                ),
            ],
        },
        CategoryDef {
            id: "hidden_charges",
            name: "Hidden Charges & Fees",
            explanation: "There might be extra fees that are not clearly visible at first.",
            tier: Severity::Medium,
            weight: 10.0,
            rules: vec![rule(
                "hidden-fees",
                1.0,
                any(&[
                    "processing fee",
                    "non-refundable",
                    "service charge",
                    "additional charges",
                    "maintenance fee",
                    "convenience fee",
                    "handling fee",
                ]),
            )],
        },
        CategoryDef {
            id: "rejection_condition",
            name: "Rejection Conditions",
            explanation:
                "The provider can refuse or reject claims and applications at its discretion.",
            tier: Severity::High,
            weight: 18.0,
            rules: vec![
                rule(
                    "claim-rejection",
                    1.0,
                    all([
                        any(&["claim", "application", "request"]),
                        any(&["reject", "rejected", "refuse", "refused", "denied", "decline"]),
                    ]),
                ),
                rule(
                    "discretion-clause",
                    0.7,
                    any(&["sole discretion", "absolute discretion"]),
                ),
            ],
        },
    ]
}
