//! Declarative detection rules and their compiled form.
//!
//! Rules are data, not code: each is a labelled, weighted condition tree
//! built from a handful of composable variants (keyword set, regex pattern,
//! ALL, NOT, NEAR). The taxonomy declares `Condition` trees; `compile`
//! validates them into matchers at load time so a malformed pattern is a
//! startup failure, never a request-time one.

use regex::Regex;

/// Declarative rule condition, evaluated against a single text unit.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Any of the keywords occurs in the unit (case-insensitive substring).
    AnyKeyword(&'static [&'static str]),
    /// The regex matches the unit.
    Pattern(&'static str),
    /// Every sub-condition holds.
    All(Vec<Condition>),
    /// The sub-condition does not hold.
    Not(Box<Condition>),
    /// Both sub-conditions hold with match starts within `window` bytes.
    Near(Box<Condition>, Box<Condition>, usize),
}

impl Condition {
    pub(crate) fn compile(&self) -> Result<Predicate, regex::Error> {
        Ok(match self {
            Condition::AnyKeyword(keywords) => Predicate::AnyKeyword(keywords),
            Condition::Pattern(pattern) => Predicate::Pattern(Regex::new(pattern)?),
            Condition::All(conditions) => Predicate::All(
                conditions
                    .iter()
                    .map(Condition::compile)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Condition::Not(inner) => Predicate::Not(Box::new(inner.compile()?)),
            Condition::Near(a, b, window) => {
                Predicate::Near(Box::new(a.compile()?), Box::new(b.compile()?), *window)
            }
        })
    }
}

/// Convenience constructors for taxonomy definitions.
pub fn any(keywords: &'static [&'static str]) -> Condition {
    Condition::AnyKeyword(keywords)
}

pub fn pattern(pattern: &'static str) -> Condition {
    Condition::Pattern(pattern)
}

pub fn all<const N: usize>(conditions: [Condition; N]) -> Condition {
    Condition::All(conditions.into_iter().collect())
}

pub fn not(condition: Condition) -> Condition {
    Condition::Not(Box::new(condition))
}

pub fn near(a: Condition, b: Condition, window: usize) -> Condition {
    Condition::Near(Box::new(a), Box::new(b), window)
}

/// Compiled condition tree.
#[derive(Debug, Clone)]
pub(crate) enum Predicate {
    AnyKeyword(&'static [&'static str]),
    Pattern(Regex),
    All(Vec<Predicate>),
    Not(Box<Predicate>),
    Near(Box<Predicate>, Box<Predicate>, usize),
}

impl Predicate {
    /// Leftmost match start within the unit, or None.
    fn find(&self, text_lower: &str) -> Option<usize> {
        match self {
            Predicate::AnyKeyword(keywords) => keywords
                .iter()
                .filter_map(|kw| text_lower.find(&kw.to_lowercase()))
                .min(),
            Predicate::Pattern(re) => re.find(text_lower).map(|m| m.start()),
            Predicate::All(preds) => {
                let mut first = None;
                for pred in preds {
                    let hit = pred.find(text_lower)?;
                    first = Some(first.map_or(hit, |f: usize| f.min(hit)));
                }
                first.or(Some(0))
            }
            Predicate::Not(inner) => match inner.find(text_lower) {
                Some(_) => None,
                None => Some(0),
            },
            Predicate::Near(a, b, window) => {
                let pos_a = a.find(text_lower)?;
                let pos_b = b.find(text_lower)?;
                (pos_a.abs_diff(pos_b) <= *window).then_some(pos_a.min(pos_b))
            }
        }
    }
}

/// A compiled detection rule: label, strength in (0, 1], matcher.
#[derive(Debug, Clone)]
pub struct DetectionRule {
    pub label: &'static str,
    pub strength: f64,
    predicate: Predicate,
}

impl DetectionRule {
    pub(crate) fn new(
        label: &'static str,
        strength: f64,
        predicate: Predicate,
    ) -> Self {
        Self {
            label,
            strength,
            predicate,
        }
    }

    /// Evaluate against one normalized unit. Matching is case-insensitive.
    pub fn matches(&self, unit_text: &str) -> bool {
        self.predicate.find(&unit_text.to_lowercase()).is_some()
    }
}
