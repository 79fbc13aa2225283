use thiserror::Error;

/// Input to the normalizer could not be analyzed at all.
///
/// Anything past this gate is best-effort: messy extraction artifacts never
/// abort an analysis, only missing or undecodable text does.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedInputError {
    #[error("document text is empty")]
    Empty,
    #[error("document text is not decodable text")]
    Undecodable,
}

/// A malformed taxonomy definition.
///
/// Raised only by `Taxonomy::load()` at process start. Detection and scoring
/// are total functions once the taxonomy has loaded.
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("duplicate category id '{0}'")]
    DuplicateCategory(String),

    #[error("category '{category}' has no detection rules")]
    EmptyRules { category: String },

    #[error("category '{category}' rule '{rule}': invalid pattern: {source}")]
    InvalidPattern {
        category: String,
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("category '{category}' rule '{rule}': strength {strength} outside (0, 1]")]
    InvalidStrength {
        category: String,
        rule: String,
        strength: f64,
    },

    #[error("category '{category}': weight {weight} must be positive")]
    InvalidWeight { category: String, weight: f64 },
}
