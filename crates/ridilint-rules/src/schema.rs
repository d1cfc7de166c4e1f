//! Rule file schema definitions
//!
//! Defines the structure of JSON-based lint rules using serde for
//! deserialization. A rule stays plain data until the engine compiles it
//! at filtering time.

use serde::Deserialize;

/// A lint rule as it appears in the JSON rule file.
///
/// The pattern fields hold raw regex fragments supplied by the rule
/// author; they are inserted into the matching expressions unescaped.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRule {
    /// Entity kind this rule applies to (`use`, `class`, `const`,
    /// `property`, `param`, `function`, `var`).
    #[serde(rename = "type")]
    pub kind: String,

    /// Patterns that must all whole-word-match the clause for the rule to
    /// apply at all.
    #[serde(default, rename = "if")]
    pub if_patterns: Option<PatternSet>,

    /// Patterns none of which may whole-word-match the clause.
    #[serde(default, rename = "if not")]
    pub if_not_patterns: Option<PatternSet>,

    /// Pattern the clause must whole-word-match, or the rule fires.
    #[serde(default)]
    pub must: Option<String>,

    /// Pattern the clause must not match (trailing-anchored only), or the
    /// rule fires.
    #[serde(default, rename = "must not")]
    pub must_not: Option<String>,

    /// Human-readable failure reason attached to matched entities.
    pub reason: String,
}

/// One pattern or a list of patterns; both spellings are accepted in the
/// rule file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatternSet {
    One(String),
    Many(Vec<String>),
}

impl PatternSet {
    pub fn patterns(&self) -> &[String] {
        match self {
            PatternSet::One(pattern) => std::slice::from_ref(pattern),
            PatternSet::Many(patterns) => patterns,
        }
    }
}
