//! Per-bot pattern compilation and key extraction.

use std::collections::HashSet;

use regex::Regex;

use crate::base::types::InvalidPatternError;

/// Compiled matcher for one bot's key pattern.
///
/// The configured source is wrapped so a key must be preceded by
/// start-of-text or non-word characters; matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    source: String,
    regex: Regex,
}

impl PatternMatcher {
    pub fn compile(pattern: &str) -> Result<Self, InvalidPatternError> {
        let regex = Regex::new(&format!(r"(?i)(?:\A|\W+)({pattern})")).map_err(|source| InvalidPatternError {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern source as configured, without the added wrapping.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// The set of unique keys mentioned in `text`.
    ///
    /// Captures keep their original casing and deduplication is exact-string,
    /// so differently-cased mentions of one key are distinct entries.
    pub fn matches(&self, text: &str) -> HashSet<String> {
        self.regex.captures_iter(text).filter_map(|captures| captures.get(1)).map(|m| m.as_str().to_string()).collect()
    }
}
