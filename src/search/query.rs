//! Query rewriting for the search fallback chain

use crate::text::{collapse_whitespace, is_stop_word};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the search fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStrategy {
    /// The prepared claim as-is
    Direct,
    /// Only alphanumerics and whitespace kept
    Simplified,
    /// Claim followed by the keyword suffix
    KeywordAppended,
    /// Named entities, numbers and acronyms pulled from the claim
    Entities,
}

impl QueryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStrategy::Direct => "direct",
            QueryStrategy::Simplified => "simplified",
            QueryStrategy::KeywordAppended => "keyword_appended",
            QueryStrategy::Entities => "entities",
        }
    }

    /// Build the query this strategy sends, or `None` when it has nothing to offer
    pub fn build(&self, query: &str, keyword_suffix: &str) -> Option<String> {
        let built = match self {
            QueryStrategy::Direct => query.to_string(),
            QueryStrategy::Simplified => simplify_query(query),
            QueryStrategy::KeywordAppended => format!("{} {}", query, keyword_suffix.trim()),
            QueryStrategy::Entities => extract_entities(query).join(" "),
        };
        let built = collapse_whitespace(&built);
        if built.is_empty() {
            None
        } else {
            Some(built)
        }
    }
}

impl fmt::Display for QueryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a claim into the base search query
///
/// Date-range filters are not added: they reduce recall on free search
/// backends.
pub fn prepare_query(claim: &str) -> String {
    collapse_whitespace(claim)
}

/// Drop punctuation and quotes, keeping alphanumerics and whitespace
pub fn simplify_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Pull entity-like tokens out of a claim
///
/// Keeps capitalized words, acronyms and tokens containing digits, in order
/// of first appearance. Stop words never count, which also drops a
/// sentence-case leading "The".
pub fn extract_entities(claim: &str) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();

    for raw in claim.split_whitespace() {
        let token: String = raw
            .trim_matches(|c: char| !c.is_alphanumeric())
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '-')
            .collect();
        if token.is_empty() {
            continue;
        }

        let lower = token.to_lowercase();
        if is_stop_word(&lower) {
            continue;
        }

        let has_digit = token.chars().any(|c| c.is_ascii_digit());
        let capitalized = token.chars().next().map_or(false, |c| c.is_uppercase());

        if (has_digit || capitalized) && !entities.iter().any(|e| e.to_lowercase() == lower) {
            entities.push(token);
        }
    }

    entities
}
