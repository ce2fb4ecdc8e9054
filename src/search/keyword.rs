//! Lexical keyword matching, the terminal fallback stage.
//!
//! Recall over precision: a product matches if its searchable text contains
//! ANY surviving query token. This stage runs when both vector stages came
//! up empty, so returning too much beats returning nothing. Results keep
//! catalog order and carry no score.

use crate::catalog::{Catalog, Product};
use crate::error::Result;
use crate::search::hybrid::{ProductMatcher, ScoredHit, SearchQuery, SearchSource};
use async_trait::async_trait;
use tracing::debug;

/// Tokens never worth matching on.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "you", "your",
    "our", "can", "has", "have", "had", "not", "but", "all", "any", "get", "its", "per", "new",
];

/// Minimum token length kept after stop-word removal.
const MIN_TOKEN_LEN: usize = 3;

/// Last-resort lexical matcher.
pub struct KeywordMatcher;

impl KeywordMatcher {
    /// Create a keyword matcher.
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase alphanumeric tokens, minus stop words and short tokens.
fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !STOP_WORDS.contains(t))
        .map(String::from)
        .collect()
}

#[async_trait]
impl ProductMatcher for KeywordMatcher {
    fn source(&self) -> SearchSource {
        SearchSource::KeywordFallback
    }

    async fn attempt(&self, query: &SearchQuery, catalog: &Catalog) -> Result<Vec<ScoredHit>> {
        let tokens = tokenize(&query.text);

        // OR semantics: any surviving token anywhere in the product text.
        let mut candidates: Vec<&Product> = if tokens.is_empty() {
            catalog.iter().collect()
        } else {
            catalog
                .iter()
                .filter(|p| {
                    let text = p.searchable_text();
                    tokens.iter().any(|t| text.contains(t.as_str()))
                })
                .collect()
        };

        // No lexical match at the last-resort stage: fall back to the full
        // catalog rather than a dead-end empty list.
        if candidates.is_empty() {
            debug!(query = %query.text, "No keyword candidates, using full catalog");
            candidates = catalog.iter().collect();
        }

        let filtered: Vec<ScoredHit> = candidates
            .iter()
            .filter(|p| query.filters.matches(p))
            .map(|p| ScoredHit::unscored(&p.id))
            .collect();

        // Post-filters emptied the set: return the unfiltered candidates
        // instead of zero results from the terminal fallback.
        if filtered.is_empty() {
            return Ok(candidates
                .iter()
                .map(|p| ScoredHit::unscored(&p.id))
                .collect());
        }
        Ok(filtered)
    }
}
