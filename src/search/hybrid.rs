//! Hybrid search orchestration.
//!
//! Runs an ordered cascade of matching strategies (remote vector, local
//! vector, keyword) and returns the first non-empty ranked list, tagged
//! with the stage that produced it. Stage failures are absorbed: the
//! orchestrator's contract is "always produce some list", and the only
//! empty outcome is an empty catalog where even the terminal keyword
//! fallback has nothing to offer.

use crate::catalog::{Catalog, Product};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Which stage of the cascade produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchSource {
    /// Remote similarity-search endpoint
    Remote,
    /// Locally cached vector table
    Local,
    /// Lexical last-resort fallback
    KeywordFallback,
}

impl SearchSource {
    /// Stable lowercase tag for logs and audit events.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSource::Remote => "remote",
            SearchSource::Local => "local",
            SearchSource::KeywordFallback => "keyword-fallback",
        }
    }
}

impl fmt::Display for SearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side filters applied after candidate retrieval.
#[derive(Debug, Clone, Default)]
pub struct PostFilters {
    /// Exact category match
    pub category: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
}

impl PostFilters {
    /// Whether a product passes every configured filter.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        true
    }

    /// Drop hits whose product fails a filter or is absent from the catalog.
    pub fn apply(&self, hits: Vec<ScoredHit>, catalog: &Catalog) -> Vec<ScoredHit> {
        hits.into_iter()
            .filter(|hit| {
                catalog
                    .get(&hit.product_id)
                    .map(|p| self.matches(p))
                    .unwrap_or(false)
            })
            .collect()
    }
}

/// One search request through the cascade.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Free-text user query
    pub text: String,
    /// Minimum similarity for vector stages
    pub threshold: f32,
    /// Result-count cap per stage
    pub limit: usize,
    /// Filters applied client-side by every stage
    pub filters: PostFilters,
}

impl SearchQuery {
    /// Build a query with the given vector threshold and result cap.
    pub fn new(text: impl Into<String>, threshold: f32, limit: usize) -> Self {
        Self {
            text: text.into(),
            threshold,
            limit,
            filters: PostFilters::default(),
        }
    }

    /// Restrict results to one category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.filters.category = Some(category.into());
        self
    }

    /// Restrict results to a price range.
    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.filters.min_price = min;
        self.filters.max_price = max;
        self
    }
}

/// A matched product with its similarity score.
///
/// Vector stages score in [-1, 1]; the keyword stage is unscored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHit {
    /// Matched product id
    pub product_id: String,
    /// Similarity score, `None` for lexical matches
    pub score: Option<f32>,
}

impl ScoredHit {
    /// A vector-scored hit.
    pub fn scored(product_id: impl Into<String>, score: f32) -> Self {
        Self {
            product_id: product_id.into(),
            score: Some(score),
        }
    }

    /// An unscored lexical hit.
    pub fn unscored(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            score: None,
        }
    }
}

/// Ranked outcome of one orchestrator invocation.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The query text that produced this result
    pub query: String,
    /// Ranked hits, best first
    pub hits: Vec<ScoredHit>,
    /// Stage that produced the hits
    pub source: SearchSource,
}

impl SearchResult {
    /// Whether no stage produced a hit (empty-catalog degenerate case).
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Matched product ids in rank order.
    pub fn product_ids(&self) -> Vec<String> {
        self.hits.iter().map(|h| h.product_id.clone()).collect()
    }
}

/// One strategy in the fallback chain.
///
/// Implementations must confine failures to their own stage: an `Err`
/// from `attempt` is logged by the orchestrator and treated exactly like
/// an empty list.
#[async_trait]
pub trait ProductMatcher: Send + Sync {
    /// The source tag this stage stamps on its results.
    fn source(&self) -> SearchSource;

    /// Try to match products for the query. Ranked best-first.
    async fn attempt(&self, query: &SearchQuery, catalog: &Catalog) -> Result<Vec<ScoredHit>>;
}

/// Ordered strategy cascade with fall-through semantics.
pub struct HybridSearch {
    stages: Vec<Arc<dyn ProductMatcher>>,
}

impl HybridSearch {
    /// Build an orchestrator from an ordered list of stages.
    pub fn new(stages: Vec<Arc<dyn ProductMatcher>>) -> Self {
        Self { stages }
    }

    /// Number of stages in the chain.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Run the cascade: each stage is tried exactly once, in order, and
    /// the first non-empty list wins.
    pub async fn search(&self, query: &SearchQuery, catalog: &Catalog) -> SearchResult {
        for stage in &self.stages {
            match stage.attempt(query, catalog).await {
                Ok(hits) if !hits.is_empty() => {
                    debug!(
                        stage = stage.source().as_str(),
                        hits = hits.len(),
                        "Search stage produced results"
                    );
                    return SearchResult {
                        query: query.text.clone(),
                        hits,
                        source: stage.source(),
                    };
                }
                Ok(_) => {
                    debug!(
                        stage = stage.source().as_str(),
                        "Search stage empty, falling through"
                    );
                }
                Err(e) => {
                    warn!(
                        stage = stage.source().as_str(),
                        "Search stage failed, falling through: {}", e
                    );
                }
            }
        }

        // Reachable only when the catalog itself is empty: the keyword
        // stage otherwise guarantees a non-empty candidate set.
        SearchResult {
            query: query.text.clone(),
            hits: Vec::new(),
            source: SearchSource::KeywordFallback,
        }
    }
}
