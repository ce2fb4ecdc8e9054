//! Hybrid product-discovery engine.
//!
//! Resolves a free-text query to a ranked set of product ids using:
//! - FastEmbed for embedding generation (ONNX-based, lightweight)
//! - Qdrant for remote vector similarity search
//! - A local vector cache and a keyword matcher for graceful degradation
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────┐
//! │  User query  │────▶│ EmbeddingService│
//! │    (text)    │     │   (FastEmbed)   │
//! └──────────────┘     └────────┬────────┘
//!                               │
//!                               ▼
//!                       ┌──────────────┐
//!                       │   Embedding  │
//!                       │  [f32; 384]  │
//!                       └──────┬───────┘
//!                              │
//!                              ▼
//!         ┌──────────┐   ┌──────────┐   ┌──────────┐
//!         │  Qdrant  │──▶│  Vector  │──▶│ Keyword  │
//!         │ (remote) │   │  cache   │   │ fallback │
//!         └──────────┘   └──────────┘   └──────────┘
//!               └─── first non-empty list wins ───┘
//!                              │
//!                              ▼
//!                      ┌──────────────┐
//!                      │ SearchResult │
//!                      │   (tagged)   │
//!                      └──────────────┘
//! ```
//!
//! The three stages are tried strictly in order, each exactly once; a
//! stage's failure or empty result falls through to the next. Only an
//! empty catalog can produce an empty final result.

mod driver;
mod embedding;
pub mod hybrid;
mod keyword;
mod local;
mod remote;
pub mod similarity;

pub use driver::SearchDriver;
pub use embedding::EmbeddingService;
pub use hybrid::{
    HybridSearch, PostFilters, ProductMatcher, ScoredHit, SearchQuery, SearchResult, SearchSource,
};
pub use keyword::KeywordMatcher;
pub use local::{LocalVectorMatcher, VectorCache};
pub use remote::RemoteVectorMatcher;

use crate::config::SearchConfig;
use std::sync::Arc;
use tracing::warn;

/// Default embedding model (all-MiniLM-L6-v2 - 384 dimensions, good balance of speed/quality)
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Embedding dimension for the default model
pub const EMBEDDING_DIM: usize = 384;

/// Build the standard remote → local → keyword cascade.
///
/// The remote stage is skipped with a warning when the Qdrant client
/// cannot be constructed; the storefront then degrades to local vector
/// and keyword matching from the start.
pub fn default_cascade(
    config: &SearchConfig,
    embedding: EmbeddingService,
    cache: Arc<VectorCache>,
) -> HybridSearch {
    let mut stages: Vec<Arc<dyn ProductMatcher>> = Vec::with_capacity(3);

    match RemoteVectorMatcher::connect(&config.qdrant_url, &config.collection, embedding.clone()) {
        Ok(remote) => stages.push(Arc::new(remote)),
        Err(e) => {
            warn!("Remote vector stage unavailable: {}", e);
        }
    }
    stages.push(Arc::new(LocalVectorMatcher::new(embedding, cache)));
    stages.push(Arc::new(KeywordMatcher::new()));

    HybridSearch::new(stages)
}
