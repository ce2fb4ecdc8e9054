//! Local vector matching over an opportunistically built cache.
//!
//! Second stage of the cascade: when the remote endpoint yields nothing
//! (service down, cold collection, or genuinely no hits), the query
//! embedding is scored against every product vector cached so far.

use crate::catalog::{Catalog, Product};
use crate::error::Result;
use crate::search::embedding::EmbeddingService;
use crate::search::hybrid::{ProductMatcher, ScoredHit, SearchQuery, SearchSource};
use crate::search::similarity::cosine_similarity;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// LRU table of product id → embedding, fed as vectors are seen.
pub struct VectorCache {
    entries: Mutex<LruCache<String, Vec<f32>>>,
}

impl VectorCache {
    /// Create a cache holding up to `capacity` product vectors.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Record a product vector observed elsewhere (catalog load, remote
    /// responses, warm-up).
    pub async fn insert(&self, product_id: impl Into<String>, vector: Vec<f32>) {
        self.entries.lock().await.put(product_id.into(), vector);
    }

    /// Whether nothing has been cached yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Number of cached vectors.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Copy out all entries for scoring.
    async fn snapshot(&self) -> Vec<(String, Vec<f32>)> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|(id, v)| (id.clone(), v.clone()))
            .collect()
    }

    /// Fill the cache from a product set.
    ///
    /// Precomputed embeddings are taken as-is; the rest are batch-embedded
    /// from product copy. Returns the number of vectors added.
    pub async fn warm(
        &self,
        embedding: &EmbeddingService,
        products: &[Product],
    ) -> Result<usize> {
        let mut added = 0;
        let mut pending: Vec<&Product> = Vec::new();

        for product in products {
            match &product.embedding {
                Some(vector) => {
                    self.insert(&product.id, vector.clone()).await;
                    added += 1;
                }
                None => pending.push(product),
            }
        }

        if !pending.is_empty() {
            let texts: Vec<String> = pending.iter().map(|p| p.searchable_text()).collect();
            let vectors = embedding.embed_batch(texts).await?;
            for (product, vector) in pending.iter().zip(vectors) {
                self.insert(&product.id, vector).await;
                added += 1;
            }
        }

        debug!(added, "Vector cache warmed");
        Ok(added)
    }
}

/// Rank cache entries against a query vector.
///
/// Threshold, then sort descending, then truncate; post-filters come after.
fn rank_entries(
    query_vector: &[f32],
    entries: &[(String, Vec<f32>)],
    threshold: f32,
    limit: usize,
) -> Vec<ScoredHit> {
    let mut scored: Vec<ScoredHit> = entries
        .iter()
        .map(|(id, vector)| ScoredHit::scored(id, cosine_similarity(query_vector, vector)))
        .filter(|hit| hit.score.unwrap_or(0.0) >= threshold)
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}

/// Second-stage matcher scoring the query against the local vector table.
pub struct LocalVectorMatcher {
    embedding: EmbeddingService,
    cache: Arc<VectorCache>,
}

impl LocalVectorMatcher {
    /// Create a local matcher over a shared vector cache.
    pub fn new(embedding: EmbeddingService, cache: Arc<VectorCache>) -> Self {
        Self { embedding, cache }
    }
}

#[async_trait]
impl ProductMatcher for LocalVectorMatcher {
    fn source(&self) -> SearchSource {
        SearchSource::Local
    }

    async fn attempt(&self, query: &SearchQuery, catalog: &Catalog) -> Result<Vec<ScoredHit>> {
        // An empty cache yields empty immediately, before any embedding work.
        if self.cache.is_empty().await {
            return Ok(Vec::new());
        }

        let query_vector = self.embedding.embed(&query.text).await?;
        let entries = self.cache.snapshot().await;
        let ranked = rank_entries(&query_vector, &entries, query.threshold, query.limit);
        Ok(query.filters.apply(ranked, catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<(String, Vec<f32>)> {
        vec![
            ("a".to_string(), vec![1.0, 0.0]),
            ("b".to_string(), vec![0.8, 0.6]),
            ("c".to_string(), vec![0.0, 1.0]),
        ]
    }

    #[test]
    fn test_rank_orders_by_score_descending() {
        let hits = rank_entries(&[1.0, 0.0], &entries(), 0.0, 10);
        let ids: Vec<_> = hits.iter().map(|h| h.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rank_discards_below_threshold() {
        let hits = rank_entries(&[1.0, 0.0], &entries(), 0.5, 10);
        let ids: Vec<_> = hits.iter().map(|h| h.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let hits = rank_entries(&[1.0, 0.0], &entries(), 0.0, 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product_id, "a");
    }

    #[test]
    fn test_rank_self_similarity_wins() {
        use rand::{Rng, SeedableRng};

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let target: Vec<f32> = (0..32).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let mut entries: Vec<(String, Vec<f32>)> = (0..10)
            .map(|i| {
                let vector = (0..32).map(|_| rng.gen_range(-1.0..1.0)).collect();
                (format!("p{}", i), vector)
            })
            .collect();
        entries.push(("target".to_string(), target.clone()));

        let hits = rank_entries(&target, &entries, -1.0, 1);
        assert_eq!(hits[0].product_id, "target");
    }

    #[test]
    fn test_rank_handles_mismatched_dimensions() {
        let short = vec![("x".to_string(), vec![1.0])];
        // Mismatched lengths score 0 and fall under any positive threshold.
        let hits = rank_entries(&[1.0, 0.0], &short, 0.1, 10);
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cache_short_circuits() {
        let cache = Arc::new(VectorCache::new(8));
        let matcher = LocalVectorMatcher::new(EmbeddingService::new(), cache);
        // With an empty cache no embedding work happens, so this returns
        // instantly even though no model is available in tests.
        let query = SearchQuery::new("headphones", 0.3, 10);
        let hits = matcher
            .attempt(&query, &Catalog::default())
            .await
            .expect("attempt");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_cache_insert_and_len() {
        let cache = VectorCache::new(2);
        assert!(cache.is_empty().await);
        cache.insert("a", vec![1.0]).await;
        cache.insert("b", vec![2.0]).await;
        assert_eq!(cache.len().await, 2);
        // Capacity 2: inserting a third evicts the least recently used.
        cache.insert("c", vec![3.0]).await;
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_warm_uses_precomputed_embeddings_without_model() {
        let cache = VectorCache::new(8);
        let embedding = EmbeddingService::new();
        let products = vec![crate::catalog::Product {
            id: "a".to_string(),
            name: "Aurora".to_string(),
            description: String::new(),
            price: 1.0,
            floor_price: 1.0,
            category: "Audio".to_string(),
            image: String::new(),
            tags: Vec::new(),
            embedding: Some(vec![0.5, 0.5]),
        }];
        let added = cache.warm(&embedding, &products).await.expect("warm");
        assert_eq!(added, 1);
        assert_eq!(cache.len().await, 1);
    }
}
