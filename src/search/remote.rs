//! Remote vector matching against a Qdrant collection.
//!
//! First stage of the cascade. The collection is expected to hold one point
//! per product with a `product_id` string payload field. Every failure mode
//! here (embedding, transport, endpoint, malformed payload) degrades to
//! an empty result so the orchestrator can fall through; the storefront
//! must keep answering searches while the vector service is down.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::search::embedding::EmbeddingService;
use crate::search::hybrid::{ProductMatcher, ScoredHit, SearchQuery, SearchSource};
use async_trait::async_trait;
use qdrant_client::qdrant::{value::Kind, ScoredPoint, SearchPointsBuilder};
use qdrant_client::Qdrant;
use tracing::{debug, warn};

/// Payload field carrying the product id on each indexed point.
const PRODUCT_ID_FIELD: &str = "product_id";

/// First-stage matcher querying the external similarity-search endpoint.
pub struct RemoteVectorMatcher {
    client: Qdrant,
    collection: String,
    embedding: EmbeddingService,
}

impl RemoteVectorMatcher {
    /// Build a matcher for the given Qdrant endpoint and collection.
    ///
    /// Fails only on malformed endpoint URLs; an unreachable endpoint
    /// surfaces later as empty search results, not as an error here.
    pub fn connect(
        url: &str,
        collection: impl Into<String>,
        embedding: EmbeddingService,
    ) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| crate::error::Error::Api(format!("Qdrant client setup failed: {}", e)))?;
        Ok(Self {
            client,
            collection: collection.into(),
            embedding,
        })
    }
}

/// Pull the product id out of a scored point's payload.
fn product_id_of(point: &ScoredPoint) -> Option<String> {
    match point
        .payload
        .get(PRODUCT_ID_FIELD)
        .and_then(|value| value.kind.as_ref())
    {
        Some(Kind::StringValue(id)) => Some(id.clone()),
        _ => None,
    }
}

#[async_trait]
impl ProductMatcher for RemoteVectorMatcher {
    fn source(&self) -> SearchSource {
        SearchSource::Remote
    }

    async fn attempt(&self, query: &SearchQuery, catalog: &Catalog) -> Result<Vec<ScoredHit>> {
        let query_vector = match self.embedding.embed(&query.text).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!("Remote stage could not embed query: {}", e);
                return Ok(Vec::new());
            }
        };

        let request = SearchPointsBuilder::new(
            self.collection.clone(),
            query_vector,
            query.limit as u64,
        )
        .score_threshold(query.threshold)
        .with_payload(true);

        let response = match self.client.search_points(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(collection = %self.collection, "Remote search failed: {}", e);
                return Ok(Vec::new());
            }
        };

        let mut hits = Vec::with_capacity(response.result.len());
        for point in &response.result {
            match product_id_of(point) {
                Some(product_id) => hits.push(ScoredHit::scored(product_id, point.score)),
                None => {
                    debug!("Skipping point without {} payload", PRODUCT_ID_FIELD);
                }
            }
        }

        // Category/price narrowing happens client-side after retrieval.
        Ok(query.filters.apply(hits, catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::Value;

    fn point_with_payload(key: &str, id: &str, score: f32) -> ScoredPoint {
        let mut point = ScoredPoint {
            score,
            ..Default::default()
        };
        point.payload.insert(
            key.to_string(),
            Value {
                kind: Some(Kind::StringValue(id.to_string())),
            },
        );
        point
    }

    #[test]
    fn test_product_id_extracted_from_payload() {
        let point = point_with_payload(PRODUCT_ID_FIELD, "prod-1", 0.9);
        assert_eq!(product_id_of(&point), Some("prod-1".to_string()));
    }

    #[test]
    fn test_missing_payload_field_yields_none() {
        let point = point_with_payload("other_field", "prod-1", 0.9);
        assert_eq!(product_id_of(&point), None);
    }

    #[test]
    fn test_non_string_payload_yields_none() {
        let mut point = ScoredPoint::default();
        point.payload.insert(
            PRODUCT_ID_FIELD.to_string(),
            Value {
                kind: Some(Kind::IntegerValue(42)),
            },
        );
        assert_eq!(product_id_of(&point), None);
    }

    #[tokio::test]
    async fn test_connect_accepts_local_endpoint() {
        // Client construction is lazy; no endpoint needs to be listening.
        let matcher =
            RemoteVectorMatcher::connect("http://localhost:6334", "products", EmbeddingService::new());
        assert!(matcher.is_ok());
    }
}
