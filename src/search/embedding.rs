//! Embedding generation via FastEmbed (ONNX-based, lightweight).
//!
//! The underlying model is expensive to initialize (first use downloads the
//! ONNX assets), so the loaded model is a process-wide singleton. Concurrent
//! first callers serialize on an async mutex and converge on a single
//! initialization attempt; a failed attempt leaves the slot empty so the
//! next caller retries from scratch instead of observing a poisoned
//! singleton.

use crate::error::{Error, Result};
use crate::search::EMBEDDING_DIM;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Loaded model, shared process-wide.
type SharedModel = Arc<std::sync::Mutex<TextEmbedding>>;

/// Memoized model slot. Empty until the first successful initialization.
static MODEL_SLOT: tokio::sync::Mutex<Option<SharedModel>> = tokio::sync::Mutex::const_new(None);

/// Query embeddings repeat heavily while a user types; keep recent ones.
const QUERY_CACHE_CAPACITY: u64 = 1024;
const QUERY_CACHE_TTL: Duration = Duration::from_secs(600);

/// Text-to-vector service producing 384-dim L2-normalized embeddings.
///
/// All instances share one underlying model; the service itself only adds
/// a per-instance memo cache for repeated query texts.
#[derive(Clone)]
pub struct EmbeddingService {
    query_cache: Cache<String, Arc<Vec<f32>>>,
}

impl Default for EmbeddingService {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingService {
    /// Create an embedding service.
    ///
    /// Cheap: the model itself is loaded lazily on first embed.
    pub fn new() -> Self {
        Self {
            query_cache: Cache::builder()
                .max_capacity(QUERY_CACHE_CAPACITY)
                .time_to_live(QUERY_CACHE_TTL)
                .build(),
        }
    }

    /// Force model initialization, surfacing the one-time asset download.
    ///
    /// Optional; `embed` initializes on demand.
    pub async fn ensure_ready(&self) -> Result<()> {
        shared_model().await.map(|_| ())
    }

    /// Embed a single text into a 384-dim L2-normalized vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(hit) = self.query_cache.get(text).await {
            debug!(len = text.len(), "Embedding cache hit");
            return Ok((*hit).clone());
        }

        let vector = embed_texts(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Model returned no vectors".to_string()))?;

        self.query_cache
            .insert(text.to_string(), Arc::new(vector.clone()))
            .await;
        Ok(vector)
    }

    /// Embed a batch of texts, uncached.
    ///
    /// Used to warm the local vector cache from product copy.
    pub async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        embed_texts(texts).await
    }
}

/// Get the shared model, initializing it if no attempt has succeeded yet.
///
/// Callers arriving while an initialization is in flight block on the slot
/// lock and reuse its result. An `Err` releases the lock with the slot
/// still empty, so a later call retries.
async fn shared_model() -> Result<SharedModel> {
    let mut slot = MODEL_SLOT.lock().await;
    if let Some(model) = slot.as_ref() {
        return Ok(model.clone());
    }

    info!(
        model = crate::search::DEFAULT_MODEL,
        "Initializing embedding model (first use downloads ONNX assets)"
    );
    let loaded = tokio::task::spawn_blocking(|| {
        TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
    })
    .await
    .map_err(|e| Error::Embedding(format!("Model init task failed: {}", e)))?
    .map_err(|e| Error::Embedding(format!("Model init failed: {}", e)))?;

    let model: SharedModel = Arc::new(std::sync::Mutex::new(loaded));
    *slot = Some(model.clone());
    info!("Embedding model ready");
    Ok(model)
}

/// Run the model over a batch and L2-normalize the outputs.
async fn embed_texts(texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
    let model = shared_model().await?;
    let count = texts.len();

    let mut vectors = tokio::task::spawn_blocking(move || {
        #[allow(unused_mut)]
        let mut guard = match model.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.embed(texts, None)
    })
    .await
    .map_err(|e| Error::Embedding(format!("Embedding task failed: {}", e)))?
    .map_err(|e| Error::Embedding(format!("Embedding failed: {}", e)))?;

    if vectors.len() != count {
        return Err(Error::Embedding(format!(
            "Model returned {} vectors for {} texts",
            vectors.len(),
            count
        )));
    }

    for vector in &mut vectors {
        if vector.len() != EMBEDDING_DIM {
            return Err(Error::Embedding(format!(
                "Expected {}-dim vector, got {}",
                EMBEDDING_DIM,
                vector.len()
            )));
        }
        l2_normalize(vector);
    }
    Ok(vectors)
}

/// Scale a vector to unit length. Zero vectors are left unchanged.
fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
