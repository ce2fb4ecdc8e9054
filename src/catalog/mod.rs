//! Product catalog: the immutable working set for a session.
//!
//! Products are fetched once at session start from a [`CatalogStore`] and
//! replaced wholesale on refresh. A store failure never leaves the session
//! empty: [`load_with_fallback`] degrades to the built-in seed catalog.

mod seed;

pub use seed::default_catalog;

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// A single sellable product.
///
/// Immutable once loaded into a session's [`Catalog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique, stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// List price in currency units
    pub price: f64,
    /// Lowest price negotiation may reach
    pub floor_price: f64,
    /// Category name, matched exactly by filters
    pub category: String,
    /// Image reference (URL or asset key)
    pub image: String,
    /// Free-form tags, searchable
    #[serde(default)]
    pub tags: Vec<String>,
    /// Precomputed embedding vector, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Product {
    /// Concatenated lowercase text the keyword matcher scans.
    pub fn searchable_text(&self) -> String {
        let mut text = format!(
            "{} {} {}",
            self.name.to_lowercase(),
            self.description.to_lowercase(),
            self.category.to_lowercase()
        );
        for tag in &self.tags {
            text.push(' ');
            text.push_str(&tag.to_lowercase());
        }
        text
    }
}

/// The full product set for a session, with an id index.
///
/// Shared as `Arc<Catalog>` snapshots; replaced wholesale on refresh.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from a product list.
    ///
    /// Later duplicates of an id are dropped with a warning; ids must be
    /// unique and stable.
    pub fn new(products: Vec<Product>) -> Self {
        let mut deduped: Vec<Product> = Vec::with_capacity(products.len());
        let mut index = HashMap::with_capacity(products.len());
        for product in products {
            if index.contains_key(&product.id) {
                warn!(id = %product.id, "Duplicate product id dropped from catalog");
                continue;
            }
            index.insert(product.id.clone(), deduped.len());
            deduped.push(product);
        }
        Self {
            products: deduped,
            index,
        }
    }

    /// Look up a product by id.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.index.get(id).map(|&i| &self.products[i])
    }

    /// All products in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Iterate products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// External catalog store: bulk read of the current product set.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch the full product set.
    async fn fetch_products(&self) -> Result<Vec<Product>>;
}

/// Catalog store backed by a JSON product file.
pub struct JsonFileStore {
    path: std::path::PathBuf,
}

impl JsonFileStore {
    /// Create a store reading from the given JSON file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        let path = self.path.clone();
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::Catalog(format!("Read {} failed: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Catalog(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Fetch the product set, falling back to the seed catalog on failure.
///
/// The core must keep operating when the store is unreachable, so this
/// never returns an error and never returns an empty working set unless
/// the store succeeded with an explicitly empty list.
pub async fn load_with_fallback(store: &dyn CatalogStore) -> Catalog {
    match store.fetch_products().await {
        Ok(products) => {
            info!(count = products.len(), "Catalog loaded from store");
            Catalog::new(products)
        }
        Err(e) => {
            warn!("Catalog store unavailable, using seed catalog: {}", e);
            Catalog::new(default_catalog())
        }
    }
}
