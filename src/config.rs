//! Store configuration.
//!
//! TOML-backed configuration with defaulted sections. The binary loads a
//! config file when one exists and otherwise runs on defaults, so a bare
//! `vitrine search` works out of the box.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Catalog source settings
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Product discovery settings
    #[serde(default)]
    pub search: SearchConfig,
    /// Pricing and discount settings
    #[serde(default)]
    pub pricing: PricingConfig,
}

/// Where the product set comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Optional path to a JSON product file; the built-in seed catalog is
    /// used when unset or unreadable
    pub products_path: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_path: None,
        }
    }
}

/// Hybrid search tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Qdrant endpoint URL for the remote vector stage
    pub qdrant_url: String,
    /// Qdrant collection holding product vectors
    pub collection: String,
    /// Minimum cosine similarity for vector matches
    pub score_threshold: f32,
    /// Maximum results per search pass
    pub limit: usize,
    /// Quiet period for keystroke debouncing, in milliseconds
    pub debounce_ms: u64,
    /// Capacity of the local product-vector cache
    pub vector_cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "products".to_string(),
            score_threshold: 0.35,
            limit: 20,
            debounce_ms: 300,
            vector_cache_capacity: 512,
        }
    }
}

/// Discount parameters for derived pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Flat discount applied once the cart holds enough distinct lines
    pub bundle_discount: f64,
    /// Distinct-line count that activates the bundle discount
    pub bundle_min_lines: usize,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            bundle_discount: 50.0,
            bundle_min_lines: 2,
        }
    }
}

impl StoreConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&contents).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Serialize failed: {}", e)))?;
        std::fs::write(path.as_ref(), contents)?;
        Ok(())
    }
}
