//! Crate-wide error type.
//!
//! Only boundary operations surface errors: configuration, catalog loading,
//! embedding-model initialization, and checkout-adjacent external calls.
//! Search-internal failures (remote endpoint down, malformed payloads) are
//! absorbed by the matchers and never reach callers as errors.

use thiserror::Error;

/// Errors surfaced by the storefront core.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read, written, or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding model failed to initialize or produce a vector
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Catalog store could not deliver a product set
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Payment-session creation or checkout persistence failed.
    /// The cart is left untouched so the operation can be retried.
    #[error("Checkout error: {0}")]
    Checkout(String),

    /// External API call failed
    #[error("API error: {0}")]
    Api(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for storefront operations.
pub type Result<T> = std::result::Result<T, Error>;
