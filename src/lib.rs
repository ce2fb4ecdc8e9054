//! Vitrine storefront core.
//!
//! The cart, pricing, and product-discovery logic of a retail storefront,
//! independent of any UI. Two subsystems carry the weight:
//!
//! - [`search`]: a hybrid product-discovery engine that resolves free-text
//!   queries through a remote vector → local vector → keyword fallback
//!   cascade, never leaving the user without results.
//! - [`store`]: a reducer-style state engine owning the catalog view, cart
//!   contents and negotiated discounts, with pricing derived on read.
//!
//! Rendering, routing, payment capture and persistence internals are out
//! of scope; they appear only as trait seams in [`catalog`] and
//! [`checkout`].

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod search;
pub mod store;

pub use catalog::{default_catalog, Catalog, CatalogStore, JsonFileStore, Product};
pub use checkout::{
    audit, AuditEvent, AuditSink, CartSnapshot, CheckoutFlow, GuestIdentity, IdentityProvider,
    PaymentSession, PaymentSessionCreator, TracingAuditSink,
};
pub use config::{CatalogConfig, PricingConfig, SearchConfig, StoreConfig};
pub use error::{Error, Result};
pub use search::{
    default_cascade, EmbeddingService, HybridSearch, KeywordMatcher, LocalVectorMatcher,
    PostFilters, ProductMatcher, RemoteVectorMatcher, ScoredHit, SearchDriver, SearchQuery,
    SearchResult, SearchSource, VectorCache, DEFAULT_MODEL, EMBEDDING_DIM,
};
pub use store::{
    CartLine, NegotiatedDiscount, SortOrder, StoreAction, StoreEngine, StoreState, ALL_CATEGORIES,
};
