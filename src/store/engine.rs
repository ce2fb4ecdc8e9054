//! The owning service around the store state.
//!
//! One engine per session. All mutation funnels through [`StoreEngine::dispatch`],
//! which takes the write lock and applies the transition, so actions are
//! atomic with respect to observers and strictly ordered by dispatch.

use super::pricing;
use super::state::{reduce, StoreAction, StoreState};
use crate::catalog::Catalog;
use crate::config::PricingConfig;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Session-scoped state container for catalog, cart and discounts.
pub struct StoreEngine {
    state: RwLock<StoreState>,
    pricing: PricingConfig,
}

impl StoreEngine {
    /// Create an engine over a loaded catalog.
    pub fn new(catalog: Catalog, pricing: PricingConfig) -> Self {
        Self {
            state: RwLock::new(StoreState::new(Arc::new(catalog))),
            pricing,
        }
    }

    /// Apply one transition.
    pub async fn dispatch(&self, action: StoreAction) {
        debug!(?action, "Dispatching store action");
        let mut state = self.state.write().await;
        reduce(&mut state, action);
    }

    /// Clone of the current state.
    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    /// Current full catalog.
    pub async fn catalog(&self) -> Arc<Catalog> {
        self.state.read().await.catalog.clone()
    }

    /// Derived: sum of price × quantity.
    pub async fn subtotal(&self) -> f64 {
        pricing::subtotal(&self.state.read().await.cart)
    }

    /// Derived: flat discount when the cart holds enough distinct lines.
    pub async fn bundle_discount(&self) -> f64 {
        pricing::bundle_discount(&self.state.read().await.cart, &self.pricing)
    }

    /// Derived: final amount due in whole currency units.
    pub async fn total(&self) -> u64 {
        let state = self.state.read().await;
        pricing::total(&state.cart, state.discount.as_ref(), &self.pricing)
    }

    /// Pricing parameters this engine computes with.
    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }
}
