//! Keystroke-to-search boundary: debouncing and stale-response discard.
//!
//! Every submission takes a fresh sequence number and waits out a quiet
//! period; only the latest submission survives to run a search pass. The
//! orchestrator is stateless per call, so an earlier search that is already
//! in flight cannot be cancelled. Instead its response is checked against
//! the sequence counter and discarded if a newer submission exists,
//! preventing stale overwrites of the view.

use crate::search::hybrid::{HybridSearch, SearchQuery};
use crate::store::{StoreAction, StoreEngine};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Drives searches from user input into the store engine.
pub struct SearchDriver {
    hybrid: Arc<HybridSearch>,
    engine: Arc<StoreEngine>,
    quiet_period: Duration,
    seq: AtomicU64,
}

impl SearchDriver {
    /// Create a driver with the given debounce quiet period.
    pub fn new(hybrid: Arc<HybridSearch>, engine: Arc<StoreEngine>, quiet_period: Duration) -> Self {
        Self {
            hybrid,
            engine,
            quiet_period,
            seq: AtomicU64::new(0),
        }
    }

    /// Submit a query; spawn this per keystroke-triggered change.
    ///
    /// Returns `true` if this submission's result was dispatched, `false`
    /// if it was superseded by a later submission (either during the quiet
    /// period or while the search pass was in flight).
    pub async fn submit(&self, query: SearchQuery) -> bool {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        sleep(self.quiet_period).await;
        if self.seq.load(Ordering::SeqCst) != seq {
            debug!(query = %query.text, "Query superseded during quiet period");
            return false;
        }

        let catalog = self.engine.catalog().await;
        let result = self.hybrid.search(&query, &catalog).await;

        if self.seq.load(Ordering::SeqCst) != seq {
            debug!(query = %query.text, "Stale search response discarded");
            return false;
        }

        self.engine
            .dispatch(StoreAction::ApplySearchResult(result))
            .await;
        true
    }
}
