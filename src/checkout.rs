//! Checkout flow and external collaborators.
//!
//! The storefront core stops at handing a cart snapshot, with its
//! already-computed total, to a payment-session creator. The snapshot's
//! `total` is the source of truth for the session amount; the far side
//! must never recompute price from client input. Payment failures are the
//! one class of error surfaced to the caller, with the cart left untouched
//! for retry.

use crate::error::{Error, Result};
use crate::search::SearchSource;
use crate::store::{pricing, StoreAction, StoreEngine};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Opaque user identity used to scope cart/discount persistence.
///
/// Absence of identity never blocks search or cart operations.
pub trait IdentityProvider: Send + Sync {
    /// The current user's opaque id, or `None` for the guest flow.
    fn current_user(&self) -> Option<String>;
}

/// Identity provider for the guest flow.
pub struct GuestIdentity;

impl IdentityProvider for GuestIdentity {
    fn current_user(&self) -> Option<String> {
        None
    }
}

/// One cart line as handed to the payment provider.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

/// Immutable cart snapshot with computed pricing.
#[derive(Debug, Clone, Serialize)]
pub struct CartSnapshot {
    /// Client reference for the checkout attempt
    pub reference: String,
    /// Cart lines at snapshot time
    pub lines: Vec<SnapshotLine>,
    /// Sum of price × quantity
    pub subtotal: f64,
    /// Flat bundle discount applied
    pub bundle_discount: f64,
    /// Negotiated percentage applied after the bundle discount
    pub discount_percent: f64,
    /// Coupon code behind the negotiated discount, if any
    pub coupon_code: Option<String>,
    /// Authoritative session amount, whole currency units
    pub total: u64,
    /// Scoping identity, `None` for guests
    pub customer: Option<String>,
}

/// Redirect handle returned by the payment provider.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    /// Provider-side session id
    pub id: String,
    /// Where to send the user to pay
    pub redirect_url: String,
}

/// External payment-session creator.
#[async_trait]
pub trait PaymentSessionCreator: Send + Sync {
    /// Create a payment session for the snapshot's `total`.
    async fn create_session(&self, snapshot: &CartSnapshot) -> Result<PaymentSession>;
}

/// Search/cart/discount events for the audit trail.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    SearchExecuted {
        query: String,
        source: SearchSource,
        hits: usize,
    },
    DiscountApplied {
        percent: f64,
        code: Option<String>,
    },
    CheckoutStarted {
        reference: String,
        lines: usize,
        total: u64,
    },
    CheckoutCompleted {
        session_id: String,
    },
}

/// Best-effort event sink.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one event. Failures are the sink's problem, not the caller's.
    async fn record(&self, event: AuditEvent) -> Result<()>;
}

/// Default sink: events go to the log.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        info!(event = ?event, "audit");
        Ok(())
    }
}

/// Record an event without blocking the user-facing flow.
///
/// The write happens on a spawned task; a sink failure is logged and
/// dropped.
pub fn audit(sink: &Arc<dyn AuditSink>, event: AuditEvent) {
    let sink = sink.clone();
    tokio::spawn(async move {
        if let Err(e) = sink.record(event).await {
            debug!("Audit sink failure ignored: {}", e);
        }
    });
}

/// Drives checkout against the engine and the payment provider.
pub struct CheckoutFlow {
    engine: Arc<StoreEngine>,
    payments: Arc<dyn PaymentSessionCreator>,
    identity: Arc<dyn IdentityProvider>,
    audit: Arc<dyn AuditSink>,
}

impl CheckoutFlow {
    /// Wire a checkout flow to its collaborators.
    pub fn new(
        engine: Arc<StoreEngine>,
        payments: Arc<dyn PaymentSessionCreator>,
        identity: Arc<dyn IdentityProvider>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            engine,
            payments,
            identity,
            audit,
        }
    }

    /// Snapshot the cart with all pricing computed.
    pub async fn snapshot(&self) -> CartSnapshot {
        let state = self.engine.snapshot().await;
        let config = self.engine.pricing();
        let lines: Vec<SnapshotLine> = state
            .cart
            .iter()
            .map(|l| SnapshotLine {
                product_id: l.product.id.clone(),
                name: l.product.name.clone(),
                unit_price: l.product.price,
                quantity: l.quantity,
            })
            .collect();

        CartSnapshot {
            reference: Uuid::new_v4().to_string(),
            lines,
            subtotal: pricing::subtotal(&state.cart),
            bundle_discount: pricing::bundle_discount(&state.cart, config),
            discount_percent: state.discount.as_ref().map(|d| d.percent()).unwrap_or(0.0),
            coupon_code: state.discount.as_ref().and_then(|d| d.code.clone()),
            total: pricing::total(&state.cart, state.discount.as_ref(), config),
            customer: self.identity.current_user(),
        }
    }

    /// Start a checkout: snapshot the cart and create a payment session.
    ///
    /// Errors propagate to the caller; the cart and discount stay as they
    /// were so the user can retry.
    pub async fn begin(&self) -> Result<PaymentSession> {
        let snapshot = self.snapshot().await;
        if snapshot.lines.is_empty() {
            return Err(Error::Checkout("Cart is empty".to_string()));
        }

        audit(
            &self.audit,
            AuditEvent::CheckoutStarted {
                reference: snapshot.reference.clone(),
                lines: snapshot.lines.len(),
                total: snapshot.total,
            },
        );

        let session = self.payments.create_session(&snapshot).await?;
        info!(session = %session.id, total = snapshot.total, "Payment session created");
        Ok(session)
    }

    /// Finish a checkout: empty the cart and clear the discount.
    pub async fn complete(&self, session: &PaymentSession) {
        self.engine.dispatch(StoreAction::ClearCart).await;
        audit(
            &self.audit,
            AuditEvent::CheckoutCompleted {
                session_id: session.id.clone(),
            },
        );
    }
}
