//! Catalog/cart state engine.
//!
//! A reducer-style state machine: the UI dispatches named [`StoreAction`]s
//! into a session-scoped [`StoreEngine`], which applies them strictly in
//! order through a single transition function. Pricing values (subtotal,
//! bundle discount, total) are derived on read, never stored.

mod engine;
pub mod pricing;
mod state;

pub use engine::StoreEngine;
pub use state::{
    reduce, CartLine, NegotiatedDiscount, SortOrder, StoreAction, StoreState, ALL_CATEGORIES,
};
