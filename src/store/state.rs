//! Store state and its transition function.
//!
//! All mutation goes through [`reduce`]: one named action in, one state
//! change out. The function is synchronous and total: invalid requests
//! (unknown product ids, out-of-range discounts) degrade to safe no-ops
//! or clamped values rather than errors.

use crate::catalog::{Catalog, Product};
use crate::search::SearchResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Category value that resets the view to the full product set.
pub const ALL_CATEGORIES: &str = "All";

/// One cart entry: a product and how many of it.
///
/// Invariant: at most one line per product id, quantity ≥ 1. Lines that
/// reach quantity 0 are removed, never stored.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// The product being bought
    pub product: Product,
    /// Units of the product, always ≥ 1
    pub quantity: u32,
}

/// Percentage discount obtained through the negotiation flow.
///
/// Applied multiplicatively after the flat bundle discount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiatedDiscount {
    percent: f64,
    /// Coupon code the negotiation issued, if any
    pub code: Option<String>,
}

impl NegotiatedDiscount {
    /// Create a discount, clamping the percentage into [0, 100].
    pub fn new(percent: f64, code: Option<String>) -> Self {
        Self {
            percent: percent.clamp(0.0, 100.0),
            code,
        }
    }

    /// The clamped percentage.
    pub fn percent(&self) -> f64 {
        self.percent
    }
}

/// View ordering for the visible catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Insertion order (search rank or catalog order)
    #[default]
    Relevance,
    /// Price ascending
    PriceLow,
    /// Price descending
    PriceHigh,
}

/// Named state transitions. Applied strictly in dispatch order.
#[derive(Debug, Clone)]
pub enum StoreAction {
    /// Replace the full product set and the working view wholesale
    SetCatalog(Vec<Product>),
    /// Add a product to the cart, merging into an existing line
    AddToCart { product_id: String, quantity: u32 },
    /// Set a line's quantity; 0 removes the line
    UpdateQuantity { product_id: String, quantity: u32 },
    /// Drop a line from the cart
    RemoveFromCart { product_id: String },
    /// Narrow the view to one category, or `"All"` for everything
    FilterByCategory(String),
    /// Narrow the view from a hybrid search result
    ApplySearchResult(SearchResult),
    /// Reorder the current view
    SetSortOrder(SortOrder),
    /// Set the negotiated discount
    ApplyDiscount { code: Option<String>, percent: f64 },
    /// Empty the cart and clear the discount
    ClearCart,
    /// UI toggle: cart drawer
    SetCartOpen(bool),
    /// UI toggle: search overlay
    SetSearchOpen(bool),
}

/// The single state value the storefront UI observes.
#[derive(Debug, Clone)]
pub struct StoreState {
    /// Full product set for the session
    pub catalog: Arc<Catalog>,
    /// Visible projection of the catalog (filtered/sorted/searched)
    pub view: Vec<Product>,
    /// Category the view is narrowed to
    pub active_category: String,
    /// Ordering applied to the view
    pub sort_order: SortOrder,
    /// Cart contents, one line per product
    pub cart: Vec<CartLine>,
    /// Negotiated discount, if one is active
    pub discount: Option<NegotiatedDiscount>,
    /// Product most recently added to the cart, for UI feedback
    pub last_added: Option<String>,
    /// Whether the cart drawer is open
    pub cart_open: bool,
    /// Whether the search overlay is open
    pub search_open: bool,
}

impl StoreState {
    /// Fresh state over a catalog, with the full set visible.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let view = catalog.products().to_vec();
        Self {
            catalog,
            view,
            active_category: ALL_CATEGORIES.to_string(),
            sort_order: SortOrder::default(),
            cart: Vec::new(),
            discount: None,
            last_added: None,
            cart_open: false,
            search_open: false,
        }
    }

    /// The cart line for a product, if present.
    pub fn cart_line(&self, product_id: &str) -> Option<&CartLine> {
        self.cart.iter().find(|l| l.product.id == product_id)
    }

    /// Ids of the currently visible products, in view order.
    pub fn view_ids(&self) -> Vec<&str> {
        self.view.iter().map(|p| p.id.as_str()).collect()
    }
}

/// Apply one action to the state.
pub fn reduce(state: &mut StoreState, action: StoreAction) {
    match action {
        StoreAction::SetCatalog(products) => {
            let catalog = Arc::new(Catalog::new(products));
            state.view = catalog.products().to_vec();
            state.catalog = catalog;
            state.active_category = ALL_CATEGORIES.to_string();
            apply_sort(&mut state.view, state.sort_order);
        }

        StoreAction::AddToCart {
            product_id,
            quantity,
        } => {
            let Some(product) = state.catalog.get(&product_id).cloned() else {
                warn!(id = %product_id, "AddToCart for unknown product ignored");
                return;
            };
            let quantity = quantity.max(1);
            match state.cart.iter_mut().find(|l| l.product.id == product_id) {
                Some(line) => line.quantity += quantity,
                None => state.cart.push(CartLine { product, quantity }),
            }
            state.last_added = Some(product_id);
            state.cart_open = true;
        }

        StoreAction::UpdateQuantity {
            product_id,
            quantity,
        } => {
            if quantity == 0 {
                state.cart.retain(|l| l.product.id != product_id);
            } else if let Some(line) = state.cart.iter_mut().find(|l| l.product.id == product_id)
            {
                line.quantity = quantity;
            }
        }

        StoreAction::RemoveFromCart { product_id } => {
            state.cart.retain(|l| l.product.id != product_id);
        }

        StoreAction::FilterByCategory(category) => {
            state.active_category = category.clone();
            let mut view: Vec<Product> = if category == ALL_CATEGORIES {
                state.catalog.products().to_vec()
            } else {
                state
                    .catalog
                    .iter()
                    .filter(|p| p.category == category)
                    .cloned()
                    .collect()
            };
            // Never-blank policy: an empty filter result falls back to the
            // full catalog instead of a dead-end view.
            if view.is_empty() {
                debug!(category = %category, "Empty category filter, showing full catalog");
                view = state.catalog.products().to_vec();
            }
            apply_sort(&mut view, state.sort_order);
            state.view = view;
        }

        StoreAction::ApplySearchResult(result) => {
            // An explicit id list from the search cascade takes priority
            // over free-text narrowing.
            if !result.hits.is_empty() {
                let narrowed: Vec<Product> = result
                    .hits
                    .iter()
                    .filter_map(|hit| state.catalog.get(&hit.product_id).cloned())
                    .collect();
                if !narrowed.is_empty() {
                    state.view = narrowed;
                    return;
                }
            }

            // Fall back to lexical narrowing of the current view.
            let needle = result.query.to_lowercase();
            if !needle.is_empty() {
                let narrowed: Vec<Product> = state
                    .view
                    .iter()
                    .filter(|p| p.searchable_text().contains(&needle))
                    .cloned()
                    .collect();
                if !narrowed.is_empty() {
                    state.view = narrowed;
                    return;
                }
            }
            // Never-blank: keep the previous view rather than emptying it.
            debug!(query = %result.query, "Search narrowed to nothing, keeping view");
        }

        StoreAction::SetSortOrder(order) => {
            state.sort_order = order;
            apply_sort(&mut state.view, order);
        }

        StoreAction::ApplyDiscount { code, percent } => {
            state.discount = Some(NegotiatedDiscount::new(percent, code));
        }

        StoreAction::ClearCart => {
            state.cart.clear();
            state.discount = None;
        }

        StoreAction::SetCartOpen(open) => state.cart_open = open,
        StoreAction::SetSearchOpen(open) => state.search_open = open,
    }
}

/// Reorder a view in place. `Relevance` leaves the order untouched.
fn apply_sort(view: &mut [Product], order: SortOrder) {
    match order {
        SortOrder::Relevance => {}
        SortOrder::PriceLow => view.sort_by(|a, b| {
            a.price
                .partial_cmp(&b.price)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        SortOrder::PriceHigh => view.sort_by(|a, b| {
            b.price
                .partial_cmp(&a.price)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{ScoredHit, SearchSource};

    fn product(id: &str, category: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id.to_uppercase()),
            description: String::new(),
            price,
            floor_price: price / 2.0,
            category: category.to_string(),
            image: String::new(),
            tags: Vec::new(),
            embedding: None,
        }
    }

    /// The three-product catalog from the worked scenario:
    /// A: category X, 100; B: category Y, 50; C: category X, 200.
    fn state() -> StoreState {
        StoreState::new(Arc::new(Catalog::new(vec![
            product("a", "X", 100.0),
            product("b", "Y", 50.0),
            product("c", "X", 200.0),
        ])))
    }

    fn add(state: &mut StoreState, id: &str) {
        reduce(
            state,
            StoreAction::AddToCart {
                product_id: id.to_string(),
                quantity: 1,
            },
        );
    }

    #[test]
    fn test_add_to_cart_increments_existing_line() {
        let mut state = state();
        add(&mut state, "a");
        add(&mut state, "a");
        assert_eq!(state.cart.len(), 1, "no duplicate lines");
        assert_eq!(state.cart_line("a").map(|l| l.quantity), Some(2));
    }

    #[test]
    fn test_add_to_cart_sets_last_added_and_opens_cart() {
        let mut state = state();
        add(&mut state, "b");
        assert_eq!(state.last_added.as_deref(), Some("b"));
        assert!(state.cart_open);
    }

    #[test]
    fn test_add_unknown_product_is_ignored() {
        let mut state = state();
        add(&mut state, "nope");
        assert!(state.cart.is_empty());
        assert!(state.last_added.is_none());
    }

    #[test]
    fn test_add_with_explicit_quantity() {
        let mut state = state();
        reduce(
            &mut state,
            StoreAction::AddToCart {
                product_id: "a".to_string(),
                quantity: 3,
            },
        );
        assert_eq!(state.cart_line("a").map(|l| l.quantity), Some(3));
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut state = state();
        add(&mut state, "a");
        reduce(
            &mut state,
            StoreAction::UpdateQuantity {
                product_id: "a".to_string(),
                quantity: 0,
            },
        );
        assert!(state.cart.is_empty());
        assert!(state.cart.iter().all(|l| l.quantity >= 1));
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut state = state();
        add(&mut state, "a");
        reduce(
            &mut state,
            StoreAction::UpdateQuantity {
                product_id: "a".to_string(),
                quantity: 5,
            },
        );
        assert_eq!(state.cart_line("a").map(|l| l.quantity), Some(5));
    }

    #[test]
    fn test_remove_from_cart() {
        let mut state = state();
        add(&mut state, "a");
        add(&mut state, "b");
        reduce(
            &mut state,
            StoreAction::RemoveFromCart {
                product_id: "a".to_string(),
            },
        );
        assert_eq!(state.cart.len(), 1);
        assert!(state.cart_line("a").is_none());
    }

    #[test]
    fn test_filter_by_category_narrows_view() {
        let mut state = state();
        reduce(&mut state, StoreAction::FilterByCategory("X".to_string()));
        assert_eq!(state.view_ids(), vec!["a", "c"]);
    }

    #[test]
    fn test_filter_all_is_idempotent_and_restores_full_view() {
        let mut state = state();
        reduce(&mut state, StoreAction::FilterByCategory("X".to_string()));
        reduce(
            &mut state,
            StoreAction::FilterByCategory(ALL_CATEGORIES.to_string()),
        );
        assert_eq!(state.view_ids(), vec!["a", "b", "c"]);
        reduce(
            &mut state,
            StoreAction::FilterByCategory(ALL_CATEGORIES.to_string()),
        );
        assert_eq!(state.view_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_filter_unknown_category_falls_back_to_full_catalog() {
        let mut state = state();
        reduce(&mut state, StoreAction::FilterByCategory("Z".to_string()));
        assert_eq!(state.view.len(), 3, "never-blank policy");
    }

    #[test]
    fn test_sort_price_low_orders_current_view() {
        let mut state = state();
        reduce(&mut state, StoreAction::FilterByCategory("X".to_string()));
        reduce(&mut state, StoreAction::SetSortOrder(SortOrder::PriceLow));
        assert_eq!(state.view_ids(), vec!["a", "c"]);
        reduce(&mut state, StoreAction::SetSortOrder(SortOrder::PriceHigh));
        assert_eq!(state.view_ids(), vec!["c", "a"]);
    }

    #[test]
    fn test_sort_relevance_leaves_order_untouched() {
        let mut state = state();
        reduce(&mut state, StoreAction::SetSortOrder(SortOrder::PriceHigh));
        assert_eq!(state.view_ids(), vec!["c", "a", "b"]);
        reduce(&mut state, StoreAction::SetSortOrder(SortOrder::Relevance));
        assert_eq!(state.view_ids(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_apply_search_result_uses_id_list_in_rank_order() {
        let mut state = state();
        let result = SearchResult {
            query: "irrelevant".to_string(),
            hits: vec![ScoredHit::scored("c", 0.9), ScoredHit::scored("a", 0.5)],
            source: SearchSource::Remote,
        };
        reduce(&mut state, StoreAction::ApplySearchResult(result));
        assert_eq!(state.view_ids(), vec!["c", "a"]);
    }

    #[test]
    fn test_apply_search_result_ignores_unknown_ids() {
        let mut state = state();
        let result = SearchResult {
            query: String::new(),
            hits: vec![ScoredHit::scored("ghost", 0.9), ScoredHit::scored("b", 0.4)],
            source: SearchSource::Local,
        };
        reduce(&mut state, StoreAction::ApplySearchResult(result));
        assert_eq!(state.view_ids(), vec!["b"]);
    }

    #[test]
    fn test_apply_search_result_falls_back_to_text_narrowing() {
        let mut state = state();
        let result = SearchResult {
            query: "product b".to_string(),
            hits: Vec::new(),
            source: SearchSource::KeywordFallback,
        };
        reduce(&mut state, StoreAction::ApplySearchResult(result));
        assert_eq!(state.view_ids(), vec!["b"]);
    }

    #[test]
    fn test_apply_search_result_keeps_view_when_nothing_matches() {
        let mut state = state();
        let before = state.view_ids().len();
        let result = SearchResult {
            query: "zzgarblezz".to_string(),
            hits: Vec::new(),
            source: SearchSource::KeywordFallback,
        };
        reduce(&mut state, StoreAction::ApplySearchResult(result));
        assert_eq!(state.view.len(), before, "never-blank policy");
    }

    #[test]
    fn test_set_catalog_replaces_wholesale() {
        let mut state = state();
        reduce(&mut state, StoreAction::FilterByCategory("X".to_string()));
        reduce(
            &mut state,
            StoreAction::SetCatalog(vec![product("z", "New", 10.0)]),
        );
        assert_eq!(state.view_ids(), vec!["z"]);
        assert_eq!(state.active_category, ALL_CATEGORIES);
        assert!(state.catalog.get("a").is_none());
    }

    #[test]
    fn test_discount_percent_clamped() {
        let mut state = state();
        reduce(
            &mut state,
            StoreAction::ApplyDiscount {
                code: Some("OVER".to_string()),
                percent: 150.0,
            },
        );
        assert_eq!(state.discount.as_ref().map(|d| d.percent()), Some(100.0));

        reduce(
            &mut state,
            StoreAction::ApplyDiscount {
                code: None,
                percent: -5.0,
            },
        );
        assert_eq!(state.discount.as_ref().map(|d| d.percent()), Some(0.0));
    }

    #[test]
    fn test_clear_cart_empties_lines_and_discount() {
        let mut state = state();
        add(&mut state, "a");
        reduce(
            &mut state,
            StoreAction::ApplyDiscount {
                code: None,
                percent: 10.0,
            },
        );
        reduce(&mut state, StoreAction::ClearCart);
        assert!(state.cart.is_empty());
        assert!(state.discount.is_none());
    }
}
