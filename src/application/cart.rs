//! Persisted cart store.
//!
//! `CartStore` decorates [`CartState`] with load-on-open and save-after-every-
//! mutation. Storage failures never reach callers: a cart that cannot be
//! restored starts empty, and a failed save leaves the in-memory state
//! authoritative until the next successful write.

use std::sync::RwLock;

use storefront_api_types::{Product, ProductId};
use tracing::{debug, info, warn};

use crate::application::repos::CartStorage;
use crate::cache::lock::{rw_read, rw_write};
use crate::domain::cart::{CartItem, CartState};

const SOURCE: &str = "application::cart";

pub struct CartStore<S> {
    state: RwLock<CartState>,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Restore the cart from `storage`, falling back to an empty cart.
    pub fn open(storage: S) -> Self {
        let state = match storage.load() {
            Ok(Some(state)) => {
                info!(items = state.items.len(), "Restored persisted cart");
                state
            }
            Ok(None) => CartState::default(),
            Err(error) => {
                warn!(error = %error, "Failed to restore cart, starting empty");
                CartState::default()
            }
        };

        Self {
            state: RwLock::new(state),
            storage,
        }
    }

    pub fn add_item(&self, product: Product, quantity: u32) {
        let product_id = product.id;
        self.mutate("add_item", |cart| cart.add_item(product, quantity));
        debug!(product_id, quantity, "Added to cart");
    }

    pub fn remove_item(&self, product_id: ProductId) {
        self.mutate("remove_item", |cart| cart.remove_item(product_id));
    }

    pub fn update_quantity(&self, product_id: ProductId, quantity: i64) {
        self.mutate("update_quantity", |cart| {
            cart.update_quantity(product_id, quantity);
        });
    }

    pub fn clear_cart(&self) {
        self.mutate("clear_cart", CartState::clear);
    }

    pub fn set_is_open(&self, is_open: bool) {
        self.mutate("set_is_open", |cart| cart.set_is_open(is_open));
    }

    pub fn total_items(&self) -> u64 {
        rw_read(&self.state, SOURCE, "total_items").total_items()
    }

    pub fn total_price(&self) -> f64 {
        rw_read(&self.state, SOURCE, "total_price").total_price()
    }

    pub fn is_open(&self) -> bool {
        rw_read(&self.state, SOURCE, "is_open").is_open
    }

    pub fn items(&self) -> Vec<CartItem> {
        rw_read(&self.state, SOURCE, "items").items.clone()
    }

    pub fn snapshot(&self) -> CartState {
        rw_read(&self.state, SOURCE, "snapshot").clone()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // Saving under the write guard keeps persisted order equal to mutation order.
    fn mutate(&self, op: &'static str, apply: impl FnOnce(&mut CartState)) {
        let mut state = rw_write(&self.state, SOURCE, op);
        apply(&mut *state);
        if let Err(error) = self.storage.save(&state) {
            warn!(op, error = %error, "Failed to persist cart");
        }
    }
}
