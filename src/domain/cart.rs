//! Cart contents and their derived totals.
//!
//! `CartState` holds no I/O. Persistence wraps it in
//! [`crate::application::cart::CartStore`].

use serde::{Deserialize, Serialize};
use storefront_api_types::{Product, ProductId};

/// A product snapshot and how many of it the shopper wants.
///
/// The product is copied at add time; later catalog edits do not change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line at the snapshotted unit price.
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// Cart contents in display order plus the sidebar visibility flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub is_open: bool,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `product`, merging with an existing line for the same id.
    ///
    /// A zero quantity leaves the cart untouched. Stock limits are not enforced here.
    pub fn add_item(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.position(product.id) {
            Some(index) => {
                let item = &mut self.items[index];
                item.quantity = item.quantity.saturating_add(quantity);
            }
            None => self.items.push(CartItem { product, quantity }),
        }
    }

    pub fn remove_item(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product.id != product_id);
    }

    /// Set the quantity of an existing line; zero or negative removes it.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product_id)
        {
            item.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn set_is_open(&mut self, is_open: bool) {
        self.is_open = is_open;
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price * quantity` at full precision; round only for display.
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product.id == product_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: ProductId, price: f64) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            description: String::new(),
            price,
            discount_percentage: 0.0,
            rating: 0.0,
            stock: 10,
            brand: "Acme".to_string(),
            category: "misc".to_string(),
            thumbnail: String::new(),
            images: Vec::new(),
        }
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 2.0), 1);
        cart.add_item(product(1, 2.0), 3);
        cart.add_item(product(1, 2.0), 2);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 6);
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut cart = CartState::new();
        cart.add_item(product(3, 1.0), 1);
        cart.add_item(product(1, 1.0), 1);
        cart.add_item(product(3, 1.0), 1);

        let ids: Vec<ProductId> = cart.items.iter().map(|i| i.product.id).collect();
        assert_eq!(ids, [3, 1]);
    }

    #[test]
    fn zero_quantity_add_is_ignored() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 2.0), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn add_saturates_instead_of_overflowing() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 1.0), u32::MAX);
        cart.add_item(product(1, 1.0), 5);
        assert_eq!(cart.items[0].quantity, u32::MAX);
    }

    #[test]
    fn update_to_zero_or_negative_removes() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 2.0), 2);
        cart.add_item(product(2, 2.0), 2);

        cart.update_quantity(1, 0);
        cart.update_quantity(2, -5);

        assert!(cart.is_empty());
    }

    #[test]
    fn update_of_absent_product_is_noop() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 2.0), 2);
        cart.update_quantity(9, 4);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 2.0), 1);
        cart.remove_item(42);
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let cart = CartState::new();
        assert_eq!(cart.total_items(), 0);
        assert!(cart.total_price().abs() < f64::EPSILON);
    }

    #[test]
    fn totals_follow_worked_example() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 10.0), 2);
        cart.add_item(product(2, 5.0), 1);
        cart.update_quantity(1, 3);

        let lines: Vec<(ProductId, u32)> = cart
            .items
            .iter()
            .map(|i| (i.product.id, i.quantity))
            .collect();
        assert_eq!(lines, [(1, 3), (2, 1)]);
        assert_eq!(cart.total_items(), 4);
        assert!((cart.total_price() - 35.0).abs() < 1e-9);
    }

    #[test]
    fn total_price_uses_snapshotted_price() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 10.0), 1);
        // A later add carrying a new catalog price does not reprice the line.
        cart.add_item(product(1, 99.0), 1);
        assert!((cart.total_price() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn clear_keeps_visibility() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 1.0), 1);
        cart.set_is_open(true);
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.is_open);
    }

    #[test]
    fn state_serializes_camel_case() {
        let mut cart = CartState::new();
        cart.set_is_open(true);
        let json = serde_json::to_value(&cart).expect("serialize cart");
        assert_eq!(json["isOpen"], serde_json::Value::Bool(true));
        assert!(json["items"].as_array().is_some_and(Vec::is_empty));
    }
}
