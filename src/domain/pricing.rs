//! Order pricing: shipping, tax and grand total derived from cart contents.

use serde::{Deserialize, Serialize};
use storefront_api_types::ProductId;

use super::cart::CartState;

pub const DEFAULT_FREE_SHIPPING_THRESHOLD: f64 = 100.0;
pub const DEFAULT_SHIPPING_FEE: f64 = 9.99;
pub const DEFAULT_TAX_RATE: f64 = 0.08;

/// Shipping and tax rules applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Subtotals strictly above this ship for free.
    pub free_shipping_threshold: f64,
    pub shipping_fee: f64,
    /// Fraction of the subtotal, e.g. `0.08`.
    pub tax_rate: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
            shipping_fee: DEFAULT_SHIPPING_FEE,
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Pricing breakdown shown next to the checkout form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub subtotal: f64,
    pub shipping: f64,
    pub tax: f64,
    pub total: f64,
    /// How much more the shopper must add to qualify for free shipping.
    pub remaining_for_free_shipping: Option<f64>,
}

impl OrderSummary {
    pub fn from_cart(cart: &CartState, policy: &PricingPolicy) -> Self {
        let lines = cart
            .items
            .iter()
            .map(|item| SummaryLine {
                product_id: item.product.id,
                title: item.product.title.clone(),
                quantity: item.quantity,
                unit_price: item.product.price,
                line_total: item.line_total(),
            })
            .collect();

        let subtotal = cart.total_price();
        let shipping = if subtotal > policy.free_shipping_threshold {
            0.0
        } else {
            policy.shipping_fee
        };
        let tax = subtotal * policy.tax_rate;
        let remaining_for_free_shipping =
            (shipping > 0.0).then(|| policy.free_shipping_threshold - subtotal);

        Self {
            lines,
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
            remaining_for_free_shipping,
        }
    }

    pub fn free_shipping(&self) -> bool {
        self.shipping == 0.0
    }
}

/// Render an amount the way the storefront displays prices.
pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}
