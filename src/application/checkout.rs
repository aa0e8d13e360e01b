//! Simulated order placement.
//!
//! No payment is taken: the service validates the shopper's details, waits a
//! fixed processing delay, issues an order number and empties the cart.

use std::time::Duration;

use serde::Serialize;
use storefront_api_types::ValidationErrors;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::cart::CartStore;
use crate::application::repos::CartStorage;
use crate::domain::cart::CartItem;
use crate::domain::checkout::CheckoutDetails;
use crate::domain::pricing::{OrderSummary, PricingPolicy};

pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_secs(2);
const ORDER_NUMBER_LEN: usize = 9;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cannot check out an empty cart")]
    EmptyCart,
    #[error("invalid checkout details: {0}")]
    Invalid(#[from] ValidationErrors),
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order_number: String,
    #[serde(with = "time::serde::rfc3339")]
    pub placed_at: OffsetDateTime,
    pub email: String,
    pub items: Vec<CartItem>,
    pub summary: OrderSummary,
}

#[derive(Debug, Clone)]
pub struct CheckoutService {
    policy: PricingPolicy,
    processing_delay: Duration,
}

impl CheckoutService {
    pub fn new(policy: PricingPolicy, processing_delay: Duration) -> Self {
        Self {
            policy,
            processing_delay,
        }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn summary<S: CartStorage>(&self, cart: &CartStore<S>) -> OrderSummary {
        OrderSummary::from_cart(&cart.snapshot(), &self.policy)
    }

    /// Place an order for the current cart contents and clear the cart.
    pub async fn place_order<S: CartStorage>(
        &self,
        cart: &CartStore<S>,
        details: &CheckoutDetails,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let snapshot = cart.snapshot();
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        details.validate()?;

        info!(
            items = snapshot.total_items(),
            delay_ms = self.processing_delay.as_millis(),
            "Processing order"
        );
        tokio::time::sleep(self.processing_delay).await;

        let summary = OrderSummary::from_cart(&snapshot, &self.policy);
        cart.clear_cart();

        let confirmation = OrderConfirmation {
            order_number: order_number(),
            placed_at: OffsetDateTime::now_utc(),
            email: details.email.clone(),
            items: snapshot.items,
            summary,
        };
        info!(
            order_number = %confirmation.order_number,
            total = confirmation.summary.total,
            "Order placed"
        );
        Ok(confirmation)
    }
}

impl Default for CheckoutService {
    fn default() -> Self {
        Self::new(PricingPolicy::default(), DEFAULT_PROCESSING_DELAY)
    }
}

fn order_number() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(ORDER_NUMBER_LEN)
        .collect::<String>()
        .to_ascii_uppercase()
}
