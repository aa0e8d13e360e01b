use serde::Serialize;
use storefront::{
    application::error::AppError,
    config::CartCommand,
    domain::{
        cart::CartItem,
        pricing::{OrderSummary, format_price},
    },
};
use tracing::warn;

use super::Ctx;
use crate::print::print_json;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartView {
    items: Vec<CartItem>,
    is_open: bool,
    total_items: u64,
    total_price: f64,
    display_total: String,
    summary: OrderSummary,
}

pub async fn handle(ctx: &Ctx, command: CartCommand) -> Result<(), AppError> {
    match command {
        CartCommand::Show => {}
        CartCommand::Add { id, quantity } => {
            let product = ctx.catalog.get_product(id).await?;
            if u64::from(quantity) > u64::from(product.stock) {
                warn!(
                    product_id = id,
                    quantity,
                    stock = product.stock,
                    "Requested quantity exceeds available stock"
                );
            }
            ctx.cart.add_item(product, quantity);
        }
        CartCommand::Remove { id } => ctx.cart.remove_item(id),
        CartCommand::Set { id, quantity } => ctx.cart.update_quantity(id, quantity),
        CartCommand::Clear => ctx.cart.clear_cart(),
        CartCommand::Open => ctx.cart.set_is_open(true),
        CartCommand::Close => ctx.cart.set_is_open(false),
    }

    let snapshot = ctx.cart.snapshot();
    print_json(&CartView {
        summary: ctx.checkout.summary(&ctx.cart),
        total_items: snapshot.total_items(),
        total_price: snapshot.total_price(),
        display_total: format_price(snapshot.total_price()),
        is_open: snapshot.is_open,
        items: snapshot.items,
    })
}
