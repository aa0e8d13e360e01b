use storefront::{
    application::error::AppError, config::CheckoutArgs, domain::checkout::CheckoutDetails,
    infra::error::InfraError,
};

use super::Ctx;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, args: CheckoutArgs) -> Result<(), AppError> {
    let raw = tokio::fs::read_to_string(&args.details)
        .await
        .map_err(InfraError::from)?;
    let details: CheckoutDetails = serde_json::from_str(&raw).map_err(|err| {
        AppError::invalid_input(format!(
            "`{}` is not a checkout details document: {err}",
            args.details.display()
        ))
    })?;

    let confirmation = ctx.checkout.place_order(&ctx.cart, &details).await?;
    print_json(&confirmation)
}
