use std::sync::Arc;

use storefront::{
    application::{
        cart::CartStore, catalog::Catalog, checkout::CheckoutService, error::AppError,
        repos::CatalogApi, uploads::ImageUploader,
    },
    cache::CacheConfig,
    config::{CliArgs, Command, Settings},
    infra::{
        catalog::{HttpCatalog, InMemoryCatalog},
        storage::JsonFileStorage,
    },
};
use tracing::info;

pub mod cart;
pub mod checkout;
pub mod products;

/// Services shared by every command.
pub struct Ctx {
    pub catalog: Catalog,
    pub cart: CartStore<JsonFileStorage>,
    pub checkout: CheckoutService,
    pub uploader: ImageUploader,
}

impl Ctx {
    pub fn build(args: &CliArgs, settings: &Settings) -> Result<Self, AppError> {
        let api: Arc<dyn CatalogApi> = if args.offline {
            info!("Using the built-in offline catalog");
            Arc::new(InMemoryCatalog::with_samples())
        } else {
            info!(base_url = %settings.catalog.base_url, "Using the remote catalog");
            Arc::new(HttpCatalog::new(
                &settings.catalog.base_url,
                settings.catalog.timeout,
            )?)
        };

        Ok(Self {
            catalog: Catalog::new(api, &CacheConfig::from(&settings.cache)),
            cart: CartStore::open(JsonFileStorage::in_dir(&settings.cart.storage_dir)),
            checkout: CheckoutService::new(
                settings.checkout.policy,
                settings.checkout.processing_delay,
            ),
            uploader: ImageUploader::new(settings.uploads.delay),
        })
    }
}

pub async fn dispatch(ctx: &Ctx, command: Command) -> Result<(), AppError> {
    match command {
        Command::Products(args) => products::handle(ctx, args.command).await,
        Command::Cart(args) => cart::handle(ctx, args.command).await,
        Command::Checkout(args) => checkout::handle(ctx, args).await,
    }
}
