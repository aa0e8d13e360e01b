use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use storefront_api_types::ProductId;

/// Command-line arguments for the storefront binary.
#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    version,
    about = "Browse the product catalog, manage the cart and place orders"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "STOREFRONT_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    /// Serve the catalog from a built-in product list instead of the remote API.
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the catalog API base URL.
    #[arg(long = "catalog-base-url", value_name = "URL", global = true)]
    pub catalog_base_url: Option<String>,

    /// Override the catalog request timeout.
    #[arg(long = "catalog-timeout-seconds", value_name = "SECONDS", global = true)]
    pub catalog_timeout_seconds: Option<u64>,

    /// Toggle retention of catalog query results.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub cache_enabled: Option<bool>,

    /// Override the directory holding the persisted cart.
    #[arg(long = "cart-dir", value_name = "PATH", value_hint = ValueHint::DirPath, global = true)]
    pub cart_dir: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Browse and administer catalog products.
    Products(ProductsArgs),
    /// Inspect and change the persisted cart.
    Cart(CartArgs),
    /// Place an order for the current cart.
    Checkout(CheckoutArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ProductsCommand {
    /// List one page of products.
    List {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        skip: u32,
        /// Keep products whose title or brand contains this text.
        #[arg(long)]
        search: Option<String>,
        /// Keep products whose category contains this text.
        #[arg(long)]
        category: Option<String>,
    },
    /// Show a single product.
    Show { id: ProductId },
    /// Create a product.
    Create(ProductFields),
    /// Replace a product's editable fields; omitted fields keep their value.
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product.
    Delete { id: ProductId },
}

#[derive(Debug, Args, Default, Clone)]
pub struct ProductFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Thumbnail image URL.
    #[arg(long, value_name = "URL", conflicts_with = "upload")]
    pub thumbnail: Option<String>,
    /// Image file to upload as the thumbnail.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub upload: Option<PathBuf>,
    /// Additional gallery image URL; repeatable.
    #[arg(long = "image", value_name = "URL")]
    pub images: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CartCommand {
    /// Print cart contents and totals.
    Show,
    /// Add a product fetched from the catalog.
    Add {
        id: ProductId,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product line.
    Remove { id: ProductId },
    /// Set a line's quantity; zero or less removes it.
    Set {
        id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart.
    Clear,
    /// Mark the cart sidebar open.
    Open,
    /// Mark the cart sidebar closed.
    Close,
}

#[derive(Debug, Args, Clone)]
pub struct CheckoutArgs {
    /// JSON file with shipping and payment details.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub details: PathBuf,
}
