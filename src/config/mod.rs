//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::checkout::DEFAULT_PROCESSING_DELAY;
use crate::application::uploads::DEFAULT_UPLOAD_DELAY;
use crate::cache::{DEFAULT_LIST_LIMIT, DEFAULT_PRODUCT_LIMIT};
use crate::domain::pricing::{
    DEFAULT_FREE_SHIPPING_THRESHOLD, DEFAULT_SHIPPING_FEE, DEFAULT_TAX_RATE, PricingPolicy,
};
use crate::infra::catalog::DEFAULT_BASE_URL;

mod cli;

pub use cli::{
    CartArgs, CartCommand, CheckoutArgs, CliArgs, Command, GlobalOverrides, ProductFields,
    ProductsArgs, ProductsCommand,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "storefront";
const ENV_PREFIX: &str = "STOREFRONT";
const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CART_DIR: &str = ".storefront";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub cache: CacheSettings,
    pub cart: CartSettings,
    pub checkout: CheckoutSettings,
    pub uploads: UploadSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub product_limit: usize,
    pub list_limit: usize,
    pub ttl: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct CartSettings {
    pub storage_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub processing_delay: Duration,
    pub policy: PricingPolicy,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    catalog: RawCatalogSettings,
    cache: RawCacheSettings,
    cart: RawCartSettings,
    checkout: RawCheckoutSettings,
    uploads: RawUploadSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(url) = overrides.catalog_base_url.as_ref() {
            self.catalog.base_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.catalog_timeout_seconds {
            self.catalog.timeout_seconds = Some(seconds);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(dir) = overrides.cart_dir.as_ref() {
            self.cart.storage_dir = Some(dir.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            catalog,
            cache,
            cart,
            checkout,
            uploads,
            logging,
        } = raw;

        let catalog = build_catalog_settings(catalog)?;
        let cache = build_cache_settings(cache)?;
        let cart = build_cart_settings(cart)?;
        let checkout = build_checkout_settings(checkout)?;
        let uploads = build_upload_settings(uploads);
        let logging = build_logging_settings(logging)?;

        Ok(Self {
            catalog,
            cache,
            cart,
            checkout,
            uploads,
            logging,
        })
    }
}

fn build_catalog_settings(catalog: RawCatalogSettings) -> Result<CatalogSettings, LoadError> {
    let raw_url = catalog
        .base_url
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Url::parse(raw_url.trim())
        .map_err(|err| LoadError::invalid("catalog.base_url", format!("failed to parse: {err}")))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "catalog.base_url",
            "scheme must be http or https",
        ));
    }

    let timeout_secs = catalog
        .timeout_seconds
        .unwrap_or(DEFAULT_CATALOG_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "catalog.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(CatalogSettings {
        base_url,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let product_limit = cache.product_limit.unwrap_or(DEFAULT_PRODUCT_LIMIT);
    if product_limit == 0 {
        return Err(LoadError::invalid(
            "cache.product_limit",
            "must be greater than zero",
        ));
    }
    let list_limit = cache.list_limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if list_limit == 0 {
        return Err(LoadError::invalid(
            "cache.list_limit",
            "must be greater than zero",
        ));
    }

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        product_limit,
        list_limit,
        ttl: cache.ttl_seconds.map(Duration::from_secs),
    })
}

fn build_cart_settings(cart: RawCartSettings) -> Result<CartSettings, LoadError> {
    let storage_dir = cart
        .storage_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CART_DIR));
    if storage_dir.as_os_str().is_empty() {
        return Err(LoadError::invalid("cart.storage_dir", "must not be empty"));
    }
    Ok(CartSettings { storage_dir })
}

fn build_checkout_settings(checkout: RawCheckoutSettings) -> Result<CheckoutSettings, LoadError> {
    let processing_delay = checkout
        .processing_delay_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_PROCESSING_DELAY);

    let policy = PricingPolicy {
        free_shipping_threshold: non_negative(
            checkout.free_shipping_threshold,
            DEFAULT_FREE_SHIPPING_THRESHOLD,
            "checkout.free_shipping_threshold",
        )?,
        shipping_fee: non_negative(
            checkout.shipping_fee,
            DEFAULT_SHIPPING_FEE,
            "checkout.shipping_fee",
        )?,
        tax_rate: non_negative(checkout.tax_rate, DEFAULT_TAX_RATE, "checkout.tax_rate")?,
    };

    Ok(CheckoutSettings {
        processing_delay,
        policy,
    })
}

fn build_upload_settings(uploads: RawUploadSettings) -> UploadSettings {
    UploadSettings {
        delay: uploads
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_UPLOAD_DELAY),
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn non_negative(value: Option<f64>, default: f64, key: &'static str) -> Result<f64, LoadError> {
    let value = value.unwrap_or(default);
    if !value.is_finite() || value < 0.0 {
        return Err(LoadError::invalid(key, "must be a non-negative number"));
    }
    Ok(value)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCatalogSettings {
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    product_limit: Option<usize>,
    list_limit: Option<usize>,
    ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCartSettings {
    storage_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCheckoutSettings {
    processing_delay_ms: Option<u64>,
    free_shipping_threshold: Option<f64>,
    shipping_fee: Option<f64>,
    tax_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawUploadSettings {
    delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
