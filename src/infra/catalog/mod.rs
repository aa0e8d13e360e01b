//! `CatalogApi` adapters: the remote HTTP service and an in-process mock.

mod http;
mod memory;

pub use http::{DEFAULT_BASE_URL, HttpCatalog};
pub use memory::{InMemoryCatalog, sample_products};
