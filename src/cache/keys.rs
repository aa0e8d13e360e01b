//! Cache key definitions for catalog queries.

use std::fmt;

use storefront_api_types::ProductId;

/// A group of queries invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryFamily {
    /// Paginated product listings.
    ProductList,
    /// Single products by id.
    Product,
}

impl QueryFamily {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryFamily::ProductList => "products",
            QueryFamily::Product => "product",
        }
    }
}

impl fmt::Display for QueryFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub limit: u32,
    pub skip: u32,
}

impl ListKey {
    pub fn new(limit: u32, skip: u32) -> Self {
        Self { limit, skip }
    }
}

/// Any catalog query key, tagged with its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    ProductList(ListKey),
    Product(ProductId),
}

impl QueryKey {
    pub fn family(&self) -> QueryFamily {
        match self {
            QueryKey::ProductList(_) => QueryFamily::ProductList,
            QueryKey::Product(_) => QueryFamily::Product,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::ProductList(key) => {
                write!(f, "products?limit={}&skip={}", key.limit, key.skip)
            }
            QueryKey::Product(id) => write!(f, "product/{id}"),
        }
    }
}
