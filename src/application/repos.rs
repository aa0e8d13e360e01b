//! Adapter traits the application layer depends on: the remote catalog and
//! durable cart storage.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use storefront_api_types::{DeletedProduct, Product, ProductFormData, ProductId, ProductsPage};
use thiserror::Error;

use crate::domain::cart::CartState;

/// Which catalog call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOperation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl fmt::Display for CatalogOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CatalogOperation::Fetch => "fetch",
            CatalogOperation::Create => "create",
            CatalogOperation::Update => "update",
            CatalogOperation::Delete => "delete",
        })
    }
}

/// The entity a catalog call was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTarget {
    Products { limit: u32, skip: u32 },
    Product(ProductId),
    NewProduct,
}

impl fmt::Display for CatalogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogTarget::Products { limit, skip } => {
                write!(f, "products (limit {limit}, skip {skip})")
            }
            CatalogTarget::Product(id) => write!(f, "product {id}"),
            CatalogTarget::NewProduct => f.write_str("new product"),
        }
    }
}

/// Failure of a remote catalog call.
///
/// `Clone` so every caller coalesced onto one request receives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("failed to {operation} {target}: not found")]
    NotFound {
        operation: CatalogOperation,
        target: CatalogTarget,
    },
    #[error("failed to {operation} {target}: {message}")]
    Network {
        operation: CatalogOperation,
        target: CatalogTarget,
        message: String,
    },
    #[error("failed to {operation} {target}: remote returned status {status}: {body}")]
    Status {
        operation: CatalogOperation,
        target: CatalogTarget,
        status: u16,
        body: String,
    },
    #[error("failed to {operation} {target}: invalid response body: {message}")]
    Decode {
        operation: CatalogOperation,
        target: CatalogTarget,
        message: String,
    },
}

impl CatalogError {
    pub fn not_found(operation: CatalogOperation, target: CatalogTarget) -> Self {
        Self::NotFound { operation, target }
    }

    pub fn network(
        operation: CatalogOperation,
        target: CatalogTarget,
        message: impl fmt::Display,
    ) -> Self {
        Self::Network {
            operation,
            target,
            message: message.to_string(),
        }
    }

    pub fn decode(
        operation: CatalogOperation,
        target: CatalogTarget,
        message: impl fmt::Display,
    ) -> Self {
        Self::Decode {
            operation,
            target,
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }

    pub fn operation(&self) -> CatalogOperation {
        match self {
            CatalogError::NotFound { operation, .. }
            | CatalogError::Network { operation, .. }
            | CatalogError::Status { operation, .. }
            | CatalogError::Decode { operation, .. } => *operation,
        }
    }

    pub fn target(&self) -> CatalogTarget {
        match self {
            CatalogError::NotFound { target, .. }
            | CatalogError::Network { target, .. }
            | CatalogError::Status { target, .. }
            | CatalogError::Decode { target, .. } => *target,
        }
    }
}

/// The remote product catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_products(&self, limit: u32, skip: u32) -> Result<ProductsPage, CatalogError>;

    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError>;

    async fn create_product(&self, data: &ProductFormData) -> Result<Product, CatalogError>;

    async fn update_product(
        &self,
        id: ProductId,
        data: &ProductFormData,
    ) -> Result<Product, CatalogError>;

    async fn delete_product(&self, id: ProductId) -> Result<DeletedProduct, CatalogError>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cart storage i/o failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cart storage holds unreadable data: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("cart state could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Durable record holding the serialized cart.
pub trait CartStorage: Send + Sync {
    /// Read the persisted cart; `Ok(None)` when nothing was stored yet.
    fn load(&self) -> Result<Option<CartState>, StorageError>;

    fn save(&self, state: &CartState) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_operation_and_entity() {
        let err = CatalogError::not_found(CatalogOperation::Delete, CatalogTarget::Product(9));
        assert_eq!(err.to_string(), "failed to delete product 9: not found");
        assert!(err.is_not_found());

        let err = CatalogError::Status {
            operation: CatalogOperation::Fetch,
            target: CatalogTarget::Products { limit: 10, skip: 20 },
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to fetch products (limit 10, skip 20): remote returned status 503: unavailable"
        );
        assert_eq!(err.operation(), CatalogOperation::Fetch);
        assert!(!err.is_not_found());
    }
}
