//! Catalog queries and mutations mediated by the query cache.

use std::sync::Arc;

use futures::FutureExt;
use storefront_api_types::{DeletedProduct, Product, ProductFormData, ProductId, ProductsPage};
use tracing::info;

use crate::application::mutation::{Mutation, MutationState};
use crate::application::repos::{CatalogApi, CatalogError};
use crate::cache::{CacheConfig, ListKey, QueryCache, QueryFamily, QueryKey, QueryState};

/// Shared handle over the remote catalog.
///
/// Cloning is cheap; clones share the same caches and mutation states.
#[derive(Clone)]
pub struct Catalog {
    api: Arc<dyn CatalogApi>,
    lists: Arc<QueryCache<ListKey, ProductsPage, CatalogError>>,
    products: Arc<QueryCache<ProductId, Product, CatalogError>>,
    creating: Arc<Mutation<Product>>,
    updating: Arc<Mutation<Product>>,
    deleting: Arc<Mutation<DeletedProduct>>,
}

impl Catalog {
    pub fn new(api: Arc<dyn CatalogApi>, config: &CacheConfig) -> Self {
        Self {
            api,
            lists: Arc::new(QueryCache::new(
                QueryFamily::ProductList,
                config.list_limit_non_zero(),
                config.enabled,
                config.ttl,
            )),
            products: Arc::new(QueryCache::new(
                QueryFamily::Product,
                config.product_limit_non_zero(),
                config.enabled,
                config.ttl,
            )),
            creating: Arc::default(),
            updating: Arc::default(),
            deleting: Arc::default(),
        }
    }

    pub async fn list_products(&self, limit: u32, skip: u32) -> Result<ProductsPage, CatalogError> {
        let api = Arc::clone(&self.api);
        self.lists
            .fetch(ListKey::new(limit, skip), move || {
                async move { api.list_products(limit, skip).await }.boxed()
            })
            .await
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let api = Arc::clone(&self.api);
        self.products
            .fetch(id, move || async move { api.get_product(id).await }.boxed())
            .await
    }

    /// Create a product; every cached listing refetches afterwards.
    pub async fn create_product(&self, data: &ProductFormData) -> Result<Product, CatalogError> {
        let created = self
            .creating
            .run(self.api.create_product(data))
            .await?;
        self.lists.invalidate_all();
        info!(product_id = created.id, title = %created.title, "Product created");
        Ok(created)
    }

    /// Replace a product; its detail query and every listing refetch afterwards.
    pub async fn update_product(
        &self,
        id: ProductId,
        data: &ProductFormData,
    ) -> Result<Product, CatalogError> {
        let updated = self
            .updating
            .run(self.api.update_product(id, data))
            .await?;
        self.lists.invalidate_all();
        self.products.invalidate(&id);
        info!(product_id = id, "Product updated");
        Ok(updated)
    }

    /// Delete a product; listings refetch and its detail entry is dropped.
    pub async fn delete_product(&self, id: ProductId) -> Result<DeletedProduct, CatalogError> {
        let deleted = self.deleting.run(self.api.delete_product(id)).await?;
        self.lists.invalidate_all();
        self.products.evict(&id);
        info!(product_id = id, is_deleted = deleted.is_deleted, "Product deleted");
        Ok(deleted)
    }

    /// Outcome of the latest create, for a form showing progress or errors.
    pub fn create_state(&self) -> MutationState<Product> {
        self.creating.state()
    }

    pub fn update_state(&self) -> MutationState<Product> {
        self.updating.state()
    }

    pub fn delete_state(&self) -> MutationState<DeletedProduct> {
        self.deleting.state()
    }

    /// Clear mutation outcomes, as when the admin dialog closes.
    pub fn reset_mutations(&self) {
        self.creating.reset();
        self.updating.reset();
        self.deleting.reset();
    }

    pub fn list_state(&self, limit: u32, skip: u32) -> QueryState<ProductsPage, CatalogError> {
        self.lists.state(&ListKey::new(limit, skip))
    }

    pub fn product_state(&self, id: ProductId) -> QueryState<Product, CatalogError> {
        self.products.state(&id)
    }

    /// Mark a single query stale.
    pub fn invalidate(&self, key: QueryKey) {
        match key {
            QueryKey::ProductList(list) => self.lists.invalidate(&list),
            QueryKey::Product(id) => self.products.invalidate(&id),
        }
    }

    /// Mark every query of a family stale.
    pub fn invalidate_family(&self, family: QueryFamily) {
        match family {
            QueryFamily::ProductList => self.lists.invalidate_all(),
            QueryFamily::Product => self.products.invalidate_all(),
        }
    }
}
