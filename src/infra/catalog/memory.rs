use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use storefront_api_types::{DeletedProduct, Product, ProductFormData, ProductId, ProductsPage};

use crate::application::repos::{CatalogApi, CatalogError, CatalogOperation, CatalogTarget};
use crate::cache::lock::mutex_lock;

const SOURCE: &str = "infra::catalog::memory";

/// In-process catalog with the remote API's request and response shapes.
///
/// Unlike the public demo service, writes are kept: a deleted product is gone
/// for later reads. Each call waits `latency` first and is counted by name.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: Mutex<Vec<Product>>,
    latency: Duration,
    offline: AtomicBool,
    requests: DashMap<&'static str, u64>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Self::default()
        }
    }

    /// Catalog seeded with [`sample_products`].
    pub fn with_samples() -> Self {
        Self::new(sample_products())
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// While offline every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of calls received for `operation` (`list_products`, `get_product`, ...).
    pub fn requests(&self, operation: &str) -> u64 {
        self.requests.get(operation).map(|count| *count).unwrap_or(0)
    }

    pub fn total_requests(&self) -> u64 {
        self.requests.iter().map(|entry| *entry.value()).sum()
    }

    pub fn products(&self) -> Vec<Product> {
        mutex_lock(&self.products, SOURCE, "products").clone()
    }

    async fn enter(
        &self,
        name: &'static str,
        operation: CatalogOperation,
        target: CatalogTarget,
    ) -> Result<(), CatalogError> {
        *self.requests.entry(name).or_insert(0) += 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(CatalogError::network(
                operation,
                target,
                "catalog is offline",
            ));
        }
        Ok(())
    }
}

fn apply_form(product: &mut Product, data: &ProductFormData) {
    product.title = data.title.clone();
    product.price = data.price;
    product.description = data.description.clone();
    product.brand = data.brand.clone();
    product.category = data.category.clone();
    product.thumbnail = data.thumbnail.clone();
    product.images = data.images.clone();
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn list_products(&self, limit: u32, skip: u32) -> Result<ProductsPage, CatalogError> {
        let target = CatalogTarget::Products { limit, skip };
        self.enter("list_products", CatalogOperation::Fetch, target)
            .await?;

        let products = mutex_lock(&self.products, SOURCE, "list_products");
        let take = if limit == 0 {
            products.len()
        } else {
            limit as usize
        };
        let page: Vec<Product> = products
            .iter()
            .skip(skip as usize)
            .take(take)
            .cloned()
            .collect();
        Ok(ProductsPage {
            limit: page.len() as u64,
            products: page,
            total: products.len() as u64,
            skip: u64::from(skip),
        })
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let target = CatalogTarget::Product(id);
        self.enter("get_product", CatalogOperation::Fetch, target)
            .await?;

        mutex_lock(&self.products, SOURCE, "get_product")
            .iter()
            .find(|product| product.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(CatalogOperation::Fetch, target))
    }

    async fn create_product(&self, data: &ProductFormData) -> Result<Product, CatalogError> {
        self.enter(
            "create_product",
            CatalogOperation::Create,
            CatalogTarget::NewProduct,
        )
        .await?;

        let mut products = mutex_lock(&self.products, SOURCE, "create_product");
        let id = products.iter().map(|product| product.id).max().unwrap_or(0) + 1;
        let mut product = Product {
            id,
            title: String::new(),
            description: String::new(),
            price: 0.0,
            discount_percentage: 0.0,
            rating: 0.0,
            stock: 0,
            brand: String::new(),
            category: String::new(),
            thumbnail: String::new(),
            images: Vec::new(),
        };
        apply_form(&mut product, data);
        products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        data: &ProductFormData,
    ) -> Result<Product, CatalogError> {
        let target = CatalogTarget::Product(id);
        self.enter("update_product", CatalogOperation::Update, target)
            .await?;

        let mut products = mutex_lock(&self.products, SOURCE, "update_product");
        let product = products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or_else(|| CatalogError::not_found(CatalogOperation::Update, target))?;
        apply_form(product, data);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<DeletedProduct, CatalogError> {
        let target = CatalogTarget::Product(id);
        self.enter("delete_product", CatalogOperation::Delete, target)
            .await?;

        let mut products = mutex_lock(&self.products, SOURCE, "delete_product");
        let index = products
            .iter()
            .position(|product| product.id == id)
            .ok_or_else(|| CatalogError::not_found(CatalogOperation::Delete, target))?;
        products.remove(index);
        Ok(DeletedProduct {
            id,
            is_deleted: true,
        })
    }
}

/// A small fixed product set for offline use and tests.
pub fn sample_products() -> Vec<Product> {
    const SAMPLES: &[(&str, f64, &str, &str, u32)] = &[
        ("Essence Mascara Lash Princess", 9.99, "Essence", "beauty", 99),
        ("Eyeshadow Palette with Mirror", 19.99, "Glamour Beauty", "beauty", 34),
        ("Powder Canister", 14.99, "Velvet Touch", "beauty", 89),
        ("Red Lipstick", 12.99, "Chic Cosmetics", "beauty", 91),
        ("Calvin Klein CK One", 49.99, "Calvin Klein", "fragrances", 29),
        ("Annibale Colombo Bed", 1899.99, "Annibale Colombo", "furniture", 88),
        ("Wooden Bathroom Sink With Mirror", 799.99, "Bath Trends", "furniture", 7),
        ("Apple", 1.99, "", "groceries", 8),
        ("Cooking Oil", 4.99, "", "groceries", 22),
        ("Decoration Swing", 59.99, "", "home-decoration", 47),
        ("Bamboo Spatula", 7.99, "", "kitchen-accessories", 37),
        ("Apple MacBook Pro 14 Inch Space Grey", 1999.99, "Apple", "laptops", 24),
    ];

    SAMPLES
        .iter()
        .zip(1u64..)
        .map(|(&(title, price, brand, category, stock), id)| Product {
            id,
            title: title.to_string(),
            description: format!("{title} from the {category} range."),
            price,
            discount_percentage: 0.0,
            rating: 4.5,
            stock,
            brand: brand.to_string(),
            category: category.to_string(),
            thumbnail: format!("https://cdn.dummyjson.com/products/images/{id}/thumbnail.png"),
            images: Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, price: f64) -> ProductFormData {
        ProductFormData {
            title: title.to_string(),
            price,
            description: "A sturdy thing".to_string(),
            brand: "Acme".to_string(),
            category: "tools".to_string(),
            thumbnail: "https://example.com/t.png".to_string(),
            images: Vec::new(),
        }
    }

    #[tokio::test]
    async fn listing_pages_through_products() {
        let catalog = InMemoryCatalog::with_samples();
        let page = catalog.list_products(5, 10).await.expect("page");
        assert_eq!(page.total, 12);
        assert_eq!(page.skip, 10);
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.products[0].id, 11);

        let all = catalog.list_products(0, 0).await.expect("all");
        assert_eq!(all.products.len(), 12);
        assert_eq!(catalog.requests("list_products"), 2);
    }

    #[tokio::test]
    async fn writes_are_kept() {
        let catalog = InMemoryCatalog::with_samples();
        let created = catalog
            .create_product(&form("Hammer", 15.0))
            .await
            .expect("created");
        assert_eq!(created.id, 13);

        let updated = catalog
            .update_product(13, &form("Claw Hammer", 17.5))
            .await
            .expect("updated");
        assert_eq!(updated.title, "Claw Hammer");

        let deleted = catalog.delete_product(13).await.expect("deleted");
        assert!(deleted.is_deleted);
        let err = catalog.get_product(13).await.expect_err("gone");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn offline_fails_with_network_error() {
        let catalog = InMemoryCatalog::with_samples();
        catalog.set_offline(true);
        let err = catalog.get_product(1).await.expect_err("offline");
        assert!(matches!(err, CatalogError::Network { .. }));
        assert_eq!(catalog.total_requests(), 1);
    }
}
