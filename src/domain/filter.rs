//! Case-insensitive narrowing of a fetched product page.

use storefront_api_types::Product;

/// Search text matched against title or brand, plus an optional category.
///
/// Empty criteria match everything. Filtering applies to the page already
/// fetched; it never changes what is requested from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    search: String,
    category: String,
}

impl ProductFilter {
    pub fn new(search: Option<&str>, category: Option<&str>) -> Self {
        Self {
            search: search.unwrap_or_default().trim().to_lowercase(),
            category: category.unwrap_or_default().trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.category.is_empty()
    }

    pub fn matches(&self, product: &Product) -> bool {
        let search = self.search.is_empty()
            || product.title.to_lowercase().contains(&self.search)
            || product.brand.to_lowercase().contains(&self.search);
        let category =
            self.category.is_empty() || product.category.to_lowercase().contains(&self.category);
        search && category
    }

    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        if self.is_empty() {
            return products;
        }
        products
            .into_iter()
            .filter(|product| self.matches(product))
            .collect()
    }
}
