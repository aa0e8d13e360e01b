//! Request and response types for the remote product catalog API.
//!
//! Field names follow the remote service's camelCase JSON. Unknown fields are
//! ignored so additions on the remote side do not break decoding.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Numeric product identifier assigned by the catalog.
pub type ProductId = u64;

/// A catalog product as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

/// Response body of a product delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProduct {
    pub id: ProductId,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Body sent when creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFormData {
    pub title: String,
    pub price: f64,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: &'static str) -> Self {
        Self {
            field: field.into(),
            message,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_fields(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns `Ok(())` when no field was rejected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Returns true when `value` parses as an absolute http(s) URL.
pub fn is_web_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

impl ProductFormData {
    /// Check the form the same way the admin product dialog does before submitting.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            errors.push(FieldError::new("price", "Price must be positive"));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "Description is required"));
        }
        if self.brand.trim().is_empty() {
            errors.push(FieldError::new("brand", "Brand is required"));
        }
        if self.category.trim().is_empty() {
            errors.push(FieldError::new("category", "Category is required"));
        }
        if !is_web_url(&self.thumbnail) {
            errors.push(FieldError::new("thumbnail", "Must be a valid URL"));
        }
        for (index, image) in self.images.iter().enumerate() {
            if !is_web_url(image) {
                errors.push(FieldError::new(format!("images[{index}]"), "Must be a valid URL"));
            }
        }

        ValidationErrors(errors).into_result()
    }
}

impl From<&Product> for ProductFormData {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price,
            description: product.description.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            thumbnail: product.thumbnail.clone(),
            images: product.images.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProductFormData {
        ProductFormData {
            title: "Desk Lamp".to_string(),
            price: 24.5,
            description: "Warm light".to_string(),
            brand: "Lumen".to_string(),
            category: "home-decoration".to_string(),
            thumbnail: "https://cdn.example.com/lamp.png".to_string(),
            images: vec!["https://cdn.example.com/lamp-1.png".to_string()],
        }
    }

    #[test]
    fn product_decodes_remote_shape_and_ignores_extra_fields() {
        let body = r#"{
            "id": 7,
            "title": "Essence Mascara",
            "description": "Volumizing",
            "price": 9.99,
            "discountPercentage": 7.17,
            "rating": 4.94,
            "stock": 5,
            "brand": "Essence",
            "category": "beauty",
            "thumbnail": "https://cdn.dummyjson.com/p/7/thumb.png",
            "images": ["https://cdn.dummyjson.com/p/7/1.png"],
            "tags": ["beauty"],
            "sku": "RCH45Q1A"
        }"#;

        let product: Product = serde_json::from_str(body).expect("product decodes");
        assert_eq!(product.id, 7);
        assert_eq!(product.stock, 5);
        assert!((product.discount_percentage - 7.17).abs() < f64::EPSILON);
        assert_eq!(product.images.len(), 1);
    }

    #[test]
    fn created_product_without_optional_fields_decodes() {
        let body = r#"{"id": 195, "title": "New", "price": 3.0}"#;
        let product: Product = serde_json::from_str(body).expect("product decodes");
        assert_eq!(product.id, 195);
        assert!(product.images.is_empty());
        assert_eq!(product.brand, "");
    }

    #[test]
    fn deleted_product_reads_flag() {
        let body = r#"{"id": 1, "title": "x", "isDeleted": true, "deletedOn": "2024-01-01"}"#;
        let deleted: DeletedProduct = serde_json::from_str(body).expect("delete body decodes");
        assert_eq!(deleted, DeletedProduct { id: 1, is_deleted: true });
    }

    #[test]
    fn valid_form_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn invalid_form_reports_every_field() {
        let form = ProductFormData {
            title: " ".to_string(),
            price: -1.0,
            thumbnail: "not a url".to_string(),
            images: vec!["ftp://files.example.com/a.png".to_string()],
            ..valid_form()
        };

        let errors = form.validate().expect_err("form should be rejected");
        let fields: Vec<&str> = errors.fields().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["title", "price", "thumbnail", "images[0]"]);
        assert!(errors.to_string().contains("Title is required"));
    }
}
