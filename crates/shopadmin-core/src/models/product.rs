use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::decimal;

/// Largest image the product form accepts
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "decimal")]
    pub rating: f64,
    #[serde(rename = "numReviews", default)]
    pub num_reviews: Option<i64>,
    #[serde(default, deserialize_with = "decimal")]
    pub price: f64,
    #[serde(rename = "priceCurrency", default = "default_currency")]
    pub price_currency: String,
    #[serde(rename = "countInStock", default)]
    pub count_in_stock: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Product {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }

    pub fn stock(&self) -> i64 {
        self.count_in_stock.unwrap_or(0)
    }
}

/// Image attached to a product create/update
#[derive(Debug, Clone)]
pub struct ProductImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ProductImage {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        Ok(Self { file_name, bytes })
    }
}

/// Product create/update form, sent as multipart
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub price_currency: String,
    pub count_in_stock: i64,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub image: Option<ProductImage>,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: 0.0,
            price_currency: default_currency(),
            count_in_stock: 0,
            sku: None,
            category: None,
            image: None,
        }
    }
}

impl ProductForm {
    /// Pre-fill the form from an existing product
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone().unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price,
            price_currency: product.price_currency.clone(),
            count_in_stock: product.stock(),
            sku: None,
            category: product.category.clone(),
            image: None,
        }
    }

    /// Check the form before it is sent; returns the first problem found
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.price <= 0.0 {
            return Err("Price must be greater than 0".to_string());
        }
        if self.count_in_stock < 0 {
            return Err("Stock cannot be negative".to_string());
        }
        if let Some(ref image) = self.image {
            if image.bytes.len() > MAX_IMAGE_BYTES {
                return Err("Image must be smaller than 5MB".to_string());
            }
        }
        Ok(())
    }

    /// Text fields in the order the server expects them
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("description", self.description.clone()),
            ("price", format!("{:.2}", self.price)),
            ("priceCurrency", self.price_currency.clone()),
            ("countInStock", self.count_in_stock.to_string()),
        ];
        if let Some(sku) = self.sku.as_ref().filter(|s| !s.is_empty()) {
            fields.push(("sku", sku.to_string()));
        }
        if let Some(category) = self.category.as_ref().filter(|s| !s.is_empty()) {
            fields.push(("category", category.to_string()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm {
            name: "Lamp".into(),
            price: 19.99,
            count_in_stock: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_product() {
        let json = r#"{"_id": 12, "name": "Lamp", "price": "19.99", "rating": "4.50", "countInStock": 4, "priceCurrency": "EUR", "created_at": "2024-03-01T10:00:00Z"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 12);
        assert_eq!(product.price, 19.99);
        assert_eq!(product.rating, 4.5);
        assert_eq!(product.price_currency, "EUR");
        assert_eq!(product.stock(), 4);
    }

    #[test]
    fn test_currency_defaults_to_usd() {
        let product: Product = serde_json::from_str(r#"{"_id": 1}"#).unwrap();
        assert_eq!(product.price_currency, "USD");
        assert_eq!(product.display_name(), "(unnamed)");
    }

    #[test]
    fn test_validate() {
        assert!(valid_form().validate().is_ok());

        let blank = ProductForm { name: "   ".into(), ..valid_form() };
        assert_eq!(blank.validate().unwrap_err(), "Product name is required");

        let free = ProductForm { price: 0.0, ..valid_form() };
        assert_eq!(free.validate().unwrap_err(), "Price must be greater than 0");

        let negative = ProductForm { count_in_stock: -1, ..valid_form() };
        assert_eq!(negative.validate().unwrap_err(), "Stock cannot be negative");

        let huge = ProductForm {
            image: Some(ProductImage {
                file_name: "big.png".into(),
                bytes: vec![0; MAX_IMAGE_BYTES + 1],
            }),
            ..valid_form()
        };
        assert_eq!(huge.validate().unwrap_err(), "Image must be smaller than 5MB");
    }

    #[test]
    fn test_text_fields_skip_empty_optionals() {
        let form = ProductForm {
            sku: Some(String::new()),
            category: Some("Home".into()),
            ..valid_form()
        };
        let fields = form.text_fields();
        assert!(fields.contains(&("price", "19.99".to_string())));
        assert!(fields.contains(&("category", "Home".to_string())));
        assert!(!fields.iter().any(|(k, _)| *k == "sku"));
    }
}
