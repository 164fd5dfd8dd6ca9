//! Data models for the shop's REST resources.
//!
//! - `User`: staff and customer accounts
//! - `Product`, `ProductForm`: catalogue entries and the create/update form
//! - `Order`, `OrderItem`, `ShippingAddress`: orders with payment and tracking state
//! - `ContactMessage`: customer messages and admin replies
//! - `Page`: the paginated list envelope shared by every list endpoint

pub mod message;
pub mod order;
pub mod page;
pub mod product;
pub mod user;

pub use message::ContactMessage;
pub use order::{Order, OrderItem, OrderStatus, OrderUpdate, PaidFilter, ShippingAddress, TrackingUpdate};
pub use page::{total_pages, ListQuery, Page};
pub use product::{Product, ProductForm, ProductImage};
pub use user::{User, UserUpdate};

use serde::{Deserialize, Deserializer};

/// Decimal fields come back from the server as strings ("12.50"), sometimes
/// as numbers, sometimes null. Anything unparsable counts as zero.
pub(crate) fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => n,
        Some(Raw::Text(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Priced {
        #[serde(default, deserialize_with = "decimal")]
        price: f64,
    }

    fn price(json: &str) -> f64 {
        serde_json::from_str::<Priced>(json).unwrap().price
    }

    #[test]
    fn test_decimal_parsing() {
        assert_eq!(price(r#"{"price": "12.50"}"#), 12.5);
        assert_eq!(price(r#"{"price": 3}"#), 3.0);
        assert_eq!(price(r#"{"price": null}"#), 0.0);
        assert_eq!(price(r#"{"price": "abc"}"#), 0.0);
        assert_eq!(price(r#"{}"#), 0.0);
    }
}
