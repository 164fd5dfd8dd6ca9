use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(default)]
    pub product: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub qty: Option<i64>,
    #[serde(default, deserialize_with = "decimal")]
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(rename = "postalCode", default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "shippingPrice", default, deserialize_with = "decimal")]
    pub shipping_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(rename = "paymentMethod", default)]
    pub payment_method: Option<String>,
    #[serde(rename = "taxPrice", default, deserialize_with = "decimal")]
    pub tax_price: f64,
    #[serde(rename = "shippingPrice", default, deserialize_with = "decimal")]
    pub shipping_price: f64,
    #[serde(rename = "totalPrice", default, deserialize_with = "decimal")]
    pub total_price: f64,
    #[serde(rename = "isPaid", default)]
    pub is_paid: bool,
    #[serde(rename = "paidAt", default)]
    pub paid_at: Option<String>,
    #[serde(rename = "isDelivered", default)]
    pub is_delivered: bool,
    #[serde(rename = "deliveredAt", default)]
    pub delivered_at: Option<String>,
    #[serde(rename = "isRefunded", default)]
    pub is_refunded: bool,
    #[serde(rename = "transferConfirmed", default)]
    pub transfer_confirmed: bool,
    #[serde(rename = "transferConfirmedAt", default)]
    pub transfer_confirmed_at: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(rename = "orderitems", default)]
    pub items: Vec<OrderItem>,
    #[serde(rename = "shippingaddress", default)]
    pub shipping_address: Option<ShippingAddress>,
}

impl Order {
    /// Country the order ships to, "Unknown" when missing
    pub fn country(&self) -> &str {
        self.shipping_address
            .as_ref()
            .and_then(|a| a.country.as_deref())
            .filter(|c| !c.is_empty())
            .unwrap_or("Unknown")
    }

    /// A bank-transfer order the customer marked as sent, waiting for an
    /// admin to approve the payment
    pub fn awaits_transfer_approval(&self) -> bool {
        !self.is_paid
            && self.payment_method.as_deref() == Some("Transfer")
            && self.transfer_confirmed_at.is_some()
    }
}

/// Paid filter on the order list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaidFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl PaidFilter {
    /// Value for the `paid` query parameter, if the filter restricts
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            PaidFilter::All => None,
            PaidFilter::Paid => Some("true"),
            PaidFilter::Unpaid => Some("false"),
        }
    }
}

/// Body of `PATCH /api/orders/{id}/`
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderUpdate {
    #[serde(rename = "isPaid", skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(rename = "isDelivered", skip_serializing_if = "Option::is_none")]
    pub is_delivered: Option<bool>,
    #[serde(rename = "isRefunded", skip_serializing_if = "Option::is_none")]
    pub is_refunded: Option<bool>,
}

/// Body of `PUT /api/orders/{id}/update-tracking/`
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "_id": 41,
        "orderitems": [{"_id": 1, "product": 12, "name": "Lamp", "qty": 2, "price": "19.99", "image": "/images/lamp.jpg", "order": 41}],
        "shippingaddress": {"_id": 9, "address": "1 Main St", "city": "Lagos", "postalCode": "100001", "country": "Nigeria", "shippingPrice": "5.00", "order": 41},
        "paymentMethod": "Transfer",
        "taxPrice": "3.20",
        "shippingPrice": "5.00",
        "totalPrice": "48.18",
        "isPaid": false,
        "paidAt": null,
        "isDelivered": false,
        "deliveredAt": null,
        "isRefunded": false,
        "transferConfirmed": true,
        "transferConfirmedAt": "2024-05-02T10:00:00Z",
        "status": "processing",
        "tracking_number": null,
        "estimated_delivery": null,
        "created_at": "2024-05-02T09:15:00.123456Z",
        "user": 3,
        "paymentResult": {}
    }"#;

    #[test]
    fn test_parse_order() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(order.id, 41);
        assert_eq!(order.total_price, 48.18);
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].qty, Some(2));
        assert_eq!(order.country(), "Nigeria");
        assert!(order.awaits_transfer_approval());
    }

    #[test]
    fn test_missing_address_is_unknown_country() {
        let order: Order = serde_json::from_str(r#"{"_id": 1, "shippingaddress": null}"#).unwrap();
        assert_eq!(order.country(), "Unknown");
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.awaits_transfer_approval());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_tracking_update_body() {
        let update = TrackingUpdate {
            status: Some(OrderStatus::Delivered),
            tracking_number: Some("TRK1".into()),
            estimated_delivery: None,
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"status": "delivered", "tracking_number": "TRK1"})
        );
        assert_eq!(PaidFilter::Unpaid.query_value(), Some("false"));
        assert_eq!(PaidFilter::All.query_value(), None);
    }
}
