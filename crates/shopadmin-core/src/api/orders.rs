use serde::Deserialize;

use crate::models::{ListQuery, Order, OrderUpdate, Page, PaidFilter, TrackingUpdate};

use super::client::ApiRequest;
use super::{ApiClient, ApiError};

/// Order actions answer with a message and the updated order
#[derive(Debug, Deserialize)]
struct OrderActionResponse {
    #[serde(default)]
    detail: Option<String>,
    order: Order,
}

impl ApiClient {
    /// One page of orders, optionally filtered by search term and paid state
    pub async fn list_orders(
        &self,
        query: &ListQuery,
        paid: PaidFilter,
    ) -> Result<Page<Order>, ApiError> {
        let mut request = ApiRequest::get("/api/orders/").params(query.params());
        if let Some(paid) = paid.query_value() {
            request = request.query("paid", paid);
        }
        self.fetch(request).await
    }

    pub async fn get_order(&self, id: i64) -> Result<Order, ApiError> {
        self.fetch(ApiRequest::get(format!("/api/orders/{}/", id))).await
    }

    /// Flip the paid, delivered or refunded flags
    pub async fn update_order(&self, id: i64, update: &OrderUpdate) -> Result<Order, ApiError> {
        self.fetch(ApiRequest::patch(format!("/api/orders/{}/", id)).json(update)?)
            .await
    }

    /// Set status, tracking number or estimated delivery.
    /// Returns the server's message with the updated order.
    pub async fn update_tracking(
        &self,
        id: i64,
        update: &TrackingUpdate,
    ) -> Result<(String, Order), ApiError> {
        let response: OrderActionResponse = self
            .fetch(ApiRequest::put(format!("/api/orders/{}/update-tracking/", id)).json(update)?)
            .await?;
        Ok((
            response.detail.unwrap_or_else(|| "Order tracking updated".to_string()),
            response.order,
        ))
    }

    /// Approve a customer-confirmed bank transfer, marking the order paid
    pub async fn approve_transfer(&self, id: i64) -> Result<(String, Order), ApiError> {
        let response: OrderActionResponse = self
            .fetch(ApiRequest::post(format!("/api/orders/{}/approve-transfer/", id)))
            .await?;
        Ok((
            response.detail.unwrap_or_else(|| "Transfer payment approved".to_string()),
            response.order,
        ))
    }
}
