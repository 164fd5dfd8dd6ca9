use crate::models::{ListQuery, Page, Product, ProductForm};

use super::client::ApiRequest;
use super::{ApiClient, ApiError, BulkDelete};

impl ApiClient {
    /// One page of products, optionally filtered by search term and category
    pub async fn list_products(
        &self,
        query: &ListQuery,
        category: Option<&str>,
    ) -> Result<Page<Product>, ApiError> {
        let mut request = ApiRequest::get("/api/products/").params(query.params());
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            request = request.query("category", category);
        }
        self.fetch(request).await
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, ApiError> {
        self.fetch(ApiRequest::get(format!("/api/products/{}/", id))).await
    }

    pub async fn create_product(&self, form: &ProductForm) -> Result<Product, ApiError> {
        form.validate().map_err(ApiError::Validation)?;
        let request = ApiRequest::post("/api/products/")
            .multipart(form.text_fields(), form.image.clone());
        self.fetch(request).await
    }

    pub async fn update_product(&self, id: i64, form: &ProductForm) -> Result<Product, ApiError> {
        form.validate().map_err(ApiError::Validation)?;
        let request = ApiRequest::put(format!("/api/products/{}/", id))
            .multipart(form.text_fields(), form.image.clone());
        self.fetch(request).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(format!("/api/products/{}/", id))).await
    }

    /// Delete products one after another, stopping at the first failure
    pub async fn delete_products(&self, ids: &[i64]) -> BulkDelete {
        let mut result = BulkDelete::default();
        for &id in ids {
            match self.delete_product(id).await {
                Ok(()) => result.deleted.push(id),
                Err(e) => {
                    result.failed = Some((id, e));
                    break;
                }
            }
        }
        result
    }
}
