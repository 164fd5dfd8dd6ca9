use crate::models::{ListQuery, Page, User, UserUpdate};

use super::client::ApiRequest;
use super::{ApiClient, ApiError, BulkDelete};

impl ApiClient {
    /// One page of users, optionally filtered by a search term
    pub async fn list_users(&self, query: &ListQuery) -> Result<Page<User>, ApiError> {
        self.fetch(ApiRequest::get("/api/users/").params(query.params()))
            .await
    }

    pub async fn get_user(&self, id: i64) -> Result<User, ApiError> {
        self.fetch(ApiRequest::get(format!("/api/users/{}/", id))).await
    }

    /// Update a user's profile and admin flag
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        if update.is_empty() {
            return Err(ApiError::Validation("Nothing to update".to_string()));
        }
        self.fetch(ApiRequest::put(format!("/api/users/{}/", id)).json(update)?)
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(format!("/api/users/{}/", id))).await
    }

    /// Delete users one after another, stopping at the first failure
    pub async fn delete_users(&self, ids: &[i64]) -> BulkDelete {
        let mut result = BulkDelete::default();
        for &id in ids {
            match self.delete_user(id).await {
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
