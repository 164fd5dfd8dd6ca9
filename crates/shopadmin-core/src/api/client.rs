//! API client for the shop's REST backend.
//!
//! Every request reads the stored session and carries its access token as a
//! bearer credential. A 401 answer triggers one refresh exchange (shared by
//! all requests that fail while it is in flight) and a single replay of the
//! original request with the new token.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{LogRedirect, LoginRedirect, SessionData, SessionStore};
use crate::models::ProductImage;

use super::error::AuthError;
use super::refresh::{RefreshCoordinator, RefreshOutcome};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Credential exchange endpoint: refresh token in, access token out
pub const REFRESH_PATH: &str = "/api/token/refresh/";

/// Login endpoint
pub const LOGIN_PATH: &str = "/api/users/login/";

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access: Option<String>,
    /// Present when the server rotates refresh tokens
    #[serde(default)]
    refresh: Option<String>,
}

/// Request payload. Bodies are kept by value so a request can be rebuilt for
/// its replay after a token refresh.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart {
        fields: Vec<(&'static str, String)>,
        image: Option<ProductImage>,
    },
}

/// A call against the REST API, relative to the client's base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Session-authenticated requests carry the bearer token and take part
    /// in the refresh protocol
    pub authenticated: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn params(mut self, params: Vec<(&'static str, String)>) -> Self {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.to_string(), v)));
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Validation(format!("Failed to encode request body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, fields: Vec<(&'static str, String)>, image: Option<ProductImage>) -> Self {
        self.body = RequestBody::Multipart { fields, image };
        self
    }

    /// Send without the session token and outside the refresh protocol
    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Authenticated client for the shop API.
/// Clone is cheap - clones share the connection pool, session store and
/// refresh state.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    redirect: Arc<dyn LoginRedirect>,
    refresh: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Create a client for the API at `base_url`, reading and writing the
    /// session through `store`
    pub fn new(base_url: &str, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            redirect: Arc::new(LogRedirect),
            refresh: Arc::new(RefreshCoordinator::new()),
        })
    }

    /// Replace the side effect fired when the session cannot be recovered
    pub fn with_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True while a refresh exchange is outstanding
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    /// The stored session, if any
    pub fn session(&self) -> Result<Option<SessionData>, ApiError> {
        Ok(self.store.load()?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Session bookkeeping =====

    /// Access token to decorate the next request with. A storage failure
    /// is treated like an absent session: the server decides.
    fn current_token(&self) -> Option<String> {
        match self.store.load() {
            Ok(session) => session.and_then(|s| s.access_token().map(str::to_string)),
            Err(e) => {
                warn!(error = %e, "Failed to read session, sending request without credentials");
                None
            }
        }
    }

    pub(crate) fn save_session(&self, session: &SessionData) -> Result<(), ApiError> {
        Ok(self.store.save(session)?)
    }

    pub(crate) fn remove_session(&self) -> Result<(), ApiError> {
        Ok(self.store.clear()?)
    }

    /// Drop the stored session without firing the login redirect
    pub(crate) fn clear_session(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session");
        }
    }

    /// Unrecoverable auth failure: forget the session and send the user to
    /// the login entry point
    fn end_session(&self) {
        self.clear_session();
        self.redirect.redirect_to_login();
    }

    // ===== Transport =====

    fn build(&self, request: &ApiRequest, token: Option<&str>) -> RequestBuilder {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .header(header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart { fields, image } => {
                let mut form = multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(*name, value.clone());
                }
                if let Some(image) = image {
                    let part = multipart::Part::bytes(image.bytes.clone())
                        .file_name(image.file_name.clone());
                    form = form.part("image", part);
                }
                builder.multipart(form)
            }
        }
    }

    async fn send_once(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, ApiError> {
        debug!(
            method = %request.method,
            path = %request.path,
            bearer = token.is_some(),
            "Sending request"
        );
        Ok(self.build(request, token).send().await?)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from(response).await)
        }
    }

    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::from_status(status, &body)
    }

    /// Send a request, recovering once from an expired access token.
    ///
    /// Non-401 failures are returned as they are. A replayed request that
    /// is rejected again returns that 401 without another refresh.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        if !request.authenticated {
            let response = self.send_once(request, None).await?;
            return Self::check_response(response).await;
        }

        let sent_token = self.current_token();
        let response = self.send_once(request, sent_token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check_response(response).await;
        }

        let unauthorized = Self::error_from(response).await;
        let fresh = self.recover_session(sent_token.as_deref(), unauthorized).await?;

        debug!(path = %request.path, "Replaying request with refreshed token");
        let response = self.send_once(request, Some(&fresh)).await?;
        Self::check_response(response).await
    }

    /// Produce a usable access token after a 401, or end the session.
    async fn recover_session(
        &self,
        sent_token: Option<&str>,
        unauthorized: ApiError,
    ) -> Result<String, ApiError> {
        let session = match self.store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to read session after 401");
                None
            }
        };

        let Some(refresh_token) = session
            .as_ref()
            .and_then(|s| s.refresh_token())
            .map(str::to_string)
        else {
            info!("Request rejected and no refresh token stored, ending session");
            self.end_session();
            return Err(unauthorized);
        };

        // A refresh finished while this request was on the wire
        if let Some(current) = session.as_ref().and_then(|s| s.access_token()) {
            if Some(current) != sent_token {
                debug!("Stored token changed since the request was sent, reusing it");
                return Ok(current.to_string());
            }
        }

        let token = self
            .refresh
            .refresh(move || self.exchange_refresh_token(refresh_token))
            .await?;
        Ok(token)
    }

    /// The refresh exchange run by the refresh leader. Persists the new
    /// token, or ends the session, before the outcome is released to
    /// queued requests.
    async fn exchange_refresh_token(&self, refresh_token: String) -> RefreshOutcome {
        info!("Access token rejected, refreshing");
        match self.request_new_access_token(&refresh_token).await {
            Ok((access, rotated)) => {
                self.store_refreshed_token(&access, rotated.as_deref());
                info!(rotated = rotated.is_some(), "Access token refreshed");
                Ok(access)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.end_session();
                Err(e)
            }
        }
    }

    async fn request_new_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<(String, Option<String>), AuthError> {
        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .header(header::ACCEPT, "application/json")
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body: ApiError::detail_message(&body),
            });
        }

        let parsed: RefreshResponse =
            serde_json::from_str(&body).map_err(|_| AuthError::MissingAccessToken)?;
        match parsed.access.filter(|a| !a.is_empty()) {
            Some(access) => Ok((access, parsed.refresh)),
            None => Err(AuthError::MissingAccessToken),
        }
    }

    fn store_refreshed_token(&self, access: &str, rotated_refresh: Option<&str>) {
        let result = self.store.load().and_then(|session| match session {
            Some(mut session) => {
                session.apply_refresh(access, rotated_refresh);
                self.store.save(&session)
            }
            None => {
                warn!("Session disappeared during refresh, new token not persisted");
                Ok(())
            }
        });
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist refreshed token");
        }
    }

    // ===== Typed helpers =====

    /// Execute and decode the JSON answer
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(&request).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "Failed to parse response from {}: {}",
                request.path, e
            ))
        })
    }

    /// Execute and ignore the body (DELETE answers 204 with a detail message)
    pub async fn send(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(&request).await?;
        Ok(())
    }
}
