//! Login, logout and the admin access check.

use tracing::{debug, info};

use crate::auth::SessionData;
use crate::models::User;

use super::client::{ApiRequest, LOGIN_PATH};
use super::{ApiClient, ApiError};

const PROFILE_PATH: &str = "/api/users/profile/";

/// How `ensure_admin` decides whether the stored session may use the admin
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminCheck {
    /// Ask the server for the profile on every check
    #[default]
    VerifyWithServer,
    /// Accept the admin flag cached in the stored session without a network
    /// call; fall back to the server when the flag is absent
    TrustCachedClaim,
}

impl ApiClient {
    /// Exchange email and password for a session and store it
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionData, ApiError> {
        let request = ApiRequest::post(LOGIN_PATH)
            .unauthenticated()
            .json(&serde_json::json!({ "email": email, "password": password }))?;

        let session: SessionData = match self.fetch(request).await {
            Ok(session) => session,
            Err(ApiError::Unauthorized(msg)) => return Err(ApiError::InvalidCredentials(msg)),
            Err(e) => return Err(e),
        };

        if session.access_token().is_none() {
            return Err(ApiError::InvalidResponse(
                "Login response did not contain an access token".to_string(),
            ));
        }

        self.save_session(&session)?;
        info!(email = %email, admin = session.is_admin, "Logged in");
        Ok(session)
    }

    /// Forget the stored session
    pub fn logout(&self) -> Result<(), ApiError> {
        self.remove_session()?;
        info!("Logged out");
        Ok(())
    }

    /// Profile of the logged-in user
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.fetch(ApiRequest::get(PROFILE_PATH)).await
    }

    /// Gate for admin operations.
    ///
    /// Returns the (possibly refreshed) session when access is granted. A
    /// profile that is not staff, or an auth failure while verifying, clears
    /// the stored session. Transport and server errors leave it in place.
    pub async fn ensure_admin(&self, check: AdminCheck) -> Result<SessionData, ApiError> {
        let session = self.session()?.ok_or(ApiError::NotAuthenticated)?;

        if check == AdminCheck::TrustCachedClaim && session.is_admin {
            debug!("Admin claim found in stored session, skipping verification");
            return Ok(session);
        }

        match self.profile().await {
            Ok(user) if user.has_admin_rights() => {
                debug!(username = %user.username, "Admin access verified");
                Ok(self.session()?.unwrap_or(session))
            }
            Ok(user) => {
                self.clear_session();
                Err(ApiError::AccessDenied(format!(
                    "{} is not an administrator",
                    user.username
                )))
            }
            Err(e) => {
                if e.is_session_terminal() || matches!(e, ApiError::AccessDenied(_)) {
                    self.clear_session();
                }
                Err(e)
            }
        }
    }
}
