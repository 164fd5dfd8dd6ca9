use tracing::warn;

/// Side effect fired when the session cannot be recovered: no refresh token
/// on a 401, or the refresh exchange failed. The stored session has already
/// been cleared when this runs.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

/// Default redirect: log and let the caller surface the error
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self) {
        warn!("Session ended; login required");
    }
}
