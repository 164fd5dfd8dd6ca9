use anyhow::{bail, Context, Result};
use keyring::Entry;
use tracing::debug;

const SERVICE_NAME: &str = "shopadmin";

/// Remembered admin passwords, kept in the OS keychain keyed by email.
///
/// Emails are matched case-insensitively, so `Admin@Shop.com` and
/// `admin@shop.com` share one keychain entry.
pub struct CredentialStore;

impl CredentialStore {
    /// Keychain account name for an email
    fn account(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn entry(email: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &Self::account(email)).context("Failed to create keyring entry")
    }

    /// Remember the password for an admin email
    pub fn remember(email: &str, password: &str) -> Result<()> {
        if Self::account(email).is_empty() {
            bail!("Cannot remember a password without an email");
        }
        if password.is_empty() {
            bail!("Refusing to remember an empty password");
        }
        Self::entry(email)?
            .set_password(password)
            .context("Failed to store password in keychain")?;
        debug!(email = %Self::account(email), "Password remembered");
        Ok(())
    }

    /// The remembered password for an admin email, if there is one.
    /// A keychain that cannot be read is an error, a missing entry is `None`.
    pub fn remembered_password(email: &str) -> Result<Option<String>> {
        match Self::entry(email)?.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve password from keychain"),
        }
    }

    /// Forget the remembered password. Missing entries are not an error.
    pub fn forget(email: &str) -> Result<()> {
        match Self::entry(email)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn use_mock_keychain() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
    }

    #[test]
    fn test_account_ignores_case_and_whitespace() {
        assert_eq!(CredentialStore::account(" Admin@Shop.COM "), "admin@shop.com");
        assert_eq!(CredentialStore::account("admin@shop.com"), "admin@shop.com");
    }

    #[test]
    fn test_remember_rejects_empty_values() {
        let err = CredentialStore::remember("admin@shop.com", "").unwrap_err();
        assert!(err.to_string().contains("empty password"));

        let err = CredentialStore::remember("  ", "secret").unwrap_err();
        assert!(err.to_string().contains("without an email"));
    }

    #[test]
    fn test_missing_entry_is_none() {
        use_mock_keychain();
        assert!(CredentialStore::remembered_password("nobody@shop.com").unwrap().is_none());
        CredentialStore::forget("nobody@shop.com").unwrap();
    }
}
