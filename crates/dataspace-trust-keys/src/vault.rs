//! Secret store contract and an in-memory implementation

use async_trait::async_trait;
use dashmap::DashMap;
use secrecy::SecretString;
use tracing::debug;

use crate::error::{Result, TrustError};

/// Secret store holding encoded keys by alias
///
/// A miss is `None`; callers convert it into a [`TrustError`] at the boundary.
#[async_trait]
pub trait Vault: Send + Sync {
    /// Look up a secret
    async fn resolve_secret(&self, key: &str) -> Option<SecretString>;

    /// Store or overwrite a secret
    ///
    /// # Errors
    ///
    /// Backend specific.
    async fn store_secret(&self, key: &str, value: SecretString) -> Result<()>;

    /// Remove a secret
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::Resolution`] if the secret does not exist.
    async fn delete_secret(&self, key: &str) -> Result<()>;
}

/// Process-local vault for development and tests
///
/// Values live only as long as the process.
#[derive(Default)]
pub struct InMemoryVault {
    secrets: DashMap<String, SecretString>,
}

impl std::fmt::Debug for InMemoryVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVault")
            .field("secrets", &self.secrets.len())
            .finish()
    }
}

impl InMemoryVault {
    /// Create an empty vault
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether the vault is empty
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

#[async_trait]
impl Vault for InMemoryVault {
    async fn resolve_secret(&self, key: &str) -> Option<SecretString> {
        debug!(key, "Resolving secret from in-memory vault");
        self.secrets.get(key).map(|entry| entry.value().clone())
    }

    async fn store_secret(&self, key: &str, value: SecretString) -> Result<()> {
        debug!(key, "Storing secret in in-memory vault");
        self.secrets.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        debug!(key, "Deleting secret from in-memory vault");
        self.secrets
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| TrustError::Resolution(format!("Secret with key '{key}' does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn test_store_and_resolve() {
        let vault = InMemoryVault::new();
        assert!(vault.resolve_secret("alias").await.is_none());

        vault
            .store_secret("alias", SecretString::new("value".to_string()))
            .await
            .unwrap();

        let secret = vault.resolve_secret("alias").await.unwrap();
        assert_eq!(secret.expose_secret(), "value");
        assert_eq!(vault.len(), 1);
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let vault = InMemoryVault::new();
        vault.store_secret("a", SecretString::new("1".into())).await.unwrap();
        vault.store_secret("a", SecretString::new("2".into())).await.unwrap();

        assert_eq!(vault.resolve_secret("a").await.unwrap().expose_secret(), "2");
    }

    #[tokio::test]
    async fn test_delete_missing_secret_fails() {
        let vault = InMemoryVault::new();
        let err = vault.delete_secret("ghost").await.unwrap_err();
        assert_eq!(
            err,
            TrustError::Resolution("Secret with key 'ghost' does not exist".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_existing_secret() {
        let vault = InMemoryVault::new();
        vault.store_secret("a", SecretString::new("1".into())).await.unwrap();
        vault.delete_secret("a").await.unwrap();
        assert!(vault.is_empty());
    }

    #[test]
    fn test_debug_hides_values() {
        let vault = InMemoryVault::new();
        vault
            .secrets
            .insert("a".into(), SecretString::new("top-secret".into()));
        assert!(!format!("{vault:?}").contains("top-secret"));
    }
}
