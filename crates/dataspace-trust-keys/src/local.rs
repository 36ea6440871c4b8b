//! Two-tier public key service: in-memory cache in front of a vault

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, TrustError};
use crate::material::{KeyMaterial, PublicKey};
use crate::parser::KeyParserRegistry;
use crate::resolver::{PUBLIC_TYPE_MISMATCH, PublicKeyResolver};
use crate::vault::Vault;

/// Public key to load into a [`LocalPublicKeyService`] at startup
///
/// Exactly one of `value` (inline encoded key) and `path` (file holding the
/// encoded key) is expected; `value` wins if both are given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyEntry {
    /// Key ID the key is cached under
    pub id: String,
    /// Inline encoded key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Path of a file holding the encoded key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl PublicKeyEntry {
    /// Entry with an inline encoded key
    pub fn inline(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: Some(value.into()),
            path: None,
        }
    }

    /// Entry read from a file
    pub fn file(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            value: None,
            path: Some(path.into()),
        }
    }
}

/// Public key resolver with a local cache and a vault fallback
///
/// - the cache is filled only by [`add_raw_key`](Self::add_raw_key) and
///   [`preload`](Self::preload), never by lookups
/// - a cache miss costs exactly one vault read
/// - entries are never evicted
pub struct LocalPublicKeyService {
    cache: DashMap<String, PublicKey>,
    vault: Arc<dyn Vault>,
    registry: Arc<KeyParserRegistry>,
}

impl std::fmt::Debug for LocalPublicKeyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPublicKeyService")
            .field("cached_keys", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl LocalPublicKeyService {
    /// Create a service with an empty cache
    pub fn new(vault: Arc<dyn Vault>, registry: Arc<KeyParserRegistry>) -> Self {
        Self {
            cache: DashMap::new(),
            vault,
            registry,
        }
    }

    fn parse_public(&self, encoded: &str) -> Result<PublicKey> {
        match self.registry.parse(encoded)? {
            KeyMaterial::Public(key) => Ok(key),
            other => {
                warn!(kind = other.kind(), "Expected public key material");
                Err(TrustError::TypeMismatch(PUBLIC_TYPE_MISMATCH.to_string()))
            }
        }
    }

    /// Parse `raw` and cache it under `id`, replacing any previous entry
    ///
    /// # Errors
    ///
    /// Returns the parse or type-mismatch failure; the cache is left untouched.
    pub fn add_raw_key(&self, id: &str, raw: &str) -> Result<()> {
        let key = self.parse_public(raw)?;
        debug!(key_id = id, family = %key.family(), "Caching public key");
        self.cache.insert(id.to_string(), key);
        Ok(())
    }

    /// Load every entry into the cache
    ///
    /// # Errors
    ///
    /// Stops at the first entry that cannot be read or parsed and returns its
    /// failure. Entries before it stay cached.
    pub async fn preload(&self, entries: &[PublicKeyEntry]) -> Result<()> {
        for entry in entries {
            let raw = match (&entry.value, &entry.path) {
                (Some(value), _) => value.clone(),
                (None, Some(path)) => tokio::fs::read_to_string(path).await.map_err(|e| {
                    TrustError::Resolution(format!(
                        "Failed to read public key '{}' from '{}': {e}",
                        entry.id,
                        path.display()
                    ))
                })?,
                (None, None) => {
                    return Err(TrustError::Resolution(format!(
                        "Public key '{}' has neither a value nor a path",
                        entry.id
                    )));
                }
            };
            self.add_raw_key(&entry.id, &raw)?;
        }
        info!(count = entries.len(), "Preloaded public keys");
        Ok(())
    }

    /// Number of cached keys
    pub fn cached_keys(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl PublicKeyResolver for LocalPublicKeyService {
    async fn resolve_key(&self, id: &str) -> Result<PublicKey> {
        if let Some(key) = self.cache.get(id) {
            return Ok(key.value().clone());
        }

        debug!(key_id = id, "Public key not cached, reading vault");
        let not_found =
            || TrustError::Resolution(format!("No public key could be resolved for key-ID '{id}'"));

        let Some(secret) = self.vault.resolve_secret(id).await else {
            return Err(not_found());
        };

        self.parse_public(secret.expose_secret()).map_err(|e| {
            debug!(key_id = id, error = %e, "Vault content is not a usable public key");
            not_found()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use crate::vault::InMemoryVault;
    use secrecy::SecretString;
    use tempfile::TempDir;

    fn service(vault: Arc<InMemoryVault>) -> LocalPublicKeyService {
        LocalPublicKeyService::new(vault, Arc::new(KeyParserRegistry::with_default_parsers()))
    }

    #[tokio::test]
    async fn test_added_key_is_served_from_cache() {
        let public = test_utils::ec_private_key().public_key();
        let service = service(Arc::new(InMemoryVault::new()));

        service.add_raw_key("k1", &test_utils::ec_public_pem(&public)).unwrap();
        assert_eq!(service.resolve_key("k1").await.unwrap(), PublicKey::EcP256(public));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let first = test_utils::ec_private_key().public_key();
        let second = test_utils::ec_private_key().public_key();
        let service = service(Arc::new(InMemoryVault::new()));

        service.add_raw_key("k1", &test_utils::ec_public_pem(&first)).unwrap();
        service.add_raw_key("k1", &test_utils::ec_public_jwk(&second)).unwrap();

        assert_eq!(service.cached_keys(), 1);
        assert_eq!(service.resolve_key("k1").await.unwrap(), PublicKey::EcP256(second));
    }

    #[tokio::test]
    async fn test_vault_fallback_does_not_populate_cache() {
        let public = test_utils::ec_private_key().public_key();
        let vault = Arc::new(InMemoryVault::new());
        vault
            .store_secret("k2", SecretString::new(test_utils::ec_public_pem(&public)))
            .await
            .unwrap();
        let service = service(vault);

        assert_eq!(service.resolve_key("k2").await.unwrap(), PublicKey::EcP256(public));
        assert_eq!(service.cached_keys(), 0);
    }

    #[tokio::test]
    async fn test_failures_collapse_to_resolution_failure() {
        let vault = Arc::new(InMemoryVault::new());
        vault
            .store_secret("corrupt", SecretString::new("garbage".to_string()))
            .await
            .unwrap();
        let secret = test_utils::ec_private_key();
        vault
            .store_secret("private", SecretString::new(test_utils::ec_private_pem(&secret)))
            .await
            .unwrap();
        let service = service(vault);

        for id in ["missing", "corrupt", "private"] {
            let err = service.resolve_key(id).await.unwrap_err();
            assert_eq!(
                err,
                TrustError::Resolution(format!("No public key could be resolved for key-ID '{id}'"))
            );
        }
    }

    #[test]
    fn test_add_raw_key_rejects_private_material() {
        let secret = test_utils::ec_private_key();
        let service = service(Arc::new(InMemoryVault::new()));

        let err = service
            .add_raw_key("k1", &test_utils::ec_private_pem(&secret))
            .unwrap_err();
        assert_eq!(err, TrustError::TypeMismatch(PUBLIC_TYPE_MISMATCH.to_string()));
        assert_eq!(service.cached_keys(), 0);
    }

    #[tokio::test]
    async fn test_preload_inline_and_file() {
        let dir = TempDir::new().unwrap();
        let from_file = test_utils::ec_private_key().public_key();
        let path = dir.path().join("partner.pem");
        std::fs::write(&path, test_utils::ec_public_pem(&from_file)).unwrap();
        let inline = test_utils::ec_private_key().public_key();

        let service = service(Arc::new(InMemoryVault::new()));
        service
            .preload(&[
                PublicKeyEntry::inline("inline", test_utils::ec_public_jwk(&inline)),
                PublicKeyEntry::file("partner", path.clone()),
            ])
            .await
            .unwrap();

        assert_eq!(service.resolve_key("inline").await.unwrap(), PublicKey::EcP256(inline));
        assert_eq!(service.resolve_key("partner").await.unwrap(), PublicKey::EcP256(from_file));
    }

    #[tokio::test]
    async fn test_preload_stops_at_first_failure() {
        let public = test_utils::ec_private_key().public_key();
        let service = service(Arc::new(InMemoryVault::new()));

        let err = service
            .preload(&[
                PublicKeyEntry::inline("good", test_utils::ec_public_pem(&public)),
                PublicKeyEntry {
                    id: "empty".to_string(),
                    value: None,
                    path: None,
                },
                PublicKeyEntry::inline("never", test_utils::ec_public_pem(&public)),
            ])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TrustError::Resolution("Public key 'empty' has neither a value nor a path".to_string())
        );
        assert_eq!(service.cached_keys(), 1);
    }
}
