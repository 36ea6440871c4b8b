//! Public key resolvers over key sources

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Result, TrustError};
use crate::material::{KeyMaterial, PublicKey};
use crate::parser::KeyParserRegistry;
use crate::source::KeySource;

/// Message of the type-mismatch failure when private or symmetric material is
/// found where a public key was requested
pub const PUBLIC_TYPE_MISMATCH: &str = "The specified resource did not contain public key material.";

/// Resolves verification keys by key ID
///
/// This is the contract token validation depends on.
#[async_trait]
pub trait PublicKeyResolver: Send + Sync {
    /// Resolve the public key for `id`
    ///
    /// # Errors
    ///
    /// Returns the resolution, parse or type-mismatch failure of the
    /// underlying lookup.
    async fn resolve_key(&self, id: &str) -> Result<PublicKey>;
}

/// Public key resolver over a [`KeySource`]
///
/// Has no configuration fallback. Every failure is reported as
/// `No public key could be resolved for key-ID '<id>': <cause>`, keeping the
/// kind of the cause.
#[derive(Clone)]
pub struct SourcePublicKeyResolver {
    source: Arc<dyn KeySource>,
    registry: Arc<KeyParserRegistry>,
}

impl std::fmt::Debug for SourcePublicKeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourcePublicKeyResolver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl SourcePublicKeyResolver {
    /// Create a resolver
    pub fn new(source: Arc<dyn KeySource>, registry: Arc<KeyParserRegistry>) -> Self {
        Self { source, registry }
    }

    async fn lookup(&self, id: &str) -> Result<PublicKey> {
        let encoded = self.source.resolve_encoded(id).await?;
        match self.registry.parse(encoded.expose())? {
            KeyMaterial::Public(key) => Ok(key),
            other => {
                warn!(key_id = id, kind = other.kind(), "Expected public key material");
                Err(TrustError::TypeMismatch(PUBLIC_TYPE_MISMATCH.to_string()))
            }
        }
    }
}

#[async_trait]
impl PublicKeyResolver for SourcePublicKeyResolver {
    async fn resolve_key(&self, id: &str) -> Result<PublicKey> {
        self.lookup(id).await.map_err(|e| {
            debug!(key_id = id, error = %e, "Public key resolution failed");
            e.with_context(|cause| format!("No public key could be resolved for key-ID '{id}': {cause}"))
        })
    }
}

/// Resolver that ignores the requested key ID and always resolves one
/// configured key ID through an inner resolver
///
/// Used when every token of a context must be verified with a fixed key, no
/// matter what its `kid` header says.
#[derive(Clone)]
pub struct PinnedKeyResolver {
    inner: Arc<dyn PublicKeyResolver>,
    key_id: String,
}

impl std::fmt::Debug for PinnedKeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinnedKeyResolver")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl PinnedKeyResolver {
    /// Pin `key_id` on top of `inner`
    pub fn new(inner: Arc<dyn PublicKeyResolver>, key_id: impl Into<String>) -> Self {
        Self {
            inner,
            key_id: key_id.into(),
        }
    }

    /// The pinned key ID
    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

#[async_trait]
impl PublicKeyResolver for PinnedKeyResolver {
    async fn resolve_key(&self, id: &str) -> Result<PublicKey> {
        if id != self.key_id {
            debug!(requested = id, pinned = %self.key_id, "Ignoring requested key ID");
        }
        self.inner.resolve_key(&self.key_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ConfigKeySource;
    use crate::test_utils;
    use std::collections::HashMap;

    fn resolver(entries: &[(&str, String)]) -> SourcePublicKeyResolver {
        let map: HashMap<String, String> = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        SourcePublicKeyResolver::new(
            Arc::new(ConfigKeySource::new(Arc::new(map))),
            Arc::new(KeyParserRegistry::with_default_parsers()),
        )
    }

    #[tokio::test]
    async fn test_resolves_public_key() {
        let public = test_utils::ec_private_key().public_key();
        let resolver = resolver(&[("k1", test_utils::ec_public_jwk(&public))]);

        assert_eq!(resolver.resolve_key("k1").await.unwrap(), PublicKey::EcP256(public));
    }

    #[tokio::test]
    async fn test_missing_key_is_wrapped() {
        let err = resolver(&[]).resolve_key("k1").await.unwrap_err();
        assert_eq!(
            err,
            TrustError::Resolution(
                "No public key could be resolved for key-ID 'k1': No config entry for key 'k1'".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_private_material_is_wrapped_type_mismatch() {
        let secret = test_utils::ec_private_key();
        let resolver = resolver(&[("k1", test_utils::ec_private_pem(&secret))]);

        let err = resolver.resolve_key("k1").await.unwrap_err();
        assert_eq!(
            err,
            TrustError::TypeMismatch(format!(
                "No public key could be resolved for key-ID 'k1': {PUBLIC_TYPE_MISMATCH}"
            ))
        );
    }

    #[tokio::test]
    async fn test_corrupt_material_keeps_parse_kind() {
        let resolver = resolver(&[("k1", "garbage".to_string())]);
        let err = resolver.resolve_key("k1").await.unwrap_err();
        assert_eq!(err.category(), "parse_failure");
    }

    #[tokio::test]
    async fn test_pinned_resolver_ignores_requested_id() {
        let public = test_utils::ec_private_key().public_key();
        let inner = Arc::new(resolver(&[("verification-key", test_utils::ec_public_pem(&public))]));
        let pinned = PinnedKeyResolver::new(inner, "verification-key");

        assert_eq!(pinned.resolve_key("anything").await.unwrap(), PublicKey::EcP256(public.clone()));
        assert_eq!(pinned.resolve_key("").await.unwrap(), PublicKey::EcP256(public));
        assert_eq!(pinned.key_id(), "verification-key");
    }
}
