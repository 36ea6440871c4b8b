//! Private key resolution with configuration fallback

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config_source::ConfigSource;
use crate::error::{Result, TrustError};
use crate::material::{EncodedKey, KeyMaterial, PrivateKey};
use crate::parser::KeyParserRegistry;
use crate::source::KeySource;

/// Message of the type-mismatch failure when public or symmetric material is
/// found where a private key was requested
pub const PRIVATE_TYPE_MISMATCH: &str = "The specified resource did not contain private key material.";

/// Resolves private keys by ID
///
/// The encoded key is taken from the [`KeySource`]; only if the source fails is
/// the ID looked up as a literal key in the [`ConfigSource`]. Once encoded data
/// has been obtained there is no further fallback: a parse failure is returned
/// as-is.
#[derive(Clone)]
pub struct PrivateKeyResolver {
    source: Arc<dyn KeySource>,
    config: Arc<dyn ConfigSource>,
    registry: Arc<KeyParserRegistry>,
}

impl std::fmt::Debug for PrivateKeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyResolver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl PrivateKeyResolver {
    /// Create a resolver
    pub fn new(
        source: Arc<dyn KeySource>,
        config: Arc<dyn ConfigSource>,
        registry: Arc<KeyParserRegistry>,
    ) -> Self {
        Self {
            source,
            config,
            registry,
        }
    }

    /// Resolve the private key stored under `id`
    ///
    /// # Errors
    ///
    /// - [`TrustError::Resolution`] if neither the source nor the config holds `id`
    /// - [`TrustError::Parse`] if the encoded data cannot be decoded
    /// - [`TrustError::TypeMismatch`] if the decoded material is not a private key
    pub async fn resolve_private_key(&self, id: &str) -> Result<PrivateKey> {
        let encoded = match self.source.resolve_encoded(id).await {
            Ok(encoded) => encoded,
            Err(e) => {
                debug!(key_id = id, error = %e, "Key source failed, falling back to config");
                self.config
                    .get_string(id)
                    .map(EncodedKey::from)
                    .ok_or_else(|| {
                        TrustError::Resolution(format!("Private key with ID '{id}' not found in Config"))
                    })?
            }
        };

        match self.registry.parse(encoded.expose())? {
            KeyMaterial::Private(key) => Ok(key),
            other => {
                warn!(key_id = id, kind = other.kind(), "Expected private key material");
                Err(TrustError::TypeMismatch(PRIVATE_TYPE_MISMATCH.to_string()))
            }
        }
    }
}
