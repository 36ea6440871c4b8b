//! Self-issued token service
//!
//! Issues signed tokens for service-to-service calls. The signing key and the
//! key ID are obtained through suppliers on every call, so rotating the key in
//! the vault takes effect without a restart.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use dataspace_trust_keys::{PrivateKey, PrivateKeyResolver, Result, TrustError};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::generator::{ClaimsDecorator, KeyIdDecorator, StandardClaimsDecorator, TokenGenerator};
use crate::representation::TokenRepresentation;

/// Default lifetime of issued tokens
pub const DEFAULT_TOKEN_EXPIRATION_MINUTES: i64 = 5;

/// Issues signed tokens
#[async_trait]
pub trait SecureTokenService: Send + Sync {
    /// Issue a token for `audience` carrying `claims`
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::Issuance`] if no signing key or key ID is
    /// available, or signing fails.
    async fn issue(&self, claims: Map<String, Value>, audience: &str) -> Result<TokenRepresentation>;
}

/// Provides the current signing key
#[async_trait]
pub trait SigningKeySupplier: Send + Sync {
    /// Current signing key
    ///
    /// # Errors
    ///
    /// Returns the failure of the underlying key lookup.
    async fn signing_key(&self) -> Result<PrivateKey>;
}

#[async_trait]
impl SigningKeySupplier for PrivateKey {
    async fn signing_key(&self) -> Result<PrivateKey> {
        Ok(self.clone())
    }
}

/// Signing key supplier resolving an alias through a [`PrivateKeyResolver`]
#[derive(Debug, Clone)]
pub struct ResolverKeySupplier {
    resolver: Arc<PrivateKeyResolver>,
    alias: String,
}

impl ResolverKeySupplier {
    /// Resolve `alias` on every call
    pub fn new(resolver: Arc<PrivateKeyResolver>, alias: impl Into<String>) -> Self {
        Self {
            resolver,
            alias: alias.into(),
        }
    }
}

#[async_trait]
impl SigningKeySupplier for ResolverKeySupplier {
    async fn signing_key(&self) -> Result<PrivateKey> {
        self.resolver.resolve_private_key(&self.alias).await
    }
}

/// Supplies the `kid` header value
pub type KeyIdSupplier = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Key ID supplier returning a fixed value
pub fn fixed_key_id(key_id: impl Into<String>) -> KeyIdSupplier {
    let key_id = key_id.into();
    Arc::new(move || Some(key_id.clone()))
}

/// Secure token service signing tokens in-process
pub struct EmbeddedSecureTokenService {
    generator: TokenGenerator,
    key_supplier: Arc<dyn SigningKeySupplier>,
    key_id_supplier: KeyIdSupplier,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl fmt::Debug for EmbeddedSecureTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedSecureTokenService")
            .field("clock", &self.clock)
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl EmbeddedSecureTokenService {
    /// Create a service issuing tokens valid for `ttl`
    pub fn new(
        key_supplier: Arc<dyn SigningKeySupplier>,
        key_id_supplier: KeyIdSupplier,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            generator: TokenGenerator::new(),
            key_supplier,
            key_id_supplier,
            clock,
            ttl,
        }
    }

    /// Lifetime of issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl SecureTokenService for EmbeddedSecureTokenService {
    async fn issue(&self, claims: Map<String, Value>, audience: &str) -> Result<TokenRepresentation> {
        let key = self.key_supplier.signing_key().await.map_err(|e| {
            warn!(error = %e, "Signing key unavailable");
            TrustError::Issuance(format!("Failed to obtain signing key: {e}"))
        })?;

        let key_id = (self.key_id_supplier)()
            .ok_or_else(|| TrustError::Issuance("No key ID available for token signing".to_string()))?;

        let now = self.clock.now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            TrustError::Issuance(format!(
                "Token lifetime of {} seconds is out of range",
                self.ttl.num_seconds()
            ))
        })?;
        let standard = StandardClaimsDecorator {
            issued_at: now,
            expires_at,
            audience: audience.to_string(),
            token_id: Uuid::new_v4().to_string(),
        };

        debug!(audience, kid = %key_id, "Issuing self-signed token");
        self.generator.generate(
            &key,
            &[&ClaimsDecorator(claims), &standard, &KeyIdDecorator(key_id)],
        )
    }
}
