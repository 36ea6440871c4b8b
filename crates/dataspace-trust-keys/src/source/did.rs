//! Keys from DID document verification methods

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::KeySource;
use crate::error::{Result, TrustError};
use crate::material::EncodedKey;

/// Verification method entry of a DID document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Absolute DID URL or `#fragment`
    pub id: String,
    /// Method type, e.g. `JsonWebKey2020`
    #[serde(rename = "type", default)]
    pub method_type: String,
    /// Controlling DID
    #[serde(default)]
    pub controller: String,
    /// Public key as JWK
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Value>,
    /// Public key as PEM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_pem: Option<String>,
}

/// The parts of a DID document needed for key resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// Subject DID
    pub id: String,
    /// Verification methods
    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,
}

impl DidDocument {
    /// Find a verification method by absolute DID URL or by `#fragment`
    pub fn find_verification_method(&self, did_url: &str, fragment: &str) -> Option<&VerificationMethod> {
        let relative = format!("#{fragment}");
        self.verification_method
            .iter()
            .find(|method| method.id == did_url || method.id == relative)
    }
}

/// Resolves a DID to its document
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Resolve `did` (without fragment)
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::Resolution`] if the DID cannot be resolved.
    async fn resolve(&self, did: &str) -> Result<DidDocument>;
}

/// Reads public keys from DID documents
///
/// Key IDs are DID URLs of the form `did:web:example.com#key-1`. The returned
/// encoded key is the serialised `publicKeyJwk` or, failing that, the
/// `publicKeyPem` of the matching verification method.
#[derive(Clone)]
pub struct DidKeySource {
    resolver: Arc<dyn DidResolver>,
}

impl std::fmt::Debug for DidKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DidKeySource").finish_non_exhaustive()
    }
}

impl DidKeySource {
    /// Create a source backed by `resolver`
    pub fn new(resolver: Arc<dyn DidResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl KeySource for DidKeySource {
    async fn resolve_encoded(&self, id: &str) -> Result<EncodedKey> {
        let Some((did, fragment)) = id.split_once('#') else {
            return Err(TrustError::Resolution(format!("DID URL '{id}' has no fragment")));
        };

        debug!(did, fragment, "Resolving DID document");
        let document = self.resolver.resolve(did).await?;

        let method = document
            .find_verification_method(id, fragment)
            .ok_or_else(|| {
                TrustError::Resolution(format!("DID document '{did}' has no verification method '{id}'"))
            })?;

        if let Some(jwk) = &method.public_key_jwk {
            let encoded = serde_json::to_string(jwk)
                .map_err(|e| TrustError::Parse(format!("Failed to serialise publicKeyJwk: {e}")))?;
            return Ok(EncodedKey::new(encoded));
        }

        method
            .public_key_pem
            .as_deref()
            .map(EncodedKey::from)
            .ok_or_else(|| TrustError::Resolution(format!("Verification method '{id}' has no public key")))
    }
}
