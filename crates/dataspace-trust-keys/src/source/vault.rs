//! Keys stored as vault secrets

use std::sync::Arc;

use async_trait::async_trait;

use super::KeySource;
use crate::error::{Result, TrustError};
use crate::material::EncodedKey;
use crate::vault::Vault;

/// Reads encoded keys from a [`Vault`], using the key ID as alias
#[derive(Clone)]
pub struct VaultKeySource {
    vault: Arc<dyn Vault>,
}

impl std::fmt::Debug for VaultKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKeySource").finish_non_exhaustive()
    }
}

impl VaultKeySource {
    /// Create a source backed by `vault`
    pub fn new(vault: Arc<dyn Vault>) -> Self {
        Self { vault }
    }
}

#[async_trait]
impl KeySource for VaultKeySource {
    async fn resolve_encoded(&self, id: &str) -> Result<EncodedKey> {
        self.vault
            .resolve_secret(id)
            .await
            .map(EncodedKey::from)
            .ok_or_else(|| TrustError::Resolution(format!("No secret found in vault for alias '{id}'")))
    }
}
