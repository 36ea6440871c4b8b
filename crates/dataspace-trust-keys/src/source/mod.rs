//! Resolution sources for encoded keys
//!
//! A [`KeySource`] turns a key ID into an [`EncodedKey`] without looking at its
//! content. Resolvers combine a source with the parser registry.

mod did;
mod file;
mod static_config;
mod vault;

pub use did::{DidDocument, DidKeySource, DidResolver, VerificationMethod};
pub use file::FileKeySource;
pub use static_config::ConfigKeySource;
pub use vault::VaultKeySource;

use async_trait::async_trait;

use crate::error::Result;
use crate::material::EncodedKey;

/// Lookup strategy for encoded keys
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch the encoded key stored under `id`
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::Resolution`](crate::TrustError::Resolution) if
    /// the source holds nothing for `id`.
    async fn resolve_encoded(&self, id: &str) -> Result<EncodedKey>;
}
