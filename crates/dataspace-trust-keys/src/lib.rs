//! # Dataspace Trust Keys
//!
//! Key material handling for the connector trust core: decoding encoded keys of
//! unknown format, resolving private and public keys by ID from vaults, files,
//! DID documents and configuration, and a locally cached public key service.
//!
//! ## Architecture
//!
//! - `error` - Failure taxonomy shared with the token crate
//! - `material` - Encoded keys and parsed key material
//! - `parser` - Ordered parser registry with PEM, JWK and base64 DER parsers
//! - `vault` - Secret store contract and an in-memory vault
//! - `config_source` - Flat configuration lookup
//! - `source` - Where encoded keys come from (vault, directory, DID, config)
//! - `resolver` - Private key resolution with config fallback, public key resolvers
//! - `local` - Cache-then-vault public key service
//!
//! ## Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use dataspace_trust_keys::{
//!     InMemoryVault, KeyParserRegistry, PrivateKeyResolver, VaultKeySource,
//! };
//!
//! # async fn example() -> dataspace_trust_keys::Result<()> {
//! let registry = Arc::new(KeyParserRegistry::with_default_parsers());
//! let resolver = PrivateKeyResolver::new(
//!     Arc::new(VaultKeySource::new(Arc::new(InMemoryVault::new()))),
//!     Arc::new(HashMap::<String, String>::new()),
//!     registry,
//! );
//! let key = resolver.resolve_private_key("signing-key").await?;
//! println!("Resolved {} key", key.family());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `test-utils` - Key generation helpers for tests of dependent crates

pub mod config_source;
pub mod error;
pub mod local;
pub mod material;
pub mod parser;
pub mod resolver;
pub mod source;
pub mod vault;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config_source::ConfigSource;
pub use error::{Result, TrustError};
pub use local::{LocalPublicKeyService, PublicKeyEntry};
pub use material::{EncodedKey, KeyFamily, KeyMaterial, PrivateKey, PublicKey, SymmetricKey};
pub use parser::{
    Base64DerKeyParser, JwkKeyParser, KeyParser, KeyParserRegistry, NO_PARSER_MESSAGE,
    PemKeyParser,
};
pub use resolver::{
    PRIVATE_TYPE_MISMATCH, PUBLIC_TYPE_MISMATCH, PinnedKeyResolver, PrivateKeyResolver,
    PublicKeyResolver, SourcePublicKeyResolver,
};
pub use source::{
    ConfigKeySource, DidDocument, DidKeySource, DidResolver, FileKeySource, KeySource,
    VaultKeySource, VerificationMethod,
};
pub use vault::{InMemoryVault, Vault};
