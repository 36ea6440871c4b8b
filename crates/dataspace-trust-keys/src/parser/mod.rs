//! Key parser registry
//!
//! Encoded keys do not declare their format. The registry tries every
//! registered [`KeyParser`] in registration order and returns the first
//! successful parse:
//!
//! - a parser that declines ([`KeyParser::can_handle`] returns `false`) is skipped
//! - a parser that accepts but fails (corrupt content) is skipped as well
//! - if nothing succeeds, a single aggregated [`TrustError::Parse`] is returned
//!
//! Individual parser errors are only emitted as `trace` events so the returned
//! failure does not reveal which format almost matched.

mod der;
mod jwk;
mod pem;

pub use der::Base64DerKeyParser;
pub use jwk::JwkKeyParser;
pub use pem::PemKeyParser;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::error::{Result, TrustError};
use crate::material::KeyMaterial;

/// Message returned when no registered parser could decode the input
pub const NO_PARSER_MESSAGE: &str = "No parser could decode the supplied key material";

/// Decoder turning an encoded key into key material
pub trait KeyParser: Send + Sync {
    /// Parser name, used in diagnostics
    fn name(&self) -> &'static str;

    /// Whether the input looks like this parser's format
    fn can_handle(&self, encoded: &str) -> bool;

    /// Decode the input
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::Parse`] if the content is corrupt or describes an
    /// unsupported key type.
    fn parse(&self, encoded: &str) -> Result<KeyMaterial>;
}

/// Ordered collection of key parsers
///
/// Registration order is trial order. Parsers can be registered through a
/// shared reference, so a registry behind an `Arc` can still be extended.
#[derive(Default)]
pub struct KeyParserRegistry {
    parsers: RwLock<Vec<Arc<dyn KeyParser>>>,
}

impl std::fmt::Debug for KeyParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.parsers.read().iter().map(|p| p.name()).collect();
        f.debug_struct("KeyParserRegistry")
            .field("parsers", &names)
            .finish()
    }
}

impl KeyParserRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in parsers: PEM, JWK, base64 DER
    pub fn with_default_parsers() -> Self {
        let registry = Self::new();
        registry.register(PemKeyParser);
        registry.register(JwkKeyParser);
        registry.register(Base64DerKeyParser);
        registry
    }

    /// Append a parser to the trial sequence
    ///
    /// Duplicates are allowed and are tried again at their position.
    pub fn register<P>(&self, parser: P)
    where
        P: KeyParser + 'static,
    {
        self.parsers.write().push(Arc::new(parser));
    }

    /// Number of registered parsers
    pub fn len(&self) -> usize {
        self.parsers.read().len()
    }

    /// Whether no parser is registered
    pub fn is_empty(&self) -> bool {
        self.parsers.read().is_empty()
    }

    /// Decode an encoded key with the first parser that succeeds
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::Parse`] with [`NO_PARSER_MESSAGE`] if every parser
    /// declined or failed.
    pub fn parse(&self, encoded: &str) -> Result<KeyMaterial> {
        // Snapshot so parsing does not hold the lock
        let parsers: Vec<Arc<dyn KeyParser>> = self.parsers.read().clone();

        for parser in &parsers {
            if !parser.can_handle(encoded) {
                continue;
            }
            match parser.parse(encoded) {
                Ok(material) => {
                    trace!(parser = parser.name(), kind = material.kind(), "Key material decoded");
                    return Ok(material);
                }
                Err(e) => {
                    trace!(parser = parser.name(), error = %e, "Parser accepted input but failed");
                }
            }
        }

        Err(TrustError::Parse(NO_PARSER_MESSAGE.to_string()))
    }
}
