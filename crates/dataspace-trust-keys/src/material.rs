//! Key material types
//!
//! [`EncodedKey`] is the at-rest text form of a key as handed out by a key
//! source. [`KeyMaterial`] is what a successful parse produces. Private keys are
//! zeroized on drop by the underlying crypto crates and never printed.

use std::fmt;

use secrecy::{ExposeSecret, SecretString, SecretVec};

/// Encoded key as stored in a vault, file, DID document or configuration
///
/// The format (PEM, JWK, base64 DER, ...) is not declared; it is discovered by
/// trial parsing in the [`KeyParserRegistry`](crate::KeyParserRegistry).
#[derive(Clone)]
pub struct EncodedKey(SecretString);

impl EncodedKey {
    /// Wrap an encoded key
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(SecretString::new(encoded.into()))
    }

    /// Access the encoded text
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for EncodedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncodedKey([REDACTED])")
    }
}

impl From<String> for EncodedKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for EncodedKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<SecretString> for EncodedKey {
    fn from(value: SecretString) -> Self {
        Self(value)
    }
}

/// Key family, used for algorithm selection and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// ECDSA over NIST P-256
    EcP256,
    /// RSA (PKCS#1 v1.5 or PSS signatures)
    Rsa,
    /// Shared secret bytes
    Symmetric,
}

impl KeyFamily {
    /// Short lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EcP256 => "ec-p256",
            Self::Rsa => "rsa",
            Self::Symmetric => "symmetric",
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Private key material
#[derive(Clone)]
pub enum PrivateKey {
    /// ECDSA P-256 private key
    EcP256(p256::SecretKey),
    /// RSA private key
    Rsa(Box<rsa::RsaPrivateKey>),
}

impl PrivateKey {
    /// Key family of this key
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::EcP256(_) => KeyFamily::EcP256,
            Self::Rsa(_) => KeyFamily::Rsa,
        }
    }

    /// Derive the matching public key
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::EcP256(secret) => PublicKey::EcP256(secret.public_key()),
            Self::Rsa(private) => PublicKey::Rsa(private.to_public_key()),
        }
    }
}

// Key material must never end up in logs
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("family", &self.family().as_str())
            .field("material", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::EcP256(a), Self::EcP256(b)) => a == b,
            (Self::Rsa(a), Self::Rsa(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PrivateKey {}

impl From<p256::SecretKey> for PrivateKey {
    fn from(value: p256::SecretKey) -> Self {
        Self::EcP256(value)
    }
}

impl From<rsa::RsaPrivateKey> for PrivateKey {
    fn from(value: rsa::RsaPrivateKey) -> Self {
        Self::Rsa(Box::new(value))
    }
}

/// Public key material
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// ECDSA P-256 public key
    EcP256(p256::PublicKey),
    /// RSA public key
    Rsa(rsa::RsaPublicKey),
}

impl PublicKey {
    /// Key family of this key
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::EcP256(_) => KeyFamily::EcP256,
            Self::Rsa(_) => KeyFamily::Rsa,
        }
    }
}

impl From<p256::PublicKey> for PublicKey {
    fn from(value: p256::PublicKey) -> Self {
        Self::EcP256(value)
    }
}

impl From<rsa::RsaPublicKey> for PublicKey {
    fn from(value: rsa::RsaPublicKey) -> Self {
        Self::Rsa(value)
    }
}

/// Shared-secret key material (JWK `kty: "oct"`)
///
/// Never accepted where a private or public key is required.
pub struct SymmetricKey(SecretVec<u8>);

impl SymmetricKey {
    /// Wrap raw secret bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(SecretVec::new(bytes))
    }

    /// Access the secret bytes
    pub fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

impl Clone for SymmetricKey {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_vec())
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Result of a successful key parse
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// Private key
    Private(PrivateKey),
    /// Public key
    Public(PublicKey),
    /// Shared secret
    Symmetric(SymmetricKey),
}

impl KeyMaterial {
    /// Key family of the contained material
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Private(key) => key.family(),
            Self::Public(key) => key.family(),
            Self::Symmetric(_) => KeyFamily::Symmetric,
        }
    }

    /// Human-readable kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Private(_) => "private",
            Self::Public(_) => "public",
            Self::Symmetric(_) => "symmetric",
        }
    }

    /// Take the private key, if this is one
    pub fn into_private(self) -> Option<PrivateKey> {
        match self {
            Self::Private(key) => Some(key),
            _ => None,
        }
    }

    /// Take the public key, if this is one
    pub fn into_public(self) -> Option<PublicKey> {
        match self {
            Self::Public(key) => Some(key),
            _ => None,
        }
    }
}
