//! PEM key parser

use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};

use super::KeyParser;
use crate::error::{Result, TrustError};
use crate::material::{KeyMaterial, PrivateKey, PublicKey};

const PEM_PREFIX: &str = "-----BEGIN";

/// Parser for PEM-armoured keys
///
/// Supported labels:
///
/// | label | content |
/// |---|---|
/// | `PRIVATE KEY` | PKCS#8, EC P-256 or RSA |
/// | `EC PRIVATE KEY` | SEC1 EC P-256 |
/// | `RSA PRIVATE KEY` | PKCS#1 RSA |
/// | `PUBLIC KEY` | SPKI, EC P-256 or RSA |
/// | `RSA PUBLIC KEY` | PKCS#1 RSA |
#[derive(Debug, Clone, Copy, Default)]
pub struct PemKeyParser;

impl PemKeyParser {
    fn label(pem: &str) -> Option<&str> {
        let rest = pem.strip_prefix(PEM_PREFIX)?.trim_start();
        let end = rest.find("-----")?;
        Some(rest[..end].trim())
    }
}

impl KeyParser for PemKeyParser {
    fn name(&self) -> &'static str {
        "pem"
    }

    fn can_handle(&self, encoded: &str) -> bool {
        encoded.trim_start().starts_with(PEM_PREFIX)
    }

    fn parse(&self, encoded: &str) -> Result<KeyMaterial> {
        let pem = encoded.trim();
        let label = Self::label(pem)
            .ok_or_else(|| TrustError::Parse("Malformed PEM armour".to_string()))?;

        let material = match label {
            "PRIVATE KEY" => p256::SecretKey::from_pkcs8_pem(pem)
                .map(PrivateKey::from)
                .or_else(|_| rsa::RsaPrivateKey::from_pkcs8_pem(pem).map(PrivateKey::from))
                .map(KeyMaterial::Private)
                .map_err(|e| TrustError::Parse(format!("Invalid PKCS#8 private key: {e}")))?,
            "EC PRIVATE KEY" => p256::SecretKey::from_sec1_pem(pem)
                .map(|key| KeyMaterial::Private(key.into()))
                .map_err(|e| TrustError::Parse(format!("Invalid SEC1 EC private key: {e}")))?,
            "RSA PRIVATE KEY" => rsa::RsaPrivateKey::from_pkcs1_pem(pem)
                .map(|key| KeyMaterial::Private(key.into()))
                .map_err(|e| TrustError::Parse(format!("Invalid PKCS#1 RSA private key: {e}")))?,
            "PUBLIC KEY" => p256::PublicKey::from_public_key_pem(pem)
                .map(PublicKey::from)
                .or_else(|_| rsa::RsaPublicKey::from_public_key_pem(pem).map(PublicKey::from))
                .map(KeyMaterial::Public)
                .map_err(|e| TrustError::Parse(format!("Invalid SPKI public key: {e}")))?,
            "RSA PUBLIC KEY" => rsa::RsaPublicKey::from_pkcs1_pem(pem)
                .map(|key| KeyMaterial::Public(key.into()))
                .map_err(|e| TrustError::Parse(format!("Invalid PKCS#1 RSA public key: {e}")))?,
            other => {
                return Err(TrustError::Parse(format!(
                    "Unsupported PEM label '{other}'"
                )));
            }
        };

        Ok(material)
    }
}
