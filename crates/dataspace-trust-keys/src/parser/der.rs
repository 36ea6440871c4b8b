//! Base64-encoded DER key parser

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};

use super::KeyParser;
use crate::error::{Result, TrustError};
use crate::material::{KeyMaterial, PrivateKey, PublicKey};

/// Parser for standard base64 text holding a PKCS#8 private key or an SPKI
/// public key in DER, EC P-256 or RSA
///
/// Line breaks are ignored, so the body of a PEM file without its armour is
/// accepted as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64DerKeyParser;

fn compact(encoded: &str) -> String {
    encoded.split_ascii_whitespace().collect()
}

fn is_base64(text: &str) -> bool {
    !text.is_empty()
        && text.len() % 4 == 0
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

impl KeyParser for Base64DerKeyParser {
    fn name(&self) -> &'static str {
        "base64-der"
    }

    fn can_handle(&self, encoded: &str) -> bool {
        is_base64(&compact(encoded))
    }

    fn parse(&self, encoded: &str) -> Result<KeyMaterial> {
        let der = STANDARD
            .decode(compact(encoded))
            .map_err(|e| TrustError::Parse(format!("Invalid base64: {e}")))?;

        if let Ok(key) = p256::SecretKey::from_pkcs8_der(&der) {
            return Ok(KeyMaterial::Private(PrivateKey::EcP256(key)));
        }
        if let Ok(key) = rsa::RsaPrivateKey::from_pkcs8_der(&der) {
            return Ok(KeyMaterial::Private(key.into()));
        }
        if let Ok(key) = p256::PublicKey::from_public_key_der(&der) {
            return Ok(KeyMaterial::Public(PublicKey::EcP256(key)));
        }
        if let Ok(key) = rsa::RsaPublicKey::from_public_key_der(&der) {
            return Ok(KeyMaterial::Public(PublicKey::Rsa(key)));
        }

        Err(TrustError::Parse(
            "DER content is neither a PKCS#8 private key nor an SPKI public key".to_string(),
        ))
    }
}
