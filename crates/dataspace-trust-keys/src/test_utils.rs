//! Key generation helpers for tests
//!
//! Available in unit tests and, for dependent crates, behind the `test-utils`
//! feature. RSA generation is slow, so one RSA key is generated per process and
//! cloned on every call.

#![allow(clippy::missing_panics_doc)]

use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
// p256 and rsa share the same pkcs8 traits
use p256::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;

/// Generate a fresh P-256 private key
pub fn ec_private_key() -> p256::SecretKey {
    p256::SecretKey::random(&mut OsRng)
}

/// Shared 2048-bit RSA private key
pub fn rsa_private_key() -> rsa::RsaPrivateKey {
    static KEY: OnceLock<rsa::RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| rsa::RsaPrivateKey::new(&mut OsRng, 2048).expect("Failed to generate RSA key"))
        .clone()
}

/// PKCS#8 PEM of a P-256 private key
pub fn ec_private_pem(key: &p256::SecretKey) -> String {
    key.to_pkcs8_pem(LineEnding::LF)
        .expect("Failed to encode EC private key")
        .to_string()
}

/// SPKI PEM of a P-256 public key
pub fn ec_public_pem(key: &p256::PublicKey) -> String {
    key.to_public_key_pem(LineEnding::LF)
        .expect("Failed to encode EC public key")
}

/// PKCS#8 PEM of an RSA private key
pub fn rsa_private_pem(key: &rsa::RsaPrivateKey) -> String {
    key.to_pkcs8_pem(LineEnding::LF)
        .expect("Failed to encode RSA private key")
        .to_string()
}

/// SPKI PEM of an RSA public key
pub fn rsa_public_pem(key: &rsa::RsaPublicKey) -> String {
    key.to_public_key_pem(LineEnding::LF)
        .expect("Failed to encode RSA public key")
}

/// JWK of a P-256 public key
pub fn ec_public_jwk(key: &p256::PublicKey) -> String {
    key.to_jwk_string()
}

/// JWK of a P-256 private key (includes `d`)
pub fn ec_private_jwk(key: &p256::SecretKey) -> String {
    key.to_jwk_string().to_string()
}

/// JWK of an RSA public key
pub fn rsa_public_jwk(key: &rsa::RsaPublicKey) -> String {
    use rsa::traits::PublicKeyParts;

    serde_json::json!({
        "kty": "RSA",
        "n": URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
        "e": URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
    })
    .to_string()
}

/// JWK of an RSA private key (includes `d`, `p`, `q`)
pub fn rsa_private_jwk(key: &rsa::RsaPrivateKey) -> String {
    use rsa::traits::{PrivateKeyParts, PublicKeyParts};

    let primes = key.primes();
    serde_json::json!({
        "kty": "RSA",
        "n": URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
        "e": URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
        "d": URL_SAFE_NO_PAD.encode(key.d().to_bytes_be()),
        "p": URL_SAFE_NO_PAD.encode(primes[0].to_bytes_be()),
        "q": URL_SAFE_NO_PAD.encode(primes[1].to_bytes_be()),
    })
    .to_string()
}

/// Standard base64 of the PKCS#8 DER encoding of a P-256 private key
pub fn ec_private_der_b64(key: &p256::SecretKey) -> String {
    let der = key.to_pkcs8_der().expect("Failed to encode EC private key");
    STANDARD.encode(der.as_bytes())
}

/// Standard base64 of the SPKI DER encoding of a P-256 public key
pub fn ec_public_der_b64(key: &p256::PublicKey) -> String {
    let der = key
        .to_public_key_der()
        .expect("Failed to encode EC public key");
    STANDARD.encode(der.as_bytes())
}

/// Standard base64 of the PKCS#8 DER encoding of an RSA private key
pub fn rsa_private_der_b64(key: &rsa::RsaPrivateKey) -> String {
    let der = key.to_pkcs8_der().expect("Failed to encode RSA private key");
    STANDARD.encode(der.as_bytes())
}

/// Standard base64 of the SPKI DER encoding of an RSA public key
pub fn rsa_public_der_b64(key: &rsa::RsaPublicKey) -> String {
    let der = key
        .to_public_key_der()
        .expect("Failed to encode RSA public key");
    STANDARD.encode(der.as_bytes())
}
