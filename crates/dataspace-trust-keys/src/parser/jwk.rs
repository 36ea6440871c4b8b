//! JSON Web Key parser

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rsa::BigUint;
use serde_json::{Map, Value};

use super::KeyParser;
use crate::error::{Result, TrustError};
use crate::material::{KeyMaterial, PrivateKey, PublicKey, SymmetricKey};

/// Parser for single JSON Web Keys (RFC 7517)
///
/// - `kty: "EC"` with `crv: "P-256"`, private when `d` is present
/// - `kty: "RSA"`, private when `d`, `p` and `q` are present
/// - `kty: "oct"`, yields a [`SymmetricKey`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JwkKeyParser;

fn parse_object(encoded: &str) -> Option<Map<String, Value>> {
    let trimmed = encoded.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed).ok()? {
        Value::Object(map) if map.contains_key("kty") => Some(map),
        _ => None,
    }
}

fn member<'a>(jwk: &'a Map<String, Value>, name: &str) -> Result<&'a str> {
    jwk.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| TrustError::Parse(format!("JWK is missing member '{name}'")))
}

fn decode_member(jwk: &Map<String, Value>, name: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(member(jwk, name)?)
        .map_err(|e| TrustError::Parse(format!("JWK member '{name}' is not base64url: {e}")))
}

fn big_uint(jwk: &Map<String, Value>, name: &str) -> Result<BigUint> {
    decode_member(jwk, name).map(|bytes| BigUint::from_bytes_be(&bytes))
}

impl JwkKeyParser {
    fn parse_ec(jwk: &Map<String, Value>, json: &str) -> Result<KeyMaterial> {
        let crv = member(jwk, "crv")?;
        if crv != "P-256" {
            return Err(TrustError::Parse(format!("Unsupported EC curve '{crv}'")));
        }

        if jwk.contains_key("d") {
            p256::SecretKey::from_jwk_str(json)
                .map(|key| KeyMaterial::Private(PrivateKey::EcP256(key)))
                .map_err(|e| TrustError::Parse(format!("Invalid EC private JWK: {e}")))
        } else {
            p256::PublicKey::from_jwk_str(json)
                .map(|key| KeyMaterial::Public(PublicKey::EcP256(key)))
                .map_err(|e| TrustError::Parse(format!("Invalid EC public JWK: {e}")))
        }
    }

    fn parse_rsa(jwk: &Map<String, Value>) -> Result<KeyMaterial> {
        let n = big_uint(jwk, "n")?;
        let e = big_uint(jwk, "e")?;

        let is_private = ["d", "p", "q"].iter().all(|name| jwk.contains_key(*name));
        if is_private {
            let d = big_uint(jwk, "d")?;
            let primes = vec![big_uint(jwk, "p")?, big_uint(jwk, "q")?];
            let key = rsa::RsaPrivateKey::from_components(n, e, d, primes)
                .map_err(|e| TrustError::Parse(format!("Invalid RSA private JWK: {e}")))?;
            key.validate()
                .map_err(|e| TrustError::Parse(format!("Invalid RSA private JWK: {e}")))?;
            Ok(KeyMaterial::Private(key.into()))
        } else {
            rsa::RsaPublicKey::new(n, e)
                .map(|key| KeyMaterial::Public(key.into()))
                .map_err(|e| TrustError::Parse(format!("Invalid RSA public JWK: {e}")))
        }
    }

    fn parse_oct(jwk: &Map<String, Value>) -> Result<KeyMaterial> {
        let bytes = decode_member(jwk, "k")?;
        if bytes.is_empty() {
            return Err(TrustError::Parse("Symmetric JWK has an empty key".to_string()));
        }
        Ok(KeyMaterial::Symmetric(SymmetricKey::new(bytes)))
    }
}

impl KeyParser for JwkKeyParser {
    fn name(&self) -> &'static str {
        "jwk"
    }

    fn can_handle(&self, encoded: &str) -> bool {
        parse_object(encoded).is_some()
    }

    fn parse(&self, encoded: &str) -> Result<KeyMaterial> {
        let jwk = parse_object(encoded)
            .ok_or_else(|| TrustError::Parse("Not a JSON Web Key".to_string()))?;

        match member(&jwk, "kty")? {
            "EC" => Self::parse_ec(&jwk, encoded.trim()),
            "RSA" => Self::parse_rsa(&jwk),
            "oct" => Self::parse_oct(&jwk),
            other => Err(TrustError::Parse(format!("Unsupported JWK key type '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_declines_non_jwk() {
        assert!(!JwkKeyParser.can_handle("-----BEGIN PUBLIC KEY-----"));
        assert!(!JwkKeyParser.can_handle(r#"{"alg":"ES256"}"#));
        assert!(!JwkKeyParser.can_handle("[1, 2]"));
        assert!(JwkKeyParser.can_handle(r#" {"kty":"EC"} "#));
    }

    #[test]
    fn test_ec_public_and_private() {
        let secret = test_utils::ec_private_key();
        let public = secret.public_key();

        let material = JwkKeyParser.parse(&test_utils::ec_public_jwk(&public)).unwrap();
        assert_eq!(material.into_public(), Some(PublicKey::EcP256(public)));

        let material = JwkKeyParser.parse(&test_utils::ec_private_jwk(&secret)).unwrap();
        assert_eq!(material.into_private(), Some(PrivateKey::EcP256(secret)));
    }

    #[test]
    fn test_rsa_public_and_private() {
        let private = test_utils::rsa_private_key();
        let public = private.to_public_key();

        let material = JwkKeyParser.parse(&test_utils::rsa_public_jwk(&public)).unwrap();
        assert_eq!(material.into_public(), Some(PublicKey::Rsa(public)));

        let material = JwkKeyParser.parse(&test_utils::rsa_private_jwk(&private)).unwrap();
        assert_eq!(material.into_private(), Some(PrivateKey::from(private)));
    }

    #[test]
    fn test_oct_yields_symmetric_key() {
        let jwk = r#"{"kty":"oct","k":"c2VjcmV0"}"#;
        match JwkKeyParser.parse(jwk).unwrap() {
            KeyMaterial::Symmetric(key) => assert_eq!(key.expose(), b"secret"),
            other => panic!("Expected symmetric key, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_curve_and_type() {
        let err = JwkKeyParser
            .parse(r#"{"kty":"EC","crv":"P-384","x":"AA","y":"AA"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported EC curve 'P-384'");

        let err = JwkKeyParser.parse(r#"{"kty":"OKP","crv":"Ed25519"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported JWK key type 'OKP'");
    }

    #[test]
    fn test_missing_member() {
        let err = JwkKeyParser.parse(r#"{"kty":"RSA","e":"AQAB"}"#).unwrap_err();
        assert_eq!(err, TrustError::Parse("JWK is missing member 'n'".to_string()));
    }
}
