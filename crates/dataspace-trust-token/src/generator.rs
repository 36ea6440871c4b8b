//! JWS token generation with pluggable decorators

use chrono::{DateTime, Utc};
use dataspace_trust_keys::{PrivateKey, Result, TrustError};
use jsonwebtoken::Header;
use serde_json::{Map, Value};
use tracing::debug;

use crate::crypto;
use crate::representation::TokenRepresentation;

/// Mutates the header and claims of a token before it is signed
///
/// Decorators run in the order given; later decorators overwrite what earlier
/// ones set.
pub trait TokenDecorator: Send + Sync {
    /// Apply this decorator
    fn decorate(&self, header: &mut Header, claims: &mut Map<String, Value>);
}

impl<F> TokenDecorator for F
where
    F: Fn(&mut Header, &mut Map<String, Value>) + Send + Sync,
{
    fn decorate(&self, header: &mut Header, claims: &mut Map<String, Value>) {
        self(header, claims);
    }
}

/// Copies a fixed set of claims into the token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimsDecorator(pub Map<String, Value>);

impl TokenDecorator for ClaimsDecorator {
    fn decorate(&self, _header: &mut Header, claims: &mut Map<String, Value>) {
        claims.extend(self.0.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// Sets `iat`, `exp`, `aud` and `jti`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardClaimsDecorator {
    /// `iat`
    pub issued_at: DateTime<Utc>,
    /// `exp`
    pub expires_at: DateTime<Utc>,
    /// `aud`
    pub audience: String,
    /// `jti`
    pub token_id: String,
}

impl TokenDecorator for StandardClaimsDecorator {
    fn decorate(&self, _header: &mut Header, claims: &mut Map<String, Value>) {
        claims.insert("iat".into(), self.issued_at.timestamp().into());
        claims.insert("exp".into(), self.expires_at.timestamp().into());
        claims.insert("aud".into(), self.audience.clone().into());
        claims.insert("jti".into(), self.token_id.clone().into());
    }
}

/// Sets the `kid` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyIdDecorator(pub String);

impl TokenDecorator for KeyIdDecorator {
    fn decorate(&self, header: &mut Header, _claims: &mut Map<String, Value>) {
        header.kid = Some(self.0.clone());
    }
}

/// Signs tokens
///
/// The algorithm follows the key: ES256 for EC P-256, RS256 for RSA. The
/// `typ` header is `JWT`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenGenerator;

impl TokenGenerator {
    /// Create a generator
    pub fn new() -> Self {
        Self
    }

    /// Build, decorate and sign a token with `key`
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::Issuance`] if signing fails.
    pub fn generate(
        &self,
        key: &PrivateKey,
        decorators: &[&dyn TokenDecorator],
    ) -> Result<TokenRepresentation> {
        let mut header = Header::new(crypto::signing_algorithm(key));
        header.typ = Some("JWT".to_string());
        let mut claims = Map::new();

        for decorator in decorators {
            decorator.decorate(&mut header, &mut claims);
        }

        let encoding_key = crypto::encoding_key(key)?;
        let token = jsonwebtoken::encode(&header, &claims, &encoding_key)
            .map_err(|e| TrustError::Issuance(format!("Failed to sign token: {e}")))?;

        debug!(algorithm = ?header.alg, kid = ?header.kid, "Token signed");
        Ok(TokenRepresentation::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataspace_trust_keys::test_utils;
    use jsonwebtoken::Algorithm;
    use serde_json::json;

    fn parts(token: &str) -> (Header, Value) {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let header = jsonwebtoken::decode_header(token).unwrap();
        let payload = token.split('.').nth(1).unwrap();
        let claims = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        (header, claims)
    }

    #[test]
    fn test_ec_token_header() {
        let key = PrivateKey::from(test_utils::ec_private_key());
        let token = TokenGenerator::new()
            .generate(&key, &[&KeyIdDecorator("k1".to_string())])
            .unwrap();

        let (header, claims) = parts(token.token());
        assert_eq!(header.alg, Algorithm::ES256);
        assert_eq!(header.typ.as_deref(), Some("JWT"));
        assert_eq!(header.kid.as_deref(), Some("k1"));
        assert_eq!(claims, json!({}));
    }

    #[test]
    fn test_rsa_key_signs_rs256() {
        let key = PrivateKey::from(test_utils::rsa_private_key());
        let token = TokenGenerator::new().generate(&key, &[]).unwrap();
        assert_eq!(parts(token.token()).0.alg, Algorithm::RS256);
    }

    #[test]
    fn test_later_decorators_win() {
        let key = PrivateKey::from(test_utils::ec_private_key());
        let Value::Object(caller) = json!({"iss": "did:web:me", "aud": "caller"}) else {
            unreachable!()
        };
        let override_aud = |_: &mut Header, claims: &mut Map<String, Value>| {
            claims.insert("aud".to_string(), json!("decorated"));
        };

        let token = TokenGenerator::new()
            .generate(&key, &[&ClaimsDecorator(caller), &override_aud])
            .unwrap();

        let (_, claims) = parts(token.token());
        assert_eq!(claims, json!({"iss": "did:web:me", "aud": "decorated"}));
    }
}
