//! Token validation engine
//!
//! Validation runs four phases and stops at the first failing one:
//!
//! 1. **Parse** the compact JWS into header and claims
//! 2. **Resolve** the verification key named by the `kid` header
//! 3. **Verify** the signature with that key
//! 4. **Check** every rule against the verified claims, merging all failures

use std::collections::HashSet;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dataspace_trust_keys::{PublicKey, PublicKeyResolver, Result, TrustError};
use jsonwebtoken::{Algorithm, Header, Validation};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::crypto::{self, DEFAULT_ALLOWED_ALGORITHMS};
use crate::representation::{ClaimToken, TokenRepresentation};
use crate::rules::{TokenValidationRule, ValidationOutcome};

/// Message of every token parse failure
pub const TOKEN_DECODE_FAILURE: &str = "Failed to decode token";

/// Message of every signature verification failure
pub const TOKEN_VERIFICATION_FAILURE: &str = "Token verification failed";

/// Validates compact JWS tokens against a key resolver and a rule list
///
/// Temporal and audience checks are not done by the JWT library; they are
/// expressed as rules so that every failure is reported together.
#[derive(Clone)]
pub struct TokenValidationService {
    allowed_algorithms: Vec<Algorithm>,
}

impl std::fmt::Debug for TokenValidationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidationService")
            .field("allowed_algorithms", &self.allowed_algorithms)
            .finish()
    }
}

impl Default for TokenValidationService {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_failure() -> TrustError {
    TrustError::Parse(TOKEN_DECODE_FAILURE.to_string())
}

fn verification_failure() -> TrustError {
    TrustError::Signature(TOKEN_VERIFICATION_FAILURE.to_string())
}

impl TokenValidationService {
    /// Service accepting ES256, RS256/384/512 and PS256/384/512
    pub fn new() -> Self {
        Self::with_allowed_algorithms(DEFAULT_ALLOWED_ALGORITHMS.iter().copied())
    }

    /// Service accepting only `algorithms`
    pub fn with_allowed_algorithms(algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        Self {
            allowed_algorithms: algorithms.into_iter().collect(),
        }
    }

    /// Accepted signature algorithms
    pub fn allowed_algorithms(&self) -> &[Algorithm] {
        &self.allowed_algorithms
    }

    fn parse(token: &str) -> Result<Header> {
        let mut parts = token.split('.');
        let (Some(_), Some(payload), Some(_), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(decode_failure());
        };

        let header = jsonwebtoken::decode_header(token).map_err(|e| {
            debug!(error = %e, "Invalid token header");
            decode_failure()
        })?;

        let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| decode_failure())?;
        match serde_json::from_slice::<Value>(&payload) {
            Ok(Value::Object(_)) => Ok(header),
            _ => Err(decode_failure()),
        }
    }

    fn verify(&self, token: &str, header: &Header, key: &PublicKey) -> Result<Map<String, Value>> {
        let algorithm = header.alg;
        if !self.allowed_algorithms.contains(&algorithm) {
            warn!(?algorithm, "Token signed with a disallowed algorithm");
            return Err(verification_failure());
        }
        if !crypto::is_compatible(algorithm, key.family()) {
            warn!(?algorithm, family = %key.family(), "Token algorithm does not match key family");
            return Err(verification_failure());
        }

        let decoding_key = crypto::decoding_key(key).map_err(|e| {
            warn!(error = %e, "Unusable verification key");
            verification_failure()
        })?;

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        jsonwebtoken::decode::<Map<String, Value>>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!(error = %e, "Token signature verification failed");
                verification_failure()
            })
    }

    /// Validate `representation`
    ///
    /// A missing `kid` header is resolved as the empty key ID.
    ///
    /// # Errors
    ///
    /// - [`TrustError::Parse`] with [`TOKEN_DECODE_FAILURE`] if the token is malformed
    /// - the resolver's failure, unchanged, if no key could be resolved
    /// - [`TrustError::Signature`] with [`TOKEN_VERIFICATION_FAILURE`] if the
    ///   signature does not verify
    /// - [`TrustError::RuleViolation`] with the messages of every failing rule
    pub async fn validate(
        &self,
        representation: &TokenRepresentation,
        resolver: &dyn PublicKeyResolver,
        rules: &[Arc<dyn TokenValidationRule>],
    ) -> Result<ClaimToken> {
        let token = representation.token();
        let header = Self::parse(token)?;

        let key_id = header.kid.as_deref().unwrap_or_default();
        let key = resolver.resolve_key(key_id).await?;

        let claims = self.verify(token, &header, &key)?;
        debug!(key_id, claims = claims.len(), "Token signature verified");

        let claim_token = ClaimToken::from_claims(claims);
        let mut outcome = ValidationOutcome::new();
        for rule in rules {
            outcome.record(rule.check(&claim_token, representation.additional()));
        }

        if !outcome.is_success() {
            debug!(
                key_id,
                failures = outcome.messages().len(),
                "Token rejected by validation rules"
            );
        }
        outcome.into_result(claim_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleFailure;
    use async_trait::async_trait;
    use dataspace_trust_keys::{PrivateKey, test_utils};
    use jsonwebtoken::EncodingKey;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    /// Resolver returning one fixed key and remembering nothing
    struct StaticResolver(PublicKey);

    #[async_trait]
    impl PublicKeyResolver for StaticResolver {
        async fn resolve_key(&self, id: &str) -> Result<PublicKey> {
            if id == "missing" {
                Err(TrustError::Resolution(format!("no key '{id}'")))
            } else {
                Ok(self.0.clone())
            }
        }
    }

    fn sign(key: &PrivateKey, algorithm: Algorithm, kid: Option<&str>, claims: &Value) -> String {
        let mut header = Header::new(algorithm);
        header.kid = kid.map(str::to_string);
        let encoding_key: EncodingKey = crypto::encoding_key(key).unwrap();
        jsonwebtoken::encode(&header, claims, &encoding_key).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_yields_claims() {
        let key = PrivateKey::from(test_utils::ec_private_key());
        let token = sign(&key, Algorithm::ES256, Some("k1"), &json!({"iss": "a", "nonce": null}));

        let claims = TokenValidationService::new()
            .validate(
                &TokenRepresentation::new(token),
                &StaticResolver(key.public_key()),
                &[],
            )
            .await
            .unwrap();

        assert_eq!(claims.string_claim("iss"), Some("a"));
        assert!(!claims.contains("nonce"));
    }

    #[tokio::test]
    async fn test_malformed_tokens() {
        let service = TokenValidationService::new();
        let resolver = StaticResolver(PrivateKey::from(test_utils::ec_private_key()).public_key());

        for token in ["", "abc", "a.b", "a.b.c.d", "eyJhbGciOiJFUzI1NiJ9.!!!.sig", "eyJhbGciOiJFUzI1NiJ9.WzFd.sig"] {
            let err = service
                .validate(&TokenRepresentation::new(token), &resolver, &[])
                .await
                .unwrap_err();
            assert_eq!(err, TrustError::Parse(TOKEN_DECODE_FAILURE.to_string()), "token {token:?}");
        }
    }

    #[tokio::test]
    async fn test_resolver_failure_is_returned_verbatim() {
        let key = PrivateKey::from(test_utils::ec_private_key());
        let token = sign(&key, Algorithm::ES256, Some("missing"), &json!({}));

        let err = TokenValidationService::new()
            .validate(&TokenRepresentation::new(token), &StaticResolver(key.public_key()), &[])
            .await
            .unwrap_err();
        assert_eq!(err, TrustError::Resolution("no key 'missing'".to_string()));
    }

    #[tokio::test]
    async fn test_disallowed_algorithm_fails_verification() {
        let key = PrivateKey::from(test_utils::rsa_private_key());
        let token = sign(&key, Algorithm::RS256, None, &json!({}));

        let err = TokenValidationService::with_allowed_algorithms([Algorithm::ES256])
            .validate(&TokenRepresentation::new(token), &StaticResolver(key.public_key()), &[])
            .await
            .unwrap_err();
        assert_eq!(err, TrustError::Signature(TOKEN_VERIFICATION_FAILURE.to_string()));
    }

    #[tokio::test]
    async fn test_rsa_pss_token_verifies() {
        let key = PrivateKey::from(test_utils::rsa_private_key());
        let token = sign(&key, Algorithm::PS256, None, &json!({"sub": "x"}));

        let claims = TokenValidationService::new()
            .validate(&TokenRepresentation::new(token), &StaticResolver(key.public_key()), &[])
            .await
            .unwrap();
        assert_eq!(claims.string_claim("sub"), Some("x"));
    }

    #[tokio::test]
    async fn test_key_family_mismatch_fails_verification() {
        let signing = PrivateKey::from(test_utils::ec_private_key());
        let other = PrivateKey::from(test_utils::rsa_private_key());
        let token = sign(&signing, Algorithm::ES256, None, &json!({}));

        let err = TokenValidationService::new()
            .validate(&TokenRepresentation::new(token), &StaticResolver(other.public_key()), &[])
            .await
            .unwrap_err();
        assert_eq!(err.category(), "signature_failure");
    }

    #[tokio::test]
    async fn test_rules_see_additional_properties() {
        let key = PrivateKey::from(test_utils::ec_private_key());
        let token = sign(&key, Algorithm::ES256, None, &json!({"aud": "did:web:a"}));
        let representation = TokenRepresentation::new(token).with_additional("audience", "did:web:b");

        let rule: Arc<dyn TokenValidationRule> = Arc::new(|claims: &ClaimToken, additional: &HashMap<String, Value>| {
            let expected = additional.get("audience").and_then(Value::as_str);
            if claims.string_claim("aud") == expected {
                Ok(())
            } else {
                Err(RuleFailure::new("audience mismatch"))
            }
        });

        let err = TokenValidationService::new()
            .validate(&representation, &StaticResolver(key.public_key()), &[rule])
            .await
            .unwrap_err();
        assert_eq!(err, TrustError::RuleViolation(vec!["audience mismatch".to_string()]));
    }
}
