//! Common test utilities for token integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dataspace_trust_keys::{PrivateKey, PublicKey, PublicKeyResolver, Result, TrustError, test_utils};
use dataspace_trust_token::{
    ClaimToken, EmbeddedSecureTokenService, FixedClock, RuleFailure, TokenValidationRule,
    fixed_key_id,
};
use chrono::Duration;
use serde_json::{Map, Value};

/// Fixed "now" used across the suites
pub const NOW: i64 = 1_700_000_000;

pub fn ec_key() -> PrivateKey {
    PrivateKey::from(test_utils::ec_private_key())
}

pub fn rsa_key() -> PrivateKey {
    PrivateKey::from(test_utils::rsa_private_key())
}

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at_timestamp(NOW))
}

/// Claims object from a `json!` literal
pub fn claims(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected JSON object, got {other}"),
    }
}

/// STS signing with `key` under key ID `kid`, valid for five minutes
pub fn sts(key: PrivateKey, kid: &str, clock: Arc<FixedClock>) -> EmbeddedSecureTokenService {
    EmbeddedSecureTokenService::new(Arc::new(key), fixed_key_id(kid), clock, Duration::minutes(5))
}

/// Resolver serving a fixed map of key IDs
#[derive(Default)]
pub struct MapResolver(pub HashMap<String, PublicKey>);

impl MapResolver {
    pub fn with(id: &str, key: PublicKey) -> Self {
        let mut keys = HashMap::new();
        keys.insert(id.to_string(), key);
        Self(keys)
    }
}

#[async_trait]
impl PublicKeyResolver for MapResolver {
    async fn resolve_key(&self, id: &str) -> Result<PublicKey> {
        self.0
            .get(id)
            .cloned()
            .ok_or_else(|| TrustError::Resolution(format!("No public key could be resolved for key-ID '{id}'")))
    }
}

/// Rule that passes or fails with a fixed message
pub fn scripted_rule(passes: bool, message: String) -> Arc<dyn TokenValidationRule> {
    Arc::new(move |_: &ClaimToken, _: &HashMap<String, Value>| {
        if passes {
            Ok(())
        } else {
            Err(RuleFailure::new(message.clone()))
        }
    })
}
