//! Token representations exchanged with callers

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A compact-serialised token plus contextual properties
///
/// The additional map carries request context (e.g. the expected audience)
/// into validation rules. It is never part of the signed content.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenRepresentation {
    token: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    additional: HashMap<String, Value>,
}

impl TokenRepresentation {
    /// Wrap a compact token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            additional: HashMap::new(),
        }
    }

    /// Attach a contextual property
    pub fn with_additional(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }

    /// The compact token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Contextual properties
    pub fn additional(&self) -> &HashMap<String, Value> {
        &self.additional
    }

    /// Take the compact token
    pub fn into_token(self) -> String {
        self.token
    }
}

// Bearer tokens are credentials
impl fmt::Debug for TokenRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRepresentation")
            .field("token", &"[REDACTED]")
            .field("additional", &self.additional)
            .finish()
    }
}

/// Verified claims of a token
///
/// Only built from tokens whose signature has been checked. Null-valued
/// claims are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimToken {
    claims: BTreeMap<String, Value>,
}

impl ClaimToken {
    /// Build from a claims object, skipping null values
    pub fn from_claims(claims: Map<String, Value>) -> Self {
        claims.into_iter().collect()
    }

    /// Raw claim value
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Claim value if it is a string
    pub fn string_claim(&self, name: &str) -> Option<&str> {
        self.claim(name).and_then(Value::as_str)
    }

    /// Claim value if it is an integer, as used by `exp`, `nbf` and `iat`
    pub fn numeric_claim(&self, name: &str) -> Option<i64> {
        self.claim(name).and_then(|value| {
            value
                .as_i64()
                .or_else(|| value.as_f64().map(|f| f as i64))
        })
    }

    /// Whether `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    /// All claims, ordered by name
    pub fn claims(&self) -> &BTreeMap<String, Value> {
        &self.claims
    }

    /// Number of claims
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether there are no claims
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl FromIterator<(String, Value)> for ClaimToken {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            claims: iter.into_iter().filter(|(_, value)| !value.is_null()).collect(),
        }
    }
}
