//! Token validation rules
//!
//! A rule inspects the verified claims plus the contextual properties of the
//! token representation and either passes or fails with one or more messages.
//! Rules are pure and never panic. The validation engine runs every rule and
//! merges all failure messages, in rule order.

mod registry;
mod standard;

pub use registry::TokenValidationRulesRegistry;
pub use standard::{
    AudienceRule, ExpirationRule, IssuerEqualsSubjectRule, IssuerRule, LEEWAY_OUT_OF_RANGE,
    NotBeforeRule, RequiredClaimsRule,
};

use std::collections::HashMap;
use std::fmt;

use dataspace_trust_keys::TrustError;
use serde_json::Value;

use crate::representation::ClaimToken;

/// Failure of a single rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    messages: Vec<String>,
}

impl RuleFailure {
    /// Failure with one message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// Failure with several messages
    pub fn with_messages(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Failure messages
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("; "))
    }
}

/// Outcome of one rule
pub type RuleResult = std::result::Result<(), RuleFailure>;

/// Predicate over verified claims
pub trait TokenValidationRule: Send + Sync {
    /// Check `token`; `additional` holds the contextual properties of the
    /// token representation
    fn check(&self, token: &ClaimToken, additional: &HashMap<String, Value>) -> RuleResult;
}

impl<F> TokenValidationRule for F
where
    F: Fn(&ClaimToken, &HashMap<String, Value>) -> RuleResult + Send + Sync,
{
    fn check(&self, token: &ClaimToken, additional: &HashMap<String, Value>) -> RuleResult {
        self(token, additional)
    }
}

/// Accumulates the failures of every rule run against a token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    messages: Vec<String>,
}

impl ValidationOutcome {
    /// Empty, successful outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of one rule
    pub fn record(&mut self, result: RuleResult) {
        if let Err(failure) = result {
            self.messages.extend(failure.messages);
        }
    }

    /// Whether no rule failed
    pub fn is_success(&self) -> bool {
        self.messages.is_empty()
    }

    /// All failure messages so far
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Convert into the final result for `token`
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::RuleViolation`] with every recorded message if any
    /// rule failed.
    pub fn into_result(self, token: ClaimToken) -> Result<ClaimToken, TrustError> {
        if self.messages.is_empty() {
            Ok(token)
        } else {
            Err(TrustError::RuleViolation(self.messages))
        }
    }
}
