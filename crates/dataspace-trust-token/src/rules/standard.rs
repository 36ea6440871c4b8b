//! Built-in claim rules

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;

use super::{RuleFailure, RuleResult, TokenValidationRule};
use crate::clock::Clock;
use crate::representation::ClaimToken;

/// Failure when the current time shifted by the leeway is not representable
pub const LEEWAY_OUT_OF_RANGE: &str = "Clock skew leeway is out of range";

/// `exp` must be present and lie after now (minus leeway); `iat`, if present,
/// must not be after `exp`
#[derive(Debug, Clone)]
pub struct ExpirationRule {
    clock: Arc<dyn Clock>,
    leeway: Duration,
}

impl ExpirationRule {
    /// Rule without leeway
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_leeway(clock, Duration::zero())
    }

    /// Rule tolerating `leeway` of clock skew
    pub fn with_leeway(clock: Arc<dyn Clock>, leeway: Duration) -> Self {
        Self { clock, leeway }
    }
}

impl TokenValidationRule for ExpirationRule {
    fn check(&self, token: &ClaimToken, _additional: &HashMap<String, Value>) -> RuleResult {
        let Some(exp) = token.numeric_claim("exp") else {
            return Err(RuleFailure::new("Required expiration time (exp) claim is missing in token"));
        };

        let Some(now) = self.clock.now().checked_sub_signed(self.leeway) else {
            return Err(RuleFailure::new(LEEWAY_OUT_OF_RANGE));
        };
        if exp <= now.timestamp() {
            return Err(RuleFailure::new("Token has expired (exp)"));
        }

        if let Some(iat) = token.numeric_claim("iat")
            && iat > exp
        {
            return Err(RuleFailure::new(
                "Issued at (iat) claim is after expiration time (exp) claim in token",
            ));
        }
        Ok(())
    }
}

/// `nbf`, if present, must not lie after now (plus leeway)
#[derive(Debug, Clone)]
pub struct NotBeforeRule {
    clock: Arc<dyn Clock>,
    leeway: Duration,
    allow_missing: bool,
}

impl NotBeforeRule {
    /// Rule without leeway that accepts tokens lacking `nbf`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            leeway: Duration::zero(),
            allow_missing: true,
        }
    }

    /// Tolerate `leeway` of clock skew
    pub fn leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Fail tokens that have no `nbf` claim
    pub fn require_claim(mut self) -> Self {
        self.allow_missing = false;
        self
    }
}

impl TokenValidationRule for NotBeforeRule {
    fn check(&self, token: &ClaimToken, _additional: &HashMap<String, Value>) -> RuleResult {
        let nbf = match token.numeric_claim("nbf") {
            Some(nbf) => nbf,
            None if self.allow_missing => return Ok(()),
            None => {
                return Err(RuleFailure::new("Required not before (nbf) claim is missing in token"));
            }
        };

        let Some(latest) = self.clock.now().checked_add_signed(self.leeway) else {
            return Err(RuleFailure::new(LEEWAY_OUT_OF_RANGE));
        };
        if nbf > latest.timestamp() {
            return Err(RuleFailure::new(
                "Current date/time with leeway before the not before (nbf) claim in token",
            ));
        }
        Ok(())
    }
}

/// `aud`, a string or an array of strings, must contain the expected audience
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceRule {
    expected: String,
}

impl AudienceRule {
    /// Require `expected` among the audiences
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl TokenValidationRule for AudienceRule {
    fn check(&self, token: &ClaimToken, _additional: &HashMap<String, Value>) -> RuleResult {
        let audiences: Vec<&str> = match token.claim("aud") {
            Some(Value::String(aud)) => vec![aud.as_str()],
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };

        if audiences.contains(&self.expected.as_str()) {
            Ok(())
        } else {
            Err(RuleFailure::new(format!(
                "Token audience claim (aud -> {audiences:?}) did not contain expected audience: {}",
                self.expected
            )))
        }
    }
}

/// `iss` must equal the expected issuer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerRule {
    expected: String,
}

impl IssuerRule {
    /// Require issuer `expected`
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl TokenValidationRule for IssuerRule {
    fn check(&self, token: &ClaimToken, _additional: &HashMap<String, Value>) -> RuleResult {
        match token.string_claim("iss") {
            Some(iss) if iss == self.expected => Ok(()),
            _ => Err(RuleFailure::new(format!(
                "Issuer (iss) claim is not '{}'",
                self.expected
            ))),
        }
    }
}

/// `iss` and `sub` must be present, non-empty and identical, as required for
/// self-issued tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct IssuerEqualsSubjectRule;

impl TokenValidationRule for IssuerEqualsSubjectRule {
    fn check(&self, token: &ClaimToken, _additional: &HashMap<String, Value>) -> RuleResult {
        match (token.string_claim("iss"), token.string_claim("sub")) {
            (Some(iss), Some(sub)) if !iss.is_empty() && iss == sub => Ok(()),
            _ => Err(RuleFailure::new("The iss and sub claims must be non-empty and identical.")),
        }
    }
}

/// Every named claim must be present; one message per missing claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredClaimsRule {
    names: Vec<String>,
}

impl RequiredClaimsRule {
    /// Require all of `names`
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl TokenValidationRule for RequiredClaimsRule {
    fn check(&self, token: &ClaimToken, _additional: &HashMap<String, Value>) -> RuleResult {
        let missing: Vec<String> = self
            .names
            .iter()
            .filter(|name| !token.contains(name))
            .map(|name| format!("Required claim '{name}' is missing"))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RuleFailure::with_messages(missing))
        }
    }
}
