//! Error taxonomy shared by key resolution, token validation and token issuance

use thiserror::Error;

/// Result type for trust core operations
pub type Result<T> = std::result::Result<T, TrustError>;

/// Failure kinds of the trust core
///
/// Every variant except [`TrustError::RuleViolation`] carries a single
/// human-readable message; the `Display` output is that message verbatim so
/// that callers can surface it without additional decoration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrustError {
    /// A key source (vault, file, DID document, config) found nothing
    #[error("{0}")]
    Resolution(String),

    /// Encoded key or token was unrecognised or corrupt
    #[error("{0}")]
    Parse(String),

    /// Parsed key was of the wrong kind (e.g. public where private was required)
    #[error("{0}")]
    TypeMismatch(String),

    /// Cryptographic verification did not succeed
    #[error("{0}")]
    Signature(String),

    /// One or more validation rules rejected the claims
    #[error("{}", .0.join("; "))]
    RuleViolation(Vec<String>),

    /// Signing key or key ID could not be obtained when issuing a token
    #[error("{0}")]
    Issuance(String),
}

impl TrustError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            TrustError::Resolution(_) => "resolution_failure",
            TrustError::Parse(_) => "parse_failure",
            TrustError::TypeMismatch(_) => "type_mismatch",
            TrustError::Signature(_) => "signature_failure",
            TrustError::RuleViolation(_) => "rule_violation",
            TrustError::Issuance(_) => "issuance_failure",
        }
    }

    /// All failure messages carried by this error
    ///
    /// Rule violations yield one entry per violated rule message, every other
    /// kind yields exactly one entry.
    pub fn messages(&self) -> Vec<String> {
        match self {
            TrustError::RuleViolation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Rewrite the message while keeping the failure kind
    ///
    /// Used where a lower-level cause is wrapped into a caller-facing message,
    /// e.g. `"No public key could be resolved for key-ID 'x': <cause>"`.
    pub fn with_context<F>(self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        match self {
            TrustError::Resolution(m) => TrustError::Resolution(f(&m)),
            TrustError::Parse(m) => TrustError::Parse(f(&m)),
            TrustError::TypeMismatch(m) => TrustError::TypeMismatch(f(&m)),
            TrustError::Signature(m) => TrustError::Signature(f(&m)),
            TrustError::Issuance(m) => TrustError::Issuance(f(&m)),
            TrustError::RuleViolation(messages) => {
                TrustError::RuleViolation(vec![f(&messages.join("; "))])
            }
        }
    }
}
