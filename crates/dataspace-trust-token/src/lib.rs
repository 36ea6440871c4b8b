//! # Dataspace Trust Token
//!
//! Bearer token handling for the connector trust core: validating incoming
//! tokens against a key resolver and a rule chain, and issuing self-signed
//! tokens for service-to-service calls.
//!
//! ## Architecture
//!
//! - `representation` - Compact token plus context, verified claim set
//! - `clock` - Injectable time source
//! - `crypto` - Key conversion and algorithm policy
//! - `rules` - Rule contract, built-in rules, per-context rule registry
//! - `validation` - Parse, resolve, verify, check
//! - `generator` - Token signing with decorators
//! - `sts` - Secure token service
//! - `settings` - File and environment settings
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dataspace_trust_keys::{InMemoryVault, KeyParserRegistry, LocalPublicKeyService};
//! use dataspace_trust_token::{
//!     ExpirationRule, SystemClock, TokenRepresentation, TokenValidationRule,
//!     TokenValidationService,
//! };
//!
//! # async fn example(token: String) -> dataspace_trust_keys::Result<()> {
//! let keys = LocalPublicKeyService::new(
//!     Arc::new(InMemoryVault::new()),
//!     Arc::new(KeyParserRegistry::with_default_parsers()),
//! );
//! let rules: Vec<Arc<dyn TokenValidationRule>> =
//!     vec![Arc::new(ExpirationRule::new(Arc::new(SystemClock)))];
//!
//! let claims = TokenValidationService::new()
//!     .validate(&TokenRepresentation::new(token), &keys, &rules)
//!     .await?;
//! println!("Token issued by {:?}", claims.string_claim("iss"));
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod crypto;
pub mod generator;
pub mod representation;
pub mod rules;
pub mod settings;
pub mod sts;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use crypto::DEFAULT_ALLOWED_ALGORITHMS;
pub use generator::{
    ClaimsDecorator, KeyIdDecorator, StandardClaimsDecorator, TokenDecorator, TokenGenerator,
};
pub use representation::{ClaimToken, TokenRepresentation};
pub use rules::{
    AudienceRule, ExpirationRule, IssuerEqualsSubjectRule, IssuerRule, LEEWAY_OUT_OF_RANGE,
    NotBeforeRule, RequiredClaimsRule, RuleFailure, RuleResult, TokenValidationRule,
    TokenValidationRulesRegistry, ValidationOutcome,
};
pub use settings::{
    MAX_CLOCK_SKEW_SECONDS, MAX_TOKEN_EXPIRATION_MINUTES, SettingsError, StsSettings,
    TrustSettings, ValidationSettings,
};
pub use sts::{
    DEFAULT_TOKEN_EXPIRATION_MINUTES, EmbeddedSecureTokenService, KeyIdSupplier,
    ResolverKeySupplier, SecureTokenService, SigningKeySupplier, fixed_key_id,
};
pub use validation::{TOKEN_DECODE_FAILURE, TOKEN_VERIFICATION_FAILURE, TokenValidationService};

/// Token crate result type, shared with the key crate
pub use dataspace_trust_keys::{Result, TrustError};
