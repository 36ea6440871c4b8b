//! Dataspace trust core demo
//!
//! Generates a P-256 signing key, stores it in an in-memory vault, issues a
//! self-signed token through the secure token service and validates it with
//! the standard rules. The validated claims are printed to stdout as JSON;
//! logs go to stderr (`RUST_LOG=debug` for details, `LOG_FORMAT=json` for
//! structured output).
//!
//! ```text
//! dataspace-trust-demo [settings.toml]
//! ```

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use anyhow::Context;
use dataspace_trust_keys::{
    ConfigSource, InMemoryVault, KeyParserRegistry, LocalPublicKeyService, PinnedKeyResolver,
    PrivateKeyResolver, PublicKeyResolver, Vault, VaultKeySource,
};
use dataspace_trust_token::{
    AudienceRule, EmbeddedSecureTokenService, ExpirationRule, IssuerEqualsSubjectRule,
    NotBeforeRule, ResolverKeySupplier, SecureTokenService, SystemClock,
    TokenValidationRulesRegistry, TokenValidationService, TrustSettings, fixed_key_id,
    settings::DEFAULT_ENV_PREFIX,
};
use p256::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use secrecy::SecretString;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_DID: &str = "did:web:demo.example";
const DEMO_AUDIENCE: &str = "did:web:provider.example";
const VALIDATION_CONTEXT: &str = "dsp-request";

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        subscriber
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init()?;
    } else {
        subscriber.with(fmt::layer().with_writer(io::stderr)).try_init()?;
    }
    Ok(())
}

/// Settings plus the raw configuration used as private key fallback
fn load_settings() -> anyhow::Result<(TrustSettings, Arc<dyn ConfigSource>)> {
    let Some(path) = std::env::args().nth(1) else {
        let mut settings = TrustSettings::default();
        settings.sts.private_key_alias = "signing-key".to_string();
        settings.sts.public_key_id = format!("{DEMO_DID}#key-1");
        let config: Arc<dyn ConfigSource> = Arc::new(HashMap::<String, String>::new());
        return Ok((settings, config));
    };

    let config = TrustSettings::build_config(&path, DEFAULT_ENV_PREFIX)
        .with_context(|| format!("Failed to load settings from {path}"))?;
    let settings = TrustSettings::from_config(&config)?;
    info!(path, "Loaded settings");
    let config: Arc<dyn ConfigSource> = Arc::new(config);
    Ok((settings, config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let (settings, config) = load_settings()?;

    // Signing key lives in the vault under the configured alias
    let signing_key = p256::SecretKey::random(&mut rand::rngs::OsRng);
    let private_pem = signing_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| anyhow::anyhow!("Failed to encode signing key: {e}"))?
        .to_string();
    let public_pem = signing_key
        .public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| anyhow::anyhow!("Failed to encode public key: {e}"))?;

    let vault = Arc::new(InMemoryVault::new());
    vault
        .store_secret(&settings.sts.private_key_alias, SecretString::new(private_pem))
        .await?;

    let registry = Arc::new(KeyParserRegistry::with_default_parsers());

    let private_keys = Arc::new(PrivateKeyResolver::new(
        Arc::new(VaultKeySource::new(vault.clone())),
        config,
        registry.clone(),
    ));
    let sts = EmbeddedSecureTokenService::new(
        Arc::new(ResolverKeySupplier::new(
            private_keys,
            settings.sts.private_key_alias.clone(),
        )),
        fixed_key_id(settings.sts.public_key_id.clone()),
        Arc::new(SystemClock),
        settings.sts.token_ttl()?,
    );

    let public_keys = Arc::new(LocalPublicKeyService::new(vault, registry));
    public_keys.preload(&settings.public_keys).await?;
    public_keys.add_raw_key(&settings.sts.public_key_id, &public_pem)?;

    let resolver: Arc<dyn PublicKeyResolver> = match &settings.validation.verification_key_id {
        Some(key_id) => Arc::new(PinnedKeyResolver::new(public_keys, key_id.clone())),
        None => public_keys,
    };

    let clock = Arc::new(SystemClock);
    let clock_skew = settings.validation.clock_skew()?;
    let rules = TokenValidationRulesRegistry::new();
    rules.add_rule(
        VALIDATION_CONTEXT,
        ExpirationRule::with_leeway(clock.clone(), clock_skew),
    );
    rules.add_rule(
        VALIDATION_CONTEXT,
        NotBeforeRule::new(clock).leeway(clock_skew),
    );
    rules.add_rule(VALIDATION_CONTEXT, AudienceRule::new(DEMO_AUDIENCE));
    rules.add_rule(VALIDATION_CONTEXT, IssuerEqualsSubjectRule);

    let claims = serde_json::json!({ "iss": DEMO_DID, "sub": DEMO_DID })
        .as_object()
        .cloned()
        .unwrap_or_default();
    let token = sts.issue(claims, DEMO_AUDIENCE).await?;
    info!(ttl_minutes = settings.sts.token_expiration_minutes, "Issued self-signed token");

    let verified = TokenValidationService::new()
        .validate(&token, resolver.as_ref(), &rules.rules(VALIDATION_CONTEXT))
        .await?;
    info!(claims = verified.len(), "Token validated");

    println!("{}", serde_json::to_string_pretty(verified.claims())?);
    Ok(())
}
