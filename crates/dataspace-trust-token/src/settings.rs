//! Trust core settings
//!
//! Loaded from a TOML, YAML or JSON file with `DATASPACE_TRUST__*` environment
//! overrides, e.g. `DATASPACE_TRUST__STS__TOKEN_EXPIRATION_MINUTES=10`.

use std::path::{Path, PathBuf};

use chrono::Duration;
use config::{Config, Environment, File, FileFormat};
use dataspace_trust_keys::PublicKeyEntry;
use serde::{Deserialize, Serialize};

use crate::sts::DEFAULT_TOKEN_EXPIRATION_MINUTES;

/// Default environment variable prefix
pub const DEFAULT_ENV_PREFIX: &str = "DATASPACE_TRUST";

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_EXPIRATION_MINUTES: i64 = 365 * 24 * 60;

/// Largest accepted clock skew (one day)
pub const MAX_CLOCK_SKEW_SECONDS: i64 = 24 * 60 * 60;

/// Settings error types
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file not found
    #[error("Settings file not found: {0}")]
    FileNotFound(PathBuf),

    /// Unsupported file format
    #[error("Unsupported settings file format. Use .toml, .yaml, .yml, or .json")]
    UnsupportedFormat,

    /// Settings parsing error
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] config::ConfigError),

    /// Values that parse but make no sense
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Self-issued token settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StsSettings {
    /// Alias of the signing key in the vault (or literal config key)
    pub private_key_alias: String,
    /// Value of the `kid` header of issued tokens
    pub public_key_id: String,
    /// Lifetime of issued tokens in minutes
    pub token_expiration_minutes: i64,
}

impl Default for StsSettings {
    fn default() -> Self {
        Self {
            private_key_alias: String::new(),
            public_key_id: String::new(),
            token_expiration_minutes: DEFAULT_TOKEN_EXPIRATION_MINUTES,
        }
    }
}

impl StsSettings {
    /// Token lifetime
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] if the minutes do not fit a duration.
    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        Duration::try_minutes(self.token_expiration_minutes).ok_or_else(|| {
            SettingsError::Invalid(format!(
                "sts.token_expiration_minutes {} is out of range",
                self.token_expiration_minutes
            ))
        })
    }
}

/// Token validation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Tolerated clock skew for temporal claims
    pub clock_skew_seconds: i64,
    /// Pin verification to this key ID regardless of the `kid` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_key_id: Option<String>,
}

impl ValidationSettings {
    /// Tolerated clock skew
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] if the seconds do not fit a duration.
    pub fn clock_skew(&self) -> Result<Duration, SettingsError> {
        Duration::try_seconds(self.clock_skew_seconds).ok_or_else(|| {
            SettingsError::Invalid(format!(
                "validation.clock_skew_seconds {} is out of range",
                self.clock_skew_seconds
            ))
        })
    }
}

/// Complete trust core settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustSettings {
    /// Token issuance
    pub sts: StsSettings,
    /// Token validation
    pub validation: ValidationSettings,
    /// Public keys loaded into the local key service at startup
    pub public_keys: Vec<PublicKeyEntry>,
}

impl TrustSettings {
    /// Load settings from a file (TOML, YAML, or JSON)
    ///
    /// Environment variables prefixed with `DATASPACE_TRUST__` override file
    /// values; `__` separates nesting levels.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use dataspace_trust_token::TrustSettings;
    ///
    /// let settings = TrustSettings::from_file("trust.toml").expect("Failed to load settings");
    /// println!("Tokens live {} minutes", settings.sts.token_expiration_minutes);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file is missing, has an unknown
    /// extension, cannot be parsed or holds invalid values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        Self::from_file_with_prefix(path, DEFAULT_ENV_PREFIX)
    }

    /// Load settings from a file with a custom environment prefix
    ///
    /// # Errors
    ///
    /// See [`from_file`](Self::from_file).
    pub fn from_file_with_prefix(
        path: impl AsRef<Path>,
        env_prefix: &str,
    ) -> Result<Self, SettingsError> {
        Self::from_config(&Self::build_config(path, env_prefix)?)
    }

    /// Build the layered configuration (file, then environment)
    ///
    /// The returned [`Config`] also serves as the private key fallback lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file is missing, has an unknown
    /// extension or cannot be parsed.
    pub fn build_config(path: impl AsRef<Path>, env_prefix: &str) -> Result<Config, SettingsError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let format = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("yaml" | "yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => return Err(SettingsError::UnsupportedFormat),
        };

        let config = Config::builder()
            .add_source(File::new(
                path.to_str().ok_or(SettingsError::UnsupportedFormat)?,
                format,
            ))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config)
    }

    /// Deserialize settings from an already built configuration
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ParseError`] for malformed values and
    /// [`SettingsError::Invalid`] for out-of-range ones.
    pub fn from_config(config: &Config) -> Result<Self, SettingsError> {
        let settings: Self = config.clone().try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.sts.token_expiration_minutes <= 0 {
            return Err(SettingsError::Invalid(
                "sts.token_expiration_minutes must be positive".to_string(),
            ));
        }
        if self.sts.token_expiration_minutes > MAX_TOKEN_EXPIRATION_MINUTES {
            return Err(SettingsError::Invalid(format!(
                "sts.token_expiration_minutes must not exceed {MAX_TOKEN_EXPIRATION_MINUTES}"
            )));
        }
        if self.validation.clock_skew_seconds < 0 {
            return Err(SettingsError::Invalid(
                "validation.clock_skew_seconds must not be negative".to_string(),
            ));
        }
        if self.validation.clock_skew_seconds > MAX_CLOCK_SKEW_SECONDS {
            return Err(SettingsError::Invalid(format!(
                "validation.clock_skew_seconds must not exceed {MAX_CLOCK_SKEW_SECONDS}"
            )));
        }
        if let Some(entry) = self.public_keys.iter().find(|e| e.value.is_none() && e.path.is_none()) {
            return Err(SettingsError::Invalid(format!(
                "public key '{}' needs a value or a path",
                entry.id
            )));
        }
        Ok(())
    }
}
