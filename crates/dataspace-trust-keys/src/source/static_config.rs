//! Keys held as literal configuration values

use std::sync::Arc;

use async_trait::async_trait;

use super::KeySource;
use crate::config_source::ConfigSource;
use crate::error::{Result, TrustError};
use crate::material::EncodedKey;

/// Reads encoded keys from static configuration, using the key ID as the
/// configuration key
#[derive(Clone)]
pub struct ConfigKeySource {
    config: Arc<dyn ConfigSource>,
}

impl std::fmt::Debug for ConfigKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigKeySource").finish_non_exhaustive()
    }
}

impl ConfigKeySource {
    /// Create a source backed by `config`
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl KeySource for ConfigKeySource {
    async fn resolve_encoded(&self, id: &str) -> Result<EncodedKey> {
        self.config
            .get_string(id)
            .map(EncodedKey::from)
            .ok_or_else(|| TrustError::Resolution(format!("No config entry for key '{id}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_config_lookup() {
        let mut map = HashMap::new();
        map.insert("k1".to_string(), "encoded".to_string());
        let source = ConfigKeySource::new(Arc::new(map));

        assert_eq!(source.resolve_encoded("k1").await.unwrap().expose(), "encoded");
        assert_eq!(
            source.resolve_encoded("k2").await.unwrap_err().to_string(),
            "No config entry for key 'k2'"
        );
    }
}
