//! Read-only configuration lookup used as the private key fallback

use std::collections::HashMap;

/// Flat string lookup into static configuration
pub trait ConfigSource: Send + Sync {
    /// Value stored under `key`, if any
    fn get_string(&self, key: &str) -> Option<String>;
}

impl ConfigSource for ::config::Config {
    fn get_string(&self, key: &str) -> Option<String> {
        ::config::Config::get_string(self, key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
