//! Common test utilities for key resolution integration tests
//!
//! Provides a vault that counts reads and key sources with scripted
//! behaviour. Key generation lives in `dataspace_trust_keys::test_utils`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dataspace_trust_keys::{
    EncodedKey, InMemoryVault, KeySource, Result, TrustError, Vault,
};
use secrecy::SecretString;

/// Static config map
pub fn config(entries: &[(&str, String)]) -> Arc<HashMap<String, String>> {
    Arc::new(
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect(),
    )
}

/// Vault wrapper that counts `resolve_secret` calls
#[derive(Default)]
pub struct CountingVault {
    inner: InMemoryVault,
    reads: AtomicUsize,
}

impl CountingVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Vault for CountingVault {
    async fn resolve_secret(&self, key: &str) -> Option<SecretString> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_secret(key).await
    }

    async fn store_secret(&self, key: &str, value: SecretString) -> Result<()> {
        self.inner.store_secret(key, value).await
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        self.inner.delete_secret(key).await
    }
}

/// Key source that always fails
pub struct FailingSource;

#[async_trait]
impl KeySource for FailingSource {
    async fn resolve_encoded(&self, id: &str) -> Result<EncodedKey> {
        Err(TrustError::Resolution(format!("Source has no key '{id}'")))
    }
}

/// Key source returning a fixed encoded key for every ID
pub struct FixedSource(pub String);

#[async_trait]
impl KeySource for FixedSource {
    async fn resolve_encoded(&self, _id: &str) -> Result<EncodedKey> {
        Ok(EncodedKey::new(self.0.clone()))
    }
}
