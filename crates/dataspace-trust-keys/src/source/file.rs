//! Keys stored as files in a directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::KeySource;
use crate::error::{Result, TrustError};
use crate::material::EncodedKey;

/// Reads encoded keys from files in a directory, using the key ID as the
/// file name
///
/// IDs that are not a single path component are rejected so a key ID can never
/// address a file outside the directory.
#[derive(Debug, Clone)]
pub struct FileKeySource {
    root: PathBuf,
}

impl FileKeySource {
    /// Create a source reading from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory keys are read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\'])
            && !id.contains('\0');
        if !valid {
            return Err(TrustError::Resolution(format!("Invalid key file name '{id}'")));
        }
        Ok(self.root.join(id))
    }
}

#[async_trait]
impl KeySource for FileKeySource {
    async fn resolve_encoded(&self, id: &str) -> Result<EncodedKey> {
        let path = self.path_for(id)?;
        debug!(key_id = id, path = %path.display(), "Reading key file");

        tokio::fs::read_to_string(&path)
            .await
            .map(EncodedKey::from)
            .map_err(|e| TrustError::Resolution(format!("Failed to read key file '{id}': {e}")))
    }
}
