//! File operations

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tokio::fs;

use crate::errors::DeployError;

/// A file wrapper with path
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
}

impl File {
    /// Create a new file reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the file exists
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Read file contents as string
    pub async fn read_string(&self) -> Result<String, DeployError> {
        fs::read_to_string(&self.path).await.map_err(|e| self.io_error(e))
    }

    /// Read file contents as bytes
    pub async fn read_bytes(&self) -> Result<Vec<u8>, DeployError> {
        fs::read(&self.path).await.map_err(|e| self.io_error(e))
    }

    /// Read file contents as a secret, e.g. a private key
    pub async fn read_secret(&self) -> Result<SecretString, DeployError> {
        Ok(SecretString::from(self.read_string().await?))
    }

    /// Read file as JSON
    pub async fn read_json<T: DeserializeOwned>(&self) -> Result<T, DeployError> {
        let contents = self.read_string().await?;
        let value = serde_json::from_str(&contents)?;
        Ok(value)
    }

    fn io_error(&self, e: std::io::Error) -> DeployError {
        DeployError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", self.path.display(), e),
        ))
    }
}
