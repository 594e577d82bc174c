//! File-backed mirror of the payment collection.

use std::path::{Path, PathBuf};

use domain::Payment;
use thiserror::Error;

/// Errors raised by mirror I/O.
///
/// These never cross the store boundary; the store logs them and keeps the
/// in-memory collection authoritative.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Serializes the full payment collection to a single JSON array file.
///
/// The file is rewritten wholesale on every mutation and read wholesale on
/// startup. Timestamps round-trip as ISO-8601 strings.
#[derive(Debug, Clone)]
pub struct FileMirror {
    path: PathBuf,
}

impl FileMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the mirrored collection.
    ///
    /// A missing file is an empty collection, not an error.
    pub async fn load(&self) -> Result<Vec<Payment>, MirrorError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Rewrites the mirror file with the given collection.
    pub async fn save(&self, payments: &[Payment]) -> Result<(), MirrorError> {
        let bytes = serde_json::to_vec_pretty(payments)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}
