//! SHA-256 checksums of migration files and generated scripts.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{DdlError, Result};

/// Hex SHA-256 of `content`.
pub fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hex SHA-256 of a file's content.
pub fn calculate_checksum(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| {
        DdlError::Migration(format!("Failed to read migration file {}: {}", path.display(), e))
    })?;
    Ok(checksum(&content))
}

/// Compare a recorded checksum with the current one.
pub fn validate_checksum(stored: &str, current: &str) -> Result<()> {
    if stored == current {
        Ok(())
    } else {
        Err(DdlError::Migration(format!(
            "Checksum mismatch: stored={}, current={}",
            stored, current
        )))
    }
}
