//! Migration file discovery and parsing

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use super::calculate_checksum;
use crate::error::{DdlError, Result};
use crate::model::ChangeSet;

/// `m{YYYYMMDDHHMMSS}_{name}.json|toml`
static FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^m(\d{14})_(.+)\.(json|toml)$").expect("valid migration file regex"));

/// Serialization of a migration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationFormat {
    Json,
    Toml,
}

impl MigrationFormat {
    fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "json" => Some(MigrationFormat::Json),
            "toml" => Some(MigrationFormat::Toml),
            _ => None,
        }
    }

    /// Parse a change set from file content.
    pub fn parse(&self, content: &str, path: &Path) -> Result<ChangeSet> {
        let parsed = match self {
            MigrationFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            MigrationFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| DdlError::Parse {
            path: path.display().to_string(),
            message,
        })
    }
}

/// A discovered migration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub path: PathBuf,

    /// Migration version (timestamp: YYYYMMDDHHMMSS)
    pub version: i64,

    /// Human-readable migration name
    pub name: String,

    pub format: MigrationFormat,

    /// SHA-256 checksum of the file content
    pub checksum: String,
}

impl MigrationFile {
    /// Parse a migration file name into version, name and format.
    ///
    /// # Example
    /// - `m20240120120000_create_users_table.json` → version: 20240120120000, name: "create_users_table"
    pub fn parse_filename(filename: &str) -> Result<(i64, String, MigrationFormat)> {
        let invalid = || {
            DdlError::Migration(format!(
                "Migration file name '{}' does not match expected pattern: m{{YYYYMMDDHHMMSS}}_{{name}}.json|toml",
                filename
            ))
        };
        let caps = FILE_NAME.captures(filename).ok_or_else(invalid)?;

        let version_str = &caps[1];
        let version = version_str.parse::<i64>().map_err(|e| {
            DdlError::Migration(format!("Invalid migration version {}: {}", version_str, e))
        })?;
        let format = MigrationFormat::from_extension(&caps[3]).ok_or_else(invalid)?;

        Ok((version, caps[2].to_string(), format))
    }

    /// Read a single migration file.
    pub fn open(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DdlError::Migration(format!("Invalid filename: {}", path.display())))?;
        let (version, name, format) = Self::parse_filename(filename)?;
        let checksum = calculate_checksum(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            version,
            name,
            format,
            checksum,
        })
    }

    /// `{version}_{name}`, the stem of generated script names
    pub fn script_stem(&self) -> String {
        format!("{}_{}", self.version, self.name)
    }

    /// Read and parse the change set.
    pub fn load(&self) -> Result<ChangeSet> {
        let content = fs::read_to_string(&self.path)?;
        self.format.parse(&content, &self.path)
    }
}

/// Discover all migration files in a directory
///
/// Scans for `.json` and `.toml` files, parses their names and returns them
/// sorted by version (oldest first). Other files are ignored; a `.json` or
/// `.toml` file with a malformed name, or two files with the same version,
/// is an error.
pub fn discover_migrations(migrations_dir: &Path) -> Result<Vec<MigrationFile>> {
    if !migrations_dir.is_dir() {
        return Err(DdlError::Migration(format!(
            "Migrations directory not found: {}",
            migrations_dir.display()
        )));
    }

    let mut migrations = Vec::new();
    for entry in fs::read_dir(migrations_dir)? {
        let path = entry?.path();
        let extension = path.extension().and_then(|s| s.to_str());
        if extension.and_then(MigrationFormat::from_extension).is_none() || !path.is_file() {
            continue;
        }
        migrations.push(MigrationFile::open(&path)?);
    }

    migrations.sort_by_key(|m| m.version);
    if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(DdlError::Migration(format!(
            "Duplicate migration version {}: {} and {}",
            pair[0].version,
            pair[0].path.display(),
            pair[1].path.display()
        )));
    }

    log::debug!(
        "Discovered {} migration(s) in {}",
        migrations.len(),
        migrations_dir.display()
    );
    Ok(migrations)
}
