//! Moorings Migration Library
//!
//! Replays migration files through the DDL generator and writes the resulting
//! scripts to disk. The CLI tool (main.rs) uses this library.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use moorings::migration::{checksum, discover_migrations, MigrationFile};
use moorings::{DdlError, DdlGenerator, DdlWrite, SchemaModel};

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error(transparent)]
    Ddl(#[from] DdlError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScriptError>;

/// One script file written to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenScript {
    pub path: PathBuf,

    /// SHA-256 checksum of the script content
    pub checksum: String,
}

/// Scripts generated for one migration file
#[derive(Debug, Clone)]
pub struct GeneratedMigration {
    pub version: i64,
    pub name: String,

    /// Checksum of the source migration file
    pub source_checksum: String,
    pub scripts: Vec<WrittenScript>,
}

/// Writes `{stem}.sql`, `{stem}-rollback.sql` and, when non-empty,
/// `{stem}-drop.sql` into `output_dir`.
pub fn write_scripts(output_dir: &Path, stem: &str, write: &DdlWrite) -> Result<Vec<WrittenScript>> {
    fs::create_dir_all(output_dir).map_err(|source| ScriptError::Write {
        path: output_dir.display().to_string(),
        source,
    })?;

    let mut files = vec![
        (format!("{}.sql", stem), write.apply_script()),
        (format!("{}-rollback.sql", stem), write.rollback_script()),
    ];
    let drop = write.drop_script();
    if !drop.is_empty() {
        files.push((format!("{}-drop.sql", stem), drop));
    }

    let mut written = Vec::with_capacity(files.len());
    for (file_name, content) in files {
        let path = output_dir.join(file_name);
        fs::write(&path, &content).map_err(|source| ScriptError::Write {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Wrote {}", path.display());
        written.push(WrittenScript {
            path,
            checksum: checksum(&content),
        });
    }
    Ok(written)
}

/// Generate one migration against `model` without touching the filesystem.
pub fn preview(generator: &DdlGenerator, model: &mut SchemaModel, migration: &MigrationFile) -> Result<DdlWrite> {
    let changes = migration.load()?;
    Ok(generator.generate(model, &changes)?)
}

/// Replay every migration in `migrations_dir` in version order and write
/// its scripts into `output_dir`.
///
/// Each migration is generated as its own batch against a model that carries
/// the tables created by earlier migrations.
pub fn generate_directory(
    generator: &DdlGenerator,
    migrations_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<GeneratedMigration>> {
    let migrations = discover_migrations(migrations_dir)?;
    log::info!(
        "Generating {} scripts for {} migration(s)",
        generator.platform_name(),
        migrations.len()
    );

    let mut model = SchemaModel::new();
    let mut generated = Vec::with_capacity(migrations.len());
    for migration in &migrations {
        let write = preview(generator, &mut model, migration)?;
        let scripts = write_scripts(output_dir, &migration.script_stem(), &write)?;
        generated.push(GeneratedMigration {
            version: migration.version,
            name: migration.name.clone(),
            source_checksum: migration.checksum.clone(),
            scripts,
        });
    }
    Ok(generated)
}
