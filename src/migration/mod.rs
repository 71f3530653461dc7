//! Versioned migration files.
//!
//! Each file holds one [`ChangeSet`](crate::model::ChangeSet) as JSON or TOML
//! and is named `m{YYYYMMDDHHMMSS}_{name}.json|toml`. Replaying the files in
//! version order evolves a [`SchemaModel`](crate::model::SchemaModel).

mod checksum;
mod file;

pub use checksum::{calculate_checksum, checksum, validate_checksum};
pub use file::{discover_migrations, MigrationFile, MigrationFormat};
