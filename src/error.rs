//! Error types for DDL generation and migration loading

use thiserror::Error;

/// Errors raised while generating DDL or loading migrations.
///
/// All of these are fatal for the statement (or file) being processed. Features a
/// platform does not support are not errors: the dialect returns `None` and the
/// generator skips the statement.
#[derive(Debug, Error)]
pub enum DdlError {
    /// A foreign key reference without the `table.column` separator
    #[error("Expecting period '.' character for table.column split but not found in [{references}] on table {table}")]
    MalformedReference { table: String, references: String },

    /// Compound foreign key whose column lists do not line up
    #[error("Foreign key {name} has {columns} column(s) but references {ref_columns} column(s)")]
    ForeignKeyColumnMismatch {
        name: String,
        columns: usize,
        ref_columns: usize,
    },

    /// Table not present in the schema model lookup
    #[error("Table [{0}] not found in the schema model")]
    UnknownTable(String),

    /// Embedded id columns could not be matched to association properties
    #[error("No associations match the key columns of embedded id [{property}]")]
    UnmatchedConcatenatedKey { property: String },

    /// A matched association carries no value for one of the key columns
    #[error("Association [{property}] has no value for key column [{column}]")]
    MissingKeyValue { property: String, column: String },

    /// Platform name not recognised
    #[error("Unknown database platform: {0}")]
    UnknownPlatform(String),

    /// Invalid migration file or migration directory
    #[error("Migration error: {0}")]
    Migration(String),

    /// Migration file could not be parsed
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DdlError>;
