//! Platform neutral schema model consumed by the DDL generator.
//!
//! The model is built elsewhere (from entity metadata or migration files); the
//! generator only reads it.

mod column;
mod embedded_id;
mod operation;
mod schema;
mod table;

pub use column::{split_reference, Column};
pub use embedded_id::{ConcatenatedKey, EmbeddedId, ImportedAssociation, ImportedColumn};
pub use operation::{
    AddColumn, AddHistoryTable, AlterColumn, ChangeSet, DropColumn, DropHistoryTable, DropTable,
    Operation,
};
pub use schema::SchemaModel;
pub use table::{ForeignKey, IdType, Table, UniqueConstraint};

/// Trimmed value when present and not blank.
pub(crate) fn has_value(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
