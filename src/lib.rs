//! # Moorings
//!
//! Cross-platform DDL migration generator. A platform neutral schema model and
//! a list of schema changes go in; apply, rollback and drop scripts for
//! PostgreSQL, MySQL, SQL Server or Oracle come out.
//!
//! See [README on GitHub](https://github.com/microscaler/moorings) for the migration file format.

pub mod config;
pub mod ddl;
pub mod error;
pub mod migration;
pub mod model;
pub mod naming;
pub mod platform;

pub use config::DdlConfig;
pub use ddl::{DdlBuffer, DdlGenerator, DdlWrite, HistoryTriggerTracker, MigrationBatch, TableDdl};
pub use error::{DdlError, Result};
pub use model::{
    AddColumn, AddHistoryTable, AlterColumn, ChangeSet, Column, ConcatenatedKey, DropColumn,
    DropHistoryTable, DropTable, EmbeddedId, ForeignKey, IdType, ImportedAssociation, Operation,
    SchemaModel, Table, UniqueConstraint,
};
pub use naming::{ConstraintNaming, IdentifierCase, NamingConvention};
pub use platform::{Platform, PlatformDdl};
