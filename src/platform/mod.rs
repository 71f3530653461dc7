//! Database platform dialects.
//!
//! [`PlatformDdl`] is the per-engine strategy used by the table DDL generator:
//! type conversion, key generation policy and the SQL fragments that differ
//! between engines. Default methods carry the common SQL; each engine overrides
//! what it does differently.

mod mysql;
mod oracle;
mod postgres;
mod sqlserver;
mod type_map;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use mysql::MySqlDdl;
pub use oracle::OracleDdl;
pub use postgres::PostgresDdl;
pub use sqlserver::SqlServerDdl;
pub use type_map::{DbType, DbTypeMap};

use crate::ddl::{DdlWrite, HistoryChange};
use crate::error::DdlError;
use crate::model::{AlterColumn, IdType, Table};

/// Default value marker meaning "remove the column default"
pub const DROP_DEFAULT: &str = "DROP DEFAULT";

pub(crate) fn is_drop_default(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(DROP_DEFAULT)
}

/// Key generation strategies an engine supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbIdentity {
    pub supports_identity: bool,
    pub supports_sequence: bool,
    pub default_id_type: IdType,
}

impl DbIdentity {
    /// Resolve a requested strategy to one the engine supports.
    ///
    /// No request means the engine default. A request the engine cannot honour
    /// falls back to the other generated strategy, then to none.
    pub fn resolve(&self, requested: Option<IdType>) -> IdType {
        match requested {
            None => self.default_id_type,
            Some(IdType::None) => IdType::None,
            Some(IdType::Identity) if self.supports_identity => IdType::Identity,
            Some(IdType::Sequence) if self.supports_sequence => IdType::Sequence,
            Some(_) if self.supports_identity => IdType::Identity,
            Some(_) if self.supports_sequence => IdType::Sequence,
            Some(_) => IdType::None,
        }
    }
}

/// Names resolved for a base table and its history table.
#[derive(Debug, Clone)]
pub struct HistoryTable<'a> {
    pub table: &'a Table,
    pub base_name: String,
    pub history_name: String,
}

impl HistoryTable<'_> {
    /// Lower-cased names of all base table columns
    pub fn column_names(&self) -> Vec<String> {
        self.table.columns.iter().map(|c| c.name.to_lowercase()).collect()
    }

    pub fn view_name(&self) -> String {
        format!("{}_with_history", self.base_name)
    }

    pub fn trigger_name(&self, suffix: &str) -> String {
        format!("{}_history_{}", self.base_name, suffix)
    }
}

/// Per-engine DDL strategy.
pub trait PlatformDdl: fmt::Debug + Send + Sync {
    /// Platform name as used in configuration
    fn name(&self) -> &'static str;

    fn type_map(&self) -> &DbTypeMap;

    fn db_identity(&self) -> DbIdentity;

    /// Maximum length of generated identifiers
    fn max_constraint_length(&self) -> usize;

    fn statement_terminator(&self) -> &str {
        ";"
    }

    /// Convert a logical type, applying the identity form for identity columns.
    fn convert_type(&self, logical: &str, identity: bool) -> String {
        let converted = self.type_map().convert(logical);
        if identity {
            self.identity_type(&converted)
        } else {
            converted
        }
    }

    /// Column type for a database generated key.
    fn identity_type(&self, physical: &str) -> String;

    /// Effective key strategy for a single-column primary key.
    fn use_identity_type(&self, requested: Option<IdType>) -> IdType {
        self.db_identity().resolve(requested)
    }

    /// `None` when the engine has no sequences.
    fn create_sequence(&self, name: &str, initial: u32, allocate: u32) -> Option<String> {
        if !self.db_identity().supports_sequence {
            return None;
        }
        let mut sql = format!("create sequence {}", name);
        if initial > 1 {
            sql.push_str(&format!(" start with {}", initial));
        }
        if allocate > 1 {
            sql.push_str(&format!(" increment by {}", allocate));
        }
        Some(sql)
    }

    fn drop_sequence(&self, name: &str) -> String {
        format!("drop sequence if exists {}", name)
    }

    fn drop_table(&self, name: &str) -> String {
        format!("drop table if exists {}", name)
    }

    fn drop_index(&self, index: &str, _table: &str) -> String {
        format!("drop index if exists {}", index)
    }

    fn alter_table_drop_foreign_key(&self, table: &str, fk_name: &str) -> String {
        format!("alter table {} drop constraint if exists {}", table, fk_name)
    }

    /// Drop a unique constraint, whether declared in `create table` or added later.
    fn alter_table_drop_unique(&self, table: &str, name: &str) -> String {
        format!("alter table {} drop constraint if exists {}", table, name)
    }

    /// Rollback of [`PlatformDdl::create_external_unique_for_one_to_one`].
    fn drop_external_unique(&self, name: &str, table: &str) -> String {
        self.alter_table_drop_unique(table, name)
    }

    /// Keyword(s) between the table and the column in `alter table ... add`
    fn add_column_keyword(&self) -> &str {
        "add column"
    }

    /// Unique constraint created outside `create table`.
    fn create_external_unique_for_one_to_one(
        &self,
        name: &str,
        table: &str,
        columns: &[String],
    ) -> String {
        format!(
            "alter table {} add constraint {} unique ({})",
            table,
            name,
            columns.join(",")
        )
    }

    /// Whether an inline unique constraint already allows many nulls.
    fn is_inline_unique_one_to_one(&self) -> bool {
        true
    }

    fn foreign_key_restrict(&self) -> &str {
        "on delete restrict on update restrict"
    }

    fn alter_column_type(&self, table: &str, column: &str, column_type: &str) -> Option<String> {
        Some(format!(
            "alter table {} alter column {} type {}",
            table,
            column,
            self.convert_type(column_type, false)
        ))
    }

    fn alter_column_default_value(&self, table: &str, column: &str, default: &str) -> Option<String> {
        if is_drop_default(default) {
            Some(format!("alter table {} alter column {} drop default", table, column))
        } else {
            Some(format!("alter table {} alter column {} set default {}", table, column, default))
        }
    }

    fn alter_column_notnull(&self, table: &str, column: &str, notnull: bool) -> Option<String> {
        let action = if notnull { "set not null" } else { "drop not null" };
        Some(format!("alter table {} alter column {} {}", table, column, action))
    }

    /// Type, default and nullability restated together, for engines that
    /// cannot change them one at a time.
    fn alter_column_base_attributes(&self, _alter: &AlterColumn) -> Option<String> {
        None
    }

    /// The base attributes statement also carries the default, so a separate
    /// default statement is not written alongside it.
    fn base_attributes_include_default(&self) -> bool {
        false
    }

    /// History artifacts for a table created in the same batch.
    fn create_with_history(&self, write: &mut DdlWrite, history: &HistoryTable<'_>);

    /// History artifacts for an existing table.
    fn add_history_table(&self, write: &mut DdlWrite, history: &HistoryTable<'_>);

    fn drop_history_table(&self, write: &mut DdlWrite, history: &HistoryTable<'_>);

    /// Rebuild history triggers after the base table's columns changed.
    fn regenerate_history_triggers(
        &self,
        write: &mut DdlWrite,
        history: &HistoryTable<'_>,
        change: &HistoryChange,
    );
}

/// Supported database platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Postgres,
    MySql,
    SqlServer,
    Oracle,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Postgres,
        Platform::MySql,
        Platform::SqlServer,
        Platform::Oracle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Postgres => "postgres",
            Platform::MySql => "mysql",
            Platform::SqlServer => "sqlserver",
            Platform::Oracle => "oracle",
        }
    }

    /// Construct the dialect for this platform.
    pub fn ddl(&self) -> Arc<dyn PlatformDdl> {
        match self {
            Platform::Postgres => Arc::new(PostgresDdl::new()),
            Platform::MySql => Arc::new(MySqlDdl::new()),
            Platform::SqlServer => Arc::new(SqlServerDdl::new()),
            Platform::Oracle => Arc::new(OracleDdl::new()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = DdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Platform::Postgres),
            "mysql" | "mariadb" => Ok(Platform::MySql),
            "sqlserver" | "mssql" => Ok(Platform::SqlServer),
            "oracle" => Ok(Platform::Oracle),
            other => Err(DdlError::UnknownPlatform(other.to_string())),
        }
    }
}

/// `OLD.a, OLD.b` style column list
pub(crate) fn prefixed_columns(prefix: &str, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("{}{}", prefix, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `create table <history> (...)` with every base column nullable, followed by
/// the period columns.
pub(crate) fn create_history_table_sql(
    platform: &dyn PlatformDdl,
    history: &HistoryTable<'_>,
    period_columns: &[(&str, &str)],
) -> String {
    let mut lines: Vec<String> = history
        .table
        .columns
        .iter()
        .map(|c| {
            format!(
                "  {} {}",
                c.name.to_lowercase(),
                platform.convert_type(&c.column_type, false)
            )
        })
        .collect();
    for (name, column_type) in period_columns {
        lines.push(format!("  {} {}", name, column_type));
    }
    format!("create table {} (\n{}\n)", history.history_name, lines.join(",\n"))
}
