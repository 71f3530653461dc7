//! SQL Server dialect.
//!
//! History uses system versioning, so there are no triggers to regenerate.
//! Unique constraints on nullable one-to-one columns are filtered indexes.

use super::{is_drop_default, DbIdentity, DbType, DbTypeMap, HistoryTable, PlatformDdl};
use crate::ddl::{DdlBuffer, DdlWrite, HistoryChange};
use crate::model::{has_value, AlterColumn, IdType};

const PERIOD_FROM: &str = "sys_periodFrom";
const PERIOD_TO: &str = "sys_periodTo";

#[derive(Debug, Clone)]
pub struct SqlServerDdl {
    type_map: DbTypeMap,
}

impl Default for SqlServerDdl {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlServerDdl {
    pub fn new() -> Self {
        let type_map = DbTypeMap::new()
            .with("clob", DbType::fixed("nvarchar(max)"))
            .with("longvarchar", DbType::fixed("nvarchar(max)"))
            .with("varchar", DbType::new("nvarchar"))
            .with("char", DbType::new("nchar"))
            .with("blob", DbType::fixed("varbinary(max)"))
            .with("longvarbinary", DbType::fixed("varbinary(max)"))
            .with("boolean", DbType::fixed("bit"))
            .with("uuid", DbType::fixed("uniqueidentifier"))
            .with("timestamp", DbType::fixed("datetime2"))
            .with("double", DbType::fixed("float(32)"))
            .with("json", DbType::fixed("nvarchar(max)"))
            .with("jsonb", DbType::fixed("nvarchar(max)"));
        Self { type_map }
    }

    fn default_constraint_name(table: &str, column: &str) -> String {
        format!("df_{}_{}", table, column)
    }

    fn write_create(write: &mut DdlWrite, history: &HistoryTable<'_>) {
        let base = &history.base_name;
        let apply = write.apply();
        apply
            .append(&format!(
                "alter table {} add {} datetime2 GENERATED ALWAYS AS ROW START NOT NULL constraint {} default SYSUTCDATETIME()",
                base,
                PERIOD_FROM,
                Self::default_constraint_name(base, PERIOD_FROM)
            ))
            .end_of_statement();
        apply
            .append(&format!(
                "alter table {} add {} datetime2 GENERATED ALWAYS AS ROW END NOT NULL constraint {} default '9999-12-31T23:59:59.9999999'",
                base,
                PERIOD_TO,
                Self::default_constraint_name(base, PERIOD_TO)
            ))
            .end_of_statement();
        apply
            .append(&format!(
                "alter table {} add PERIOD FOR SYSTEM_TIME ({}, {})",
                base, PERIOD_FROM, PERIOD_TO
            ))
            .end_of_statement();
        apply
            .append(&format!(
                "alter table {} set (system_versioning = on (history_table=dbo.{}))",
                base, history.history_name
            ))
            .end_of_statement();
    }

    fn write_versioning_off(buffer: &mut DdlBuffer, history: &HistoryTable<'_>) {
        let base = &history.base_name;
        buffer
            .append(&format!("alter table {} set (system_versioning = off)", base))
            .end_of_statement();
        buffer
            .append(&format!("alter table {} drop period for system_time", base))
            .end_of_statement();
        buffer
            .append(&format!("drop table {}", history.history_name))
            .end_of_statement();
    }

    fn drop_period_columns(buffer: &mut DdlBuffer, base: &str) {
        for column in [PERIOD_FROM, PERIOD_TO] {
            buffer
                .append(&format!(
                    "alter table {} drop constraint {}",
                    base,
                    Self::default_constraint_name(base, column)
                ))
                .end_of_statement();
            buffer
                .append(&format!("alter table {} drop column {}", base, column))
                .end_of_statement();
        }
    }
}

impl PlatformDdl for SqlServerDdl {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn type_map(&self) -> &DbTypeMap {
        &self.type_map
    }

    fn db_identity(&self) -> DbIdentity {
        DbIdentity {
            supports_identity: true,
            supports_sequence: true,
            default_id_type: IdType::Identity,
        }
    }

    fn max_constraint_length(&self) -> usize {
        128
    }

    fn identity_type(&self, physical: &str) -> String {
        format!("{} identity(1,1)", physical)
    }

    fn drop_index(&self, index: &str, table: &str) -> String {
        format!("drop index {} on {}", index, table)
    }

    fn alter_table_drop_foreign_key(&self, table: &str, fk_name: &str) -> String {
        format!("alter table {} drop constraint {}", table, fk_name)
    }

    /// Inline uniques are constraints, uniques added later are filtered indexes.
    fn alter_table_drop_unique(&self, table: &str, name: &str) -> String {
        format!(
            "if exists (select 1 from sys.key_constraints where name = '{name}') \
             alter table {table} drop constraint {name} \
             else drop index if exists {name} on {table}",
            name = name,
            table = table
        )
    }

    fn drop_external_unique(&self, name: &str, table: &str) -> String {
        self.drop_index(name, table)
    }

    fn add_column_keyword(&self) -> &str {
        "add"
    }

    fn is_inline_unique_one_to_one(&self) -> bool {
        false
    }

    fn create_external_unique_for_one_to_one(
        &self,
        name: &str,
        table: &str,
        columns: &[String],
    ) -> String {
        let filter = columns
            .iter()
            .map(|c| format!("{} is not null", c))
            .collect::<Vec<_>>()
            .join(" and ");
        format!(
            "create unique nonclustered index {} on {}({}) where {}",
            name,
            table,
            columns.join(","),
            filter
        )
    }

    fn foreign_key_restrict(&self) -> &str {
        "on delete no action on update no action"
    }

    fn alter_column_type(&self, _table: &str, _column: &str, _column_type: &str) -> Option<String> {
        None
    }

    fn alter_column_notnull(&self, _table: &str, _column: &str, _notnull: bool) -> Option<String> {
        None
    }

    fn alter_column_default_value(&self, table: &str, column: &str, default: &str) -> Option<String> {
        let constraint = Self::default_constraint_name(table, column);
        if is_drop_default(default) {
            Some(format!("alter table {} drop constraint {}", table, constraint))
        } else {
            Some(format!(
                "alter table {} add constraint {} default {} for {}",
                table, constraint, default, column
            ))
        }
    }

    fn alter_column_base_attributes(&self, alter: &AlterColumn) -> Option<String> {
        if has_value(&alter.column_type).is_none() && alter.notnull.is_none() {
            return None;
        }
        let column_type = alter
            .column_type
            .as_deref()
            .or(alter.current_type.as_deref())?;
        let nullability = match alter.notnull.or(alter.current_notnull) {
            Some(true) => " not null",
            _ => " null",
        };
        Some(format!(
            "alter table {} alter column {} {}{}",
            alter.table_name,
            alter.column_name,
            self.convert_type(column_type, false),
            nullability
        ))
    }

    fn create_with_history(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        Self::write_create(write, history);
        Self::write_versioning_off(write.rollback(), history);
    }

    fn add_history_table(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        Self::write_create(write, history);
        let rollback = write.rollback();
        Self::write_versioning_off(rollback, history);
        Self::drop_period_columns(rollback, &history.base_name);
    }

    fn drop_history_table(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        let drop = write.drop();
        Self::write_versioning_off(drop, history);
        Self::drop_period_columns(drop, &history.base_name);
    }

    fn regenerate_history_triggers(
        &self,
        _write: &mut DdlWrite,
        history: &HistoryTable<'_>,
        _change: &HistoryChange,
    ) {
        log::debug!(
            "system versioning keeps {} in step with {}, nothing to regenerate",
            history.history_name,
            history.base_name
        );
    }
}
