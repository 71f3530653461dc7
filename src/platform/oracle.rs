//! Oracle dialect.

use super::{
    create_history_table_sql, is_drop_default, prefixed_columns, DbIdentity, DbType, DbTypeMap,
    HistoryTable, PlatformDdl,
};
use crate::ddl::{DdlBuffer, DdlWrite, HistoryChange};
use crate::model::IdType;

const PERIOD_START: &str = "sys_period_start";
const PERIOD_END: &str = "sys_period_end";

#[derive(Debug, Clone)]
pub struct OracleDdl {
    type_map: DbTypeMap,
}

impl Default for OracleDdl {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleDdl {
    pub fn new() -> Self {
        let type_map = DbTypeMap::new()
            .with("varchar", DbType::new("varchar2"))
            .with("longvarchar", DbType::fixed("clob"))
            .with("integer", DbType::fixed("number(10)"))
            .with("int", DbType::fixed("number(10)"))
            .with("bigint", DbType::fixed("number(19)"))
            .with("smallint", DbType::fixed("number(5)"))
            .with("tinyint", DbType::fixed("number(3)"))
            .with("boolean", DbType::fixed("number(1)"))
            .with("bit", DbType::fixed("number(1)"))
            .with("double", DbType::fixed("number(19,4)"))
            .with("uuid", DbType::fixed("varchar2(40)"))
            .with("json", DbType::fixed("clob"))
            .with("jsonb", DbType::fixed("clob"))
            .with("varbinary", DbType::new("raw"))
            .with("longvarbinary", DbType::fixed("blob"));
        Self { type_map }
    }

    fn write_trigger(buffer: &mut DdlBuffer, history: &HistoryTable<'_>, columns: &[String]) {
        let mut insert_columns = vec![PERIOD_START.to_string(), PERIOD_END.to_string()];
        insert_columns.extend(columns.iter().cloned());

        let block = format!(
            "create or replace trigger {trigger}\n  before update or delete on {base}\n  for each row\nbegin\n  insert into {history} ({columns}) values (:OLD.{start}, systimestamp, {old});\n  if updating then\n    :NEW.{start} := systimestamp;\n  end if;\nend;\n/",
            trigger = history.trigger_name("upd"),
            base = history.base_name,
            history = history.history_name,
            columns = insert_columns.join(","),
            start = PERIOD_START,
            old = prefixed_columns(":OLD.", columns),
        );
        buffer.append_block(&block);
    }

    fn write_create(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        let base = &history.base_name;
        let apply = write.apply();
        apply
            .append(&format!(
                "alter table {} add {} timestamp default systimestamp",
                base, PERIOD_START
            ))
            .end_of_statement();
        apply
            .append(&format!("alter table {} add {} timestamp", base, PERIOD_END))
            .end_of_statement();
        apply
            .append(&create_history_table_sql(
                self,
                history,
                &[(PERIOD_START, "timestamp"), (PERIOD_END, "timestamp")],
            ))
            .end_of_statement();
        apply
            .append(&format!(
                "create view {} as select * from {} union all select * from {}",
                history.view_name(),
                base,
                history.history_name
            ))
            .end_of_statement();
        Self::write_trigger(apply, history, &history.column_names());
    }

    fn write_teardown(buffer: &mut DdlBuffer, history: &HistoryTable<'_>) {
        buffer
            .append(&format!("drop trigger {}", history.trigger_name("upd")))
            .end_of_statement();
        buffer
            .append(&format!("drop view {}", history.view_name()))
            .end_of_statement();
        buffer
            .append(&format!("drop table {} cascade constraints purge", history.history_name))
            .end_of_statement();
    }

    fn drop_period_columns(buffer: &mut DdlBuffer, base: &str) {
        buffer
            .append(&format!(
                "alter table {} drop ({}, {})",
                base, PERIOD_START, PERIOD_END
            ))
            .end_of_statement();
    }
}

impl PlatformDdl for OracleDdl {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn type_map(&self) -> &DbTypeMap {
        &self.type_map
    }

    fn db_identity(&self) -> DbIdentity {
        DbIdentity {
            supports_identity: true,
            supports_sequence: true,
            default_id_type: IdType::Sequence,
        }
    }

    fn max_constraint_length(&self) -> usize {
        30
    }

    fn identity_type(&self, physical: &str) -> String {
        format!("{} generated by default as identity", physical)
    }

    fn drop_sequence(&self, name: &str) -> String {
        format!("drop sequence {}", name)
    }

    fn drop_table(&self, name: &str) -> String {
        format!("drop table {} cascade constraints purge", name)
    }

    fn drop_index(&self, index: &str, _table: &str) -> String {
        format!("drop index {}", index)
    }

    fn alter_table_drop_foreign_key(&self, table: &str, fk_name: &str) -> String {
        format!("alter table {} drop constraint {}", table, fk_name)
    }

    fn alter_table_drop_unique(&self, table: &str, name: &str) -> String {
        format!("alter table {} drop constraint {}", table, name)
    }

    fn add_column_keyword(&self) -> &str {
        "add"
    }

    fn foreign_key_restrict(&self) -> &str {
        ""
    }

    fn alter_column_type(&self, table: &str, column: &str, column_type: &str) -> Option<String> {
        Some(format!(
            "alter table {} modify {} {}",
            table,
            column,
            self.convert_type(column_type, false)
        ))
    }

    fn alter_column_default_value(&self, table: &str, column: &str, default: &str) -> Option<String> {
        let value = if is_drop_default(default) { "null" } else { default };
        Some(format!("alter table {} modify {} default {}", table, column, value))
    }

    fn alter_column_notnull(&self, table: &str, column: &str, notnull: bool) -> Option<String> {
        let nullability = if notnull { "not null" } else { "null" };
        Some(format!("alter table {} modify {} {}", table, column, nullability))
    }

    fn create_with_history(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        self.write_create(write, history);
        Self::write_teardown(write.rollback(), history);
    }

    fn add_history_table(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        self.write_create(write, history);
        let rollback = write.rollback();
        Self::write_teardown(rollback, history);
        Self::drop_period_columns(rollback, &history.base_name);
    }

    fn drop_history_table(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        let drop = write.drop();
        Self::write_teardown(drop, history);
        Self::drop_period_columns(drop, &history.base_name);
    }

    fn regenerate_history_triggers(
        &self,
        write: &mut DdlWrite,
        history: &HistoryTable<'_>,
        change: &HistoryChange,
    ) {
        let lower = |names: Vec<String>| names.into_iter().map(|n| n.to_lowercase()).collect::<Vec<_>>();
        Self::write_trigger(write.apply(), history, &lower(change.apply_columns(history.table)));
        Self::write_trigger(write.rollback(), history, &lower(change.rollback_columns(history.table)));
    }
}
