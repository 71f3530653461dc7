//! MySQL / MariaDB dialect.
//!
//! No sequences. Column changes restate the whole column with `modify`.
//! History is kept by `before update` / `before delete` triggers written as
//! `delimiter $$` blocks.

use super::{
    create_history_table_sql, is_drop_default, prefixed_columns, DbIdentity, DbType, DbTypeMap,
    HistoryTable, PlatformDdl,
};
use crate::ddl::{DdlBuffer, DdlWrite, HistoryChange};
use crate::model::{has_value, AlterColumn, IdType};

const PERIOD_START: &str = "sys_period_start";
const PERIOD_END: &str = "sys_period_end";

#[derive(Debug, Clone)]
pub struct MySqlDdl {
    type_map: DbTypeMap,
}

impl Default for MySqlDdl {
    fn default() -> Self {
        Self::new()
    }
}

impl MySqlDdl {
    pub fn new() -> Self {
        let type_map = DbTypeMap::new()
            .with("clob", DbType::fixed("longtext"))
            .with("longvarchar", DbType::fixed("longtext"))
            .with("blob", DbType::fixed("longblob"))
            .with("longvarbinary", DbType::fixed("longblob"))
            .with("boolean", DbType::fixed("tinyint(1)"))
            .with("bit", DbType::fixed("tinyint(1)"))
            .with("uuid", DbType::fixed("varchar(40)"))
            .with("timestamp", DbType::fixed("datetime(6)"))
            .with("jsonb", DbType::fixed("json"));
        Self { type_map }
    }

    fn write_triggers(buffer: &mut DdlBuffer, history: &HistoryTable<'_>, columns: &[String]) {
        let mut insert_columns = vec![PERIOD_START.to_string(), PERIOD_END.to_string()];
        insert_columns.extend(columns.iter().cloned());
        let insert = format!(
            "    insert into {} ({}) values (OLD.{}, now(6), {});",
            history.history_name,
            insert_columns.join(","),
            PERIOD_START,
            prefixed_columns("OLD.", columns)
        );

        let update = format!(
            "delimiter $$\ncreate trigger {} before update on {} for each row begin\n{}\n    set NEW.{} = now(6);\nend$$\ndelimiter ;",
            history.trigger_name("upd"),
            history.base_name,
            insert,
            PERIOD_START
        );
        let delete = format!(
            "delimiter $$\ncreate trigger {} before delete on {} for each row begin\n{}\nend$$\ndelimiter ;",
            history.trigger_name("del"),
            history.base_name,
            insert
        );
        buffer.append_block(&update).append_block(&delete);
    }

    fn drop_triggers(buffer: &mut DdlBuffer, history: &HistoryTable<'_>) {
        for suffix in ["upd", "del"] {
            buffer
                .append(&format!("drop trigger if exists {}", history.trigger_name(suffix)))
                .end_of_statement();
        }
    }

    fn write_create(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        let base = &history.base_name;
        let apply = write.apply();
        apply
            .append(&format!(
                "alter table {} add {} datetime(6) default now(6)",
                base, PERIOD_START
            ))
            .end_of_statement();
        apply
            .append(&format!("alter table {} add {} datetime(6)", base, PERIOD_END))
            .end_of_statement();
        apply
            .append(&create_history_table_sql(
                self,
                history,
                &[(PERIOD_START, "datetime(6)"), (PERIOD_END, "datetime(6)")],
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
        Self::write_triggers(apply, history, &history.column_names());
    }

    fn write_teardown(buffer: &mut DdlBuffer, history: &HistoryTable<'_>) {
        Self::drop_triggers(buffer, history);
        buffer
            .append(&format!("drop view if exists {}", history.view_name()))
            .end_of_statement();
        buffer
            .append(&format!("drop table if exists {}", history.history_name))
            .end_of_statement();
    }

    fn drop_period_columns(buffer: &mut DdlBuffer, base: &str) {
        for column in [PERIOD_START, PERIOD_END] {
            buffer
                .append(&format!("alter table {} drop column {}", base, column))
                .end_of_statement();
        }
    }
}

impl PlatformDdl for MySqlDdl {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn type_map(&self) -> &DbTypeMap {
        &self.type_map
    }

    fn db_identity(&self) -> DbIdentity {
        DbIdentity {
            supports_identity: true,
            supports_sequence: false,
            default_id_type: IdType::Identity,
        }
    }

    fn max_constraint_length(&self) -> usize {
        64
    }

    fn identity_type(&self, physical: &str) -> String {
        format!("{} auto_increment", physical)
    }

    fn drop_index(&self, index: &str, table: &str) -> String {
        format!("drop index {} on {}", index, table)
    }

    fn alter_table_drop_foreign_key(&self, table: &str, fk_name: &str) -> String {
        format!("alter table {} drop foreign key {}", table, fk_name)
    }

    /// Unique constraints are indexes.
    fn alter_table_drop_unique(&self, table: &str, name: &str) -> String {
        self.drop_index(name, table)
    }

    fn alter_column_type(&self, _table: &str, _column: &str, _column_type: &str) -> Option<String> {
        None
    }

    fn alter_column_notnull(&self, _table: &str, _column: &str, _notnull: bool) -> Option<String> {
        None
    }

    fn alter_column_default_value(&self, table: &str, column: &str, default: &str) -> Option<String> {
        if is_drop_default(default) {
            Some(format!("alter table {} alter {} drop default", table, column))
        } else {
            Some(format!("alter table {} alter {} set default {}", table, column, default))
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
        let notnull = alter.notnull.or(alter.current_notnull).unwrap_or(false);
        // `modify` replaces the whole definition, so the default is restated
        let default = match has_value(&alter.default_value) {
            Some(default) => Some(default),
            None => has_value(&alter.current_default_value),
        }
        .filter(|d| !is_drop_default(d));

        let mut sql = format!(
            "alter table {} modify {} {}",
            alter.table_name,
            alter.column_name,
            self.convert_type(column_type, false)
        );
        if let Some(default) = default {
            sql.push_str(&format!(" default {}", default));
        }
        if notnull {
            sql.push_str(" not null");
        }
        Some(sql)
    }

    fn base_attributes_include_default(&self) -> bool {
        true
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

        let apply = write.apply();
        Self::drop_triggers(apply, history);
        Self::write_triggers(apply, history, &lower(change.apply_columns(history.table)));

        let rollback = write.rollback();
        Self::drop_triggers(rollback, history);
        Self::write_triggers(rollback, history, &lower(change.rollback_columns(history.table)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Table};

    #[test]
    fn test_type_conversion() {
        let ddl = MySqlDdl::new();
        assert_eq!(ddl.convert_type("clob", false), "longtext");
        assert_eq!(ddl.convert_type("blob", false), "longblob");
        assert_eq!(ddl.convert_type("boolean", false), "tinyint(1)");
        assert_eq!(ddl.convert_type("uuid", false), "varchar(40)");
        assert_eq!(ddl.convert_type("timestamp", false), "datetime(6)");
        assert_eq!(ddl.convert_type("varchar(20)", false), "varchar(20)");
        assert_eq!(ddl.convert_type("decimal(8,4)", false), "decimal(8,4)");
        assert_eq!(ddl.convert_type("bigint", true), "bigint auto_increment");
    }

    #[test]
    fn test_no_sequences() {
        let ddl = MySqlDdl::new();
        assert_eq!(ddl.create_sequence("customer_seq", 1, 50), None);
        assert_eq!(ddl.use_identity_type(Some(IdType::Sequence)), IdType::Identity);
        assert_eq!(ddl.use_identity_type(None), IdType::Identity);
    }

    #[test]
    fn test_drop_statements() {
        let ddl = MySqlDdl::new();
        assert_eq!(ddl.drop_index("ix_order_customer", "orders"), "drop index ix_order_customer on orders");
        assert_eq!(
            ddl.alter_table_drop_foreign_key("orders", "fk_order_customer"),
            "alter table orders drop foreign key fk_order_customer"
        );
    }

    #[test]
    fn test_base_attributes_restate_column() {
        let ddl = MySqlDdl::new();
        let mut alter = AlterColumn::new("customer", "status");
        alter.notnull = Some(true);
        alter.current_type = Some("varchar(1)".into());

        assert_eq!(ddl.alter_column_type("customer", "status", "varchar(3)"), None);
        assert_eq!(ddl.alter_column_notnull("customer", "status", true), None);
        assert_eq!(
            ddl.alter_column_base_attributes(&alter).as_deref(),
            Some("alter table customer modify status varchar(1) not null")
        );

        alter.column_type = Some("clob".into());
        alter.notnull = Some(false);
        assert_eq!(
            ddl.alter_column_base_attributes(&alter).as_deref(),
            Some("alter table customer modify status longtext")
        );
    }

    #[test]
    fn test_base_attributes_keep_default() {
        let ddl = MySqlDdl::new();
        assert!(ddl.base_attributes_include_default());

        // type only: the existing default is restated
        let mut alter = AlterColumn::new("customer", "status");
        alter.column_type = Some("varchar(3)".into());
        alter.current_notnull = Some(true);
        alter.current_default_value = Some("'N'".into());
        assert_eq!(
            ddl.alter_column_base_attributes(&alter).as_deref(),
            Some("alter table customer modify status varchar(3) default 'N' not null")
        );

        // new default wins, dropping it leaves no default clause
        alter.default_value = Some("'A'".into());
        assert_eq!(
            ddl.alter_column_base_attributes(&alter).as_deref(),
            Some("alter table customer modify status varchar(3) default 'A' not null")
        );
        alter.default_value = Some("DROP DEFAULT".into());
        assert_eq!(
            ddl.alter_column_base_attributes(&alter).as_deref(),
            Some("alter table customer modify status varchar(3) not null")
        );
        assert_eq!(ddl.alter_table_drop_unique("customer", "uq_status"), "drop index uq_status on customer");
    }

    #[test]
    fn test_history_triggers_are_blocks() {
        let table = Table::new("customer")
            .column(Column::new("id", "bigint").primary_key())
            .column(Column::new("name", "varchar(40)"));
        let history = HistoryTable {
            table: &table,
            base_name: "customer".into(),
            history_name: "customer_history".into(),
        };
        let mut write = DdlWrite::default();
        MySqlDdl::new().create_with_history(&mut write, &history);

        let apply = write.apply_buffer();
        assert!(apply.statements()[2].starts_with("create table customer_history ("));
        assert!(apply.statements()[2].contains("  name varchar(40)"));
        assert!(apply.as_str().contains("delimiter $$\ncreate trigger customer_history_upd"));
        assert!(apply.as_str().contains("end$$\ndelimiter ;\n"));
        assert!(!apply.as_str().contains("delimiter ;;"));

        let rollback = write.rollback_buffer().statements();
        assert_eq!(rollback[0], "drop trigger if exists customer_history_upd");
        assert_eq!(rollback[1], "drop trigger if exists customer_history_del");
    }
}
