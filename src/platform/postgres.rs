//! PostgreSQL dialect.
//!
//! History uses a `tstzrange` period column, a plpgsql function copying the old
//! row into the history table and a `before update or delete` trigger.

use super::{prefixed_columns, DbIdentity, DbType, DbTypeMap, HistoryTable, PlatformDdl};
use crate::ddl::{DdlBuffer, DdlWrite, HistoryChange};
use crate::model::IdType;

const SYS_PERIOD: &str = "sys_period";

#[derive(Debug, Clone)]
pub struct PostgresDdl {
    type_map: DbTypeMap,
}

impl Default for PostgresDdl {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresDdl {
    pub fn new() -> Self {
        let type_map = DbTypeMap::new()
            .with("clob", DbType::fixed("text"))
            .with("longvarchar", DbType::fixed("text"))
            .with("blob", DbType::fixed("bytea"))
            .with("varbinary", DbType::fixed("bytea"))
            .with("longvarbinary", DbType::fixed("bytea"))
            .with("binary", DbType::fixed("bytea"))
            .with("double", DbType::fixed("float"))
            .with("tinyint", DbType::fixed("smallint"))
            .with("datetime", DbType::fixed("timestamp"))
            .with("uuid", DbType::fixed("uuid"));
        Self { type_map }
    }

    fn function_name(history: &HistoryTable<'_>) -> String {
        format!("{}_history_version", history.base_name)
    }

    fn write_trigger_function(buffer: &mut DdlBuffer, history: &HistoryTable<'_>, columns: &[String]) {
        let mut insert_columns = vec![SYS_PERIOD.to_string()];
        insert_columns.extend(columns.iter().cloned());
        let insert = format!(
            "insert into {} ({}) values (tstzrange(lower(OLD.{}), current_timestamp), {});",
            history.history_name,
            insert_columns.join(","),
            SYS_PERIOD,
            prefixed_columns("OLD.", columns)
        );

        buffer
            .append("create or replace function ")
            .append(&Self::function_name(history))
            .append("() returns trigger as $$")
            .new_line()
            .append("begin")
            .new_line()
            .append("  if (TG_OP = 'UPDATE') then")
            .new_line()
            .append("    ")
            .append(&insert)
            .new_line()
            .append("    NEW.sys_period = tstzrange(current_timestamp,null);")
            .new_line()
            .append("    return new;")
            .new_line()
            .append("  elsif (TG_OP = 'DELETE') then")
            .new_line()
            .append("    ")
            .append(&insert)
            .new_line()
            .append("    return old;")
            .new_line()
            .append("  end if;")
            .new_line()
            .append("end;")
            .new_line()
            .append("$$ LANGUAGE plpgsql")
            .end_of_statement();
    }

    fn write_create(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        let base = &history.base_name;
        let apply = write.apply();
        apply
            .append(&format!(
                "alter table {} add column {} tstzrange not null default tstzrange(current_timestamp, null)",
                base, SYS_PERIOD
            ))
            .end_of_statement();
        apply
            .append(&format!("create table {}(like {})", history.history_name, base))
            .end_of_statement();
        apply
            .append(&format!(
                "create view {} as select * from {} union all select * from {}",
                history.view_name(),
                base,
                history.history_name
            ))
            .end_of_statement();
        Self::write_trigger_function(apply, history, &history.column_names());
        apply
            .append(&format!(
                "create trigger {} before update or delete on {} for each row execute procedure {}()",
                history.trigger_name("upd"),
                base,
                Self::function_name(history)
            ))
            .end_of_statement();
    }

    fn write_teardown(buffer: &mut DdlBuffer, history: &HistoryTable<'_>) {
        buffer
            .append(&format!(
                "drop trigger if exists {} on {} cascade",
                history.trigger_name("upd"),
                history.base_name
            ))
            .end_of_statement();
        buffer
            .append(&format!("drop function if exists {}()", Self::function_name(history)))
            .end_of_statement();
        buffer
            .append(&format!("drop view if exists {}", history.view_name()))
            .end_of_statement();
        buffer
            .append(&format!("drop table if exists {}", history.history_name))
            .end_of_statement();
    }
}

impl PlatformDdl for PostgresDdl {
    fn name(&self) -> &'static str {
        "postgres"
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
        63
    }

    fn identity_type(&self, physical: &str) -> String {
        match physical {
            "integer" | "int" | "int4" => "serial".to_string(),
            "bigint" | "int8" => "bigserial".to_string(),
            "smallint" | "int2" => "smallserial".to_string(),
            other => other.to_string(),
        }
    }

    fn drop_table(&self, name: &str) -> String {
        format!("drop table if exists {} cascade", name)
    }

    fn create_with_history(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        self.write_create(write, history);
        Self::write_teardown(write.rollback(), history);
    }

    fn add_history_table(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        self.write_create(write, history);
        let rollback = write.rollback();
        Self::write_teardown(rollback, history);
        rollback
            .append(&format!("alter table {} drop column {}", history.base_name, SYS_PERIOD))
            .end_of_statement();
    }

    fn drop_history_table(&self, write: &mut DdlWrite, history: &HistoryTable<'_>) {
        let drop = write.drop();
        Self::write_teardown(drop, history);
        drop.append(&format!("alter table {} drop column {}", history.base_name, SYS_PERIOD))
            .end_of_statement();
    }

    fn regenerate_history_triggers(
        &self,
        write: &mut DdlWrite,
        history: &HistoryTable<'_>,
        change: &HistoryChange,
    ) {
        let lower = |names: Vec<String>| names.into_iter().map(|n| n.to_lowercase()).collect::<Vec<_>>();
        Self::write_trigger_function(write.apply(), history, &lower(change.apply_columns(history.table)));
        Self::write_trigger_function(
            write.rollback(),
            history,
            &lower(change.rollback_columns(history.table)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Table};

    #[test]
    fn test_type_conversion() {
        let ddl = PostgresDdl::new();
        assert_eq!(ddl.convert_type("clob", false), "text");
        assert_eq!(ddl.convert_type("blob", false), "bytea");
        assert_eq!(ddl.convert_type("json", false), "json");
        assert_eq!(ddl.convert_type("jsonb", false), "jsonb");
        assert_eq!(ddl.convert_type("hstore", false), "hstore");
        assert_eq!(ddl.convert_type("double", false), "float");
        assert_eq!(ddl.convert_type("tinyint", false), "smallint");
        assert_eq!(ddl.convert_type("varchar(20)", false), "varchar(20)");
        assert_eq!(ddl.convert_type("decimal(10)", false), "decimal(10)");
        assert_eq!(ddl.convert_type("decimal(8,4)", false), "decimal(8,4)");
        assert_eq!(ddl.convert_type("boolean", false), "boolean");
        assert_eq!(ddl.convert_type("bit", false), "bit");
        assert_eq!(ddl.convert_type("uuid", false), "uuid");
    }

    #[test]
    fn test_identity_types() {
        let ddl = PostgresDdl::new();
        assert_eq!(ddl.convert_type("integer", true), "serial");
        assert_eq!(ddl.convert_type("bigint", true), "bigserial");
        assert_eq!(ddl.convert_type("varchar(10)", true), "varchar(10)");
    }

    #[test]
    fn test_sequences() {
        let ddl = PostgresDdl::new();
        assert_eq!(ddl.create_sequence("customer_seq", 0, 0).as_deref(), Some("create sequence customer_seq"));
        assert_eq!(
            ddl.create_sequence("customer_seq", 1000, 50).as_deref(),
            Some("create sequence customer_seq start with 1000 increment by 50")
        );
        assert_eq!(ddl.drop_sequence("customer_seq"), "drop sequence if exists customer_seq");
    }

    #[test]
    fn test_alter_column_statements() {
        let ddl = PostgresDdl::new();
        assert_eq!(
            ddl.alter_column_type("customer", "name", "clob").as_deref(),
            Some("alter table customer alter column name type text")
        );
        assert_eq!(
            ddl.alter_column_default_value("customer", "status", "'A'").as_deref(),
            Some("alter table customer alter column status set default 'A'")
        );
        assert_eq!(
            ddl.alter_column_default_value("customer", "status", "drop default").as_deref(),
            Some("alter table customer alter column status drop default")
        );
        assert_eq!(
            ddl.alter_column_notnull("customer", "status", false).as_deref(),
            Some("alter table customer alter column status drop not null")
        );
        // uniques are constraints, dropped as such even when declared inline
        assert_eq!(
            ddl.alter_table_drop_unique("customer", "uq_customer_name"),
            "alter table customer drop constraint if exists uq_customer_name"
        );
        assert!(!ddl.base_attributes_include_default());
    }

    #[test]
    fn test_create_with_history() {
        let table = Table::new("customer")
            .column(Column::new("id", "bigint").primary_key())
            .column(Column::new("name", "varchar(40)"));
        let history = HistoryTable {
            table: &table,
            base_name: "customer".into(),
            history_name: "customer_history".into(),
        };
        let mut write = DdlWrite::default();
        PostgresDdl::new().create_with_history(&mut write, &history);

        let apply = write.apply_buffer().statements();
        assert!(apply[0].starts_with("alter table customer add column sys_period tstzrange"));
        assert_eq!(apply[1], "create table customer_history(like customer)");
        assert!(apply[3].contains("insert into customer_history (sys_period,id,name)"));
        assert!(apply[3].contains("OLD.id, OLD.name"));
        assert!(apply[4].starts_with("create trigger customer_history_upd"));

        let rollback = write.rollback_buffer().statements();
        assert_eq!(rollback[0], "drop trigger if exists customer_history_upd on customer cascade");
        assert_eq!(rollback[3], "drop table if exists customer_history");
    }
}
