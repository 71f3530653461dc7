//! Incremental schema changes.

use serde::{Deserialize, Serialize};

use super::{Column, Table};

/// Add one or more columns to an existing table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddColumn {
    pub table_name: String,
    pub columns: Vec<Column>,
    pub with_history: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropColumn {
    pub table_name: String,
    pub column_name: String,
    pub with_history: bool,
}

/// Alter a single column.
///
/// Every field other than the table and column name is optional and only the
/// present ones produce DDL. `current_type` and `current_notnull` describe the
/// column before the change; some platforms restate the whole column and the
/// rollback uses them to restore the previous definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlterColumn {
    pub table_name: String,
    pub column_name: String,
    pub with_history: bool,
    #[serde(rename = "type")]
    pub column_type: Option<String>,
    pub current_type: Option<String>,
    pub default_value: Option<String>,
    pub current_default_value: Option<String>,
    pub notnull: Option<bool>,
    pub current_notnull: Option<bool>,
    pub unique: Option<String>,
    pub drop_unique: Option<String>,
    pub unique_one_to_one: Option<String>,
    pub references: Option<String>,
    pub foreign_key_name: Option<String>,
    pub foreign_key_index: Option<String>,
    pub drop_foreign_key: Option<String>,
    pub drop_foreign_key_index: Option<String>,
}

impl AlterColumn {
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            ..Default::default()
        }
    }

    /// True when any of type, default or nullability changes
    pub fn alters_base_attributes(&self) -> bool {
        super::has_value(&self.column_type).is_some()
            || super::has_value(&self.default_value).is_some()
            || self.notnull.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropTable {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddHistoryTable {
    pub base_table: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropHistoryTable {
    pub base_table: String,
}

/// One schema change of a migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Operation {
    CreateTable(Table),
    DropTable(DropTable),
    AddColumn(AddColumn),
    DropColumn(DropColumn),
    AlterColumn(AlterColumn),
    AddHistoryTable(AddHistoryTable),
    DropHistoryTable(DropHistoryTable),
}

impl Operation {
    /// Name of the table this change applies to
    pub fn table_name(&self) -> &str {
        match self {
            Operation::CreateTable(t) => &t.name,
            Operation::DropTable(t) => &t.name,
            Operation::AddColumn(a) => &a.table_name,
            Operation::DropColumn(d) => &d.table_name,
            Operation::AlterColumn(a) => &a.table_name,
            Operation::AddHistoryTable(a) => &a.base_table,
            Operation::DropHistoryTable(d) => &d.base_table,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operation::CreateTable(_) => "createTable",
            Operation::DropTable(_) => "dropTable",
            Operation::AddColumn(_) => "addColumn",
            Operation::DropColumn(_) => "dropColumn",
            Operation::AlterColumn(_) => "alterColumn",
            Operation::AddHistoryTable(_) => "addHistoryTable",
            Operation::DropHistoryTable(_) => "dropHistoryTable",
        }
    }
}

/// Ordered set of changes making up one migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeSet {
    pub operations: Vec<Operation>,
}

impl ChangeSet {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}
