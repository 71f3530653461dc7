//! Schema model: lookup from table name to the full table definition.

use std::collections::BTreeMap;

use log::debug;

use super::{has_value, Column, Operation, Table};
use crate::error::{DdlError, Result};

/// Current table definitions keyed by lower-cased table name.
///
/// Operations that only carry a table name (history changes, trigger
/// regeneration) resolve the full definition here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaModel {
    tables: BTreeMap<String, Table>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        let mut model = Self::new();
        for table in tables {
            model.add_table(table);
        }
        model
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(key(&table.name), table);
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&key(name))
    }

    /// Like [`SchemaModel::table`] but missing tables are an error.
    pub fn require_table(&self, name: &str) -> Result<&Table> {
        self.table(name)
            .ok_or_else(|| DdlError::UnknownTable(name.to_string()))
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Evolve the model by one change.
    ///
    /// Column changes and drops against tables the model does not know are
    /// skipped; the DDL for them needs no lookup. History changes need the
    /// table, so an unknown table is an error there.
    pub fn apply(&mut self, operation: &Operation) -> Result<()> {
        debug!("Applying {} on {} to schema model", operation.kind(), operation.table_name());
        match operation {
            Operation::CreateTable(table) => {
                self.add_table(table.clone());
            }
            Operation::DropTable(drop) => {
                self.tables.remove(&key(&drop.name));
            }
            Operation::AddColumn(add) => {
                if let Some(table) = self.known_table_mut(&add.table_name) {
                    for column in &add.columns {
                        if table.find_column(&column.name).is_none() {
                            table.columns.push(column.clone());
                        }
                    }
                }
            }
            Operation::DropColumn(drop) => {
                if let Some(table) = self.known_table_mut(&drop.table_name) {
                    table
                        .columns
                        .retain(|c| !c.name.eq_ignore_ascii_case(&drop.column_name));
                }
            }
            Operation::AlterColumn(alter) => {
                let column = self
                    .known_table_mut(&alter.table_name)
                    .and_then(|t| t.find_column_mut(&alter.column_name));
                match column {
                    Some(column) => alter_column(column, alter),
                    None => debug!(
                        "Column {}.{} not in schema model, skipping",
                        alter.table_name, alter.column_name
                    ),
                }
            }
            Operation::AddHistoryTable(add) => {
                self.table_mut(&add.base_table)?.with_history = true;
            }
            Operation::DropHistoryTable(drop) => {
                self.table_mut(&drop.base_table)?.with_history = false;
            }
        }
        Ok(())
    }

    fn known_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        let table = self.tables.get_mut(&key(name));
        if table.is_none() {
            debug!("Table {} not in schema model, skipping", name);
        }
        table
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(&key(name))
            .ok_or_else(|| DdlError::UnknownTable(name.to_string()))
    }
}

fn alter_column(column: &mut Column, alter: &super::AlterColumn) {
    if let Some(column_type) = has_value(&alter.column_type) {
        column.column_type = column_type.to_string();
    }
    if let Some(default_value) = has_value(&alter.default_value) {
        if default_value.eq_ignore_ascii_case(crate::platform::DROP_DEFAULT) {
            column.default_value = None;
        } else {
            column.default_value = Some(default_value.to_string());
        }
    }
    if let Some(notnull) = alter.notnull {
        column.notnull = notnull;
    }
    if has_value(&alter.drop_unique).is_some() {
        column.unique = None;
        column.unique_one_to_one = None;
    }
    if let Some(unique) = has_value(&alter.unique) {
        column.unique = Some(unique.to_string());
    }
    if let Some(unique) = has_value(&alter.unique_one_to_one) {
        column.unique_one_to_one = Some(unique.to_string());
    }
    if has_value(&alter.drop_foreign_key).is_some() {
        column.references = None;
        column.foreign_key_name = None;
        column.foreign_key_index = None;
    }
    if let Some(references) = has_value(&alter.references) {
        column.references = Some(references.to_string());
        column.foreign_key_name = alter.foreign_key_name.clone();
        column.foreign_key_index = alter.foreign_key_index.clone();
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}
