//! Column definition as it appears in a table model or an add-column change.

use serde::{Deserialize, Serialize};

use super::has_value;
use crate::error::{DdlError, Result};

/// A column in the platform neutral table model.
///
/// `column_type` is a logical cross-platform type token such as `clob`,
/// `varchar(20)` or `decimal(8,4)`; the platform converts it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub notnull: bool,
    pub primary_key: bool,
    pub default_value: Option<String>,
    /// Check constraint expression, e.g. `check (status in ('A','I'))`
    pub check_constraint: Option<String>,
    pub check_constraint_name: Option<String>,
    /// Unique constraint name
    pub unique: Option<String>,
    /// Unique constraint name for an optional one-to-one (unique among non-null values)
    pub unique_one_to_one: Option<String>,
    /// Foreign key target as `table.column`
    pub references: Option<String>,
    pub foreign_key_name: Option<String>,
    /// Index name for the foreign key, defaulting to `ix_{table}_{column}`
    pub foreign_key_index: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            ..Default::default()
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.notnull = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn unique(mut self, name: impl Into<String>) -> Self {
        self.unique = Some(name.into());
        self
    }

    pub fn unique_one_to_one(mut self, name: impl Into<String>) -> Self {
        self.unique_one_to_one = Some(name.into());
        self
    }

    pub fn check(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.check_constraint_name = Some(name.into());
        self.check_constraint = Some(expression.into());
        self
    }

    /// Reference `table.column`, optionally naming the constraint and the index
    /// on the owning column.
    pub fn references(
        mut self,
        references: impl Into<String>,
        fk_name: Option<&str>,
        index_name: Option<&str>,
    ) -> Self {
        self.references = Some(references.into());
        self.foreign_key_name = fk_name.map(str::to_string);
        self.foreign_key_index = index_name.map(str::to_string);
        self
    }

    /// Split `references` into the referenced table and column.
    ///
    /// Returns `Ok(None)` when the column has no reference.
    pub fn split_references(&self, table: &str) -> Result<Option<(String, String)>> {
        match has_value(&self.references) {
            Some(references) => split_reference(table, references).map(Some),
            None => Ok(None),
        }
    }
}

/// Split `table.column` at the last period.
///
/// Schema-qualified references (`schema.table.column`) keep the schema on the
/// table part.
pub fn split_reference(table: &str, references: &str) -> Result<(String, String)> {
    let references = references.trim();
    match references.rfind('.') {
        Some(pos) if pos > 0 && pos < references.len() - 1 => Ok((
            references[..pos].to_string(),
            references[pos + 1..].to_string(),
        )),
        _ => Err(DdlError::MalformedReference {
            table: table.to_string(),
            references: references.to_string(),
        }),
    }
}
