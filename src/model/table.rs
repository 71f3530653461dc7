//! Table model: the payload of a create-table change and the entry type of the
//! schema lookup.

use serde::{Deserialize, Serialize};

use super::Column;
use crate::error::{DdlError, Result};

/// Primary key generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    /// Keys are supplied by the application
    None,
    /// Database identity / auto-increment column
    Identity,
    /// Database sequence
    Sequence,
}

/// Compound foreign key.
///
/// `columns` and `ref_columns` correspond by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub ref_table_name: String,
    pub ref_columns: Vec<String>,
    pub index_name: Option<String>,
}

impl ForeignKey {
    pub fn new(
        name: impl Into<String>,
        columns: &[&str],
        ref_table_name: impl Into<String>,
        ref_columns: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ref_table_name: ref_table_name.into(),
            ref_columns: ref_columns.iter().map(|c| c.to_string()).collect(),
            index_name: None,
        }
    }

    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Check the column lists line up.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() || self.columns.len() != self.ref_columns.len() {
            return Err(DdlError::ForeignKeyColumnMismatch {
                name: self.name.clone(),
                columns: self.columns.len(),
                ref_columns: self.ref_columns.len(),
            });
        }
        Ok(())
    }
}

/// Multi-column unique constraint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

/// Table definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Table {
    pub name: String,
    /// Columns in physical order
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique_constraints: Vec<UniqueConstraint>,
    /// Requested key generation; the platform decides when absent
    pub identity_type: Option<IdType>,
    pub sequence_name: Option<String>,
    pub sequence_initial: Option<u32>,
    pub sequence_allocate: Option<u32>,
    pub pk_name: Option<String>,
    pub with_history: bool,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn unique_constraint(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.unique_constraints.push(UniqueConstraint {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn identity_type(mut self, id_type: IdType) -> Self {
        self.identity_type = Some(id_type);
        self
    }

    pub fn pk_name(mut self, name: impl Into<String>) -> Self {
        self.pk_name = Some(name.into());
        self
    }

    pub fn with_history(mut self) -> Self {
        self.with_history = true;
        self
    }

    /// Primary key columns in declared order.
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn find_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}
