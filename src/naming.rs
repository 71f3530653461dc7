//! Identifier and constraint naming policy.
//!
//! [`NamingConvention`] derives sequence and history table names from logical
//! names. [`ConstraintNaming`] normalises identifier case, supplies default
//! constraint names and keeps generated names within the platform's maximum
//! identifier length.

use serde::{Deserialize, Serialize};

/// Case applied to unquoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierCase {
    #[default]
    Lower,
    Upper,
    Preserve,
}

impl IdentifierCase {
    fn apply(self, name: &str) -> String {
        match self {
            IdentifierCase::Lower => name.to_lowercase(),
            IdentifierCase::Upper => name.to_uppercase(),
            IdentifierCase::Preserve => name.to_string(),
        }
    }
}

/// Naming of derived objects: sequences and history tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConvention {
    sequence_format: String,
    history_table_suffix: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            sequence_format: "{table}_seq".to_string(),
            history_table_suffix: "_history".to_string(),
        }
    }
}

impl NamingConvention {
    /// Create with a sequence format (`{table}` and `{column}` placeholders)
    /// and the suffix appended to base table names for history tables.
    pub fn new(sequence_format: impl Into<String>, history_table_suffix: impl Into<String>) -> Self {
        Self {
            sequence_format: sequence_format.into(),
            history_table_suffix: history_table_suffix.into(),
        }
    }

    /// Sequence name for a table's single-column primary key
    pub fn sequence_name(&self, table: &str, pk_column: &str) -> String {
        self.sequence_format
            .replace("{table}", &unqualified(table))
            .replace("{column}", pk_column)
    }

    /// History table name for a base table
    pub fn history_table_name(&self, base_table: &str) -> String {
        format!("{}{}", base_table, self.history_table_suffix)
    }

    pub fn history_table_suffix(&self) -> &str {
        &self.history_table_suffix
    }
}

/// Counter used to disambiguate truncated names of one kind within one table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NameCounter(u32);

impl NameCounter {
    fn next(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// One counter per constraint kind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameCounters {
    pub check: NameCounter,
    pub unique: NameCounter,
    pub foreign_key: NameCounter,
    pub index: NameCounter,
}

/// Constraint naming: identifier case, default names and maximum length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintNaming {
    case: IdentifierCase,
    max_length: usize,
}

impl ConstraintNaming {
    pub fn new(case: IdentifierCase, max_length: usize) -> Self {
        Self { case, max_length }
    }

    pub fn max_length_limit(&self) -> usize {
        self.max_length
    }

    pub fn case(&self) -> IdentifierCase {
        self.case
    }

    /// Normalise a table or column name.
    ///
    /// Quoted identifiers are returned as given.
    pub fn lower_name(&self, name: &str) -> String {
        let name = name.trim();
        if is_quoted(name) {
            return name.to_string();
        }
        self.case.apply(name)
    }

    pub fn primary_key_name(&self, table: &str) -> String {
        self.lower_name(&format!("pk_{}", sanitize(table)))
    }

    pub fn foreign_key_name(&self, table: &str, column: &str) -> String {
        self.lower_name(&format!("fk_{}_{}", sanitize(table), sanitize(column)))
    }

    pub fn foreign_key_index_name(&self, table: &str, column: &str) -> String {
        self.lower_name(&format!("ix_{}_{}", sanitize(table), sanitize(column)))
    }

    pub fn unique_name(&self, table: &str, column: &str) -> String {
        self.lower_name(&format!("uq_{}_{}", sanitize(table), sanitize(column)))
    }

    pub fn check_name(&self, table: &str, column: &str) -> String {
        self.lower_name(&format!("ck_{}_{}", sanitize(table), sanitize(column)))
    }

    /// Keep `name` within the maximum identifier length.
    ///
    /// Names that fit are returned unchanged and leave the counter alone. Longer
    /// names are truncated and suffixed with `_NN`, where `NN` is the next value
    /// of `counter`, zero padded to two digits.
    pub fn max_length(&self, name: &str, counter: &mut NameCounter) -> String {
        if name.chars().count() <= self.max_length {
            return name.to_string();
        }
        let suffix = format!("_{:02}", counter.next());
        let keep = self.max_length.saturating_sub(suffix.len());
        let prefix: String = name.chars().take(keep).collect();
        format!("{}{}", prefix, suffix)
    }
}

fn is_quoted(name: &str) -> bool {
    (name.starts_with('"') && name.ends_with('"'))
        || (name.starts_with('`') && name.ends_with('`'))
        || (name.starts_with('[') && name.ends_with(']'))
}

/// Schema-qualified names keep only the table part.
fn unqualified(table: &str) -> String {
    match table.rfind('.') {
        Some(pos) => table[pos + 1..].to_string(),
        None => table.to_string(),
    }
}

/// Sanitize a name for use inside a constraint name
fn sanitize(name: &str) -> String {
    name.trim().replace(['-', '.'], "_")
}
