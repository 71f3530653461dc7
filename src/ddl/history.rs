//! Tracking of history tables whose triggers must be regenerated.

use std::collections::BTreeMap;

use crate::model::Table;

/// Columns added to and dropped from one base table during a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryChange {
    pub added: Vec<String>,
    pub dropped: Vec<String>,
}

impl HistoryChange {
    /// Columns the regenerated forward trigger copies: the table's current
    /// columns minus the ones dropped in this batch.
    pub fn apply_columns(&self, table: &Table) -> Vec<String> {
        table
            .columns
            .iter()
            .map(|c| c.name.clone())
            .filter(|name| !contains(&self.dropped, name))
            .collect()
    }

    /// Columns for the rollback trigger: the forward set without the columns
    /// added in this batch.
    pub fn rollback_columns(&self, table: &Table) -> Vec<String> {
        self.apply_columns(table)
            .into_iter()
            .filter(|name| !contains(&self.added, name))
            .collect()
    }
}

/// Base tables registered for history trigger regeneration within one batch.
///
/// Each table appears once no matter how many columns changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryTriggerTracker {
    tables: BTreeMap<String, HistoryChange>,
}

impl HistoryTriggerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_added(&mut self, base_table: &str, column: &str) {
        let change = self.tables.entry(base_table.to_string()).or_default();
        if !contains(&change.added, column) {
            change.added.push(column.to_string());
        }
    }

    pub fn register_dropped(&mut self, base_table: &str, column: &str) {
        let change = self.tables.entry(base_table.to_string()).or_default();
        if !contains(&change.dropped, column) {
            change.dropped.push(column.to_string());
        }
    }

    pub fn contains(&self, base_table: &str) -> bool {
        self.tables.contains_key(base_table)
    }

    pub fn change(&self, base_table: &str) -> Option<&HistoryChange> {
        self.tables.get(base_table)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Consume the tracker, yielding each table exactly once.
    pub fn into_changes(self) -> impl Iterator<Item = (String, HistoryChange)> {
        self.tables.into_iter()
    }
}

fn contains(names: &[String], name: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name))
}
