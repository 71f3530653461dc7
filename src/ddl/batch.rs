//! One migration's worth of schema changes.

use log::debug;

use super::{DdlWrite, HistoryTriggerTracker, TableDdl};
use crate::error::Result;
use crate::model::{has_value, AlterColumn, Operation, SchemaModel};

/// Generation context for one batch of changes.
///
/// Holds the output channels, the schema model (evolved as each change is
/// generated) and the history trigger tracker. [`MigrationBatch::finish`]
/// consumes the batch, so triggers are regenerated exactly once per batch.
#[derive(Debug)]
pub struct MigrationBatch<'a> {
    ddl: &'a TableDdl,
    model: &'a mut SchemaModel,
    write: DdlWrite,
    tracker: HistoryTriggerTracker,
}

impl<'a> MigrationBatch<'a> {
    pub fn new(ddl: &'a TableDdl, model: &'a mut SchemaModel) -> Self {
        Self {
            write: ddl.new_write(),
            ddl,
            model,
            tracker: HistoryTriggerTracker::new(),
        }
    }

    /// Generate DDL for one change, then apply it to the model.
    pub fn generate(&mut self, operation: &Operation) -> Result<()> {
        debug!("Generating {} for {}", operation.kind(), operation.table_name());
        let ddl = self.ddl;
        let write = &mut self.write;
        let model = &*self.model;

        match operation {
            Operation::CreateTable(table) => ddl.create_table(write, table)?,
            Operation::DropTable(drop) => ddl.drop_table(write, model, drop),
            Operation::AddColumn(add) => ddl.add_column(write, &mut self.tracker, model, add)?,
            Operation::DropColumn(drop) => {
                ddl.drop_column(write, &mut self.tracker, model, drop)
            }
            Operation::AlterColumn(alter) => {
                let alter = with_current_state(model, alter);
                ddl.alter_column(write, model, &alter)?
            }
            Operation::AddHistoryTable(add) => ddl.add_history_table(write, model, add)?,
            Operation::DropHistoryTable(drop) => ddl.drop_history_table(write, model, drop)?,
        }
        self.model.apply(operation)
    }

    /// Generate every change in order.
    pub fn generate_all<'o>(&mut self, operations: impl IntoIterator<Item = &'o Operation>) -> Result<()> {
        for operation in operations {
            self.generate(operation)?;
        }
        Ok(())
    }

    pub fn write(&self) -> &DdlWrite {
        &self.write
    }

    pub fn tracker(&self) -> &HistoryTriggerTracker {
        &self.tracker
    }

    pub fn model(&self) -> &SchemaModel {
        self.model
    }

    /// Regenerate history triggers for the tracked tables and return the output.
    pub fn finish(self) -> DdlWrite {
        let MigrationBatch {
            ddl,
            model,
            mut write,
            tracker,
        } = self;
        if !tracker.is_empty() {
            debug!("Regenerating history triggers for {} table(s)", tracker.len());
        }
        ddl.regenerate_history_triggers(&mut write, model, tracker);
        write
    }
}

/// Fill the previous type, default and nullability from the model when the
/// change does not carry them, so rollback statements can restore them.
fn with_current_state(model: &SchemaModel, alter: &AlterColumn) -> AlterColumn {
    let mut alter = alter.clone();
    let Some(column) = model
        .table(&alter.table_name)
        .and_then(|t| t.find_column(&alter.column_name))
    else {
        return alter;
    };
    if has_value(&alter.current_type).is_none() {
        alter.current_type = Some(column.column_type.clone());
    }
    if has_value(&alter.current_default_value).is_none() {
        alter.current_default_value = column.default_value.clone();
    }
    if alter.current_notnull.is_none() {
        alter.current_notnull = Some(column.notnull || column.primary_key);
    }
    alter
}
