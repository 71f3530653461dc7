//! Table level DDL generation.
//!
//! [`TableDdl`] turns one schema change into statements on the five output
//! channels of a [`DdlWrite`], asking the platform for dialect fragments and
//! the naming policy for identifiers.

use std::sync::Arc;

use log::{debug, warn};

use super::{DdlBuffer, DdlWrite, HistoryTriggerTracker};
use crate::error::Result;
use crate::model::{
    has_value, split_reference, AddColumn, AddHistoryTable, AlterColumn, Column, DropColumn,
    DropHistoryTable, DropTable, ForeignKey, IdType, SchemaModel, Table,
};
use crate::naming::{ConstraintNaming, NameCounter, NameCounters, NamingConvention};
use crate::platform::{HistoryTable, PlatformDdl, DROP_DEFAULT};

/// Width column names are padded to in `create table`
const COLUMN_WIDTH: usize = 30;

/// Column lists that already have a unique or primary key index.
#[derive(Debug, Default)]
struct IndexSet {
    indexes: Vec<Vec<String>>,
}

impl IndexSet {
    fn add(&mut self, columns: &[String]) {
        if !self.contains(columns) {
            self.indexes.push(columns.iter().map(|c| c.to_lowercase()).collect());
        }
    }

    fn contains(&self, columns: &[String]) -> bool {
        self.indexes.iter().any(|index| {
            index.len() == columns.len()
                && index
                    .iter()
                    .zip(columns)
                    .all(|(a, b)| a.eq_ignore_ascii_case(b))
        })
    }
}

/// State that lives for the generation of one table.
#[derive(Debug, Default)]
struct TableScratch {
    counters: NameCounters,
    /// One-to-one uniques the platform wants outside `create table`
    external_unique: Vec<(String, Vec<String>)>,
    indexes: IndexSet,
}

/// Foreign key resolved to physical names.
struct ForeignKeyDdl<'a> {
    table: &'a str,
    name: String,
    columns: Vec<String>,
    ref_table: String,
    ref_columns: Vec<String>,
    index: Option<String>,
}

/// Generates DDL for table and column changes on one platform.
#[derive(Debug, Clone)]
pub struct TableDdl {
    platform: Arc<dyn PlatformDdl>,
    naming: NamingConvention,
    constraint_naming: ConstraintNaming,
}

impl TableDdl {
    pub fn new(
        platform: Arc<dyn PlatformDdl>,
        naming: NamingConvention,
        constraint_naming: ConstraintNaming,
    ) -> Self {
        Self {
            platform,
            naming,
            constraint_naming,
        }
    }

    /// Default naming with the platform's maximum identifier length.
    pub fn for_platform(platform: Arc<dyn PlatformDdl>) -> Self {
        let constraint_naming =
            ConstraintNaming::new(Default::default(), platform.max_constraint_length());
        Self::new(platform, NamingConvention::default(), constraint_naming)
    }

    pub fn platform(&self) -> &dyn PlatformDdl {
        self.platform.as_ref()
    }

    pub fn naming(&self) -> &NamingConvention {
        &self.naming
    }

    pub fn constraint_naming(&self) -> &ConstraintNaming {
        &self.constraint_naming
    }

    /// Empty write using the platform's statement terminator.
    pub fn new_write(&self) -> DdlWrite {
        DdlWrite::new(self.platform.statement_terminator())
    }

    fn lower(&self, name: &str) -> String {
        self.constraint_naming.lower_name(name)
    }

    /// Normalised, length limited constraint name.
    fn constraint_name(&self, name: &str, counter: &mut NameCounter) -> String {
        self.constraint_naming.max_length(&self.lower(name), counter)
    }

    fn history_table<'t>(&self, table: &'t Table) -> HistoryTable<'t> {
        let base_name = self.lower(&table.name);
        let history_name = self.naming.history_table_name(&base_name);
        HistoryTable {
            table,
            base_name,
            history_name,
        }
    }

    fn has_history(model: &SchemaModel, table: &str, requested: bool) -> bool {
        requested || model.table(table).map_or(false, |t| t.with_history)
    }

    /// Create table, its history, sequence and foreign keys.
    ///
    /// References and compound foreign keys are checked before anything is
    /// written, so an error leaves `write` untouched.
    pub fn create_table(&self, write: &mut DdlWrite, table: &Table) -> Result<()> {
        let references = resolve_references(&table.name, &table.columns)?;
        for foreign_key in &table.foreign_keys {
            foreign_key.validate()?;
        }

        let mut scratch = TableScratch::default();
        let table_name = self.lower(&table.name);
        debug!("Generating create table for {}", table_name);

        let pk_columns = table.primary_key_columns();
        let id_type = if pk_columns.len() == 1 {
            self.platform.use_identity_type(table.identity_type)
        } else {
            IdType::None
        };
        let sequence_name = match (id_type, pk_columns.first()) {
            (IdType::Sequence, Some(pk)) => Some(
                has_value(&table.sequence_name)
                    .map(|s| self.lower(s))
                    .unwrap_or_else(|| {
                        self.naming.sequence_name(&table_name, &self.lower(&pk.name))
                    }),
            ),
            _ => None,
        };

        let apply = write.apply();
        apply.append("create table ").append(&table_name).append(" (");
        let mut first = true;
        for column in &table.columns {
            start_line(apply, &mut first);
            let identity = id_type == IdType::Identity && column.primary_key;
            apply
                .append_padded(&self.lower(&column.name), COLUMN_WIDTH)
                .append(&self.platform.convert_type(&column.column_type, identity));
            if column.notnull || column.primary_key {
                apply.append(" not null");
            }
        }
        for line in self.inline_constraints(table, &table_name, &pk_columns, &mut scratch) {
            start_line(apply, &mut first);
            apply.append(&line);
        }
        apply.new_line().append(")").end_of_statement();

        for (name, columns) in &scratch.external_unique {
            write
                .apply()
                .append(&self.platform.create_external_unique_for_one_to_one(name, &table_name, columns))
                .end_of_statement();
            write
                .rollback_foreign_keys()
                .append(&self.platform.drop_external_unique(name, &table_name))
                .end_of_statement();
        }

        if table.with_history {
            let history = self.history_table(table);
            self.platform.create_with_history(write, &history);
        }

        write
            .rollback()
            .append(&self.platform.drop_table(&table_name))
            .end_of_statement();

        if let Some(sequence) = &sequence_name {
            let initial = table.sequence_initial.unwrap_or(0);
            let allocate = table.sequence_allocate.unwrap_or(0);
            if let Some(sql) = self.platform.create_sequence(sequence, initial, allocate) {
                write.apply().append(&sql).end_of_statement();
                write
                    .rollback()
                    .append(&self.platform.drop_sequence(sequence))
                    .end_of_statement();
            }
        }

        write.apply().end();
        write.rollback().end();

        self.create_foreign_keys(write, table, &table_name, &references, &mut scratch);
        Ok(())
    }

    /// Check, unique and primary key lines of `create table`.
    fn inline_constraints(
        &self,
        table: &Table,
        table_name: &str,
        pk_columns: &[&Column],
        scratch: &mut TableScratch,
    ) -> Vec<String> {
        let mut lines = Vec::new();

        for column in &table.columns {
            if let Some(expression) = has_value(&column.check_constraint) {
                let name = has_value(&column.check_constraint_name)
                    .map(str::to_string)
                    .unwrap_or_else(|| self.constraint_naming.check_name(table_name, &column.name));
                let name = self.constraint_name(&name, &mut scratch.counters.check);
                lines.push(format!("constraint {} {}", name, check_clause(expression)));
            }
        }

        for column in &table.columns {
            let column_name = self.lower(&column.name);
            if let Some(unique) = has_value(&column.unique) {
                let name = self.constraint_name(unique, &mut scratch.counters.unique);
                lines.push(format!("constraint {} unique ({})", name, column_name));
                scratch.indexes.add(&[column_name.clone()]);
            }
            if let Some(unique) = has_value(&column.unique_one_to_one) {
                let name = self.constraint_name(unique, &mut scratch.counters.unique);
                if self.platform.is_inline_unique_one_to_one() {
                    lines.push(format!("constraint {} unique ({})", name, column_name));
                } else {
                    scratch.external_unique.push((name, vec![column_name.clone()]));
                }
                scratch.indexes.add(&[column_name]);
            }
        }

        for unique in &table.unique_constraints {
            let columns: Vec<String> = unique.columns.iter().map(|c| self.lower(c)).collect();
            let name = self.constraint_name(&unique.name, &mut scratch.counters.unique);
            lines.push(format!("constraint {} unique ({})", name, columns.join(",")));
            scratch.indexes.add(&columns);
        }

        if !pk_columns.is_empty() {
            let name = has_value(&table.pk_name)
                .map(str::to_string)
                .unwrap_or_else(|| self.constraint_naming.primary_key_name(table_name));
            let name = self.constraint_name(&name, &mut scratch.counters.index);
            let columns: Vec<String> = pk_columns.iter().map(|c| self.lower(&c.name)).collect();
            lines.push(format!("constraint {} primary key ({})", name, columns.join(",")));
            scratch.indexes.add(&columns);
        }

        lines
    }

    /// Single column foreign keys then compound ones, into the foreign key channels.
    ///
    /// `references` holds the resolved reference of each column, in column order.
    fn create_foreign_keys(
        &self,
        write: &mut DdlWrite,
        table: &Table,
        table_name: &str,
        references: &[Option<(String, String)>],
        scratch: &mut TableScratch,
    ) {
        let mut written = false;

        for (column, reference) in table.columns.iter().zip(references) {
            let Some((ref_table, ref_column)) = reference else {
                continue;
            };
            let column_name = self.lower(&column.name);
            let name = has_value(&column.foreign_key_name)
                .map(str::to_string)
                .unwrap_or_else(|| self.constraint_naming.foreign_key_name(table_name, &column_name));
            let name = self.constraint_name(&name, &mut scratch.counters.foreign_key);
            let columns = vec![column_name.clone()];
            let index = self.foreign_key_index(
                has_value(&column.foreign_key_index),
                table_name,
                &column_name,
                &columns,
                scratch,
            );
            self.write_foreign_key(
                write,
                &ForeignKeyDdl {
                    table: table_name,
                    name,
                    columns,
                    ref_table: self.lower(ref_table),
                    ref_columns: vec![self.lower(ref_column)],
                    index,
                },
            );
            written = true;
        }

        for foreign_key in &table.foreign_keys {
            let fk = self.compound_foreign_key(table_name, foreign_key, scratch);
            self.write_foreign_key(write, &fk);
            written = true;
        }

        if written {
            write.apply_foreign_keys().end();
            write.rollback_foreign_keys().end();
        }
    }

    fn compound_foreign_key<'a>(
        &self,
        table_name: &'a str,
        foreign_key: &ForeignKey,
        scratch: &mut TableScratch,
    ) -> ForeignKeyDdl<'a> {
        let columns: Vec<String> = foreign_key.columns.iter().map(|c| self.lower(c)).collect();
        let name = if foreign_key.name.trim().is_empty() {
            self.constraint_naming
                .foreign_key_name(table_name, &columns.join("_"))
        } else {
            foreign_key.name.clone()
        };
        let name = self.constraint_name(&name, &mut scratch.counters.foreign_key);
        let index = self.foreign_key_index(
            has_value(&foreign_key.index_name),
            table_name,
            &columns.join("_"),
            &columns,
            scratch,
        );
        ForeignKeyDdl {
            table: table_name,
            name,
            columns,
            ref_table: self.lower(&foreign_key.ref_table_name),
            ref_columns: foreign_key.ref_columns.iter().map(|c| self.lower(c)).collect(),
            index,
        }
    }

    /// Index name for a foreign key, `None` when a unique or primary key index
    /// already covers the columns.
    fn foreign_key_index(
        &self,
        explicit: Option<&str>,
        table_name: &str,
        column_part: &str,
        columns: &[String],
        scratch: &mut TableScratch,
    ) -> Option<String> {
        if scratch.indexes.contains(columns) {
            debug!("Index on {}({}) already present", table_name, columns.join(","));
            return None;
        }
        let name = explicit
            .map(str::to_string)
            .unwrap_or_else(|| self.constraint_naming.foreign_key_index_name(table_name, column_part));
        scratch.indexes.add(columns);
        Some(self.constraint_name(&name, &mut scratch.counters.index))
    }

    fn write_foreign_key(&self, write: &mut DdlWrite, fk: &ForeignKeyDdl<'_>) {
        let columns = fk.columns.join(",");
        write
            .apply_foreign_keys()
            .append(&format!(
                "alter table {} add constraint {} foreign key ({}) references {} ({})",
                fk.table,
                fk.name,
                columns,
                fk.ref_table,
                fk.ref_columns.join(",")
            ))
            .append_with_space(self.platform.foreign_key_restrict())
            .end_of_statement();
        if let Some(index) = &fk.index {
            write
                .apply_foreign_keys()
                .append(&format!("create index {} on {} ({})", index, fk.table, columns))
                .end_of_statement();
        }

        write
            .rollback_foreign_keys()
            .append(&self.platform.alter_table_drop_foreign_key(fk.table, &fk.name))
            .end_of_statement();
        if let Some(index) = &fk.index {
            write
                .rollback_foreign_keys()
                .append(&self.platform.drop_index(index, fk.table))
                .end_of_statement();
        }
    }

    /// Drop table, preceded by its history artifacts and followed by its sequence.
    pub fn drop_table(&self, write: &mut DdlWrite, model: &SchemaModel, drop: &DropTable) {
        let table_name = self.lower(&drop.name);
        debug!("Generating drop table for {}", table_name);

        let existing = model.table(&drop.name);
        if let Some(table) = existing.filter(|t| t.with_history) {
            let history = self.history_table(table);
            self.platform.drop_history_table(write, &history);
        }

        write
            .drop()
            .append(&self.platform.drop_table(&table_name))
            .end_of_statement();

        if let Some(table) = existing {
            if let Some(sequence) = self.table_sequence(table) {
                write
                    .drop()
                    .append(&self.platform.drop_sequence(&sequence))
                    .end_of_statement();
            }
        } else {
            debug!("Table {} not in schema model, dropping table only", drop.name);
        }
        write.drop().end();
    }

    fn table_sequence(&self, table: &Table) -> Option<String> {
        let pk_columns = table.primary_key_columns();
        if pk_columns.len() != 1
            || self.platform.use_identity_type(table.identity_type) != IdType::Sequence
        {
            return None;
        }
        let table_name = self.lower(&table.name);
        Some(
            has_value(&table.sequence_name)
                .map(|s| self.lower(s))
                .unwrap_or_else(|| self.naming.sequence_name(&table_name, &self.lower(&pk_columns[0].name))),
        )
    }

    /// Add columns, repeated nullable on the history table.
    pub fn add_column(
        &self,
        write: &mut DdlWrite,
        tracker: &mut HistoryTriggerTracker,
        model: &SchemaModel,
        add: &AddColumn,
    ) -> Result<()> {
        let table_name = self.lower(&add.table_name);
        let with_history = Self::has_history(model, &add.table_name, add.with_history);
        let history_name = self.naming.history_table_name(&table_name);
        let keyword = self.platform.add_column_keyword().to_string();
        let references = resolve_references(&add.table_name, &add.columns)?;
        let mut scratch = TableScratch::default();
        let mut foreign_keys = false;

        for (column, reference) in add.columns.iter().zip(&references) {
            let column_name = self.lower(&column.name);
            debug!("Generating add column {}.{}", table_name, column_name);

            let definition = self.column_definition(&table_name, column, true, &mut scratch);
            write
                .apply()
                .append(&format!("alter table {} {} {}", table_name, keyword, definition))
                .end_of_statement();
            write
                .rollback()
                .append(&format!("alter table {} drop column {}", table_name, column_name))
                .end_of_statement();

            if with_history {
                tracker.register_added(&table_name, &column_name);
                let definition = self.column_definition(&history_name, column, false, &mut scratch);
                write
                    .apply()
                    .append(&format!("alter table {} {} {}", history_name, keyword, definition))
                    .end_of_statement();
                write
                    .rollback()
                    .append(&format!("alter table {} drop column {}", history_name, column_name))
                    .end_of_statement();
            }

            for unique in [has_value(&column.unique), has_value(&column.unique_one_to_one)]
                .into_iter()
                .flatten()
            {
                let name = self.constraint_name(unique, &mut scratch.counters.unique);
                self.write_external_unique(write, &table_name, &name, &column_name);
                scratch.indexes.add(&[column_name.clone()]);
            }

            if let Some((ref_table, ref_column)) = reference {
                let name = has_value(&column.foreign_key_name)
                    .map(str::to_string)
                    .unwrap_or_else(|| self.constraint_naming.foreign_key_name(&table_name, &column_name));
                let name = self.constraint_name(&name, &mut scratch.counters.foreign_key);
                let columns = vec![column_name.clone()];
                let index = self.foreign_key_index(
                    has_value(&column.foreign_key_index),
                    &table_name,
                    &column_name,
                    &columns,
                    &mut scratch,
                );
                self.write_foreign_key(
                    write,
                    &ForeignKeyDdl {
                        table: &table_name,
                        name,
                        columns,
                        ref_table: self.lower(ref_table),
                        ref_columns: vec![self.lower(ref_column)],
                        index,
                    },
                );
                foreign_keys = true;
            }
        }

        write.apply().end();
        write.rollback().end();
        if foreign_keys {
            write.apply_foreign_keys().end();
            write.rollback_foreign_keys().end();
        }
        Ok(())
    }

    /// `name type [default x] [not null] [constraint ck check (...)]`.
    ///
    /// `constrained` false gives the history table form: no not null, no check.
    fn column_definition(
        &self,
        table_name: &str,
        column: &Column,
        constrained: bool,
        scratch: &mut TableScratch,
    ) -> String {
        let mut definition = format!(
            "{} {}",
            self.lower(&column.name),
            self.platform.convert_type(&column.column_type, false)
        );
        if let Some(default) = has_value(&column.default_value) {
            definition.push_str(&format!(" default {}", default));
        }
        if !constrained {
            return definition;
        }
        if column.notnull || column.primary_key {
            definition.push_str(" not null");
        }
        if let Some(expression) = has_value(&column.check_constraint) {
            let name = has_value(&column.check_constraint_name)
                .map(str::to_string)
                .unwrap_or_else(|| self.constraint_naming.check_name(table_name, &column.name));
            let name = self.constraint_name(&name, &mut scratch.counters.check);
            definition.push_str(&format!(" constraint {} {}", name, check_clause(expression)));
        }
        definition
    }

    fn write_external_unique(&self, write: &mut DdlWrite, table_name: &str, name: &str, column: &str) {
        write
            .apply()
            .append(&self.platform.create_external_unique_for_one_to_one(
                name,
                table_name,
                &[column.to_string()],
            ))
            .end_of_statement();
        write
            .rollback_foreign_keys()
            .append(&self.platform.drop_external_unique(name, table_name))
            .end_of_statement();
    }

    /// Drop a column, deferred to the drop channel.
    pub fn drop_column(
        &self,
        write: &mut DdlWrite,
        tracker: &mut HistoryTriggerTracker,
        model: &SchemaModel,
        drop: &DropColumn,
    ) {
        let table_name = self.lower(&drop.table_name);
        let column_name = self.lower(&drop.column_name);
        debug!("Generating drop column {}.{}", table_name, column_name);

        write
            .drop()
            .append(&format!("alter table {} drop column {}", table_name, column_name))
            .end_of_statement();

        if Self::has_history(model, &drop.table_name, drop.with_history) {
            tracker.register_dropped(&table_name, &column_name);
            write
                .drop()
                .append(&format!(
                    "alter table {} drop column {}",
                    self.naming.history_table_name(&table_name),
                    column_name
                ))
                .end_of_statement();
        }
        write.drop().end();
    }

    /// Alter one column.
    ///
    /// Sub-changes run in a fixed order: drop foreign key, add foreign key,
    /// drop unique, add unique, add one-to-one unique, type, default, not null,
    /// then the combined base attributes statement. The dropped foreign key
    /// goes to the apply channel so it is gone before the column changes.
    pub fn alter_column(
        &self,
        write: &mut DdlWrite,
        model: &SchemaModel,
        alter: &AlterColumn,
    ) -> Result<()> {
        let reference = has_value(&alter.references)
            .map(|references| split_reference(&alter.table_name, references))
            .transpose()?;

        let table_name = self.lower(&alter.table_name);
        let column_name = self.lower(&alter.column_name);
        let mut scratch = TableScratch::default();
        debug!("Generating alter column {}.{}", table_name, column_name);

        if let Some(fk_name) = has_value(&alter.drop_foreign_key) {
            let fk_name = self.lower(fk_name);
            write
                .apply()
                .append(&self.platform.alter_table_drop_foreign_key(&table_name, &fk_name))
                .end_of_statement();
            if let Some(index) = has_value(&alter.drop_foreign_key_index) {
                write
                    .apply()
                    .append(&self.platform.drop_index(&self.lower(index), &table_name))
                    .end_of_statement();
            }
        }

        if let Some((ref_table, ref_column)) = reference {
            let name = has_value(&alter.foreign_key_name)
                .map(str::to_string)
                .unwrap_or_else(|| self.constraint_naming.foreign_key_name(&table_name, &column_name));
            let name = self.constraint_name(&name, &mut scratch.counters.foreign_key);
            let columns = vec![column_name.clone()];
            if covered_by_unique(model, alter) {
                scratch.indexes.add(&columns);
            }
            let index = self.foreign_key_index(
                has_value(&alter.foreign_key_index),
                &table_name,
                &column_name,
                &columns,
                &mut scratch,
            );
            self.write_foreign_key(
                write,
                &ForeignKeyDdl {
                    table: &table_name,
                    name,
                    columns,
                    ref_table: self.lower(&ref_table),
                    ref_columns: vec![self.lower(&ref_column)],
                    index,
                },
            );
        }

        if let Some(unique) = has_value(&alter.drop_unique) {
            write
                .apply()
                .append(&self.platform.alter_table_drop_unique(&table_name, &self.lower(unique)))
                .end_of_statement();
        }

        for unique in [has_value(&alter.unique), has_value(&alter.unique_one_to_one)]
            .into_iter()
            .flatten()
        {
            let name = self.constraint_name(unique, &mut scratch.counters.unique);
            self.write_external_unique(write, &table_name, &name, &column_name);
        }

        if let Some(column_type) = has_value(&alter.column_type) {
            if let Some(sql) = self.platform.alter_column_type(&table_name, &column_name, column_type) {
                write.apply().append(&sql).end_of_statement();
                if let Some(current) = has_value(&alter.current_type) {
                    if let Some(sql) = self.platform.alter_column_type(&table_name, &column_name, current) {
                        write.rollback().append(&sql).end_of_statement();
                    }
                }
            }
        }

        // restating the column needs a type, given or current
        let default_in_base_attributes = self.platform.base_attributes_include_default()
            && (has_value(&alter.column_type).is_some()
                || (alter.notnull.is_some() && has_value(&alter.current_type).is_some()));
        if let Some(default) = has_value(&alter.default_value).filter(|_| !default_in_base_attributes) {
            if let Some(sql) =
                self.platform
                    .alter_column_default_value(&table_name, &column_name, default)
            {
                write.apply().append(&sql).end_of_statement();
                let previous = has_value(&alter.current_default_value).unwrap_or(DROP_DEFAULT);
                if let Some(sql) =
                    self.platform
                        .alter_column_default_value(&table_name, &column_name, previous)
                {
                    write.rollback().append(&sql).end_of_statement();
                }
            }
        }

        if let Some(notnull) = alter.notnull {
            if let Some(sql) = self.platform.alter_column_notnull(&table_name, &column_name, notnull) {
                write.apply().append(&sql).end_of_statement();
                let previous = alter.current_notnull.unwrap_or(!notnull);
                if let Some(sql) =
                    self.platform
                        .alter_column_notnull(&table_name, &column_name, previous)
                {
                    write.rollback().append(&sql).end_of_statement();
                }
            }
        }

        if alter.alters_base_attributes() {
            let forward = AlterColumn {
                table_name: table_name.clone(),
                column_name: column_name.clone(),
                ..alter.clone()
            };
            if let Some(sql) = self.platform.alter_column_base_attributes(&forward) {
                write.apply().append(&sql).end_of_statement();
                if let Some(sql) = self.platform.alter_column_base_attributes(&reversed(&forward)) {
                    write.rollback().append(&sql).end_of_statement();
                }
            }
        }

        if Self::has_history(model, &alter.table_name, alter.with_history) {
            if let Some(column_type) = has_value(&alter.column_type) {
                let history_name = self.naming.history_table_name(&table_name);
                self.alter_history_column_type(write.apply(), &history_name, &column_name, column_type);
                if let Some(current) = has_value(&alter.current_type) {
                    self.alter_history_column_type(write.rollback(), &history_name, &column_name, current);
                }
            }
        }
        Ok(())
    }

    /// History columns are always nullable.
    fn alter_history_column_type(
        &self,
        buffer: &mut DdlBuffer,
        history_name: &str,
        column_name: &str,
        column_type: &str,
    ) {
        let sql = self
            .platform
            .alter_column_type(history_name, column_name, column_type)
            .or_else(|| {
                let mut alter = AlterColumn::new(history_name, column_name);
                alter.column_type = Some(column_type.to_string());
                alter.notnull = Some(false);
                self.platform.alter_column_base_attributes(&alter)
            });
        if let Some(sql) = sql {
            buffer.append(&sql).end_of_statement();
        }
    }

    pub fn add_history_table(
        &self,
        write: &mut DdlWrite,
        model: &SchemaModel,
        add: &AddHistoryTable,
    ) -> Result<()> {
        let table = model.require_table(&add.base_table)?;
        debug!("Generating add history table for {}", table.name);
        self.platform.add_history_table(write, &self.history_table(table));
        Ok(())
    }

    pub fn drop_history_table(
        &self,
        write: &mut DdlWrite,
        model: &SchemaModel,
        drop: &DropHistoryTable,
    ) -> Result<()> {
        let table = model.require_table(&drop.base_table)?;
        debug!("Generating drop history table for {}", table.name);
        self.platform.drop_history_table(write, &self.history_table(table));
        Ok(())
    }

    /// Rebuild the history triggers of every table in `tracker`, once each.
    pub fn regenerate_history_triggers(
        &self,
        write: &mut DdlWrite,
        model: &SchemaModel,
        tracker: HistoryTriggerTracker,
    ) {
        for (table_name, change) in tracker.into_changes() {
            match model.table(&table_name) {
                Some(table) => {
                    debug!("Regenerating history triggers for {}", table_name);
                    let history = self.history_table(table);
                    self.platform.regenerate_history_triggers(write, &history, &change);
                }
                None => warn!(
                    "Table {} is no longer in the schema model, skipping history trigger regeneration",
                    table_name
                ),
            }
        }
    }
}

/// Separator between lines of `create table`.
fn start_line(buffer: &mut DdlBuffer, first: &mut bool) {
    if !*first {
        buffer.append(",");
    }
    *first = false;
    buffer.new_line().append("  ");
}

/// Expressions may be given bare or with the `check` keyword.
fn check_clause(expression: &str) -> String {
    if expression.to_lowercase().starts_with("check") {
        expression.to_string()
    } else {
        format!("check ({})", expression)
    }
}

/// The altered column ends up with a unique or primary key index.
fn covered_by_unique(model: &SchemaModel, alter: &AlterColumn) -> bool {
    if has_value(&alter.unique).is_some() || has_value(&alter.unique_one_to_one).is_some() {
        return true;
    }
    let Some(table) = model.table(&alter.table_name) else {
        return false;
    };
    let pk = table.primary_key_columns();
    let is_sole_pk = pk.len() == 1 && pk[0].name.eq_ignore_ascii_case(&alter.column_name);
    let is_unique = table.find_column(&alter.column_name).map_or(false, |c| {
        has_value(&c.unique).is_some() || has_value(&c.unique_one_to_one).is_some()
    }) && has_value(&alter.drop_unique).is_none();
    is_sole_pk || is_unique
}

/// `table.column` of every column that references another table, in column order.
fn resolve_references(table: &str, columns: &[Column]) -> Result<Vec<Option<(String, String)>>> {
    columns.iter().map(|c| c.split_references(table)).collect()
}

/// Base attribute change restoring the previous definition.
///
/// An unchanged default stays the current default; a changed default goes
/// back to the previous value, or is dropped when there was none.
fn reversed(alter: &AlterColumn) -> AlterColumn {
    let (default_value, current_default_value) = match has_value(&alter.default_value) {
        Some(_) => (
            Some(
                has_value(&alter.current_default_value)
                    .unwrap_or(DROP_DEFAULT)
                    .to_string(),
            ),
            alter.default_value.clone(),
        ),
        None => (None, alter.current_default_value.clone()),
    };
    AlterColumn {
        column_type: alter.current_type.clone(),
        current_type: alter.column_type.clone(),
        default_value,
        current_default_value,
        notnull: alter.current_notnull,
        current_notnull: alter.notnull,
        ..AlterColumn::new(alter.table_name.clone(), alter.column_name.clone())
    }
}
