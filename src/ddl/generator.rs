//! Entry point for generating migration DDL.

use std::sync::Arc;

use log::info;

use super::{DdlWrite, MigrationBatch, TableDdl};
use crate::config::DdlConfig;
use crate::error::Result;
use crate::model::{ChangeSet, SchemaModel};
use crate::naming::{ConstraintNaming, NamingConvention};
use crate::platform::{Platform, PlatformDdl};

/// Generates migration scripts for one platform.
///
/// ```
/// use moorings::{ChangeSet, Column, DdlGenerator, Operation, Platform, SchemaModel, Table};
///
/// let generator = DdlGenerator::new(Platform::Postgres);
/// let changes = ChangeSet::new(vec![Operation::CreateTable(
///     Table::new("customer").column(Column::new("id", "bigint").primary_key()),
/// )]);
/// let mut model = SchemaModel::new();
/// let write = generator.generate(&mut model, &changes).unwrap();
/// assert!(write.apply_script().starts_with("create table customer ("));
/// ```
#[derive(Debug, Clone)]
pub struct DdlGenerator {
    ddl: TableDdl,
}

impl DdlGenerator {
    /// Generator with the default naming for `platform`.
    pub fn new(platform: Platform) -> Self {
        Self {
            ddl: TableDdl::for_platform(platform.ddl()),
        }
    }

    pub fn with_platform_ddl(
        platform: Arc<dyn PlatformDdl>,
        naming: NamingConvention,
        constraint_naming: ConstraintNaming,
    ) -> Self {
        Self {
            ddl: TableDdl::new(platform, naming, constraint_naming),
        }
    }

    pub fn from_config(config: &DdlConfig) -> Result<Self> {
        let platform = config.platform()?.ddl();
        let constraint_naming = config.constraint_naming(platform.max_constraint_length());
        Ok(Self::with_platform_ddl(
            platform,
            config.naming_convention(),
            constraint_naming,
        ))
    }

    pub fn table_ddl(&self) -> &TableDdl {
        &self.ddl
    }

    pub fn platform_name(&self) -> &'static str {
        self.ddl.platform().name()
    }

    /// Start a batch against `model`.
    pub fn batch<'a>(&'a self, model: &'a mut SchemaModel) -> MigrationBatch<'a> {
        MigrationBatch::new(&self.ddl, model)
    }

    /// Generate one change set as a single batch, evolving `model`.
    pub fn generate(&self, model: &mut SchemaModel, changes: &ChangeSet) -> Result<DdlWrite> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "generate_migration",
            platform = self.platform_name(),
            operations = changes.operations.len()
        )
        .entered();

        info!(
            "Generating {} DDL for {} operation(s)",
            self.platform_name(),
            changes.operations.len()
        );
        let mut batch = self.batch(model);
        batch.generate_all(&changes.operations)?;
        Ok(batch.finish())
    }
}
