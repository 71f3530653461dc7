//! Concatenated (embedded) primary keys derived from associations.
//!
//! An embedded id whose columns are all foreign key columns of the owning
//! entity can be built from the ids of the associated rows when the id itself
//! was left empty. Matching happens once per entity; deriving happens per
//! insert.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{DdlError, Result};

/// Embedded id property and its ordered key columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedId {
    pub property: String,
    pub columns: Vec<String>,
}

/// Local column of an association and the referenced id column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedColumn {
    pub local_column: String,
    pub foreign_column: String,
}

/// Many-to-one association importing foreign key columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedAssociation {
    pub property: String,
    pub columns: Vec<ImportedColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MatchedImport {
    key_column: String,
    association: String,
    foreign_column: String,
}

/// Embedded id matched against the owning entity's associations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatenatedKey {
    property: String,
    columns: Vec<String>,
    matches: Option<Vec<MatchedImport>>,
}

impl ConcatenatedKey {
    /// Match every key column to an association column.
    ///
    /// A key with any unmatched column keeps no matches; deriving it later
    /// fails instead of producing a partial key.
    pub fn build(id: &EmbeddedId, associations: &[ImportedAssociation]) -> Self {
        let matches = id
            .columns
            .iter()
            .map(|key_column| {
                associations.iter().find_map(|assoc| {
                    assoc
                        .columns
                        .iter()
                        .find(|c| c.local_column.eq_ignore_ascii_case(key_column))
                        .map(|c| MatchedImport {
                            key_column: key_column.clone(),
                            association: assoc.property.clone(),
                            foreign_column: c.foreign_column.clone(),
                        })
                })
            })
            .collect::<Option<Vec<_>>>();

        Self {
            property: id.property.clone(),
            columns: id.columns.clone(),
            matches,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.matches.is_some()
    }

    /// Build the key values from the associated rows' id values.
    ///
    /// `association_ids` maps association property → (id column → value).
    pub fn derive(
        &self,
        association_ids: &BTreeMap<String, BTreeMap<String, Value>>,
    ) -> Result<BTreeMap<String, Value>> {
        let matches = self.matches.as_ref().ok_or_else(|| DdlError::UnmatchedConcatenatedKey {
            property: self.property.clone(),
        })?;

        let mut key = BTreeMap::new();
        for matched in matches {
            let value = association_ids
                .get(&matched.association)
                .and_then(|ids| ids.get(&matched.foreign_column))
                .filter(|v| !v.is_null())
                .ok_or_else(|| DdlError::MissingKeyValue {
                    property: matched.association.clone(),
                    column: matched.foreign_column.clone(),
                })?;
            key.insert(matched.key_column.clone(), value.clone());
        }
        Ok(key)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}
