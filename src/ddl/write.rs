//! Five-channel DDL output.
//!
//! Foreign keys go to their own channels so that every table exists before any
//! constraint is added, and constraints are removed before any table is
//! dropped. The fixed concatenation order gives that guarantee without a
//! dependency graph.

use super::DdlBuffer;

/// Output channels of one migration batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlWrite {
    apply: DdlBuffer,
    apply_foreign_keys: DdlBuffer,
    rollback: DdlBuffer,
    rollback_foreign_keys: DdlBuffer,
    drop: DdlBuffer,
}

impl Default for DdlWrite {
    fn default() -> Self {
        Self::new(";")
    }
}

impl DdlWrite {
    pub fn new(terminator: &str) -> Self {
        Self {
            apply: DdlBuffer::new(terminator),
            apply_foreign_keys: DdlBuffer::new(terminator),
            rollback: DdlBuffer::new(terminator),
            rollback_foreign_keys: DdlBuffer::new(terminator),
            drop: DdlBuffer::new(terminator),
        }
    }

    pub fn apply(&mut self) -> &mut DdlBuffer {
        &mut self.apply
    }

    pub fn apply_foreign_keys(&mut self) -> &mut DdlBuffer {
        &mut self.apply_foreign_keys
    }

    pub fn rollback(&mut self) -> &mut DdlBuffer {
        &mut self.rollback
    }

    pub fn rollback_foreign_keys(&mut self) -> &mut DdlBuffer {
        &mut self.rollback_foreign_keys
    }

    pub fn drop(&mut self) -> &mut DdlBuffer {
        &mut self.drop
    }

    pub fn apply_buffer(&self) -> &DdlBuffer {
        &self.apply
    }

    pub fn apply_foreign_keys_buffer(&self) -> &DdlBuffer {
        &self.apply_foreign_keys
    }

    pub fn rollback_buffer(&self) -> &DdlBuffer {
        &self.rollback
    }

    pub fn rollback_foreign_keys_buffer(&self) -> &DdlBuffer {
        &self.rollback_foreign_keys
    }

    pub fn drop_buffer(&self) -> &DdlBuffer {
        &self.drop
    }

    pub fn is_empty(&self) -> bool {
        self.apply.is_empty()
            && self.apply_foreign_keys.is_empty()
            && self.rollback.is_empty()
            && self.rollback_foreign_keys.is_empty()
            && self.drop.is_empty()
    }

    /// Forward migration: tables first, then their foreign keys
    pub fn apply_script(&self) -> String {
        join(&[&self.apply, &self.apply_foreign_keys])
    }

    /// Reverse migration: foreign keys first, then the tables
    pub fn rollback_script(&self) -> String {
        join(&[&self.rollback_foreign_keys, &self.rollback])
    }

    /// Deferred destructive changes
    pub fn drop_script(&self) -> String {
        self.drop.as_str().to_string()
    }

    /// All channels in the global order: apply, apply foreign keys, drop,
    /// rollback foreign keys, rollback.
    pub fn full_script(&self) -> String {
        join(&[
            &self.apply,
            &self.apply_foreign_keys,
            &self.drop,
            &self.rollback_foreign_keys,
            &self.rollback,
        ])
    }
}

fn join(buffers: &[&DdlBuffer]) -> String {
    let mut script = String::new();
    for buffer in buffers {
        script.push_str(buffer.as_str());
    }
    script
}
