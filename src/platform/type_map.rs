//! Logical to platform type conversion.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// `name` or `name(params)`, e.g. `varchar(20)`, `decimal(8,4)`, `double precision`
static TYPE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_ ]*?)\s*(\([^()]*\))?$").expect("valid type token regex")
});

/// Platform type for one logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbType {
    name: &'static str,
    /// Whether the logical type's parameters are carried over
    parameters: bool,
}

impl DbType {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            parameters: true,
        }
    }

    /// Type that takes no length/precision, e.g. `text` or `bytea`
    pub const fn fixed(name: &'static str) -> Self {
        Self {
            name,
            parameters: false,
        }
    }

    fn render(&self, params: Option<&str>) -> String {
        match params {
            Some(params) if self.parameters => format!("{}{}", self.name, params),
            _ => self.name.to_string(),
        }
    }
}

/// Mapping from logical type names to a platform's types.
///
/// Logical names not in the map pass through unchanged, parameters included.
#[derive(Debug, Clone, Default)]
pub struct DbTypeMap {
    types: HashMap<&'static str, DbType>,
}

impl DbTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, logical: &'static str, db_type: DbType) -> Self {
        self.types.insert(logical, db_type);
        self
    }

    /// Convert a logical type token into the platform type.
    pub fn convert(&self, logical: &str) -> String {
        let logical = logical.trim();
        let Some(caps) = TYPE_TOKEN.captures(logical) else {
            return logical.to_string();
        };
        let base = caps.get(1).map(|m| m.as_str().trim()).unwrap_or(logical);
        let params = caps.get(2).map(|m| m.as_str());

        match self.types.get(base.to_lowercase().as_str()) {
            Some(db_type) => db_type.render(params),
            None => logical.to_string(),
        }
    }
}
