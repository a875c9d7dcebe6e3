use formula_frame::{Column, Table};
use std::collections::HashMap;

/// Current binding of every variable visible to the expressions of one transform.
///
/// Seeded from the input table and updated by the orchestrator after each output column, so
/// later expressions see earlier results.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    columns: HashMap<String, Column>,
}

impl Namespace {
    pub fn from_table(table: &Table) -> Self {
        Self {
            columns: table
                .iter()
                .map(|(name, column)| (name.to_string(), column.clone()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, column: Column) {
        self.columns.insert(name.into(), column);
    }

    pub fn remove(&mut self, name: &str) -> Option<Column> {
        self.columns.remove(name)
    }
}
