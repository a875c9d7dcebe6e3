use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use std::collections::HashMap;

/// An ordered set of uniquely named columns of equal length.
///
/// `class` is structural metadata owned by the caller; transforms carry it through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    column_index: HashMap<String, usize>,
    rows: usize,
    class: Vec<String>,
}

impl Table {
    /// Build a table, validating names and lengths. The row count is taken from the first column.
    pub fn new(columns: Vec<(impl Into<String>, Column)>) -> FrameResult<Self> {
        let rows = columns.first().map_or(0, |(_, col)| col.len());
        Self::with_row_count(rows, columns)
    }

    /// Build a table with an explicit row count, so a table without columns can still have rows.
    pub fn with_row_count(
        rows: usize,
        columns: Vec<(impl Into<String>, Column)>,
    ) -> FrameResult<Self> {
        let mut names = Vec::with_capacity(columns.len());
        let mut cols = Vec::with_capacity(columns.len());
        let mut column_index = HashMap::with_capacity(columns.len());

        for (position, (name, column)) in columns.into_iter().enumerate() {
            let name: String = name.into();
            if name.is_empty() {
                return Err(FrameError::EmptyColumnName { position });
            }
            if column.len() != rows {
                return Err(FrameError::LengthMismatch {
                    name,
                    expected: rows,
                    actual: column.len(),
                });
            }
            if let Some(labels) = column.names() {
                if labels.len() != column.len() {
                    return Err(FrameError::NamesLengthMismatch {
                        name,
                        expected: column.len(),
                        actual: labels.len(),
                    });
                }
            }
            if column_index.insert(name.clone(), position).is_some() {
                return Err(FrameError::DuplicateColumn(name));
            }
            names.push(name);
            cols.push(column);
        }

        Ok(Self {
            names,
            columns: cols,
            column_index,
            rows,
            class: Vec::new(),
        })
    }

    pub fn with_class<S: Into<String>>(mut self, class: impl IntoIterator<Item = S>) -> Self {
        self.class = class.into_iter().map(Into::into).collect();
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn class(&self) -> &[String] {
        &self.class
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let idx = self.column_index(name)?;
        self.columns.get(idx)
    }

    pub fn column_by_idx(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    /// Columns paired with their names, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }
}
