use crate::column::{Column, ColumnData};
use crate::error::{FrameError, FrameResult};
use crate::table::Table;
use crate::types::KeyValue;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// How a [`Grouping`] partitions its rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupingKind {
    /// Ungrouped: one group holding every row.
    Natural,
    /// Every row is its own group.
    Rowwise,
    /// Rows sharing equal values in the key columns.
    Keyed { keys: Vec<String> },
}

/// An ordered partition of a table's rows into non-empty groups.
///
/// Every row position in `0..row_count` belongs to exactly one group, and rows within a group
/// are kept in ascending order.
#[derive(Clone, Debug)]
pub struct Grouping {
    kind: GroupingKind,
    groups: Vec<Vec<usize>>,
    rows: usize,
}

impl Grouping {
    pub fn natural(rows: usize) -> Self {
        Self {
            kind: GroupingKind::Natural,
            groups: vec![(0..rows).collect()],
            rows,
        }
    }

    pub fn rowwise(rows: usize) -> Self {
        Self {
            kind: GroupingKind::Rowwise,
            groups: (0..rows).map(|row| vec![row]).collect(),
            rows,
        }
    }

    /// Group `table` by the values of `keys`, ordering groups by ascending key tuple.
    ///
    /// Missing key values form their own group, sorted after every present value.
    pub fn by_keys(table: &Table, keys: &[&str]) -> FrameResult<Self> {
        let mut key_columns = Vec::with_capacity(keys.len());
        for &key in keys {
            let column = table
                .column(key)
                .ok_or_else(|| FrameError::UnknownColumn(key.to_string()))?;
            if !is_key_type(column) {
                return Err(FrameError::UnsupportedKeyType {
                    name: key.to_string(),
                    column_type: column.column_type(),
                });
            }
            key_columns.push(column);
        }

        let mut buckets: BTreeMap<Vec<KeyValue>, Vec<usize>> = BTreeMap::new();
        for row in 0..table.row_count() {
            let key = key_columns
                .iter()
                .map(|column| key_value(column, row))
                .collect();
            buckets.entry(key).or_default().push(row);
        }

        Ok(Self {
            kind: GroupingKind::Keyed {
                keys: keys.iter().map(|k| k.to_string()).collect(),
            },
            groups: buckets.into_values().collect(),
            rows: table.row_count(),
        })
    }

    pub fn kind(&self) -> &GroupingKind {
        &self.kind
    }

    pub fn is_natural(&self) -> bool {
        self.kind == GroupingKind::Natural
    }

    pub fn keys(&self) -> &[String] {
        match &self.kind {
            GroupingKind::Keyed { keys } => keys,
            GroupingKind::Natural | GroupingKind::Rowwise => &[],
        }
    }

    pub fn has_key(&self, name: &str) -> bool {
        self.keys().iter().any(|k| k == name)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Index view of group `ordinal`.
    ///
    /// Panics if `ordinal >= group_count()`.
    pub fn group(&self, ordinal: usize) -> SlicingIndex<'_> {
        SlicingIndex::new(&self.groups[ordinal], ordinal)
    }

    /// Groups in ascending ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = SlicingIndex<'_>> + '_ {
        self.groups
            .iter()
            .enumerate()
            .map(|(ordinal, rows)| SlicingIndex::new(rows, ordinal))
    }

    /// The first row of every group, in group order.
    pub fn first_rows(&self) -> Vec<usize> {
        self.groups
            .iter()
            .filter_map(|rows| rows.first().copied())
            .collect()
    }
}

fn is_key_type(column: &Column) -> bool {
    matches!(
        column.data(),
        ColumnData::Logical(_)
            | ColumnData::Integer(_)
            | ColumnData::Double(_)
            | ColumnData::Text(_)
    )
}

fn key_value(column: &Column, row: usize) -> KeyValue {
    let value = match column.data() {
        ColumnData::Logical(v) => v[row].map(KeyValue::Logical),
        ColumnData::Integer(v) => v[row].map(KeyValue::Integer),
        ColumnData::Double(v) => v[row].map(|d| KeyValue::Double(OrderedFloat(d))),
        ColumnData::Text(v) => v[row].clone().map(KeyValue::Text),
        ColumnData::Complex(_) | ColumnData::List(_) | ColumnData::Raw(_) => None,
    };
    value.unwrap_or(KeyValue::Missing)
}

/// One group's view into the rows of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlicingIndex<'a> {
    rows: &'a [usize],
    group: usize,
}

impl<'a> SlicingIndex<'a> {
    pub fn new(rows: &'a [usize], group: usize) -> Self {
        Self { rows, group }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row position of the `i`-th member of the group.
    pub fn get(&self, i: usize) -> usize {
        self.rows[i]
    }

    /// Ordinal of the group, `0..group_count`.
    pub fn group(&self) -> usize {
        self.group
    }

    pub fn rows(&self) -> &'a [usize] {
        self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + 'a {
        self.rows.iter().copied()
    }
}
