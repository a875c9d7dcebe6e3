//! Assembly of per-group results into one column.
//!
//! Groups may produce results of different element types. The gatherer keeps a running element
//! type that only ever widens along the promotion lattice; when a later group needs a wider type,
//! the values already written are upcast in place before the new ones are stored.

use crate::error::{ExpectedLength, MutateError, MutateResult};
use formula_frame::{Attributes, Column, ColumnData, ColumnType, FrameError};

#[derive(Debug)]
pub struct Gatherer<'a> {
    name: &'a str,
    data: ColumnData,
    class: Vec<String>,
}

impl<'a> Gatherer<'a> {
    /// Start an accumulator of `len` missing values typed after `first`.
    pub fn new(name: &'a str, first: &Column, len: usize) -> Self {
        Self {
            name,
            data: ColumnData::missing(first.column_type(), len),
            class: first.class().to_vec(),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    pub fn describe(&self) -> String {
        match self.class.first() {
            Some(class) => class.clone(),
            None => self.column_type().name().to_string(),
        }
    }

    /// Store one group's result. A result as long as the group is placed row by row; a
    /// length-one result is broadcast to every row of the group.
    pub fn grab(&mut self, result: &Column, rows: &[usize]) -> MutateResult<()> {
        let n = result.len();
        if n != rows.len() && n != 1 {
            return Err(MutateError::LengthMismatch {
                name: self.name.to_string(),
                expected: ExpectedLength::GroupSize(rows.len()),
                actual: n,
            });
        }

        let incoming = self.conform(result)?;
        place(&mut self.data, incoming.data(), rows)?;
        Ok(())
    }

    pub fn collect(self) -> Column {
        Column::new(self.data).with_attributes(Attributes {
            names: None,
            class: self.class,
        })
    }

    /// Bring `result` and the accumulator to a common element type.
    fn conform(&mut self, result: &Column) -> MutateResult<Column> {
        let current = self.column_type();

        // Missing values carry no type information worth widening for.
        if result.all_missing() {
            return Ok(Column::missing(current, result.len()));
        }

        if result.class() != self.class.as_slice() {
            return Err(MutateError::IncompatibleTypes {
                name: self.name.to_string(),
                found: result.describe(),
                expected: self.describe(),
            });
        }

        let target = current.promote(result.column_type());
        if target != current {
            log::trace!(
                "column `{}`: widening gathered values from {current} to {target}",
                self.name
            );
            self.data = self.data.widen(target)?;
        }
        Ok(result.widen(target)?)
    }
}

fn place(dst: &mut ColumnData, src: &ColumnData, rows: &[usize]) -> Result<(), FrameError> {
    match (dst, src) {
        (ColumnData::Logical(d), ColumnData::Logical(s)) => scatter(d, s, rows),
        (ColumnData::Integer(d), ColumnData::Integer(s)) => scatter(d, s, rows),
        (ColumnData::Double(d), ColumnData::Double(s)) => scatter(d, s, rows),
        (ColumnData::Complex(d), ColumnData::Complex(s)) => scatter(d, s, rows),
        (ColumnData::Text(d), ColumnData::Text(s)) => scatter(d, s, rows),
        (ColumnData::List(d), ColumnData::List(s)) => scatter(d, s, rows),
        (ColumnData::Raw(d), ColumnData::Raw(s)) => scatter(d, s, rows),
        (dst, src) => {
            return Err(FrameError::InvalidCast {
                from: src.column_type(),
                to: dst.column_type(),
            })
        }
    }
    Ok(())
}

fn scatter<T: Clone>(dst: &mut [T], src: &[T], rows: &[usize]) {
    if src.len() == rows.len() {
        for (&row, value) in rows.iter().zip(src) {
            dst[row] = value.clone();
        }
    } else if let Some(value) = src.first() {
        for &row in rows {
            dst[row] = value.clone();
        }
    }
}
