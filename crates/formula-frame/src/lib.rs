//! Typed, column-oriented tables and row groupings for Formula's grouped transforms.
//!
//! This crate focuses on:
//! - Typed column buffers with an explicit missing-value representation per element type.
//! - A type promotion lattice used when results of different types are combined.
//! - Partitioning a table's rows into ordered groups ([`Grouping`] / [`SlicingIndex`]).

#![forbid(unsafe_code)]

mod column;
mod error;
mod grouping;
mod table;
mod types;

pub use crate::column::{Attributes, Column, ColumnData};
pub use crate::error::{FrameError, FrameResult};
pub use crate::grouping::{Grouping, GroupingKind, SlicingIndex};
pub use crate::table::Table;
pub use crate::types::{ColumnType, KeyValue};

pub use num_complex::Complex64;
