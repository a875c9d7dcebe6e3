use crate::types::ColumnType;

pub type FrameResult<T> = Result<T, FrameError>;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("column at position {position} has an empty name")]
    EmptyColumnName { position: usize },

    #[error("column `{name}` has {actual} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("column `{name}` has {actual} names for {expected} values")]
    NamesLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("column `{name}` of type {column_type} can't be used as a grouping key")]
    UnsupportedKeyType {
        name: String,
        column_type: ColumnType,
    },

    #[error("grouping covers {grouping} rows but the table has {table}")]
    GroupingRowMismatch { grouping: usize, table: usize },

    #[error("can't convert a {from} column to {to}")]
    InvalidCast { from: ColumnType, to: ColumnType },
}
