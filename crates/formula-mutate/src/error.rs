use formula_frame::FrameError;
use std::fmt;

pub type MutateResult<T> = Result<T, MutateError>;

/// Length a result was required to have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpectedLength {
    /// A per-group result: the group's size, or one.
    GroupSize(usize),
    /// A whole-column value: the table's row count, or one.
    RowCount(usize),
    /// A summarised result: exactly one.
    Summary,
}

impl fmt::Display for ExpectedLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedLength::GroupSize(n) => write!(f, "length {n} (the group size) or one"),
            ExpectedLength::RowCount(n) => write!(f, "length {n} (the number of rows) or one"),
            ExpectedLength::Summary => f.write_str("length 1"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MutateError {
    #[error("column `{name}` is of unsupported {found}")]
    UnsupportedType { name: String, found: String },

    #[error("column `{name}` must be {expected}, not {actual}")]
    LengthMismatch {
        name: String,
        expected: ExpectedLength,
        actual: usize,
    },

    #[error("column `{name}` can't be modified because it's a grouping variable")]
    GroupingViolation { name: String },

    #[error("column `{name}` has incompatible types ({found}), expecting {expected}")]
    IncompatibleTypes {
        name: String,
        found: String,
        expected: String,
    },

    #[error("evaluation error in column `{name}`: {source}")]
    Evaluation {
        name: String,
        #[source]
        source: EvalError,
    },

    #[error("transform interrupted")]
    Interrupted,

    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl MutateError {
    pub(crate) fn unsupported_type(name: &str, type_name: &str) -> Self {
        MutateError::UnsupportedType {
            name: name.to_string(),
            found: format!("type {type_name}"),
        }
    }

    pub(crate) fn unsupported_class(name: &str, class: &str) -> Self {
        MutateError::UnsupportedType {
            name: name.to_string(),
            found: format!("class {class}"),
        }
    }

    /// Output column the error is attributed to, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            MutateError::UnsupportedType { name, .. }
            | MutateError::LengthMismatch { name, .. }
            | MutateError::GroupingViolation { name }
            | MutateError::IncompatibleTypes { name, .. }
            | MutateError::Evaluation { name, .. } => Some(name),
            MutateError::Interrupted | MutateError::Frame(_) => None,
        }
    }
}

/// Failure raised by a host [`crate::Evaluator`] while evaluating one group.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("object `{0}` not found")]
    UnknownVariable(String),

    #[error("could not find function `{0}`")]
    UnknownFunction(String),

    #[error("{function} expects {expected} arguments, got {actual}")]
    Arity {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("type error: {0}")]
    Type(String),
}
