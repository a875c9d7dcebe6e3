//! Grouped column transforms over [`formula_frame`] tables.
//!
//! [`MutateEngine::transform`] evaluates a list of named expressions once per group and
//! assembles the per-group results into full-length columns. Recognised reductions over a column
//! (`mean`, `var`, `sd`) are answered by specialized reducers; everything else is handed to a
//! host [`Evaluator`].

#![forbid(unsafe_code)]

mod error;
mod evaluator;
mod expr;
mod gather;
mod host;
mod hybrid;
mod interpreter;
mod mutate;
mod namespace;
mod options;
mod recycle;
mod reduce;

pub use crate::error::{EvalError, ExpectedLength, MutateError, MutateResult};
pub use crate::evaluator::{ExpressionEvaluator, Shape};
pub use crate::expr::{Arg, Datum, Expr, NamedExpr};
pub use crate::gather::Gatherer;
pub use crate::host::{Evaluator, GroupVariables};
pub use crate::hybrid::{dispatch, recognize, HybridCall, Reducer, ReductionKind, DROP_MISSING};
pub use crate::interpreter::Interpreter;
pub use crate::mutate::MutateEngine;
pub use crate::namespace::Namespace;
pub use crate::options::{InterruptFlag, MutateOptions, HYBRID_ENV_VAR};
pub use crate::recycle::ConstantRecycler;
pub use crate::reduce::{mean, std_dev, variance, Element};
