//! Boundary between the grouped core and the host that actually executes expressions.
//!
//! The core never hands the host a pointer back into itself. Instead, each group's evaluation
//! receives a [`GroupVariables`] capability that resolves names to that group's slice of the
//! namespace. The host may call back into it any number of times (including from nested
//! evaluation); the capability is dropped before the next group is visited.

use crate::error::EvalError;
use crate::expr::{Datum, Expr};
use crate::namespace::Namespace;
use formula_frame::{Column, SlicingIndex};
use std::collections::HashMap;

/// Executes expressions on behalf of the grouped core.
pub trait Evaluator {
    fn evaluate(&self, expr: &Expr, vars: &mut GroupVariables<'_>) -> Result<Datum, EvalError>;
}

impl<F> Evaluator for F
where
    F: Fn(&Expr, &mut GroupVariables<'_>) -> Result<Datum, EvalError>,
{
    fn evaluate(&self, expr: &Expr, vars: &mut GroupVariables<'_>) -> Result<Datum, EvalError> {
        self(expr, vars)
    }
}

/// Per-group variable resolver.
///
/// Slices are materialized lazily on first access and cached for the lifetime of the resolver.
#[derive(Debug)]
pub struct GroupVariables<'a> {
    namespace: &'a Namespace,
    index: SlicingIndex<'a>,
    cache: HashMap<String, Column>,
}

impl<'a> GroupVariables<'a> {
    pub fn new(namespace: &'a Namespace, index: SlicingIndex<'a>) -> Self {
        Self {
            namespace,
            index,
            cache: HashMap::new(),
        }
    }

    /// This group's values of `name`.
    ///
    /// Summary columns resolve to the single value stored for the group.
    pub fn get(&mut self, name: &str) -> Option<&Column> {
        if !self.cache.contains_key(name) {
            let column = self.namespace.get(name)?;
            let slice = if column.is_summary() {
                column.take(&[self.index.group()])
            } else {
                column.take(self.index.rows())
            };
            self.cache.insert(name.to_string(), slice);
        }
        self.cache.get(name)
    }

    pub fn group(&self) -> usize {
        self.index.group()
    }

    pub fn group_size(&self) -> usize {
        self.index.len()
    }
}
