//! Hybrid evaluation of recognised reductions.
//!
//! A call such as `mean(x, drop_missing = TRUE)` where `x` is a logical, integer or double
//! column is answered directly from the column buffer by a reducer specialized for the
//! (element type, drop-missing) pair, instead of asking the host to evaluate the call once per
//! group. Anything the dispatcher does not recognise falls through to generic evaluation.

use crate::expr::{Arg, Expr};
use crate::namespace::Namespace;
use crate::reduce::{self, Element};
use formula_frame::{Column, ColumnData, Grouping, SlicingIndex};

/// Name of the option that makes reductions skip missing elements.
pub const DROP_MISSING: &str = "drop_missing";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReductionKind {
    Mean,
    Variance,
    StdDev,
}

impl ReductionKind {
    pub fn from_function(name: &str) -> Option<Self> {
        match name {
            "mean" => Some(ReductionKind::Mean),
            "var" | "variance" => Some(ReductionKind::Variance),
            "sd" | "std_dev" => Some(ReductionKind::StdDev),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReductionKind::Mean => "mean",
            ReductionKind::Variance => "var",
            ReductionKind::StdDev => "sd",
        }
    }
}

type ReduceFn<T> = fn(&[Option<T>], &SlicingIndex<'_>, bool) -> Option<f64>;

/// Reducer instantiations for one element type, indexed by `drop_missing as usize`.
struct ReducerTable<T> {
    mean: [ReduceFn<T>; 2],
    variance: [ReduceFn<T>; 2],
    std_dev: [ReduceFn<T>; 2],
}

impl<T: Element> ReducerTable<T> {
    const fn new() -> Self {
        Self {
            mean: [reduce::mean::<T, false>, reduce::mean::<T, true>],
            variance: [reduce::variance::<T, false>, reduce::variance::<T, true>],
            std_dev: [reduce::std_dev::<T, false>, reduce::std_dev::<T, true>],
        }
    }

    fn select(&self, kind: ReductionKind, drop_missing: bool) -> ReduceFn<T> {
        let slot = usize::from(drop_missing);
        match kind {
            ReductionKind::Mean => self.mean[slot],
            ReductionKind::Variance => self.variance[slot],
            ReductionKind::StdDev => self.std_dev[slot],
        }
    }
}

static LOGICAL: ReducerTable<bool> = ReducerTable::new();
static INTEGER: ReducerTable<i64> = ReducerTable::new();
static DOUBLE: ReducerTable<f64> = ReducerTable::new();

#[derive(Clone, Copy)]
enum Bound<'a> {
    Logical(&'a [Option<bool>], ReduceFn<bool>),
    Integer(&'a [Option<i64>], ReduceFn<i64>),
    Double(&'a [Option<f64>], ReduceFn<f64>),
}

/// A reducer bound to one column buffer.
#[derive(Clone, Copy)]
pub struct Reducer<'a> {
    kind: ReductionKind,
    bound: Bound<'a>,
    is_summary: bool,
}

impl std::fmt::Debug for Reducer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reducer")
            .field("kind", &self.kind)
            .field("is_summary", &self.is_summary)
            .finish_non_exhaustive()
    }
}

/// Select the reducer for `kind` over `column`, or `None` when the element type is not one the
/// reducers handle.
pub fn dispatch(kind: ReductionKind, column: &Column, drop_missing: bool) -> Option<Reducer<'_>> {
    let bound = match column.data() {
        ColumnData::Logical(v) => Bound::Logical(v, LOGICAL.select(kind, drop_missing)),
        ColumnData::Integer(v) => Bound::Integer(v, INTEGER.select(kind, drop_missing)),
        ColumnData::Double(v) => Bound::Double(v, DOUBLE.select(kind, drop_missing)),
        ColumnData::Complex(_) | ColumnData::Text(_) | ColumnData::List(_) | ColumnData::Raw(_) => {
            return None
        }
    };
    Some(Reducer {
        kind,
        bound,
        is_summary: column.is_summary(),
    })
}

impl Reducer<'_> {
    pub fn kind(&self) -> ReductionKind {
        self.kind
    }

    pub fn compute_for_group(&self, index: &SlicingIndex<'_>) -> Option<f64> {
        match self.bound {
            Bound::Logical(data, f) => f(data, index, self.is_summary),
            Bound::Integer(data, f) => f(data, index, self.is_summary),
            Bound::Double(data, f) => f(data, index, self.is_summary),
        }
    }

    /// One value per row: each row carries its group's result.
    pub fn window(&self, grouping: &Grouping) -> Column {
        let mut out = vec![None; grouping.row_count()];
        for index in grouping.iter() {
            let value = self.compute_for_group(&index);
            for row in index.iter() {
                out[row] = value;
            }
        }
        Column::double(out)
    }

    /// One value per group, in group order.
    pub fn summarise(&self, grouping: &Grouping) -> Column {
        Column::double(grouping.iter().map(|index| self.compute_for_group(&index)))
            .with_summary(true)
    }
}

/// A call recognised as a hybrid reduction.
#[derive(Debug)]
pub struct HybridCall<'a> {
    pub kind: ReductionKind,
    pub column: &'a Column,
    pub drop_missing: bool,
}

impl<'a> HybridCall<'a> {
    pub fn reducer(&self) -> Option<Reducer<'a>> {
        dispatch(self.kind, self.column, self.drop_missing)
    }
}

/// Recognise `f(symbol)` / `f(symbol, drop_missing = <logical>)` for a reduction `f` whose
/// argument is bound in `namespace`.
pub fn recognize<'a>(expr: &Expr, namespace: &'a Namespace) -> Option<HybridCall<'a>> {
    let Expr::Call { function, args } = expr else {
        return None;
    };
    let kind = ReductionKind::from_function(function)?;

    let mut column = None;
    let mut drop_missing = false;
    for Arg { name, value } in args {
        match name.as_deref() {
            None if column.is_none() => {
                let Expr::Symbol(symbol) = value else {
                    return None;
                };
                column = Some(namespace.get(symbol)?);
            }
            Some(DROP_MISSING) => drop_missing = logical_scalar(value)?,
            _ => return None,
        }
    }

    Some(HybridCall {
        kind,
        column: column?,
        drop_missing,
    })
}

fn logical_scalar(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Literal(column) => match column.data() {
            ColumnData::Logical(v) if v.len() == 1 => v[0],
            _ => None,
        },
        _ => None,
    }
}
