//! A small reference [`Evaluator`] for hosts that do not bring their own.
//!
//! Supported calls: `+ - * /` (element-wise, recycling length-one operands), `mean`, `var` /
//! `variance`, `sd` / `std_dev`, `sum`, `min`, `max` (all accepting `drop_missing = <logical>`)
//! and `n()`. Integer arithmetic that overflows yields a missing value.

use crate::error::EvalError;
use crate::expr::{Arg, Datum, Expr};
use crate::host::{Evaluator, GroupVariables};
use crate::hybrid::{self, ReductionKind, DROP_MISSING};
use crate::reduce::CompensatedSum;
use formula_frame::{Column, ColumnData, SlicingIndex};

#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter;

impl Evaluator for Interpreter {
    fn evaluate(&self, expr: &Expr, vars: &mut GroupVariables<'_>) -> Result<Datum, EvalError> {
        match expr {
            Expr::Null => Ok(Datum::Null),
            Expr::Symbol(name) => vars
                .get(name)
                .cloned()
                .map(Datum::Vector)
                .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
            Expr::Literal(column) => Ok(Datum::Vector(column.clone())),
            Expr::Foreign(type_name) => Ok(Datum::Foreign(type_name.clone())),
            Expr::Call { function, args } => self.call(function, args, vars),
        }
    }
}

/// Positional arguments of a call plus its `drop_missing` option.
struct CallArgs<'e> {
    positional: Vec<&'e Expr>,
    drop_missing: bool,
}

impl Interpreter {
    fn call(
        &self,
        function: &str,
        args: &[Arg],
        vars: &mut GroupVariables<'_>,
    ) -> Result<Datum, EvalError> {
        let args = self.split_args(args, vars)?;

        if let Some(kind) = ReductionKind::from_function(function) {
            let [arg] = expect_args::<1>(function, &args.positional)?;
            let column = self.vector(arg, vars)?;
            return reduce(function, kind, &column, args.drop_missing).map(Datum::from);
        }

        match function {
            "+" | "-" | "*" | "/" => {
                let [lhs, rhs] = expect_args::<2>(function, &args.positional)?;
                let lhs = self.vector(lhs, vars)?;
                let rhs = self.vector(rhs, vars)?;
                arithmetic(function, &lhs, &rhs).map(Datum::from)
            }
            "sum" => {
                let [arg] = expect_args::<1>(function, &args.positional)?;
                let column = self.vector(arg, vars)?;
                sum(&column, args.drop_missing).map(Datum::from)
            }
            "min" | "max" => {
                let [arg] = expect_args::<1>(function, &args.positional)?;
                let column = self.vector(arg, vars)?;
                extremum(function == "max", &column, args.drop_missing).map(Datum::from)
            }
            "n" => {
                expect_args::<0>(function, &args.positional)?;
                Ok(Column::from(vars.group_size() as i64).into())
            }
            _ => Err(EvalError::UnknownFunction(function.to_string())),
        }
    }

    fn split_args<'e>(
        &self,
        args: &'e [Arg],
        vars: &mut GroupVariables<'_>,
    ) -> Result<CallArgs<'e>, EvalError> {
        let mut out = CallArgs {
            positional: Vec::with_capacity(args.len()),
            drop_missing: false,
        };
        for arg in args {
            match arg.name.as_deref() {
                None => out.positional.push(&arg.value),
                Some(DROP_MISSING) => {
                    let flag = self.vector(&arg.value, vars)?;
                    out.drop_missing = logical_flag(&flag).ok_or_else(|| {
                        EvalError::Type(format!("`{DROP_MISSING}` must be TRUE or FALSE"))
                    })?;
                }
                Some(other) => return Err(EvalError::Type(format!("unused argument `{other}`"))),
            }
        }
        Ok(out)
    }

    fn vector(&self, expr: &Expr, vars: &mut GroupVariables<'_>) -> Result<Column, EvalError> {
        match self.evaluate(expr, vars)? {
            Datum::Vector(column) => Ok(column),
            Datum::Null => Err(EvalError::Type("argument is NULL".into())),
            Datum::Foreign(type_name) => Err(EvalError::Type(format!(
                "argument of type {type_name} is not a vector"
            ))),
        }
    }
}

fn logical_flag(column: &Column) -> Option<bool> {
    match column.data() {
        ColumnData::Logical(v) => match v.as_slice() {
            [Some(flag)] => Some(*flag),
            _ => None,
        },
        _ => None,
    }
}

fn expect_args<'e, const N: usize>(
    function: &str,
    args: &[&'e Expr],
) -> Result<[&'e Expr; N], EvalError> {
    <[&Expr; N]>::try_from(args).map_err(|_| EvalError::Arity {
        function: function.to_string(),
        expected: N,
        actual: args.len(),
    })
}

fn reduce(
    function: &str,
    kind: ReductionKind,
    column: &Column,
    drop_missing: bool,
) -> Result<Column, EvalError> {
    let reducer = hybrid::dispatch(kind, column, drop_missing).ok_or_else(|| {
        EvalError::Type(format!(
            "{function} needs a numeric or logical argument, not {}",
            column.describe()
        ))
    })?;
    let rows: Vec<usize> = (0..column.len()).collect();
    let value = reducer.compute_for_group(&SlicingIndex::new(&rows, 0));
    Ok(Column::double([value]))
}

enum Numbers {
    Integer(Vec<Option<i64>>),
    Double(Vec<Option<f64>>),
}

fn numbers(column: &Column) -> Result<Numbers, EvalError> {
    match column.data() {
        ColumnData::Logical(v) => Ok(Numbers::Integer(
            v.iter().map(|b| b.map(i64::from)).collect(),
        )),
        ColumnData::Integer(v) => Ok(Numbers::Integer(v.clone())),
        ColumnData::Double(v) => Ok(Numbers::Double(v.clone())),
        _ => Err(EvalError::Type(format!(
            "non-numeric argument of type {}",
            column.describe()
        ))),
    }
}

fn to_doubles(numbers: Numbers) -> Vec<Option<f64>> {
    match numbers {
        Numbers::Integer(v) => v.into_iter().map(|i| i.map(|i| i as f64)).collect(),
        Numbers::Double(v) => v,
    }
}

fn arithmetic(op: &str, lhs: &Column, rhs: &Column) -> Result<Column, EvalError> {
    let (a, b) = (lhs.len(), rhs.len());
    if a != b && a != 1 && b != 1 {
        return Err(EvalError::Type(format!(
            "operands of `{op}` have incompatible lengths {a} and {b}"
        )));
    }
    let n = if a == 0 || b == 0 { 0 } else { a.max(b) };

    match (numbers(lhs)?, numbers(rhs)?) {
        (Numbers::Integer(x), Numbers::Integer(y)) if op != "/" => {
            let f: fn(i64, i64) -> Option<i64> = match op {
                "+" => i64::checked_add,
                "-" => i64::checked_sub,
                _ => i64::checked_mul,
            };
            Ok(Column::integer((0..n).map(|i| {
                let (x, y) = (x[i % a], y[i % b]);
                f(x?, y?)
            })))
        }
        (x, y) => {
            let (x, y) = (to_doubles(x), to_doubles(y));
            let f: fn(f64, f64) -> f64 = match op {
                "+" => |p, q| p + q,
                "-" => |p, q| p - q,
                "*" => |p, q| p * q,
                _ => |p, q| p / q,
            };
            Ok(Column::double((0..n).map(|i| {
                let (x, y) = (x[i % a], y[i % b]);
                Some(f(x?, y?))
            })))
        }
    }
}

fn sum(column: &Column, drop_missing: bool) -> Result<Column, EvalError> {
    match numbers(column)? {
        Numbers::Integer(v) => {
            let mut total = Some(0_i64);
            for value in v {
                match value {
                    Some(value) => total = total.and_then(|t| t.checked_add(value)),
                    None if drop_missing => {}
                    None => return Ok(Column::integer([None])),
                }
            }
            Ok(Column::integer([total]))
        }
        Numbers::Double(v) => {
            let mut total = CompensatedSum::default();
            for value in v {
                match value {
                    Some(value) => total.add(value),
                    None if drop_missing => {}
                    None => return Ok(Column::double([None])),
                }
            }
            Ok(Column::double([Some(total.value())]))
        }
    }
}

fn extremum(max: bool, column: &Column, drop_missing: bool) -> Result<Column, EvalError> {
    // NaN wins over any number, unlike `f64::max` / `f64::min`.
    let pick = |acc: f64, x: f64| {
        if acc.is_nan() || x.is_nan() {
            f64::NAN
        } else if max {
            acc.max(x)
        } else {
            acc.min(x)
        }
    };
    let empty = if max { f64::NEG_INFINITY } else { f64::INFINITY };

    match numbers(column)? {
        Numbers::Integer(v) => {
            let mut best: Option<i64> = None;
            for value in v {
                match value {
                    Some(x) => {
                        best = Some(match best {
                            Some(b) if max => b.max(x),
                            Some(b) => b.min(x),
                            None => x,
                        })
                    }
                    None if drop_missing => {}
                    None => return Ok(Column::integer([None])),
                }
            }
            Ok(match best {
                Some(b) => Column::integer([Some(b)]),
                None => Column::double([Some(empty)]),
            })
        }
        Numbers::Double(v) => {
            let mut best = empty;
            for value in v {
                match value {
                    Some(x) => best = pick(best, x),
                    None if drop_missing => {}
                    None => return Ok(Column::double([None])),
                }
            }
            Ok(Column::double([Some(best)]))
        }
    }
}
