#![allow(dead_code)]

use formula_frame::{Column, Grouping, Table};
use formula_mutate::{Expr, NamedExpr};

/// `x = [1, 2, NA, 4]` grouped by `g = [a, a, b, b]`.
pub fn build_table() -> Table {
    Table::new(vec![
        ("g", Column::text([Some("a"), Some("a"), Some("b"), Some("b")])),
        ("x", Column::double([Some(1.0), Some(2.0), None, Some(4.0)])),
    ])
    .unwrap()
}

pub fn by_g(table: &Table) -> Grouping {
    Grouping::by_keys(table, &["g"]).unwrap()
}

pub fn call(function: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::call(function, args)
}

pub fn mean_of(name: &str, drop_missing: bool) -> Expr {
    Expr::call("mean", [Expr::symbol(name)]).named_arg("drop_missing", drop_missing.into())
}

pub fn named(name: &str, expr: Expr) -> NamedExpr {
    NamedExpr::new(name, expr)
}

pub fn doubles(column: &Column) -> Vec<Option<f64>> {
    match column.data() {
        formula_frame::ColumnData::Double(v) => v.clone(),
        other => panic!("expected a double column, got {:?}", other.column_type()),
    }
}
