mod common;

use common::{build_table, by_g, doubles, mean_of};
use formula_frame::{Column, Grouping, SlicingIndex};
use formula_mutate::{dispatch, recognize, Expr, Namespace, ReductionKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn x() -> Column {
    build_table().column("x").unwrap().clone()
}

#[test]
fn mean_drops_missing_when_asked() {
    let table = build_table();
    let grouping = by_g(&table);
    let reducer = dispatch(ReductionKind::Mean, table.column("x").unwrap(), true).unwrap();

    assert_eq!(
        doubles(&reducer.window(&grouping)),
        vec![Some(1.5), Some(1.5), Some(4.0), Some(4.0)]
    );
}

#[test]
fn missing_element_makes_the_group_missing() {
    let table = build_table();
    let grouping = by_g(&table);
    let reducer = dispatch(ReductionKind::Mean, table.column("x").unwrap(), false).unwrap();

    assert_eq!(
        doubles(&reducer.window(&grouping)),
        vec![Some(1.5), Some(1.5), None, None]
    );
}

#[test]
fn missing_propagates_for_every_element_type() {
    let grouping = Grouping::natural(3);
    let columns = [
        Column::logical([Some(true), None, Some(false)]),
        Column::integer([Some(1), None, Some(3)]),
        Column::double([Some(1.0), None, Some(3.0)]),
    ];

    for column in &columns {
        for kind in [ReductionKind::Mean, ReductionKind::Variance, ReductionKind::StdDev] {
            let kept = dispatch(kind, column, false).unwrap().summarise(&grouping);
            assert_eq!(doubles(&kept), vec![None], "{kind:?} of {:?}", column.column_type());
        }
        let dropped = dispatch(ReductionKind::Mean, column, true)
            .unwrap()
            .summarise(&grouping);
        assert!(doubles(&dropped)[0].is_some());
    }
}

#[test]
fn logical_mean_is_the_share_of_true() {
    let column = Column::logical([Some(true), Some(false), Some(true), Some(true)]);
    let reducer = dispatch(ReductionKind::Mean, &column, false).unwrap();
    let rows = [0, 1, 2, 3];
    assert_eq!(reducer.compute_for_group(&SlicingIndex::new(&rows, 0)), Some(0.75));
}

#[test]
fn empty_group_mean_is_nan_and_variance_is_missing() {
    let column = x();
    let index = SlicingIndex::new(&[], 0);

    let mean = dispatch(ReductionKind::Mean, &column, false)
        .unwrap()
        .compute_for_group(&index);
    assert!(mean.is_some_and(f64::is_nan));

    for kind in [ReductionKind::Variance, ReductionKind::StdDev] {
        let value = dispatch(kind, &column, false).unwrap().compute_for_group(&index);
        assert_eq!(value, None);
    }
}

#[test]
fn variance_of_a_single_row_is_missing() {
    let column = x();
    let reducer = dispatch(ReductionKind::Variance, &column, true).unwrap();
    let window = reducer.window(&Grouping::rowwise(4));
    assert_eq!(doubles(&window), vec![None, None, None, None]);
}

#[test]
fn variance_with_one_remaining_element_is_missing() {
    let column = Column::double([None, Some(2.0), None]);
    let rows = [0, 1, 2];
    let value = dispatch(ReductionKind::Variance, &column, true)
        .unwrap()
        .compute_for_group(&SlicingIndex::new(&rows, 0));
    assert_eq!(value, None);
}

#[test]
fn variance_passes_through_a_non_finite_mean() {
    let column = Column::double([Some(1.0), Some(f64::INFINITY), Some(3.0)]);
    let rows = [0, 1, 2];
    let index = SlicingIndex::new(&rows, 0);

    let var = dispatch(ReductionKind::Variance, &column, false)
        .unwrap()
        .compute_for_group(&index);
    assert_eq!(var, Some(f64::INFINITY));

    let nan = Column::double([Some(1.0), Some(f64::NAN)]);
    let var = dispatch(ReductionKind::Variance, &nan, false)
        .unwrap()
        .compute_for_group(&SlicingIndex::new(&rows[..2], 0));
    assert!(var.is_some_and(f64::is_nan));
}

#[test]
fn std_dev_is_the_square_root_of_variance() {
    let column = Column::integer([Some(1), Some(2), Some(3), Some(4)]);
    let rows = [0, 1, 2, 3];
    let index = SlicingIndex::new(&rows, 0);

    let var = dispatch(ReductionKind::Variance, &column, false)
        .unwrap()
        .compute_for_group(&index)
        .unwrap();
    let sd = dispatch(ReductionKind::StdDev, &column, false)
        .unwrap()
        .compute_for_group(&index)
        .unwrap();
    assert_eq!(var, 5.0 / 3.0);
    assert_eq!(sd.to_bits(), var.sqrt().to_bits());
}

#[test]
fn summary_column_reduces_to_its_stored_value() {
    let grouping = by_g(&build_table());
    let summary = Column::integer([Some(10), Some(20)]).with_summary(true);

    let mean = dispatch(ReductionKind::Mean, &summary, false).unwrap();
    assert_eq!(
        doubles(&mean.window(&grouping)),
        vec![Some(10.0), Some(10.0), Some(20.0), Some(20.0)]
    );

    let var = dispatch(ReductionKind::Variance, &summary, false).unwrap();
    assert_eq!(doubles(&var.summarise(&grouping)), vec![None, None]);
}

#[test]
fn dispatch_declines_non_numeric_columns() {
    let columns = [
        Column::text([Some("a")]),
        Column::list(vec![Column::from(1.0)]),
        Column::complex([None]),
        Column::raw(vec![1]),
    ];
    for column in &columns {
        assert!(dispatch(ReductionKind::Mean, column, false).is_none());
    }
}

#[test]
fn recognize_accepts_symbol_with_drop_missing() {
    let namespace = Namespace::from_table(&build_table());

    let call = recognize(&mean_of("x", true), &namespace).unwrap();
    assert_eq!(call.kind, ReductionKind::Mean);
    assert!(call.drop_missing);

    let call = recognize(&Expr::call("std_dev", [Expr::symbol("x")]), &namespace).unwrap();
    assert_eq!(call.kind, ReductionKind::StdDev);
    assert!(!call.drop_missing);
}

#[test]
fn recognize_rejects_other_shapes() {
    let namespace = Namespace::from_table(&build_table());
    let rejected = [
        Expr::call("mean", [Expr::symbol("missing_column")]),
        Expr::call("mean", [Expr::call("+", [Expr::symbol("x"), 1.0.into()])]),
        Expr::call("mean", [Expr::symbol("x"), Expr::symbol("x")]),
        Expr::call("mean", []),
        Expr::call("mean", [Expr::symbol("x")]).named_arg("trim", 0.1.into()),
        Expr::call("mean", [Expr::symbol("x")]).named_arg("drop_missing", Expr::symbol("flag")),
        Expr::call("median", [Expr::symbol("x")]),
    ];
    for expr in &rejected {
        assert!(recognize(expr, &namespace).is_none(), "{expr:?}");
    }
}

proptest! {
    #[test]
    fn mean_of_integer_valued_doubles_is_exact(
        values in prop::collection::vec(-1_000_000i64..1_000_000, 1..64)
    ) {
        let exact = values.iter().sum::<i64>() as f64 / values.len() as f64;
        let column = Column::double(values.iter().map(|&v| Some(v as f64)));
        let rows: Vec<usize> = (0..values.len()).collect();

        let got = dispatch(ReductionKind::Mean, &column, false)
            .unwrap()
            .compute_for_group(&SlicingIndex::new(&rows, 0))
            .unwrap();
        prop_assert!((got - exact).abs() <= exact.abs() * f64::EPSILON, "{got} vs {exact}");
    }
}
