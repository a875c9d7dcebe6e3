use formula_frame::{Column, ColumnData, ColumnType};
use formula_mutate::{ExpectedLength, Gatherer, MutateError};
use pretty_assertions::assert_eq;

#[test]
fn logical_results_widen_to_integer() {
    let first = Column::from(true);
    let mut gatherer = Gatherer::new("y", &first, 3);
    gatherer.grab(&first, &[0]).unwrap();
    gatherer.grab(&Column::from(false), &[1]).unwrap();
    gatherer.grab(&Column::from(7_i64), &[2]).unwrap();

    assert_eq!(gatherer.column_type(), ColumnType::Integer);
    assert_eq!(
        gatherer.collect().data(),
        &ColumnData::Integer(vec![Some(1), Some(0), Some(7)])
    );
}

#[test]
fn integer_results_widen_to_double() {
    let first = Column::integer([Some(1), Some(2)]);
    let mut gatherer = Gatherer::new("y", &first, 4);
    gatherer.grab(&first, &[0, 2]).unwrap();
    gatherer.grab(&Column::double([Some(0.5), None]), &[1, 3]).unwrap();

    assert_eq!(
        gatherer.collect().data(),
        &ColumnData::Double(vec![Some(1.0), Some(0.5), Some(2.0), None])
    );
}

#[test]
fn numbers_widen_to_text() {
    let first = Column::from(1.5);
    let mut gatherer = Gatherer::new("y", &first, 2);
    gatherer.grab(&first, &[0]).unwrap();
    gatherer.grab(&Column::from("b"), &[1]).unwrap();

    assert_eq!(
        gatherer.collect().data(),
        &ColumnData::Text(vec![Some("1.5".into()), Some("b".into())])
    );
}

#[test]
fn length_one_result_is_broadcast() {
    let first = Column::from(3_i64);
    let mut gatherer = Gatherer::new("y", &first, 5);
    gatherer.grab(&first, &[0, 1, 4]).unwrap();
    gatherer.grab(&Column::integer([Some(8), Some(9)]), &[2, 3]).unwrap();

    assert_eq!(
        gatherer.collect().data(),
        &ColumnData::Integer(vec![Some(3), Some(3), Some(8), Some(9), Some(3)])
    );
}

#[test]
fn all_missing_result_does_not_widen() {
    let first = Column::from(2_i64);
    let mut gatherer = Gatherer::new("y", &first, 3);
    gatherer.grab(&first, &[0]).unwrap();
    gatherer.grab(&Column::text([None::<&str>, None]), &[1, 2]).unwrap();

    assert_eq!(gatherer.column_type(), ColumnType::Integer);
    assert_eq!(
        gatherer.collect().data(),
        &ColumnData::Integer(vec![Some(2), None, None])
    );
}

#[test]
fn wrong_length_is_rejected() {
    let first = Column::from(1.0);
    let mut gatherer = Gatherer::new("y", &first, 3);
    let err = gatherer
        .grab(&Column::double([Some(1.0), Some(2.0)]), &[0, 1, 2])
        .unwrap_err();

    match err {
        MutateError::LengthMismatch {
            name,
            expected,
            actual,
        } => {
            assert_eq!(name, "y");
            assert_eq!(expected, ExpectedLength::GroupSize(3));
            assert_eq!(actual, 2);
        }
        other => panic!("expected a length mismatch, got {other:?}"),
    }
}

#[test]
fn class_mismatch_is_incompatible() {
    let first = Column::from(1.0).with_class(["Date"]);
    let mut gatherer = Gatherer::new("day", &first, 2);
    gatherer.grab(&first, &[0]).unwrap();

    let err = gatherer.grab(&Column::from(2.0), &[1]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "column `day` has incompatible types (double), expecting Date"
    );
}

#[test]
fn class_is_carried_to_the_output() {
    let first = Column::from(1.0).with_class(["Date"]);
    let mut gatherer = Gatherer::new("day", &first, 2);
    gatherer.grab(&first, &[0]).unwrap();
    gatherer.grab(&Column::from(5.0).with_class(["Date"]), &[1]).unwrap();

    let out = gatherer.collect();
    assert!(out.inherits("Date"));
    assert_eq!(out.names(), None);
}
