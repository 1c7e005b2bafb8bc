use frame_columnar::{BitVec, Column, ErrorKind, FrameError, Table, Value};
use frame_query::{
    execute_predicate, execute_value, filter, ColumnMapping, ComparisonOperator, Predicate,
    ValueExpr, ValueOperator,
};
use pretty_assertions::assert_eq;

fn xy_table() -> Table {
    Table::new(vec![
        Column::from_options("x", vec![Some(1i64), Some(2), None, Some(4)]),
        Column::from_values("y", vec![10i64, 20, 30, 40]),
    ])
    .unwrap()
}

fn mask_to_bools(mask: &BitVec) -> Vec<bool> {
    (0..mask.len()).map(|i| mask.get(i)).collect()
}

fn x() -> ValueExpr {
    ValueExpr::column(0)
}

fn y() -> ValueExpr {
    ValueExpr::column(1)
}

#[test]
fn greater_than_literal_forces_null_rows_false() {
    let table = xy_table();
    let predicate = Predicate::compare(ComparisonOperator::Greater, x(), ValueExpr::int(1));
    let mask = execute_predicate(&table, &predicate, &ColumnMapping::identity(2)).unwrap();
    assert_eq!(mask_to_bools(&mask), vec![false, true, false, true]);
}

#[test]
fn addition_propagates_nulls() {
    let table = xy_table();
    let value = ValueExpr::binary(ValueOperator::Plus, x(), y());
    let column = execute_value(&table, &value, &ColumnMapping::identity(2)).unwrap();
    assert_eq!(
        column.to_values(),
        vec![Value::Int(11), Value::Int(22), Value::Null, Value::Int(44)]
    );
    assert_eq!(column.name(), "result");
}

#[test]
fn adding_a_string_literal_is_a_type_mismatch() {
    let table = xy_table();
    let value = ValueExpr::binary(ValueOperator::Plus, x(), ValueExpr::string("s"));
    let err = execute_value(&table, &value, &ColumnMapping::identity(2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn nested_and_applies_null_mask_once() {
    let table = xy_table();
    let predicate = Predicate::and(
        Predicate::compare(ComparisonOperator::Greater, x(), ValueExpr::int(1)),
        Predicate::compare(ComparisonOperator::Lesser, y(), ValueExpr::int(40)),
    );
    let mask = execute_predicate(&table, &predicate, &ColumnMapping::identity(2)).unwrap();
    assert_eq!(mask_to_bools(&mask), vec![false, true, false, false]);
}

#[test]
fn not_of_a_null_row_is_still_false() {
    let table = xy_table();
    let predicate = Predicate::not(Predicate::compare(
        ComparisonOperator::Greater,
        x(),
        ValueExpr::int(100),
    ));
    let mask = execute_predicate(&table, &predicate, &ColumnMapping::identity(2)).unwrap();
    assert_eq!(mask_to_bools(&mask), vec![true, true, false, true]);
}

#[test]
fn column_reference_round_trips() {
    let table = xy_table();
    let column = execute_value(&table, &x(), &ColumnMapping::identity(2)).unwrap();
    let source = table.column(0).unwrap();

    assert_eq!(&column, source);
    assert!(column.shares_storage(source));
}

#[test]
fn column_references_of_every_kind_round_trip() {
    let table = Table::new(vec![
        Column::from_options("f", vec![Some(1.5f32), None, Some(-2.0)]),
        Column::from_options("u", vec![Some(u64::MAX), Some(0), None]),
        Column::from_options("n", vec![Some(-1i16), None, Some(7)]),
        Column::from_bools("b", &[Some(true), None, Some(false)]),
    ])
    .unwrap();
    let mapping = ColumnMapping::identity(4);

    for (id, source) in table.columns().iter().enumerate() {
        let column = execute_value(&table, &ValueExpr::column(id), &mapping).unwrap();
        assert_eq!(&column, source);
        assert_eq!(column.data_type(), source.data_type());
        assert!(column.shares_storage(source));
    }
}

#[test]
fn narrow_columns_widen_inside_arithmetic() {
    let table = Table::new(vec![Column::from_options("n", vec![Some(-1i16), None, Some(7)])]).unwrap();
    let value = ValueExpr::binary(ValueOperator::Plus, ValueExpr::column(0), ValueExpr::int(1));
    let column = execute_value(&table, &value, &ColumnMapping::identity(1)).unwrap();
    assert_eq!(column.data_type(), frame_columnar::DataType::Int64);
    assert_eq!(
        column.to_values(),
        vec![Value::Int(0), Value::Null, Value::Int(8)]
    );
}

#[test]
fn scalar_expression_is_broadcast() {
    let table = xy_table();
    let value = ValueExpr::binary(ValueOperator::Plus, ValueExpr::int(2), ValueExpr::float(0.5));
    let column = execute_value(&table, &value, &ColumnMapping::identity(2)).unwrap();
    assert_eq!(column.len(), 4);
    assert_eq!(column.null_count(), 0);
    assert!(column.to_values().iter().all(|v| *v == Value::Float(2.5)));
}

#[test]
fn mixed_numeric_promotes_to_float() {
    let table = Table::new(vec![
        Column::from_values("i", vec![7i64, -7]),
        Column::from_values("f", vec![2.0f64, 2.0]),
    ])
    .unwrap();
    let mapping = ColumnMapping::identity(2);

    let modulo = ValueExpr::binary(ValueOperator::Modulo, ValueExpr::column(0), ValueExpr::column(1));
    let column = execute_value(&table, &modulo, &mapping).unwrap();
    assert_eq!(column.to_values(), vec![Value::Float(1.0), Value::Float(-1.0)]);

    let divide = ValueExpr::binary(ValueOperator::Divide, ValueExpr::column(0), ValueExpr::int(2));
    let column = execute_value(&table, &divide, &mapping).unwrap();
    assert_eq!(column.to_values(), vec![Value::Int(3), Value::Int(-3)]);
}

#[test]
fn string_predicates() {
    let table = Table::new(vec![Column::from_strs(
        "s",
        &[Some("alpha"), Some("beta"), None, Some("alphabet")],
    )])
    .unwrap();
    let mapping = ColumnMapping::identity(1);
    let s = || ValueExpr::column(0);

    let starts = Predicate::compare(ComparisonOperator::StartsWith, s(), ValueExpr::string("alpha"));
    let mask = execute_predicate(&table, &starts, &mapping).unwrap();
    assert_eq!(mask_to_bools(&mask), vec![true, false, false, true]);

    let equal = Predicate::compare(ComparisonOperator::Equal, s(), ValueExpr::string("beta"));
    let mask = execute_predicate(&table, &equal, &mapping).unwrap();
    assert_eq!(mask_to_bools(&mask), vec![false, true, false, false]);

    let matches = Predicate::compare(ComparisonOperator::Matches, s(), ValueExpr::string("al.*a"));
    let mask = execute_predicate(&table, &matches, &mapping).unwrap();
    assert_eq!(mask_to_bools(&mask), vec![true, false, false, false]);

    let wrong = Predicate::compare(ComparisonOperator::StartsWith, s(), ValueExpr::int(1));
    let err = execute_predicate(&table, &wrong, &mapping).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn string_ordering_is_a_mismatch() {
    let table = Table::new(vec![Column::from_strs("s", &[Some("b"), Some("a")])]).unwrap();
    let mapping = ColumnMapping::identity(1);
    for op in [ComparisonOperator::Greater, ComparisonOperator::Lesser] {
        let predicate = Predicate::compare(op, ValueExpr::column(0), ValueExpr::string("a"));
        let err = execute_predicate(&table, &predicate, &mapping).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }
}

#[test]
fn string_vs_number_ordering_is_a_mismatch() {
    let table = Table::new(vec![Column::from_strs("s", &[Some("a")])]).unwrap();
    let predicate =
        Predicate::compare(ComparisonOperator::Greater, ValueExpr::column(0), ValueExpr::int(1));
    let err = execute_predicate(&table, &predicate, &ColumnMapping::identity(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn string_column_references_pass_through() {
    let table = Table::new(vec![Column::from_strs("s", &[Some("a"), None, Some("c")])]).unwrap();
    let column = execute_value(&table, &ValueExpr::column(0), &ColumnMapping::identity(1)).unwrap();
    assert_eq!(column.name(), "s");
    assert_eq!(
        column.to_values(),
        vec![Value::from("a"), Value::Null, Value::from("c")]
    );

    let negate = ValueExpr::negate(ValueExpr::column(0));
    let err = execute_value(&table, &negate, &ColumnMapping::identity(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn mapping_indirection_resolves_ids() {
    let table = xy_table();
    // Id 0 is column `y`.
    let mapping = ColumnMapping::new(vec![1]);
    let predicate =
        Predicate::compare(ComparisonOperator::Equal, ValueExpr::column(0), ValueExpr::int(30));
    let mask = execute_predicate(&table, &predicate, &mapping).unwrap();
    assert_eq!(mask_to_bools(&mask), vec![false, false, true, false]);
}

#[test]
fn filter_keeps_matching_rows() {
    let table = xy_table();
    let predicate = Predicate::compare(ComparisonOperator::Greater, y(), ValueExpr::int(15));
    let filtered = filter(&table, &predicate, &ColumnMapping::identity(2)).unwrap();

    assert_eq!(filtered.num_rows(), 3);
    assert_eq!(
        filtered.column(0).unwrap().to_values(),
        vec![Value::Int(2), Value::Null, Value::Int(4)]
    );
}

#[test]
fn chunked_columns_are_rejected() {
    let column = Column::from_chunks(
        "c",
        frame_columnar::DataType::Int64,
        vec![
            Column::from_values("a", vec![1i64]).segment().unwrap().clone(),
            Column::from_values("b", vec![2i64]).segment().unwrap().clone(),
        ],
    )
    .unwrap();
    let table = Table::new(vec![column]).unwrap();
    let err = execute_value(&table, &ValueExpr::column(0), &ColumnMapping::identity(1)).unwrap_err();
    assert_eq!(
        err,
        FrameError::MultiSegmentUnsupported {
            column: "c".to_owned(),
            segments: 2
        }
    );
}

#[test]
fn boolean_columns_compare_for_equality() {
    let table = Table::new(vec![
        Column::from_bools("a", &[Some(true), Some(false), Some(true)]),
        Column::from_bools("b", &[Some(true), Some(true), None]),
    ])
    .unwrap();
    let predicate =
        Predicate::compare(ComparisonOperator::Equal, ValueExpr::column(0), ValueExpr::column(1));
    let mask = execute_predicate(&table, &predicate, &ColumnMapping::identity(2)).unwrap();
    assert_eq!(mask_to_bools(&mask), vec![true, false, false]);

    let lesser =
        Predicate::compare(ComparisonOperator::Lesser, ValueExpr::column(0), ValueExpr::column(1));
    let mask = execute_predicate(&table, &lesser, &ColumnMapping::identity(2)).unwrap();
    assert_eq!(mask_to_bools(&mask), vec![false, true, false]);
}

#[test]
fn serde_round_trip_of_a_predicate() {
    let predicate = Predicate::or(
        Predicate::compare(ComparisonOperator::Matches, x(), ValueExpr::string("^a")),
        Predicate::not(Predicate::compare(
            ComparisonOperator::Lesser,
            ValueExpr::negate(y()),
            ValueExpr::float(1.5),
        )),
    );
    let json = serde_json::to_string(&predicate).unwrap();
    let back: Predicate = serde_json::from_str(&json).unwrap();
    assert_eq!(back, predicate);

    let parsed: ValueExpr =
        serde_json::from_str(r#"{"type":"literal","value":{"int64":5}}"#).unwrap();
    assert_eq!(parsed, ValueExpr::int(5));
}
