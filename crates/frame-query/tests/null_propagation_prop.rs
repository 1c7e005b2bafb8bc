use frame_columnar::{Column, Table};
use frame_query::{
    execute_predicate, execute_value, ColumnMapping, ComparisonOperator, Predicate, ValueExpr,
    ValueOperator,
};
use proptest::prelude::*;

const ROWS: usize = 24;

fn arb_column(name: &'static str) -> impl Strategy<Value = Column> {
    prop::collection::vec(prop::option::weighted(0.8, -50i64..50), ROWS)
        .prop_map(move |values| Column::from_options(name, values))
}

fn arb_value() -> impl Strategy<Value = ValueExpr> {
    let leaf = prop_oneof![
        (0usize..3).prop_map(ValueExpr::column),
        (-10i64..10).prop_map(ValueExpr::int),
        (-10.0f64..10.0).prop_map(ValueExpr::float),
    ];
    leaf.prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            (
                prop_oneof![
                    Just(ValueOperator::Plus),
                    Just(ValueOperator::Minus),
                    Just(ValueOperator::Times),
                    Just(ValueOperator::Divide),
                    Just(ValueOperator::Modulo),
                ],
                inner.clone(),
                inner.clone()
            )
                .prop_map(|(op, l, r)| ValueExpr::binary(op, l, r)),
            inner.prop_map(ValueExpr::negate),
        ]
    })
}

fn arb_predicate() -> impl Strategy<Value = Predicate> {
    let comparison = (
        prop_oneof![
            Just(ComparisonOperator::Greater),
            Just(ComparisonOperator::Lesser),
            Just(ComparisonOperator::Equal),
        ],
        arb_value(),
        arb_value(),
    )
        .prop_map(|(op, l, r)| Predicate::compare(op, l, r));

    comparison.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Predicate::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Predicate::or(l, r)),
            inner.prop_map(Predicate::not),
        ]
    })
}

fn referenced_value(expr: &ValueExpr, out: &mut Vec<usize>) {
    match expr {
        ValueExpr::ColumnReference { id } => out.push(*id),
        ValueExpr::Literal { .. } => {}
        ValueExpr::Operation { operands, .. } => {
            operands.iter().for_each(|o| referenced_value(o, out))
        }
    }
}

fn referenced_predicate(predicate: &Predicate, out: &mut Vec<usize>) {
    match predicate {
        Predicate::Comparison { operands, .. } => {
            operands.iter().for_each(|o| referenced_value(o, out))
        }
        Predicate::Boolean { operands, .. } => {
            operands.iter().for_each(|p| referenced_predicate(p, out))
        }
    }
}

fn arb_table() -> impl Strategy<Value = Table> {
    (arb_column("a"), arb_column("b"), arb_column("c"))
        .prop_map(|(a, b, c)| Table::new(vec![a, b, c]).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn predicate_is_false_wherever_a_referenced_column_is_null(
        table in arb_table(),
        predicate in arb_predicate(),
    ) {
        let mapping = ColumnMapping::identity(3);
        let mask = execute_predicate(&table, &predicate, &mapping).unwrap();
        prop_assert_eq!(mask.len(), ROWS);

        let mut ids = Vec::new();
        referenced_predicate(&predicate, &mut ids);
        for row in 0..ROWS {
            if ids.iter().any(|&id| table.column(id).unwrap().is_null(row)) {
                prop_assert!(!mask.get(row), "row {} should be forced false", row);
            }
        }
    }

    #[test]
    fn value_is_null_exactly_where_a_referenced_column_is(
        table in arb_table(),
        value in arb_value(),
    ) {
        let mapping = ColumnMapping::identity(3);
        let column = execute_value(&table, &value, &mapping).unwrap();
        prop_assert_eq!(column.len(), ROWS);

        let mut ids = Vec::new();
        referenced_value(&value, &mut ids);
        for row in 0..ROWS {
            let expected = ids.iter().any(|&id| table.column(id).unwrap().is_null(row));
            prop_assert_eq!(column.is_null(row), expected, "row {}", row);
        }
    }
}
