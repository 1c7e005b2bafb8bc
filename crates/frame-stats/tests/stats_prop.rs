use frame_columnar::{Column, Table, Value};
use frame_stats::{correlation_matrix, count_values, max, median, min, quantile};
use proptest::prelude::*;

fn arb_column() -> impl Strategy<Value = Column> {
    prop::collection::vec(prop::option::weighted(0.8, -1000i32..1000), 1..64)
        .prop_map(|values| Column::from_options("x", values))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn quantile_endpoints_are_the_extremes(column in arb_column()) {
        let q0 = quantile(&column, 0.0).unwrap().get(0).as_f64();
        let q1 = quantile(&column, 1.0).unwrap().get(0).as_f64();
        prop_assert_eq!(q0, min(&column).unwrap().get(0).as_f64());
        prop_assert_eq!(q1, max(&column).unwrap().get(0).as_f64());
        prop_assert_eq!(
            quantile(&column, 0.5).unwrap().get(0),
            median(&column).unwrap().get(0)
        );
    }

    #[test]
    fn quantiles_are_monotone(column in arb_column(), a in 0.0f64..1.0, b in 0.0f64..1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = quantile(&column, lo).unwrap().get(0).as_f64();
        let hi = quantile(&column, hi).unwrap().get(0).as_f64();
        if let (Some(lo), Some(hi)) = (lo, hi) {
            prop_assert!(lo <= hi, "{} > {}", lo, hi);
        }
    }

    #[test]
    fn counts_cover_every_row(column in arb_column()) {
        let table = count_values(&column).unwrap();
        let counts = table.column(1).unwrap();
        let total: i64 = counts
            .to_values()
            .into_iter()
            .map(|v| match v {
                Value::Int(n) => n,
                other => panic!("count should be an integer, got {other:?}"),
            })
            .sum();
        prop_assert_eq!(total as usize, column.len());
    }

    #[test]
    fn correlation_matrix_is_symmetric(
        a in prop::collection::vec(prop::option::weighted(0.9, -50.0f64..50.0), 16),
        b in prop::collection::vec(prop::option::weighted(0.9, -50i64..50), 16),
        c in prop::collection::vec(-50i16..50, 16),
    ) {
        let table = Table::new(vec![
            Column::from_options("a", a),
            Column::from_options("b", b),
            Column::from_values("c", c),
        ])
        .unwrap();
        let matrix = correlation_matrix(&table).unwrap();
        for i in 0..3 {
            prop_assert_eq!(matrix.column(i).unwrap().get(i), Value::Float(1.0));
            for j in 0..3 {
                let ij = matrix.column(i).unwrap().get(j).as_f64().unwrap();
                let ji = matrix.column(j).unwrap().get(i).as_f64().unwrap();
                prop_assert!(ij.to_bits() == ji.to_bits(), "[{}][{}] = {} vs {}", i, j, ij, ji);
            }
        }
    }
}
