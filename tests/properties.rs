//! Property-based tests for the numeric core.
//!
//! - statistics never yield NaN or infinity, whatever the input
//! - type optimization is idempotent and keeps every cell's value
//! - crosstab rows sum to 100 unless empty
//! - expanding a folded selection returns the selection

use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use proptest::prelude::*;

use enem_panel::config::OptimizerConfig;
use enem_panel::crosstab::{crosstab, CrossTab};
use enem_panel::optimize::optimize;
use enem_panel::stats::Statistic;
use enem_panel::{Dataset, Record, RecordSource, RegionMap, StateCode, Variable};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn messy_value() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        Just(None),
        Just(Some(f64::NAN)),
        Just(Some(f64::INFINITY)),
        Just(Some(f64::NEG_INFINITY)),
        (-1000.0..2000.0f64).prop_map(Some),
        any::<f64>().prop_map(Some),
    ]
}

fn invalid_value() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        Just(None),
        Just(Some(f64::NAN)),
        Just(Some(f64::INFINITY)),
        Just(Some(f64::NEG_INFINITY)),
    ]
}

fn statistic() -> impl Strategy<Value = Statistic> {
    prop_oneof![
        Just(Statistic::Count),
        Just(Statistic::Mean),
        Just(Statistic::Median),
        Just(Statistic::Min),
        Just(Statistic::Max),
        Just(Statistic::StdDev),
        Just(Statistic::Skewness),
        Just(Statistic::Kurtosis),
        (0.0..=100.0f64).prop_map(Statistic::Percentile),
    ]
}

/// A small microdata-like table: an integer code, a score and a category.
fn table() -> impl Strategy<Value = RecordBatch> {
    (1usize..60).prop_flat_map(|rows| {
        (
            prop::collection::vec(prop::option::of(-70_000i64..70_000), rows),
            prop::collection::vec(prop::option::of(0u32..=10_000), rows),
            prop::collection::vec(
                prop::option::of(prop::sample::select(vec!["A", "B", "C"])),
                rows,
            ),
        )
            .prop_map(|(codes, tenths, letters)| {
                let scores: Vec<Option<f64>> =
                    tenths.into_iter().map(|t| t.map(|t| t as f64 / 10.0)).collect();
                let schema = Schema::new(vec![
                    Field::new("TP_CODE", DataType::Int64, true),
                    Field::new("NU_NOTA_MT", DataType::Float64, true),
                    Field::new("Q006", DataType::Utf8, true),
                ]);
                let columns: Vec<ArrayRef> = vec![
                    Arc::new(Int64Array::from(codes)),
                    Arc::new(Float64Array::from(scores)),
                    Arc::new(StringArray::from(letters)),
                ];
                RecordBatch::try_new(Arc::new(schema), columns).unwrap()
            })
    })
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn statistics_are_always_finite(
        values in prop::collection::vec(messy_value(), 0..40),
        stat in statistic(),
    ) {
        let result = stat.compute(values);
        prop_assert!(result.is_finite(), "{stat:?} gave {result}");
    }

    #[test]
    fn all_invalid_input_is_exactly_zero(
        values in prop::collection::vec(invalid_value(), 0..20),
        stat in statistic(),
    ) {
        prop_assert_eq!(stat.compute(values), 0.0);
    }

    #[test]
    fn optimize_is_idempotent(batch in table()) {
        let config = OptimizerConfig::default();
        let once = optimize(&batch, &config).unwrap();
        let twice = optimize(&once, &config).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn optimize_keeps_every_value(batch in table()) {
        let optimized = optimize(&batch, &OptimizerConfig::default()).unwrap();
        prop_assert_eq!(optimized.num_rows(), batch.num_rows());
        prop_assert_eq!(optimized.schema().fields().len(), batch.schema().fields().len());

        let codes = cast(optimized.column(0), &DataType::Int64).unwrap();
        prop_assert_eq!(
            codes.as_primitive::<Int64Type>(),
            batch.column(0).as_primitive::<Int64Type>()
        );

        let scores = cast(optimized.column(1), &DataType::Float64).unwrap();
        let restored: Vec<Option<f64>> = scores
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map(round_tenth))
            .collect();
        let original: Vec<Option<f64>> =
            batch.column(1).as_primitive::<Float64Type>().iter().collect();
        prop_assert_eq!(restored, original);

        let letters = cast(optimized.column(2), &DataType::Utf8).unwrap();
        prop_assert_eq!(letters.as_string::<i32>(), batch.column(2).as_string::<i32>());
        prop_assert_eq!(letters.null_count(), batch.column(2).null_count());
    }

    #[test]
    fn crosstab_rows_sum_to_hundred(
        pairs in prop::collection::vec(
            (prop::option::of(prop::sample::select(vec!["F", "M"])), prop::option::of(0i64..5)),
            0..80,
        ),
    ) {
        let records = pairs
            .into_iter()
            .map(|(sex, school)| {
                let mut rec = Record::new(StateCode::SE);
                if let Some(sex) = sex {
                    rec = rec.with_attribute(Variable::Sex, sex);
                }
                if let Some(school) = school {
                    rec = rec.with_attribute(Variable::SchoolType, school);
                }
                rec
            })
            .collect();
        let ds = Dataset::from_records(records);
        let tab = crosstab(&ds.view_all(), Variable::Sex, Variable::SchoolType);
        for row in &tab.percents {
            let total: f64 = row.iter().sum();
            prop_assert!((total - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_rows_are_all_zero(
        counts in prop::collection::vec(
            prop::collection::vec(prop_oneof![Just(0u64), 0u64..1000], 3),
            1..6,
        ),
    ) {
        let rows = (0..counts.len()).map(|i| format!("X{i}")).collect();
        let columns = vec!["Y1".to_string(), "Y2".to_string(), "Y3".to_string()];
        let tab = CrossTab::from_counts(rows, columns, counts.clone());
        for (row, percents) in counts.iter().zip(&tab.percents) {
            let total: f64 = percents.iter().sum();
            if row.iter().sum::<u64>() == 0 {
                prop_assert!(percents.iter().all(|p| *p == 0.0));
            } else {
                prop_assert!((total - 100.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn expand_inverts_fold(states in prop::sample::subsequence(StateCode::ALL.to_vec(), 0..=27)) {
        let regions = RegionMap::brazil();
        let selected: BTreeSet<StateCode> = states.into_iter().collect();
        let labels = regions.fold(&selected);
        prop_assert_eq!(regions.expand(&labels).unwrap(), selected);
    }
}
