use serde::Serialize;

use super::safe::{
    clean, finite_or_zero, kurtosis, mean, percentile_sorted, skewness, sort, std_dev,
};

/// Describe-style summary of one numeric column.
///
/// Every field follows the same rules as [`Statistic`](super::Statistic):
/// missing values are dropped and undefined results are `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl Summary {
    /// Compute every statistic from a single cleaned, sorted copy.
    pub fn compute<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut vals = clean(values);
        if vals.is_empty() {
            return Summary::default();
        }
        sort(&mut vals);

        Summary {
            count: vals.len(),
            mean: finite_or_zero(mean(&vals)),
            std: finite_or_zero(std_dev(&vals)),
            min: vals[0],
            p25: finite_or_zero(percentile_sorted(&vals, 25.0)),
            median: finite_or_zero(percentile_sorted(&vals, 50.0)),
            p75: finite_or_zero(percentile_sorted(&vals, 75.0)),
            max: vals[vals.len() - 1],
            skewness: finite_or_zero(skewness(&vals)),
            kurtosis: finite_or_zero(kurtosis(&vals)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Statistic;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn summary_agrees_with_single_statistics() {
        let values: Vec<Option<f64>> = vec![
            Some(420.0),
            None,
            Some(515.5),
            Some(f64::NAN),
            Some(633.0),
            Some(702.1),
            Some(388.9),
        ];
        let s = Summary::compute(values.clone());
        assert_eq!(s.count, 5);
        assert!(close(s.mean, Statistic::Mean.compute(values.clone())));
        assert!(close(s.std, Statistic::StdDev.compute(values.clone())));
        assert_eq!(s.median, 515.5);
        assert_eq!(s.p25, Statistic::Percentile(25.0).compute(values.clone()));
        assert_eq!(s.min, 388.9);
        assert_eq!(s.max, 702.1);
        assert!(close(s.skewness, Statistic::Skewness.compute(values.clone())));
        assert!(close(s.kurtosis, Statistic::Kurtosis.compute(values)));
    }

    #[test]
    fn empty_summary_is_all_zero() {
        assert_eq!(Summary::compute(vec![None, Some(f64::INFINITY)]), Summary::default());
    }
}
