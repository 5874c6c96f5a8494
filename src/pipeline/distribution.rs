use crate::data::model::{Competency, View, SCORE_RANGE};
use crate::stats::{histogram, Bin, Statistic, Summary};

/// Descriptive summary of one competency's valid scores.
pub fn score_summary(view: &View<'_>, competency: Competency) -> Summary {
    if !view.has_competency(competency) {
        log::warn!("score summary unavailable: column {} missing", competency.column());
        return Summary::default();
    }
    Summary::compute(view.iter().map(|rec| rec.score(competency)))
}

/// One statistic of a competency's valid scores; `0.0` when undefined.
pub fn score_statistic(view: &View<'_>, competency: Competency, statistic: Statistic) -> f64 {
    if !view.has_competency(competency) {
        log::warn!("score statistic unavailable: column {} missing", competency.column());
        return 0.0;
    }
    statistic.compute(view.iter().map(|rec| rec.score(competency)))
}

/// Equal-width histogram of one competency over the full score range.
pub fn score_histogram(view: &View<'_>, competency: Competency, bins: usize) -> Vec<Bin> {
    if !view.has_competency(competency) {
        log::warn!("score histogram unavailable: column {} missing", competency.column());
        return Vec::new();
    }
    histogram(view.iter().map(|rec| rec.score(competency)), bins, SCORE_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Dataset, Record, RecordSource, StateCode, STATE_COLUMN};

    fn dataset() -> Dataset {
        Dataset::from_records(
            [420.0, 560.0, 560.0, 980.0, -1.0, 1000.0]
                .into_iter()
                .map(|s| Record::new(StateCode::PI).with_score(Competency::Essay, s))
                .collect(),
        )
    }

    #[test]
    fn summary_skips_sentinel_scores() {
        let summary = score_summary(&dataset().view_all(), Competency::Essay);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 420.0);
        assert_eq!(summary.max, 1000.0);
        assert_eq!(summary.median, 560.0);
    }

    #[test]
    fn single_statistics_agree_with_summary() {
        let view_ds = dataset();
        let view = view_ds.view_all();
        let summary = score_summary(&view, Competency::Essay);
        assert_eq!(score_statistic(&view, Competency::Essay, Statistic::Median), summary.median);
        assert_eq!(score_statistic(&view, Competency::Essay, Statistic::Count), 5.0);
        assert_eq!(score_statistic(&view, Competency::Mathematics, Statistic::Mean), 0.0);
    }

    #[test]
    fn histogram_covers_score_range() {
        let bins = score_histogram(&dataset().view_all(), Competency::Essay, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[9].end, 1000.0);
        assert_eq!(bins[4].count, 1);
        assert_eq!(bins[5].count, 2);
        // 980 and the closed upper edge 1000
        assert_eq!(bins[9].count, 2);
        assert_eq!(bins.iter().map(|b| b.count).sum::<u64>(), 5);
    }

    #[test]
    fn missing_column_yields_defaults() {
        let ds = Dataset::new(dataset().records().to_vec(), [STATE_COLUMN]);
        assert_eq!(score_summary(&ds.view_all(), Competency::Essay), Summary::default());
        assert!(score_histogram(&ds.view_all(), Competency::Essay, 10).is_empty());
        assert_eq!(score_statistic(&ds.view_all(), Competency::Essay, Statistic::Max), 0.0);
    }
}
