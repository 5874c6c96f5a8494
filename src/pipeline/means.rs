use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::filter::FilterSelection;
use crate::data::model::{Competency, StateCode, View};
use crate::regions::RegionMap;
use crate::stats::{MeanAccumulator, Statistic};

/// Competency label of the per-group general average row.
pub const GENERAL_AVERAGE: &str = "Média geral";

/// `(group, competency, mean)`, the row shape of every mean chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanRow {
    pub group: String,
    pub competency: String,
    pub mean: f64,
}

/// How records are grouped into chart rows.
#[derive(Debug, Clone, Copy)]
pub enum Grouping<'a> {
    /// One group per state present in the view, in code order.
    State,
    /// The folded labels of the selection: complete regions collapse into
    /// one group, leftover states stay on their own.
    Folded(&'a RegionMap, &'a FilterSelection),
}

/// Per-state partial sums, merged per group and divided once.
type Partials = BTreeMap<StateCode, (usize, [MeanAccumulator; 5])>;

/// Mean of each competency per group, plus a general-average row.
///
/// The general average is the mean of the group's per-competency means. A
/// competency without any valid score in the group has no row and does not
/// count toward the average. Groups without records are omitted; an empty
/// view or a missing score column yields no rows.
pub fn mean_table(
    view: &View<'_>,
    competencies: &[Competency],
    grouping: Grouping<'_>,
) -> Vec<MeanRow> {
    if view.is_empty() || competencies.is_empty() {
        return Vec::new();
    }
    if let Some(missing) = competencies.iter().find(|c| !view.has_competency(**c)) {
        log::warn!("mean table unavailable: column {} missing", missing.column());
        return Vec::new();
    }

    let partials = partials(view);
    let groups: Vec<(String, Vec<StateCode>)> = match grouping {
        Grouping::State => partials
            .keys()
            .map(|state| (state.to_string(), vec![*state]))
            .collect(),
        Grouping::Folded(regions, selection) => regions
            .fold(selection.states())
            .into_iter()
            .filter_map(|label| {
                let members = regions.members(&label)?;
                Some((label, members.into_iter().collect()))
            })
            .collect(),
    };

    let mut rows = Vec::new();
    for (label, members) in groups {
        let mut records = 0;
        let mut accs = [MeanAccumulator::default(); 5];
        for state in &members {
            if let Some((n, partial)) = partials.get(state) {
                records += n;
                for (acc, p) in accs.iter_mut().zip(partial) {
                    acc.merge(p);
                }
            }
        }
        if records == 0 {
            continue;
        }

        // Competencies without a valid score get no row and stay out of the
        // general average, so the average always matches the rows shown.
        let mut means = Vec::with_capacity(competencies.len());
        for competency in competencies {
            let Some(mean) = accs[competency.index()].mean() else { continue };
            means.push(Some(mean));
            rows.push(MeanRow {
                group: label.clone(),
                competency: competency.label().to_string(),
                mean,
            });
        }
        rows.push(MeanRow {
            group: label,
            competency: GENERAL_AVERAGE.to_string(),
            mean: Statistic::Mean.compute(means),
        });
    }

    log::debug!("mean table: {} rows from {} records", rows.len(), view.len());
    rows
}

fn partials(view: &View<'_>) -> Partials {
    let mut partials = Partials::new();
    for rec in view.iter() {
        let (n, accs) = partials.entry(rec.state).or_default();
        *n += 1;
        for c in Competency::ALL {
            accs[c.index()].push(rec.score(c));
        }
    }
    partials
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Dataset, Record, RecordSource, STATE_COLUMN};

    fn rec(state: StateCode, math: f64, essay: f64) -> Record {
        Record::new(state)
            .with_score(Competency::Mathematics, math)
            .with_score(Competency::Essay, essay)
    }

    fn find<'a>(rows: &'a [MeanRow], group: &str, competency: &str) -> &'a MeanRow {
        rows.iter()
            .find(|r| r.group == group && r.competency == competency)
            .unwrap()
    }

    const COMPS: [Competency; 2] = [Competency::Mathematics, Competency::Essay];

    #[test]
    fn general_average_is_mean_of_means() {
        // Math has three valid scores, essay only one: a flat mean of all
        // scores would weigh math three times as much.
        let ds = Dataset::from_records(vec![
            rec(StateCode::SP, 600.0, 900.0),
            rec(StateCode::SP, 500.0, f64::NAN),
            rec(StateCode::SP, 700.0, -1.0),
        ]);
        let rows = mean_table(&ds.view_all(), &COMPS, Grouping::State);
        assert_eq!(rows.len(), 3);
        assert_eq!(find(&rows, "SP", "Matemática").mean, 600.0);
        assert_eq!(find(&rows, "SP", "Redação").mean, 900.0);
        assert_eq!(find(&rows, "SP", GENERAL_AVERAGE).mean, 750.0);
    }

    #[test]
    fn competency_without_scores_has_no_row() {
        let ds = Dataset::from_records(vec![
            Record::new(StateCode::AC).with_score(Competency::Mathematics, 480.0),
        ]);
        let rows = mean_table(&ds.view_all(), &COMPS, Grouping::State);
        assert!(rows.iter().all(|r| r.competency != "Redação"));
        assert_eq!(rows.len(), 2);
        assert_eq!(find(&rows, "AC", GENERAL_AVERAGE).mean, 480.0);
    }

    #[test]
    fn general_average_matches_emitted_rows() {
        let ds = Dataset::from_records(vec![
            rec(StateCode::GO, 450.0, 700.0),
            rec(StateCode::GO, 550.0, f64::NAN),
            Record::new(StateCode::MT).with_score(Competency::Mathematics, 610.0),
        ]);
        let rows = mean_table(&ds.view_all(), &COMPS, Grouping::State);
        for state in ["GO", "MT"] {
            let shown: Vec<f64> = rows
                .iter()
                .filter(|r| r.group == state && r.competency != GENERAL_AVERAGE)
                .map(|r| r.mean)
                .collect();
            let expected = shown.iter().sum::<f64>() / shown.len() as f64;
            assert_eq!(find(&rows, state, GENERAL_AVERAGE).mean, expected);
        }
        assert_eq!(find(&rows, "GO", GENERAL_AVERAGE).mean, 600.0);
    }

    #[test]
    fn states_come_out_in_code_order() {
        let ds = Dataset::from_records(vec![
            rec(StateCode::TO, 500.0, 500.0),
            rec(StateCode::AL, 500.0, 500.0),
        ]);
        let rows = mean_table(&ds.view_all(), &[Competency::Mathematics], Grouping::State);
        let groups: Vec<&str> = rows.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["AL", "AL", "TO", "TO"]);
    }

    #[test]
    fn folded_region_pools_its_states() {
        use StateCode::*;
        let ds = Dataset::from_records(vec![
            rec(PR, 400.0, 600.0),
            rec(RS, 500.0, 600.0),
            rec(RS, 600.0, 600.0),
            rec(SC, 700.0, 600.0),
            rec(SP, 800.0, 800.0),
        ]);
        let regions = RegionMap::brazil();
        let selection = FilterSelection::new([PR, RS, SC, SP]);
        let view = ds.select(&selection);
        let rows = mean_table(&view, &COMPS, Grouping::Folded(&regions, &selection));

        // (400 + 500 + 600 + 700) / 4, not the mean of the state means
        assert_eq!(find(&rows, "Sul", "Matemática").mean, 550.0);
        assert_eq!(find(&rows, "SP", "Matemática").mean, 800.0);
        let groups: Vec<&str> = rows.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["Sul", "Sul", "Sul", "SP", "SP", "SP"]);
    }

    #[test]
    fn merged_partials_equal_whole_group() {
        use StateCode::*;
        let records: Vec<Record> = (0..40)
            .map(|i| {
                let state = [ES, MG, RJ, SP][i % 4];
                rec(state, 300.0 + (i * 13 % 600) as f64, 400.0 + (i * 7 % 500) as f64)
            })
            .collect();
        let direct: MeanAccumulator =
            records.iter().map(|r| r.score(Competency::Mathematics)).collect();

        let ds = Dataset::from_records(records);
        let regions = RegionMap::brazil();
        let selection = FilterSelection::new([ES, MG, RJ, SP]);
        let grouping = Grouping::Folded(&regions, &selection);
        let rows = mean_table(&ds.select(&selection), &COMPS, grouping);
        let pooled = find(&rows, "Sudeste", "Matemática").mean;
        assert!((pooled - direct.mean().unwrap()).abs() < 1e-9);
    }

    #[test]
    fn empty_or_unavailable_inputs_yield_no_rows() {
        let ds = Dataset::from_records(vec![rec(StateCode::BA, 500.0, 500.0)]);
        let none = FilterSelection::default();
        assert!(mean_table(&ds.select(&none), &COMPS, Grouping::State).is_empty());
        assert!(mean_table(&ds.view_all(), &[], Grouping::State).is_empty());

        let partial = Dataset::new(ds.records().to_vec(), [STATE_COLUMN, "NU_NOTA_MT"]);
        assert!(mean_table(&partial.view_all(), &COMPS, Grouping::State).is_empty());
    }
}
