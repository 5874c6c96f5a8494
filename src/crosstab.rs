//! Joint frequencies of two categorical variables.
//!
//! One [`CrossTab`] feeds three chart shapes: the pivot itself (heatmap), its
//! row-normalized percentages (stacked bars) and its unpivoted non-zero cells
//! (Sankey flows).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::model::View;
use crate::labels::Variable;

/// Rectangular count pivot with row percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossTab {
    /// Labels of the row variable, in axis order.
    pub rows: Vec<String>,
    /// Labels of the column variable, in axis order.
    pub columns: Vec<String>,
    pub counts: Vec<Vec<u64>>,
    /// `counts[i][j] / sum(counts[i]) * 100`; all zero for an empty row.
    pub percents: Vec<Vec<f64>>,
}

/// One pivot cell in tidy form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabCell {
    pub x: String,
    pub y: String,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SankeyEdge {
    pub source: usize,
    pub target: usize,
    pub value: u64,
}

/// Node labels plus weighted edges between node indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SankeyFlow {
    pub nodes: Vec<String>,
    pub edges: Vec<SankeyEdge>,
}

/// Count records by `(label(var_x), label(var_y))`.
///
/// Both axes follow the variables' code order. A missing column yields an
/// empty table.
pub fn crosstab(view: &View<'_>, var_x: Variable, var_y: Variable) -> CrossTab {
    for var in [var_x, var_y] {
        if !view.has_variable(var) {
            log::warn!("crosstab unavailable: column {} missing", var.column());
            return CrossTab::default();
        }
    }

    let mut pairs: BTreeMap<(String, String), u64> = BTreeMap::new();
    for rec in view.iter() {
        let x = var_x.label(rec.attribute(var_x)).to_string();
        let y = var_y.label(rec.attribute(var_y)).to_string();
        *pairs.entry((x, y)).or_default() += 1;
    }

    let rows = axis(var_x, pairs.keys().map(|(x, _)| x));
    let columns = axis(var_y, pairs.keys().map(|(_, y)| y));
    let counts = rows
        .iter()
        .map(|x| {
            columns
                .iter()
                .map(|y| pairs.get(&(x.clone(), y.clone())).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    CrossTab::from_counts(rows, columns, counts)
}

fn axis<'a>(variable: Variable, labels: impl Iterator<Item = &'a String>) -> Vec<String> {
    let distinct: BTreeSet<&String> = labels.collect();
    let mut axis: Vec<String> = distinct.into_iter().cloned().collect();
    axis.sort_by_cached_key(|label| variable.axis_key(label));
    axis
}

impl CrossTab {
    /// Build from a finished count pivot, deriving the percentages.
    pub fn from_counts(rows: Vec<String>, columns: Vec<String>, counts: Vec<Vec<u64>>) -> Self {
        let percents = counts
            .iter()
            .map(|row| {
                let total: u64 = row.iter().sum();
                row.iter()
                    .map(|&c| if total == 0 { 0.0 } else { c as f64 / total as f64 * 100.0 })
                    .collect()
            })
            .collect();
        CrossTab {
            rows,
            columns,
            counts,
            percents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn row_total(&self, row: usize) -> u64 {
        self.counts.get(row).map_or(0, |r| r.iter().sum())
    }

    /// Every cell, row-major, zeros included.
    pub fn cells(&self) -> Vec<CrossTabCell> {
        let mut cells = Vec::with_capacity(self.rows.len() * self.columns.len());
        for (i, x) in self.rows.iter().enumerate() {
            for (j, y) in self.columns.iter().enumerate() {
                cells.push(CrossTabCell {
                    x: x.clone(),
                    y: y.clone(),
                    count: self.counts[i][j],
                    percent: self.percents[i][j],
                });
            }
        }
        cells
    }

    /// Unpivot the non-zero cells into a flow graph.
    ///
    /// Row labels become nodes in first-seen order, then column labels in
    /// first-seen order; targets are offset by the number of row nodes.
    pub fn sankey(&self) -> SankeyFlow {
        let mut sources: Vec<&str> = Vec::new();
        let mut targets: Vec<&str> = Vec::new();
        let mut links = Vec::new();

        for (i, x) in self.rows.iter().enumerate() {
            for (j, y) in self.columns.iter().enumerate() {
                let value = self.counts[i][j];
                if value == 0 {
                    continue;
                }
                let s = position_or_push(&mut sources, x);
                let t = position_or_push(&mut targets, y);
                links.push((s, t, value));
            }
        }

        let offset = sources.len();
        SankeyFlow {
            nodes: sources.iter().chain(targets.iter()).map(|s| s.to_string()).collect(),
            edges: links
                .into_iter()
                .map(|(source, t, value)| SankeyEdge {
                    source,
                    target: offset + t,
                    value,
                })
                .collect(),
        }
    }
}

fn position_or_push<'a>(nodes: &mut Vec<&'a str>, label: &'a str) -> usize {
    match nodes.iter().position(|n| *n == label) {
        Some(pos) => pos,
        None => {
            nodes.push(label);
            nodes.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Dataset, Record, RecordSource, StateCode, STATE_COLUMN};
    use crate::labels::UNLABELED;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn row_percentages() {
        let tab = CrossTab::from_counts(
            strings(&["X1", "X2"]),
            strings(&["Y1", "Y2"]),
            vec![vec![30, 70], vec![0, 0]],
        );
        assert_eq!(tab.percents[0], vec![30.0, 70.0]);
        assert_eq!(tab.percents[1], vec![0.0, 0.0]);
        assert_eq!(tab.row_total(0), 100);
    }

    fn sample() -> Dataset {
        let mut records = Vec::new();
        for (sex, school, n) in [("F", 2, 3), ("F", 3, 1), ("M", 2, 2), ("M", 9, 1)] {
            for _ in 0..n {
                records.push(
                    Record::new(StateCode::PE)
                        .with_attribute(Variable::Sex, sex)
                        .with_attribute(Variable::SchoolType, school as i64),
                );
            }
        }
        Dataset::from_records(records)
    }

    #[test]
    fn pivot_from_records() {
        let ds = sample();
        let tab = crosstab(&ds.view_all(), Variable::Sex, Variable::SchoolType);
        assert_eq!(tab.rows, strings(&["F", "M"]));
        assert_eq!(tab.columns, strings(&["Pública", "Privada", UNLABELED]));
        assert_eq!(tab.counts, vec![vec![3, 1, 0], vec![2, 0, 1]]);
        assert_eq!(tab.percents[0], vec![75.0, 25.0, 0.0]);
        let total: f64 = tab.percents[1].iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(tab.cells().len(), 6);
    }

    #[test]
    fn sankey_offsets_targets() {
        let ds = sample();
        let flow = crosstab(&ds.view_all(), Variable::Sex, Variable::SchoolType).sankey();
        assert_eq!(flow.nodes, strings(&["F", "M", "Pública", "Privada", UNLABELED]));
        assert_eq!(
            flow.edges,
            vec![
                SankeyEdge { source: 0, target: 2, value: 3 },
                SankeyEdge { source: 0, target: 3, value: 1 },
                SankeyEdge { source: 1, target: 2, value: 2 },
                SankeyEdge { source: 1, target: 4, value: 1 },
            ]
        );
    }

    #[test]
    fn missing_column_or_empty_view_is_empty() {
        let ds = Dataset::new(sample().records().to_vec(), [STATE_COLUMN, "TP_SEXO"]);
        assert!(crosstab(&ds.view_all(), Variable::Sex, Variable::SchoolType).is_empty());

        let ds = sample();
        let none = ds.view_all().emptied();
        let tab = crosstab(&none, Variable::Sex, Variable::SchoolType);
        assert!(tab.is_empty());
        assert!(tab.sankey().nodes.is_empty());
    }
}
