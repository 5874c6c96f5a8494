use serde::{Deserialize, Serialize};

use crate::data::model::{Competency, RawValue, Record, View};
use crate::labels::Variable;
use crate::stats::correlation;

/// Record filters of the score scatter plot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterFilter {
    /// Raw `TP_SEXO` value to keep.
    pub sex: Option<String>,
    /// Raw `TP_ESCOLA` code to keep.
    pub school_type: Option<i64>,
    /// Drop rows where either score is exactly zero. Absence on an exam day
    /// often shows up as a zero score and would drag the correlation.
    pub exclude_zeros: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

/// Filtered records of a scatter plot plus how many zero rows were dropped.
#[derive(Debug, Clone)]
pub struct ScatterSubset<'a> {
    pub x: Competency,
    pub y: Competency,
    pub records: View<'a>,
    /// Rows removed by `exclude_zeros`.
    pub removed: usize,
}

impl ScatterSubset<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn points(&self) -> Vec<ScatterPoint> {
        self.records
            .iter()
            .filter_map(|rec| {
                Some(ScatterPoint {
                    x: rec.score(self.x)?,
                    y: rec.score(self.y)?,
                })
            })
            .collect()
    }

    /// Pearson correlation of the kept points; `0.0` when undefined.
    pub fn correlation(&self) -> f64 {
        correlation(self.points().into_iter().map(|p| (p.x, p.y)))
    }
}

/// Keep records with both scores that pass the sex and school-type filters,
/// optionally dropping zero scores.
///
/// A filter on a column the source lacks, or a missing score column, yields
/// an empty subset.
pub fn scatter_filter<'a>(
    view: &View<'a>,
    x: Competency,
    y: Competency,
    filter: &ScatterFilter,
) -> ScatterSubset<'a> {
    let empty = |view: &View<'a>| ScatterSubset {
        x,
        y,
        records: view.emptied(),
        removed: 0,
    };

    for c in [x, y] {
        if !view.has_competency(c) {
            log::warn!("scatter unavailable: column {} missing", c.column());
            return empty(view);
        }
    }
    let wanted = [
        (Variable::Sex, filter.sex.clone().map(RawValue::Text)),
        (Variable::SchoolType, filter.school_type.map(RawValue::Code)),
    ];
    for (var, value) in &wanted {
        if value.is_some() && !view.has_variable(*var) {
            log::warn!("scatter filter unavailable: column {} missing", var.column());
            return empty(view);
        }
    }

    let matches = |rec: &Record| {
        wanted.iter().all(|(var, value)| match value {
            Some(value) => rec.attribute(*var) == value,
            None => true,
        })
    };
    let candidates =
        view.retain(|rec| matches(rec) && rec.score(x).is_some() && rec.score(y).is_some());
    if !filter.exclude_zeros {
        return ScatterSubset {
            x,
            y,
            records: candidates,
            removed: 0,
        };
    }

    let kept = candidates.retain(|rec| rec.score(x) != Some(0.0) && rec.score(y) != Some(0.0));
    let removed = candidates.len() - kept.len();
    log::debug!("scatter: {} rows kept, {} zero rows removed", kept.len(), removed);
    ScatterSubset {
        x,
        y,
        records: kept,
        removed,
    }
}
