use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::model::{Competency, View};
use crate::labels::Variable;
use crate::stats::MeanAccumulator;

/// Optional transforms of a comparative-by-category table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOptions {
    /// Order the category axis by this competency's mean, highest first.
    pub sort_by: Option<Competency>,
    /// Keep only this competency's rows (applied after sorting).
    pub only: Option<Competency>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMeanRow {
    pub category: String,
    pub competency: String,
    pub mean: f64,
}

/// Rows plus the order the renderer must use for the category axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTable {
    pub axis: Vec<String>,
    pub rows: Vec<CategoryMeanRow>,
}

impl CategoryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Mean of each competency within each category of `variable`.
pub fn category_means(
    view: &View<'_>,
    variable: Variable,
    competencies: &[Competency],
    options: CategoryOptions,
) -> CategoryTable {
    if view.is_empty() || competencies.is_empty() {
        return CategoryTable::default();
    }
    if !view.has_variable(variable) {
        log::warn!("category means unavailable: column {} missing", variable.column());
        return CategoryTable::default();
    }
    if let Some(missing) = competencies.iter().find(|c| !view.has_competency(**c)) {
        log::warn!("category means unavailable: column {} missing", missing.column());
        return CategoryTable::default();
    }

    let mut groups: BTreeMap<String, [MeanAccumulator; 5]> = BTreeMap::new();
    for rec in view.iter() {
        let label = variable.label(rec.attribute(variable)).to_string();
        let accs = groups.entry(label).or_default();
        for c in competencies {
            accs[c.index()].push(rec.score(*c));
        }
    }

    let mean_of = |category: &str, competency: Competency| -> f64 {
        groups
            .get(category)
            .and_then(|accs| accs[competency.index()].mean())
            .unwrap_or(0.0)
    };

    let mut axis: Vec<String> = groups.keys().cloned().collect();
    axis.sort_by_cached_key(|label| variable.axis_key(label));
    if let Some(key) = options.sort_by {
        // Stable: ties keep code order.
        axis.sort_by(|a, b| mean_of(b, key).total_cmp(&mean_of(a, key)));
    }

    let mut rows = Vec::with_capacity(axis.len() * competencies.len());
    for category in &axis {
        for &competency in competencies {
            if options.only.is_some_and(|only| only != competency) {
                continue;
            }
            rows.push(CategoryMeanRow {
                category: category.clone(),
                competency: competency.label().to_string(),
                mean: mean_of(category, competency),
            });
        }
    }

    CategoryTable { axis, rows }
}
