use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::Competency;
use crate::labels::Variable;
use crate::pipeline::scatter::ScatterFilter;
use crate::stats::Statistic;

// ---------------------------------------------------------------------------
// Type optimizer settings
// ---------------------------------------------------------------------------

/// Knobs of [`optimize`](crate::optimize::optimize).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Float64 columns whose name starts with this are narrowed to f32.
    pub score_prefix: String,
    /// String columns with distinct/rows below this become dictionaries.
    pub categorical_ratio: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            score_prefix: "NU_NOTA_".to_string(),
            categorical_ratio: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Report settings (binary)
// ---------------------------------------------------------------------------

/// What the report binary generates and aggregates.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "rows": 20000, "states": ["Sudeste", "BA"], "category": "income" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Synthetic candidates to generate.
    pub rows: usize,
    pub seed: u64,
    /// Region names and/or state codes.
    pub states: Vec<String>,
    pub competencies: Vec<Competency>,
    pub category: Variable,
    pub sort_by: Option<Competency>,
    pub crosstab_x: Variable,
    pub crosstab_y: Variable,
    pub scatter_x: Competency,
    pub scatter_y: Competency,
    pub scatter: ScatterFilter,
    pub summary_of: Competency,
    /// Headline statistics of `summary_of`, e.g. `"median"` or `{ "percentile": 90 }`.
    pub statistics: Vec<Statistic>,
    pub histogram_bins: usize,
    pub optimizer: OptimizerConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rows: 10_000,
            seed: 42,
            states: vec!["Nordeste".to_string(), "SP".to_string()],
            competencies: Competency::ALL.to_vec(),
            category: Variable::Income,
            sort_by: Some(Competency::Mathematics),
            crosstab_x: Variable::MotherEducation,
            crosstab_y: Variable::SchoolType,
            scatter_x: Competency::Mathematics,
            scatter_y: Competency::NaturalSciences,
            scatter: ScatterFilter {
                exclude_zeros: true,
                ..ScatterFilter::default()
            },
            summary_of: Competency::Essay,
            statistics: vec![Statistic::Median, Statistic::StdDev, Statistic::Percentile(90.0)],
            histogram_bins: 20,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).context("parsing config JSON")
    }
}
