use std::path::Path;

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use serde::Serialize;

use enem_panel::config::ReportConfig;
use enem_panel::crosstab::{CrossTab, SankeyFlow};
use enem_panel::data::batch::{from_record_batch, to_record_batch};
use enem_panel::optimize::{memory_footprint, optimize};
use enem_panel::pipeline::{AbsenceRow, CategoryOptions, CategoryTable, MeanRow, ScatterPoint};
use enem_panel::sample::synthetic_dataset;
use enem_panel::stats::{Bin, Statistic, Summary};
use enem_panel::Panel;

/// Rows shown in the debug preview of the optimized batch.
const PREVIEW_ROWS: usize = 5;

#[derive(Serialize)]
struct Report {
    selection: Vec<String>,
    memory: MemoryReport,
    state_means: Vec<MeanRow>,
    folded_means: Vec<MeanRow>,
    categories: CategoryTable,
    absence: Vec<AbsenceRow>,
    crosstab: CrossTab,
    sankey: SankeyFlow,
    scatter: ScatterReport,
    summary: Summary,
    statistics: Vec<StatisticValue>,
    histogram: Vec<Bin>,
}

#[derive(Serialize)]
struct MemoryReport {
    before: usize,
    after: usize,
}

#[derive(Serialize)]
struct StatisticValue {
    statistic: Statistic,
    value: f64,
}

#[derive(Serialize)]
struct ScatterReport {
    points: Vec<ScatterPoint>,
    removed: usize,
    correlation: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ReportConfig::load(Path::new(&path))?,
        None => ReportConfig::default(),
    };
    log::info!("generating {} candidates (seed {})", config.rows, config.seed);

    let batch = to_record_batch(&synthetic_dataset(config.rows, config.seed))?;
    let optimized = optimize(&batch, &config.optimizer).context("optimizing record batch")?;
    let memory = MemoryReport {
        before: memory_footprint(&batch),
        after: memory_footprint(&optimized),
    };
    log::info!("record batch: {} -> {} bytes", memory.before, memory.after);
    if log::log_enabled!(log::Level::Debug) {
        let preview = optimized.slice(0, PREVIEW_ROWS.min(optimized.num_rows()));
        log::debug!("optimized batch:\n{}", pretty_format_batches(&[preview])?);
    }

    let panel = Panel::new(from_record_batch(&optimized)?);
    let selection = panel
        .selection(&config.states)
        .context("applying state selection")?;

    let competencies = &config.competencies;
    let crosstab = panel.crosstab(&selection, config.crosstab_x, config.crosstab_y);
    let scatter = panel.scatter(&selection, config.scatter_x, config.scatter_y, &config.scatter);
    let report = Report {
        selection: panel.folded_labels(&selection),
        memory,
        state_means: panel.state_means(&selection, competencies),
        folded_means: panel.folded_means(&selection, competencies),
        categories: panel.category_means(
            &selection,
            config.category,
            competencies,
            CategoryOptions {
                sort_by: config.sort_by,
                only: None,
            },
        ),
        absence: panel.absence(&selection),
        sankey: crosstab.sankey(),
        crosstab,
        scatter: ScatterReport {
            points: scatter.points(),
            removed: scatter.removed,
            correlation: scatter.correlation(),
        },
        summary: panel.score_summary(&selection, config.summary_of),
        statistics: config
            .statistics
            .iter()
            .map(|&statistic| StatisticValue {
                statistic,
                value: panel.score_statistic(&selection, config.summary_of, statistic),
            })
            .collect(),
        histogram: panel.score_histogram(&selection, config.summary_of, config.histogram_bins),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
