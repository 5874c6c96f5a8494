use crate::crosstab::{crosstab, CrossTab};
use crate::data::filter::FilterSelection;
use crate::data::model::{Competency, Dataset, RecordSource, View};
use crate::error::PanelError;
use crate::labels::Variable;
use crate::pipeline::{
    absence_table, category_means, mean_table, scatter_filter, score_histogram, score_statistic,
    score_summary, AbsenceRow, CategoryOptions, CategoryTable, Grouping, MeanRow, ScatterFilter,
    ScatterSubset,
};
use crate::regions::RegionMap;
use crate::stats::{Bin, Statistic, Summary};

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// A dataset and its region map behind one query surface.
///
/// The panel keeps no selection of its own: every query takes the caller's
/// [`FilterSelection`], so the same panel can serve any number of
/// independent selections.
pub struct Panel {
    dataset: Dataset,
    regions: RegionMap,
}

impl Panel {
    /// Use the Brazilian macro-regions.
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            regions: RegionMap::brazil(),
        }
    }

    pub fn with_regions(mut self, regions: RegionMap) -> Self {
        self.regions = regions;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    /// Selection from UI picks: region names and/or state codes.
    pub fn selection<S: AsRef<str>>(&self, labels: &[S]) -> Result<FilterSelection, PanelError> {
        FilterSelection::from_labels(labels, &self.regions)
    }

    /// Selection labels with complete regions collapsed.
    pub fn folded_labels(&self, selection: &FilterSelection) -> Vec<String> {
        self.regions.fold(selection.states())
    }

    /// Borrowed view of the selected records.
    pub fn view(&self, selection: &FilterSelection) -> View<'_> {
        let view = self.dataset.select(selection);
        log::debug!(
            "selection {:?}: {} of {} records",
            self.folded_labels(selection),
            view.len(),
            self.dataset.len()
        );
        view
    }

    // -- chart queries --

    /// Mean per state.
    pub fn state_means(
        &self,
        selection: &FilterSelection,
        competencies: &[Competency],
    ) -> Vec<MeanRow> {
        mean_table(&self.view(selection), competencies, Grouping::State)
    }

    /// Mean per folded selection label (complete regions pooled).
    pub fn folded_means(
        &self,
        selection: &FilterSelection,
        competencies: &[Competency],
    ) -> Vec<MeanRow> {
        mean_table(
            &self.view(selection),
            competencies,
            Grouping::Folded(&self.regions, selection),
        )
    }

    pub fn category_means(
        &self,
        selection: &FilterSelection,
        variable: Variable,
        competencies: &[Competency],
        options: CategoryOptions,
    ) -> CategoryTable {
        category_means(&self.view(selection), variable, competencies, options)
    }

    pub fn absence(&self, selection: &FilterSelection) -> Vec<AbsenceRow> {
        absence_table(&self.view(selection))
    }

    pub fn crosstab(
        &self,
        selection: &FilterSelection,
        var_x: Variable,
        var_y: Variable,
    ) -> CrossTab {
        crosstab(&self.view(selection), var_x, var_y)
    }

    pub fn scatter(
        &self,
        selection: &FilterSelection,
        x: Competency,
        y: Competency,
        filter: &ScatterFilter,
    ) -> ScatterSubset<'_> {
        scatter_filter(&self.view(selection), x, y, filter)
    }

    pub fn score_summary(&self, selection: &FilterSelection, competency: Competency) -> Summary {
        score_summary(&self.view(selection), competency)
    }

    pub fn score_statistic(
        &self,
        selection: &FilterSelection,
        competency: Competency,
        statistic: Statistic,
    ) -> f64 {
        score_statistic(&self.view(selection), competency, statistic)
    }

    pub fn score_histogram(
        &self,
        selection: &FilterSelection,
        competency: Competency,
        bins: usize,
    ) -> Vec<Bin> {
        score_histogram(&self.view(selection), competency, bins)
    }
}
