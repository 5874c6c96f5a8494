use std::collections::BTreeSet;

use crate::error::PanelError;
use crate::regions::RegionMap;

use super::model::{Record, StateCode};

// ---------------------------------------------------------------------------
// Filter selection: which states the consumer picked
// ---------------------------------------------------------------------------

/// The set of selected states passed into every aggregation call.
///
/// An empty selection means "nothing selected" and yields empty results; it
/// never means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    states: BTreeSet<StateCode>,
}

impl FilterSelection {
    pub fn new(states: impl IntoIterator<Item = StateCode>) -> Self {
        FilterSelection {
            states: states.into_iter().collect(),
        }
    }

    /// Every state selected.
    pub fn all() -> Self {
        FilterSelection::new(StateCode::ALL)
    }

    /// Build a selection from UI picks: region names and/or state codes.
    pub fn from_labels<S: AsRef<str>>(
        labels: &[S],
        regions: &RegionMap,
    ) -> Result<Self, PanelError> {
        regions.expand(labels).map(|states| FilterSelection { states })
    }

    pub fn states(&self) -> &BTreeSet<StateCode> {
        &self.states
    }

    pub fn contains(&self, state: StateCode) -> bool {
        self.states.contains(&state)
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn is_all(&self) -> bool {
        self.states.len() == StateCode::ALL.len()
    }

    /// Toggle a single state in or out of the selection.
    pub fn toggle(&mut self, state: StateCode) {
        if !self.states.remove(&state) {
            self.states.insert(state);
        }
    }
}

/// Return indices of records whose state is selected.
///
/// * Empty selection → no records
/// * Every state selected → every record, without per-row checks
/// * Otherwise → records whose state is in the set
pub fn filtered_indices(records: &[Record], selection: &FilterSelection) -> Vec<usize> {
    if selection.is_empty() {
        return Vec::new();
    }
    if selection.is_all() {
        return (0..records.len()).collect();
    }
    records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.contains(rec.state))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        [StateCode::SP, StateCode::RJ, StateCode::SP, StateCode::BA]
            .into_iter()
            .map(Record::new)
            .collect()
    }

    #[test]
    fn empty_selection_selects_nothing() {
        assert!(filtered_indices(&records(), &FilterSelection::default()).is_empty());
    }

    #[test]
    fn all_selection_selects_everything() {
        assert_eq!(filtered_indices(&records(), &FilterSelection::all()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn partial_selection_keeps_order() {
        let sel = FilterSelection::new([StateCode::SP, StateCode::BA]);
        assert_eq!(filtered_indices(&records(), &sel), vec![0, 2, 3]);
    }

    #[test]
    fn toggle_flips_membership() {
        let mut sel = FilterSelection::default();
        sel.toggle(StateCode::PE);
        assert!(sel.contains(StateCode::PE));
        sel.toggle(StateCode::PE);
        assert!(sel.is_empty());
    }

    #[test]
    fn labels_expand_regions() {
        let sel = FilterSelection::from_labels(&["Sul", "sp"], &RegionMap::brazil()).unwrap();
        let expected: BTreeSet<_> =
            [StateCode::PR, StateCode::RS, StateCode::SC, StateCode::SP].into();
        assert_eq!(sel.states(), &expected);
        assert!(FilterSelection::from_labels(&["Atlantis"], &RegionMap::brazil()).is_err());
    }
}
