//! Macro-regions and the folding of a state selection into display labels.

use std::collections::BTreeSet;
use std::fmt;

use crate::data::model::StateCode;
use crate::error::PanelError;

/// Reserved pseudo-region holding every state. Never emitted by folding.
pub const ALL_STATES: &str = "Brasil";

/// A named group of states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    pub states: BTreeSet<StateCode>,
}

/// Regions in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionMap {
    regions: Vec<Region>,
}

impl RegionMap {
    pub fn new() -> Self {
        RegionMap::default()
    }

    /// Add a region, replacing the states of an existing one with the same name.
    pub fn with_region(mut self, name: &str, states: impl IntoIterator<Item = StateCode>) -> Self {
        let states: BTreeSet<StateCode> = states.into_iter().collect();
        match self.regions.iter_mut().find(|r| r.name == name) {
            Some(region) => region.states = states,
            None => self.regions.push(Region {
                name: name.to_string(),
                states,
            }),
        }
        self
    }

    /// The five Brazilian macro-regions plus [`ALL_STATES`].
    pub fn brazil() -> Self {
        use StateCode::*;
        RegionMap::new()
            .with_region(ALL_STATES, StateCode::ALL)
            .with_region("Norte", [AC, AP, AM, PA, RO, RR, TO])
            .with_region("Nordeste", [AL, BA, CE, MA, PB, PE, PI, RN, SE])
            .with_region("Centro-Oeste", [DF, GO, MT, MS])
            .with_region("Sudeste", [ES, MG, RJ, SP])
            .with_region("Sul", [PR, RS, SC])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn get(&self, name: &str) -> Option<&BTreeSet<StateCode>> {
        self.regions.iter().find(|r| r.name == name).map(|r| &r.states)
    }

    /// Collapse complete regions of `selected` into their names.
    pub fn fold(&self, selected: &BTreeSet<StateCode>) -> Vec<String> {
        fold(selected, self.regions.iter().map(|r| (r.name.as_str(), &r.states)))
    }

    /// States behind a display label: a region name or a single state code.
    pub fn members(&self, label: &str) -> Option<BTreeSet<StateCode>> {
        if let Some(states) = self.get(label) {
            return Some(states.clone());
        }
        label.parse::<StateCode>().ok().map(|s| BTreeSet::from([s]))
    }

    /// Union of the states behind every label.
    pub fn expand<S: AsRef<str>>(&self, labels: &[S]) -> Result<BTreeSet<StateCode>, PanelError> {
        let mut states = BTreeSet::new();
        for label in labels {
            let label = label.as_ref();
            let members = self
                .members(label)
                .ok_or_else(|| PanelError::UnknownLabel(label.to_string()))?;
            states.extend(members);
        }
        Ok(states)
    }
}

/// Fold a state selection against `regions`, in region iteration order.
///
/// Each region (except [`ALL_STATES`]) whose states are all still selected
/// is emitted once and its states are consumed. Leftover states follow,
/// sorted by code.
pub fn fold<'r, S, I>(selected: &BTreeSet<S>, regions: I) -> Vec<String>
where
    S: Ord + Clone + fmt::Display + 'r,
    I: IntoIterator<Item = (&'r str, &'r BTreeSet<S>)>,
{
    let mut remaining = selected.clone();
    let mut labels = Vec::new();
    if remaining.is_empty() {
        return labels;
    }

    for (name, states) in regions {
        if name == ALL_STATES || states.is_empty() {
            continue;
        }
        if states.is_subset(&remaining) {
            labels.push(name.to_string());
            remaining.retain(|s| !states.contains(s));
        }
    }

    labels.extend(remaining.iter().map(|s| s.to_string()));
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(states: &[StateCode]) -> BTreeSet<StateCode> {
        states.iter().copied().collect()
    }

    #[test]
    fn empty_selection_folds_to_nothing() {
        assert!(RegionMap::brazil().fold(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn full_region_folds_to_its_name() {
        use StateCode::*;
        let regions = RegionMap::brazil();
        assert_eq!(regions.fold(&set(&[PR, RS, SC])), vec!["Sul"]);
        assert_eq!(regions.fold(&set(&[PR, RS, SC, BA])), vec!["Sul", "BA"]);
    }

    #[test]
    fn leftovers_are_sorted_by_code() {
        use StateCode::*;
        let regions = RegionMap::brazil();
        assert_eq!(regions.fold(&set(&[TO, AC, SP])), vec!["AC", "SP", "TO"]);
    }

    #[test]
    fn everything_folds_to_regions_not_pseudo_region() {
        let all: BTreeSet<_> = StateCode::ALL.into_iter().collect();
        assert_eq!(
            RegionMap::brazil().fold(&all),
            vec!["Norte", "Nordeste", "Centro-Oeste", "Sudeste", "Sul"]
        );
    }

    #[test]
    fn synthetic_string_regions() {
        let r: BTreeSet<&str> = ["A", "B", "C", "D"].into();
        let selected: BTreeSet<&str> = ["A", "B", "C", "D"].into();
        assert_eq!(fold(&selected, [("R", &r)]), vec!["R"]);

        let selected: BTreeSet<&str> = ["A", "B", "C", "D", "E"].into();
        assert_eq!(fold(&selected, [("R", &r)]), vec!["R", "E"]);

        let selected: BTreeSet<&str> = ["A", "B"].into();
        assert_eq!(fold(&selected, [("R", &r)]), vec!["A", "B"]);
    }

    #[test]
    fn expand_inverts_fold() {
        use StateCode::*;
        let regions = RegionMap::brazil();
        let selected = set(&[ES, MG, RJ, SP, AM, DF]);
        let labels = regions.fold(&selected);
        assert_eq!(regions.expand(&labels).unwrap(), selected);
    }

    #[test]
    fn with_region_replaces_existing() {
        use StateCode::*;
        let regions = RegionMap::new()
            .with_region("X", [AC])
            .with_region("X", [AL, AM]);
        assert_eq!(regions.iter().count(), 1);
        assert_eq!(regions.get("X"), Some(&set(&[AL, AM])));
    }
}
