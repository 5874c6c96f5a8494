use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::{Competency, ExamDay, StateCode, View};

/// Component label of the "missed at least one day" row.
pub const ANY_COMPONENT: &str = "Qualquer prova";

/// `(state, component, percent absent)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsenceRow {
    pub state: String,
    pub component: String,
    pub percent: f64,
}

#[derive(Debug, Default)]
struct Tally {
    candidates: u64,
    absent: [u64; 2],
    absent_any: u64,
}

impl Tally {
    fn percent(&self, absent: u64) -> f64 {
        if self.candidates == 0 {
            0.0
        } else {
            absent as f64 / self.candidates as f64 * 100.0
        }
    }
}

/// Percentage of absent candidates per state.
///
/// For each state (code order) the rows are: the four objective components,
/// then each exam day, then [`ANY_COMPONENT`]. Attendance is recorded per
/// day, so the two components of a day always carry the same percentage.
/// Needs the presence columns of both days; otherwise yields no rows.
pub fn absence_table(view: &View<'_>) -> Vec<AbsenceRow> {
    if view.is_empty() {
        return Vec::new();
    }
    if let Some(day) = ExamDay::ALL.into_iter().find(|d| !view.has_presence(*d)) {
        log::warn!("absence table unavailable: no presence column for {}", day.label());
        return Vec::new();
    }

    let mut tallies: BTreeMap<StateCode, Tally> = BTreeMap::new();
    for rec in view.iter() {
        let tally = tallies.entry(rec.state).or_default();
        tally.candidates += 1;
        let mut missed_any = false;
        for day in ExamDay::ALL {
            if rec.is_absent(day) {
                tally.absent[day.index()] += 1;
                missed_any = true;
            }
        }
        if missed_any {
            tally.absent_any += 1;
        }
    }

    let mut rows = Vec::with_capacity(tallies.len() * 7);
    for (state, tally) in &tallies {
        let mut push = |component: &str, absent: u64| {
            rows.push(AbsenceRow {
                state: state.to_string(),
                component: component.to_string(),
                percent: tally.percent(absent),
            })
        };
        for c in Competency::OBJECTIVE {
            push(c.label(), tally.absent[c.exam_day().index()]);
        }
        for day in ExamDay::ALL {
            push(day.label(), tally.absent[day.index()]);
        }
        push(ANY_COMPONENT, tally.absent_any);
    }
    rows
}
