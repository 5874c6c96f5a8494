use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PanelError;
use crate::labels::Variable;

use super::filter::{filtered_indices, FilterSelection};

/// Column holding the state where the candidate sat the exam.
pub const STATE_COLUMN: &str = "SG_UF_PROVA";

/// Inclusive domain of a valid competency score.
pub const SCORE_RANGE: (f64, f64) = (0.0, 1000.0);

// ---------------------------------------------------------------------------
// StateCode – the closed set of 27 federative units
// ---------------------------------------------------------------------------

/// Two-letter code of a Brazilian federative unit.
///
/// Declaration order is alphabetical, so the derived `Ord` sorts by code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[rustfmt::skip]
pub enum StateCode {
    AC, AL, AM, AP, BA, CE, DF, ES, GO, MA, MG, MS, MT, PA,
    PB, PE, PI, PR, RJ, RN, RO, RR, RS, SC, SE, SP, TO,
}

impl StateCode {
    #[rustfmt::skip]
    pub const ALL: [StateCode; 27] = {
        use StateCode::*;
        [
            AC, AL, AM, AP, BA, CE, DF, ES, GO, MA, MG, MS, MT, PA,
            PB, PE, PI, PR, RJ, RN, RO, RR, RS, SC, SE, SP, TO,
        ]
    };

    #[rustfmt::skip]
    pub fn as_str(self) -> &'static str {
        use StateCode::*;
        match self {
            AC => "AC", AL => "AL", AM => "AM", AP => "AP", BA => "BA",
            CE => "CE", DF => "DF", ES => "ES", GO => "GO", MA => "MA",
            MG => "MG", MS => "MS", MT => "MT", PA => "PA", PB => "PB",
            PE => "PE", PI => "PI", PR => "PR", RJ => "RJ", RN => "RN",
            RO => "RO", RR => "RR", RS => "RS", SC => "SC", SE => "SE",
            SP => "SP", TO => "TO",
        }
    }
}

impl FromStr for StateCode {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        StateCode::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| PanelError::UnknownState(s.to_string()))
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Competency / exam day / presence
// ---------------------------------------------------------------------------

/// One of the five scored exam components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competency {
    NaturalSciences,
    HumanSciences,
    Languages,
    Mathematics,
    Essay,
}

impl Competency {
    pub const ALL: [Competency; 5] = [
        Competency::NaturalSciences,
        Competency::HumanSciences,
        Competency::Languages,
        Competency::Mathematics,
        Competency::Essay,
    ];

    /// The four multiple-choice components, each with its own presence column.
    pub const OBJECTIVE: [Competency; 4] = [
        Competency::NaturalSciences,
        Competency::HumanSciences,
        Competency::Languages,
        Competency::Mathematics,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Score column name in the microdata.
    pub fn column(self) -> &'static str {
        match self {
            Competency::NaturalSciences => "NU_NOTA_CN",
            Competency::HumanSciences => "NU_NOTA_CH",
            Competency::Languages => "NU_NOTA_LC",
            Competency::Mathematics => "NU_NOTA_MT",
            Competency::Essay => "NU_NOTA_REDACAO",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Competency::NaturalSciences => "Ciências da Natureza",
            Competency::HumanSciences => "Ciências Humanas",
            Competency::Languages => "Linguagens e Códigos",
            Competency::Mathematics => "Matemática",
            Competency::Essay => "Redação",
        }
    }

    /// Presence column; the essay has none of its own.
    pub fn presence_column(self) -> Option<&'static str> {
        match self {
            Competency::NaturalSciences => Some("TP_PRESENCA_CN"),
            Competency::HumanSciences => Some("TP_PRESENCA_CH"),
            Competency::Languages => Some("TP_PRESENCA_LC"),
            Competency::Mathematics => Some("TP_PRESENCA_MT"),
            Competency::Essay => None,
        }
    }

    pub fn exam_day(self) -> ExamDay {
        match self {
            Competency::HumanSciences | Competency::Languages | Competency::Essay => ExamDay::One,
            Competency::NaturalSciences | Competency::Mathematics => ExamDay::Two,
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Competency::ALL.into_iter().find(|c| c.column() == name)
    }
}

/// Exam days. Attendance is recorded per day, not per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExamDay {
    One,
    Two,
}

impl ExamDay {
    pub const ALL: [ExamDay; 2] = [ExamDay::One, ExamDay::Two];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ExamDay::One => "Dia 1",
            ExamDay::Two => "Dia 2",
        }
    }

    /// Presence columns that all carry this day's attendance.
    pub fn presence_columns(self) -> [&'static str; 2] {
        match self {
            ExamDay::One => ["TP_PRESENCA_CH", "TP_PRESENCA_LC"],
            ExamDay::Two => ["TP_PRESENCA_CN", "TP_PRESENCA_MT"],
        }
    }
}

/// Attendance code of a candidate on one exam day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presence {
    Absent,
    Present,
    Eliminated,
}

impl Presence {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Presence::Absent),
            1 => Some(Presence::Present),
            2 => Some(Presence::Eliminated),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Presence::Absent => 0,
            Presence::Present => 1,
            Presence::Eliminated => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// RawValue – a single categorical cell as delivered by the record source
// ---------------------------------------------------------------------------

/// A categorical cell before label mapping.
///
/// Numeric codes (`TP_*`) arrive as `Code`, letter codes (`Q0xx`) and free
/// text (`TP_SEXO`) as `Text`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RawValue {
    #[default]
    Null,
    Code(i64),
    Text(String),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

impl From<i64> for RawValue {
    fn from(code: i64) -> Self {
        RawValue::Code(code)
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_string())
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Text(text)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => write!(f, "<null>"),
            RawValue::Code(c) => write!(f, "{c}"),
            RawValue::Text(s) => write!(f, "{s}"),
        }
    }
}

static NULL_VALUE: RawValue = RawValue::Null;

// ---------------------------------------------------------------------------
// Record – one candidate
// ---------------------------------------------------------------------------

/// One candidate's exam result (one row of the microdata).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub state: StateCode,
    /// Scores indexed by [`Competency::index`]; `None` when missing.
    pub scores: [Option<f64>; 5],
    /// Demographic attributes; an absent key reads as [`RawValue::Null`].
    pub attributes: BTreeMap<Variable, RawValue>,
    /// Attendance indexed by [`ExamDay::index`].
    pub presence: [Option<Presence>; 2],
}

impl Record {
    pub fn new(state: StateCode) -> Self {
        Record {
            state,
            scores: [None; 5],
            attributes: BTreeMap::new(),
            presence: [None; 2],
        }
    }

    pub fn with_score(mut self, competency: Competency, score: f64) -> Self {
        self.scores[competency.index()] = Some(score);
        self
    }

    pub fn with_attribute(mut self, variable: Variable, value: impl Into<RawValue>) -> Self {
        let value = value.into();
        if value.is_null() {
            self.attributes.remove(&variable);
        } else {
            self.attributes.insert(variable, value);
        }
        self
    }

    pub fn with_presence(mut self, day: ExamDay, presence: Presence) -> Self {
        self.presence[day.index()] = Some(presence);
        self
    }

    /// The score as stored, without domain validation.
    pub fn raw_score(&self, competency: Competency) -> Option<f64> {
        self.scores[competency.index()]
    }

    /// The score if it is a finite value inside [`SCORE_RANGE`].
    pub fn score(&self, competency: Competency) -> Option<f64> {
        self.raw_score(competency).and_then(crate::stats::valid_score)
    }

    pub fn attribute(&self, variable: Variable) -> &RawValue {
        self.attributes.get(&variable).unwrap_or(&NULL_VALUE)
    }

    pub fn presence(&self, day: ExamDay) -> Option<Presence> {
        self.presence[day.index()]
    }

    pub fn is_absent(&self, day: ExamDay) -> bool {
        self.presence(day) == Some(Presence::Absent)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the record source
// ---------------------------------------------------------------------------

/// Access the aggregation layer needs from whoever owns the records.
pub trait RecordSource {
    fn records(&self) -> &[Record];

    /// Microdata column names this source actually provides.
    fn columns(&self) -> &BTreeSet<String>;

    fn has_column(&self, name: &str) -> bool {
        self.columns().contains(name)
    }

    /// Read-only view of the records whose state is selected.
    fn select(&self, selection: &FilterSelection) -> View<'_> {
        View::new(
            self.records(),
            self.columns(),
            filtered_indices(self.records(), selection),
        )
    }

    fn view_all(&self) -> View<'_> {
        View::new(self.records(), self.columns(), (0..self.records().len()).collect())
    }
}

/// The full in-memory record set with its column schema.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    columns: BTreeSet<String>,
}

impl Dataset {
    pub fn new<I, S>(records: Vec<Record>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Dataset {
            records,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// A dataset that provides every known microdata column.
    pub fn from_records(records: Vec<Record>) -> Self {
        Dataset::new(records, known_columns())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for Dataset {
    fn records(&self) -> &[Record] {
        &self.records
    }

    fn columns(&self) -> &BTreeSet<String> {
        &self.columns
    }
}

/// Every microdata column the model understands, in table order.
pub fn known_columns() -> Vec<&'static str> {
    let mut columns = vec![STATE_COLUMN];
    columns.extend(Competency::ALL.iter().map(|c| c.column()));
    columns.extend(Variable::ALL.iter().map(|v| v.column()));
    columns.extend(Competency::OBJECTIVE.iter().filter_map(|c| c.presence_column()));
    columns
}

// ---------------------------------------------------------------------------
// View – a filtered, borrowed snapshot
// ---------------------------------------------------------------------------

/// Borrowed subset of a record source. Never mutates the records.
#[derive(Debug, Clone)]
pub struct View<'a> {
    records: &'a [Record],
    columns: &'a BTreeSet<String>,
    indices: Vec<usize>,
}

impl<'a> View<'a> {
    pub fn new(records: &'a [Record], columns: &'a BTreeSet<String>, indices: Vec<usize>) -> Self {
        View {
            records,
            columns,
            indices,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Positions of the viewed records in the source.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn has_competency(&self, competency: Competency) -> bool {
        self.has_column(competency.column())
    }

    pub fn has_variable(&self, variable: Variable) -> bool {
        self.has_column(variable.column())
    }

    /// Whether any presence column of `day` is available.
    pub fn has_presence(&self, day: ExamDay) -> bool {
        day.presence_columns().iter().any(|c| self.has_column(c))
    }

    /// A narrower view keeping only records that satisfy `keep`.
    pub fn retain(&self, mut keep: impl FnMut(&Record) -> bool) -> View<'a> {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| keep(&self.records[i]))
            .collect();
        View::new(self.records, self.columns, indices)
    }

    /// Same source, no records.
    pub fn emptied(&self) -> View<'a> {
        View::new(self.records, self.columns, Vec::new())
    }
}
