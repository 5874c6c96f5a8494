//! Demographic variables and their fixed code → label tables.
//!
//! Every variable has a total mapping: known codes get their display label,
//! textual variables pass their raw value through, and everything else lands
//! in the explicit [`Label::Unlabeled`] bucket.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::model::RawValue;

/// Display label of the unlabeled bucket.
pub const UNLABELED: &str = "Não rotulado";

/// A categorical column of the microdata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Race,
    Sex,
    SchoolDependency,
    AgeBracket,
    FatherEducation,
    MotherEducation,
    Income,
    SchoolType,
}

/// Result of mapping one raw cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Known(&'static str),
    /// Textual variables keep their raw value.
    Raw(String),
    Unlabeled,
}

impl Label {
    pub fn as_str(&self) -> &str {
        match self {
            Label::Known(label) => *label,
            Label::Raw(raw) => raw.as_str(),
            Label::Unlabeled => UNLABELED,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a variable's codes are written in the microdata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coding {
    /// Integer codes (`TP_*`).
    Numeric,
    /// Letter codes (`Q0xx`).
    Letter,
    /// Free text, used as-is.
    Textual,
}

impl Variable {
    pub const ALL: [Variable; 8] = [
        Variable::Race,
        Variable::Sex,
        Variable::SchoolDependency,
        Variable::AgeBracket,
        Variable::FatherEducation,
        Variable::MotherEducation,
        Variable::Income,
        Variable::SchoolType,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Variable::Race => "TP_COR_RACA",
            Variable::Sex => "TP_SEXO",
            Variable::SchoolDependency => "TP_DEPENDENCIA_ADM_ESC",
            Variable::AgeBracket => "TP_FAIXA_ETARIA",
            Variable::FatherEducation => "Q001",
            Variable::MotherEducation => "Q002",
            Variable::Income => "Q006",
            Variable::SchoolType => "TP_ESCOLA",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variable::Race => "Cor/Raça",
            Variable::Sex => "Sexo",
            Variable::SchoolDependency => "Dependência administrativa",
            Variable::AgeBracket => "Faixa etária",
            Variable::FatherEducation => "Escolaridade do pai",
            Variable::MotherEducation => "Escolaridade da mãe",
            Variable::Income => "Renda familiar",
            Variable::SchoolType => "Tipo de escola",
        }
    }

    pub fn coding(self) -> Coding {
        match self {
            Variable::Sex => Coding::Textual,
            Variable::FatherEducation | Variable::MotherEducation | Variable::Income => {
                Coding::Letter
            }
            Variable::Race
            | Variable::SchoolDependency
            | Variable::AgeBracket
            | Variable::SchoolType => Coding::Numeric,
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Variable::ALL.into_iter().find(|v| v.column() == name)
    }

    /// Map a raw cell to its display label.
    pub fn label(self, raw: &RawValue) -> Label {
        match (self.coding(), raw) {
            (_, RawValue::Null) => Label::Unlabeled,
            (Coding::Textual, RawValue::Text(text)) => Label::Raw(text.clone()),
            (Coding::Textual, RawValue::Code(code)) => Label::Raw(code.to_string()),
            (Coding::Numeric, RawValue::Code(code)) => numeric_codes(self)
                .iter()
                .find(|(c, _)| c == code)
                .map_or(Label::Unlabeled, |&(_, label)| Label::Known(label)),
            (Coding::Letter, RawValue::Text(text)) => letter_codes(self)
                .iter()
                .find(|(c, _)| c.eq_ignore_ascii_case(text.trim()))
                .map_or(Label::Unlabeled, |&(_, label)| Label::Known(label)),
            _ => Label::Unlabeled,
        }
    }

    /// Known labels in code order.
    pub fn labels(self) -> Vec<&'static str> {
        match self.coding() {
            Coding::Numeric => numeric_codes(self).iter().map(|(_, l)| *l).collect(),
            Coding::Letter => letter_codes(self).iter().map(|(_, l)| *l).collect(),
            Coding::Textual => Vec::new(),
        }
    }

    /// Ordering key for a category axis: known labels in code order, then
    /// raw text lexicographically, then the unlabeled bucket.
    pub fn axis_key(self, label: &str) -> (u8, usize, String) {
        if label == UNLABELED {
            return (2, 0, String::new());
        }
        match self.labels().iter().position(|known| *known == label) {
            Some(pos) => (0, pos, String::new()),
            None => (1, 0, label.to_string()),
        }
    }
}

fn numeric_codes(variable: Variable) -> &'static [(i64, &'static str)] {
    match variable {
        Variable::Race => RACE,
        Variable::SchoolDependency => SCHOOL_DEPENDENCY,
        Variable::AgeBracket => AGE_BRACKET,
        Variable::SchoolType => SCHOOL_TYPE,
        _ => &[],
    }
}

fn letter_codes(variable: Variable) -> &'static [(&'static str, &'static str)] {
    match variable {
        Variable::FatherEducation | Variable::MotherEducation => EDUCATION,
        Variable::Income => INCOME,
        _ => &[],
    }
}

const RACE: &[(i64, &str)] = &[
    (0, "Não declarado"),
    (1, "Branca"),
    (2, "Preta"),
    (3, "Parda"),
    (4, "Amarela"),
    (5, "Indígena"),
    (6, "Não dispõe da informação"),
];

const SCHOOL_DEPENDENCY: &[(i64, &str)] = &[
    (1, "Federal"),
    (2, "Estadual"),
    (3, "Municipal"),
    (4, "Privada"),
];

const SCHOOL_TYPE: &[(i64, &str)] = &[
    (1, "Não respondeu"),
    (2, "Pública"),
    (3, "Privada"),
];

const AGE_BRACKET: &[(i64, &str)] = &[
    (1, "Menor de 17 anos"),
    (2, "17 anos"),
    (3, "18 anos"),
    (4, "19 anos"),
    (5, "20 anos"),
    (6, "21 anos"),
    (7, "22 anos"),
    (8, "23 anos"),
    (9, "24 anos"),
    (10, "25 anos"),
    (11, "Entre 26 e 30 anos"),
    (12, "Entre 31 e 35 anos"),
    (13, "Entre 36 e 40 anos"),
    (14, "Entre 41 e 45 anos"),
    (15, "Entre 46 e 50 anos"),
    (16, "Entre 51 e 55 anos"),
    (17, "Entre 56 e 60 anos"),
    (18, "Entre 61 e 65 anos"),
    (19, "Entre 66 e 70 anos"),
    (20, "Maior de 70 anos"),
];

// Q001 / Q002
const EDUCATION: &[(&str, &str)] = &[
    ("A", "Nunca estudou"),
    ("B", "Fundamental I incompleto"),
    ("C", "Fundamental I completo"),
    ("D", "Fundamental II completo"),
    ("E", "Ensino médio completo"),
    ("F", "Ensino superior completo"),
    ("G", "Pós-graduação"),
    ("H", "Não sabe"),
];

// Q006, monthly family income in BRL
const INCOME: &[(&str, &str)] = &[
    ("A", "Nenhuma renda"),
    ("B", "Até R$ 1.320"),
    ("C", "R$ 1.320 a 1.980"),
    ("D", "R$ 1.980 a 2.640"),
    ("E", "R$ 2.640 a 3.300"),
    ("F", "R$ 3.300 a 3.960"),
    ("G", "R$ 3.960 a 5.280"),
    ("H", "R$ 5.280 a 6.600"),
    ("I", "R$ 6.600 a 7.920"),
    ("J", "R$ 7.920 a 9.240"),
    ("K", "R$ 9.240 a 10.560"),
    ("L", "R$ 10.560 a 11.880"),
    ("M", "R$ 11.880 a 13.200"),
    ("N", "R$ 13.200 a 15.840"),
    ("O", "R$ 15.840 a 19.800"),
    ("P", "R$ 19.800 a 26.400"),
    ("Q", "Acima de R$ 26.400"),
];
