//! The 18 model input columns and their kinds.

use std::fmt;

/// Whether a column is passed through the fitted scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Continuous or count-like value; standardised before the classifier.
    Numeric,
    /// One-hot 0/1 flag; passed to the classifier unscaled.
    Dummy,
}

/// A model input column. Declaration order is the canonical training order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Height,
    Weight,
    ApHi,
    ApLo,
    Smoke,
    Alco,
    Active,
    AgeYears,
    Bmi,
    BpDiff,
    GenderMale,
    Cholesterol2,
    Cholesterol3,
    Gluc2,
    Gluc3,
    AgeCat30To45,
    AgeCat45To60,
    AgeCat60Plus,
}

impl Column {
    pub const COUNT: usize = 18;

    /// Every column, in canonical order.
    pub const ALL: [Column; Column::COUNT] = [
        Column::Height,
        Column::Weight,
        Column::ApHi,
        Column::ApLo,
        Column::Smoke,
        Column::Alco,
        Column::Active,
        Column::AgeYears,
        Column::Bmi,
        Column::BpDiff,
        Column::GenderMale,
        Column::Cholesterol2,
        Column::Cholesterol3,
        Column::Gluc2,
        Column::Gluc3,
        Column::AgeCat30To45,
        Column::AgeCat45To60,
        Column::AgeCat60Plus,
    ];

    /// Column name as written to `features.json`.
    pub fn name(self) -> &'static str {
        match self {
            Column::Height       => "height",
            Column::Weight       => "weight",
            Column::ApHi         => "ap_hi",
            Column::ApLo         => "ap_lo",
            Column::Smoke        => "smoke",
            Column::Alco         => "alco",
            Column::Active       => "active",
            Column::AgeYears     => "age_years",
            Column::Bmi          => "bmi",
            Column::BpDiff       => "bp_diff",
            Column::GenderMale   => "gender_male",
            Column::Cholesterol2 => "cholesterol_2",
            Column::Cholesterol3 => "cholesterol_3",
            Column::Gluc2        => "gluc_2",
            Column::Gluc3        => "gluc_3",
            Column::AgeCat30To45 => "age_cat_30-45",
            Column::AgeCat45To60 => "age_cat_45-60",
            Column::AgeCat60Plus => "age_cat_60+",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Cholesterol2
            | Column::Cholesterol3
            | Column::Gluc2
            | Column::Gluc3
            | Column::AgeCat30To45
            | Column::AgeCat45To60
            | Column::AgeCat60Plus => ColumnKind::Dummy,
            _ => ColumnKind::Numeric,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.kind() == ColumnKind::Numeric
    }

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
