//! Raw patient input and its validation rules.
//!
//! Field names follow the Kaggle cardiovascular dataset (`ap_hi`, `gluc`,
//! `alco`, ...) because both the CSV used for training and the JSON accepted
//! by the service use them.

use serde_json::{Map, Value};

use crate::error::{Result, ValidationError};

pub const AGE: &str = "age";
pub const GENDER: &str = "gender";
pub const HEIGHT: &str = "height";
pub const WEIGHT: &str = "weight";
pub const AP_HI: &str = "ap_hi";
pub const AP_LO: &str = "ap_lo";
pub const CHOLESTEROL: &str = "cholesterol";
pub const GLUC: &str = "gluc";
pub const SMOKE: &str = "smoke";
pub const ALCO: &str = "alco";
pub const ACTIVE: &str = "active";

/// Required input fields, in the order missing fields are reported.
pub const FIELDS: [&str; 11] = [
    AGE, GENDER, HEIGHT, WEIGHT, AP_HI, AP_LO, CHOLESTEROL, GLUC, SMOKE, ALCO, ACTIVE,
];

// Physiologically plausible bounds, inclusive.
const AGE_BOUNDS: (f64, f64) = (1.0, 120.0);
const HEIGHT_BOUNDS: (f64, f64) = (120.0, 230.0);
const WEIGHT_BOUNDS: (f64, f64) = (25.0, 250.0);
const SYSTOLIC_BOUNDS: (f64, f64) = (60.0, 250.0);
const DIASTOLIC_BOUNDS: (f64, f64) = (40.0, 180.0);

/// Dataset encoding: 1 = female, 2 = male.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Gender::Female),
            2 => Ok(Gender::Male),
            other => Err(ValidationError::InvalidCategory {
                field: GENDER,
                value: other,
                allowed: "1, 2",
            }),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Gender::Female => 1,
            Gender::Male => 2,
        }
    }
}

/// Ordinal lab level used for cholesterol and glucose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Normal,
    AboveNormal,
    WellAboveNormal,
}

impl Level {
    pub fn from_code(field: &'static str, code: i64) -> Result<Self> {
        match code {
            1 => Ok(Level::Normal),
            2 => Ok(Level::AboveNormal),
            3 => Ok(Level::WellAboveNormal),
            other => Err(ValidationError::InvalidCategory {
                field,
                value: other,
                allowed: "1, 2, 3",
            }),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Level::Normal => 1,
            Level::AboveNormal => 2,
            Level::WellAboveNormal => 3,
        }
    }
}

/// Decode a 0/1 survey flag.
pub fn flag_from_code(field: &'static str, code: i64) -> Result<bool> {
    match code {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ValidationError::InvalidCategory {
            field,
            value: other,
            allowed: "0, 1",
        }),
    }
}

/// One patient's vitals and survey answers.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub age_years: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Systolic blood pressure (`ap_hi`).
    pub systolic_bp: i32,
    /// Diastolic blood pressure (`ap_lo`).
    pub diastolic_bp: i32,
    pub cholesterol: Level,
    pub glucose: Level,
    pub smoker: bool,
    pub alcohol: bool,
    pub physically_active: bool,
}

impl PatientRecord {
    /// Parse and validate a JSON object carrying the 11 input fields.
    ///
    /// Every field is required; `null` counts as missing. The first missing
    /// field in [`FIELDS`] order is reported. Unknown keys are ignored.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

        if let Some(missing) = FIELDS.iter().copied().find(|name| is_missing(obj, name)) {
            return Err(ValidationError::MissingField(missing));
        }

        let age = bounded(AGE, integer(obj, AGE)? as f64, AGE_BOUNDS)?;
        let systolic = bounded(AP_HI, integer(obj, AP_HI)? as f64, SYSTOLIC_BOUNDS)?;
        let diastolic = bounded(AP_LO, integer(obj, AP_LO)? as f64, DIASTOLIC_BOUNDS)?;

        let record = Self {
            age_years: age as u32,
            gender: Gender::from_code(integer(obj, GENDER)?)?,
            height_cm: number(obj, HEIGHT)?,
            weight_kg: number(obj, WEIGHT)?,
            systolic_bp: systolic as i32,
            diastolic_bp: diastolic as i32,
            cholesterol: Level::from_code(CHOLESTEROL, integer(obj, CHOLESTEROL)?)?,
            glucose: Level::from_code(GLUC, integer(obj, GLUC)?)?,
            smoker: flag(obj, SMOKE)?,
            alcohol: flag(obj, ALCO)?,
            physically_active: flag(obj, ACTIVE)?,
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the numeric fields against their plausible ranges.
    ///
    /// Categorical fields are already constrained by their types.
    pub fn validate(&self) -> Result<()> {
        bounded(AGE, self.age_years as f64, AGE_BOUNDS)?;
        bounded(HEIGHT, self.height_cm, HEIGHT_BOUNDS)?;
        bounded(WEIGHT, self.weight_kg, WEIGHT_BOUNDS)?;
        bounded(AP_HI, self.systolic_bp as f64, SYSTOLIC_BOUNDS)?;
        bounded(AP_LO, self.diastolic_bp as f64, DIASTOLIC_BOUNDS)?;
        Ok(())
    }
}

fn is_missing(obj: &Map<String, Value>, name: &str) -> bool {
    matches!(obj.get(name), None | Some(Value::Null))
}

fn field<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value> {
    match obj.get(name) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(name)),
        Some(value) => Ok(value),
    }
}

fn number(obj: &Map<String, Value>, name: &'static str) -> Result<f64> {
    field(obj, name)?
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::InvalidType { field: name, expected: "number" })
}

/// Accepts `45` and `45.0`, rejects `45.5` and strings.
fn integer(obj: &Map<String, Value>, name: &'static str) -> Result<i64> {
    let value = field(obj, name)?;
    if let Some(i) = value.as_i64() {
        return Ok(i);
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => Ok(f as i64),
        _ => Err(ValidationError::InvalidType { field: name, expected: "integer" }),
    }
}

fn flag(obj: &Map<String, Value>, name: &'static str) -> Result<bool> {
    match field(obj, name)? {
        Value::Bool(b) => Ok(*b),
        _ => flag_from_code(name, integer(obj, name)?),
    }
}

fn bounded(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<f64> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange { field, value, min, max })
    }
}
