//! Patient record → feature vector.
//!
//! The arithmetic here is the training contract: changing any formula
//! requires retraining and re-exporting the artifacts.

use crate::columns::Column;
use crate::error::{Result, ValidationError};
use crate::patient::{Gender, Level, PatientRecord};

/// Encoded model input, stored in canonical column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; Column::COUNT],
}

impl FeatureVector {
    pub fn get(&self, column: Column) -> f64 {
        self.values[column.index()]
    }

    /// Values in canonical order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, f64)> + '_ {
        Column::ALL.iter().map(move |&c| (c, self.values[c.index()]))
    }
}

/// Body-mass index, kg/m².
///
/// Fails instead of returning `inf`/`NaN` when the height is zero or the
/// inputs are otherwise degenerate.
pub fn bmi(height_cm: f64, weight_kg: f64) -> Result<f64> {
    let height_m = height_cm / 100.0;
    let value = weight_kg / (height_m * height_m);
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NonFiniteFeature("bmi"))
    }
}

/// Encode one validated patient record.
pub fn encode(record: &PatientRecord) -> Result<FeatureVector> {
    record.validate()?;

    let age = record.age_years;
    let mut values = [0.0; Column::COUNT];
    let mut set = |column: Column, value: f64| values[column.index()] = value;

    set(Column::Height, record.height_cm);
    set(Column::Weight, record.weight_kg);
    set(Column::ApHi, record.systolic_bp as f64);
    set(Column::ApLo, record.diastolic_bp as f64);
    set(Column::Smoke, indicator(record.smoker));
    set(Column::Alco, indicator(record.alcohol));
    set(Column::Active, indicator(record.physically_active));
    set(Column::AgeYears, age as f64);
    set(Column::Bmi, bmi(record.height_cm, record.weight_kg)?);
    set(Column::BpDiff, (record.systolic_bp - record.diastolic_bp) as f64);
    set(Column::GenderMale, indicator(record.gender == Gender::Male));

    // Level 1 is the dropped baseline for both lab values.
    set(Column::Cholesterol2, indicator(record.cholesterol == Level::AboveNormal));
    set(Column::Cholesterol3, indicator(record.cholesterol == Level::WellAboveNormal));
    set(Column::Gluc2, indicator(record.glucose == Level::AboveNormal));
    set(Column::Gluc3, indicator(record.glucose == Level::WellAboveNormal));

    // Half-open bins [0,30) [30,45) [45,60) [60,200]; under 30 is the baseline.
    set(Column::AgeCat30To45, indicator((30..45).contains(&age)));
    set(Column::AgeCat45To60, indicator((45..60).contains(&age)));
    set(Column::AgeCat60Plus, indicator(age >= 60));

    Ok(FeatureVector { values })
}

fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnKind;
    use pretty_assertions::assert_eq;

    fn sample() -> PatientRecord {
        PatientRecord {
            age_years: 45,
            gender: Gender::Male,
            height_cm: 170.0,
            weight_kg: 72.5,
            systolic_bp: 130,
            diastolic_bp: 85,
            cholesterol: Level::AboveNormal,
            glucose: Level::Normal,
            smoker: false,
            alcohol: false,
            physically_active: true,
        }
    }

    #[test]
    fn test_reference_vector() {
        let features = encode(&sample()).unwrap();
        let bmi = 72.5 / (1.7 * 1.7);
        assert_eq!(
            features.as_slice(),
            &[
                170.0, 72.5, 130.0, 85.0, 0.0, 0.0, 1.0, 45.0, bmi, 45.0, 1.0,
                1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0,
            ]
        );
        assert!((features.get(Column::Bmi) - 25.0865).abs() < 1e-4);
    }

    #[test]
    fn test_dummies_are_binary() {
        for age in [1, 29, 30, 44, 45, 59, 60, 120] {
            let record = PatientRecord { age_years: age, ..sample() };
            let features = encode(&record).unwrap();
            for (column, value) in features.iter() {
                if column.kind() == ColumnKind::Dummy {
                    assert!(value == 0.0 || value == 1.0, "{} = {}", column, value);
                }
            }
        }
    }

    #[test]
    fn test_age_bins_select_at_most_one() {
        let cases = [
            (29, [0.0, 0.0, 0.0]),
            (30, [1.0, 0.0, 0.0]),
            (44, [1.0, 0.0, 0.0]),
            (45, [0.0, 1.0, 0.0]),
            (59, [0.0, 1.0, 0.0]),
            (60, [0.0, 0.0, 1.0]),
            (120, [0.0, 0.0, 1.0]),
        ];
        for (age, expected) in cases {
            let features = encode(&PatientRecord { age_years: age, ..sample() }).unwrap();
            let got = [
                features.get(Column::AgeCat30To45),
                features.get(Column::AgeCat45To60),
                features.get(Column::AgeCat60Plus),
            ];
            assert_eq!(got, expected, "age {}", age);
        }
    }

    #[test]
    fn test_level_one_hot() {
        let cases = [
            (Level::Normal, [0.0, 0.0]),
            (Level::AboveNormal, [1.0, 0.0]),
            (Level::WellAboveNormal, [0.0, 1.0]),
        ];
        for (level, expected) in cases {
            let record = PatientRecord { cholesterol: level, glucose: level, ..sample() };
            let f = encode(&record).unwrap();
            assert_eq!([f.get(Column::Cholesterol2), f.get(Column::Cholesterol3)], expected);
            assert_eq!([f.get(Column::Gluc2), f.get(Column::Gluc3)], expected);
        }
    }

    #[test]
    fn test_bp_diff_sign() {
        let record = PatientRecord { systolic_bp: 90, diastolic_bp: 100, ..sample() };
        assert_eq!(encode(&record).unwrap().get(Column::BpDiff), -10.0);
        let record = PatientRecord { systolic_bp: 100, diastolic_bp: 100, ..sample() };
        assert_eq!(encode(&record).unwrap().get(Column::BpDiff), 0.0);
    }

    #[test]
    fn test_gender_only_changes_gender_male() {
        let male = encode(&sample()).unwrap();
        let female = encode(&PatientRecord { gender: Gender::Female, ..sample() }).unwrap();
        for ((column, a), (_, b)) in male.iter().zip(female.iter()) {
            if column == Column::GenderMale {
                assert_eq!((a, b), (1.0, 0.0));
            } else {
                assert_eq!(a, b, "{} differs", column);
            }
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(encode(&sample()).unwrap(), encode(&sample()).unwrap());
    }

    #[test]
    fn test_zero_height_rejected() {
        assert_eq!(bmi(0.0, 70.0), Err(ValidationError::NonFiniteFeature("bmi")));
        let err = encode(&PatientRecord { height_cm: 0.0, ..sample() }).unwrap_err();
        assert_eq!(err.field(), Some("height"));
    }

    #[test]
    fn test_bmi_positive() {
        assert!(bmi(120.0, 25.0).unwrap() > 0.0);
        assert!(bmi(230.0, 250.0).unwrap() > 0.0);
    }
}
