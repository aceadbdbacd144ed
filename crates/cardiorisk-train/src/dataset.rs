//! Loading and cleaning the cardiovascular dataset.
//!
//! Input is the Kaggle `cardio_train.csv`: semicolon-delimited, age in days,
//! target column `cardio`.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use cardiorisk_features::{
    encode, patient, FeatureOrder, Gender, Level, PatientRecord, ValidationError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DAYS_PER_YEAR: i64 = 365;

/// One CSV row, as stored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub id: Option<i64>,
    /// Age in days.
    pub age: i64,
    pub gender: i64,
    pub height: f64,
    pub weight: f64,
    pub ap_hi: i64,
    pub ap_lo: i64,
    pub cholesterol: i64,
    pub gluc: i64,
    pub smoke: i64,
    pub alco: i64,
    pub active: i64,
    pub cardio: i64,
}

impl RawRow {
    /// Outlier filter applied before encoding. Bounds are inclusive.
    pub fn is_plausible(&self) -> bool {
        (60..=250).contains(&self.ap_hi)
            && (40..=180).contains(&self.ap_lo)
            && (130.0..=220.0).contains(&self.height)
            && (30.0..=250.0).contains(&self.weight)
    }

    pub fn age_years(&self) -> i64 {
        self.age / DAYS_PER_YEAR
    }

    pub fn to_record(&self) -> Result<PatientRecord, ValidationError> {
        let years = self.age_years();
        let age_years = u32::try_from(years)
            .ok()
            .filter(|&y| y >= 1)
            .ok_or(ValidationError::OutOfRange {
                field: patient::AGE,
                value: years as f64,
                min: 1.0,
                max: 120.0,
            })?;
        let record = PatientRecord {
            age_years,
            gender: Gender::from_code(self.gender)?,
            height_cm: self.height,
            weight_kg: self.weight,
            systolic_bp: self.ap_hi as i32,
            diastolic_bp: self.ap_lo as i32,
            cholesterol: Level::from_code(patient::CHOLESTEROL, self.cholesterol)?,
            glucose: Level::from_code(patient::GLUC, self.gluc)?,
            smoker: patient::flag_from_code(patient::SMOKE, self.smoke)?,
            alcohol: patient::flag_from_code(patient::ALCO, self.alco)?,
            physically_active: patient::flag_from_code(patient::ACTIVE, self.active)?,
        };
        record.validate()?;
        Ok(record)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub read: usize,
    /// Dropped by the blood-pressure / height / weight filter.
    pub filtered: usize,
    /// Dropped because the record failed validation or had a bad label.
    pub rejected: usize,
    pub kept: usize,
}

/// Encoded design matrix in `order`, one row per patient.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub order: FeatureOrder,
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&y| y == 1).count()
    }

    pub fn select(&self, indices: &[usize]) -> (Vec<Vec<f64>>, Vec<u8>) {
        let rows = indices.iter().map(|&i| self.rows[i].clone()).collect();
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        (rows, labels)
    }
}

pub fn load_csv(path: &Path) -> anyhow::Result<(Dataset, LoadStats)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open dataset {}", path.display()))?;
    let loaded = from_reader(file)?;
    info!(
        path = %path.display(),
        read = loaded.1.read,
        kept = loaded.1.kept,
        filtered = loaded.1.filtered,
        rejected = loaded.1.rejected,
        "Loaded dataset"
    );
    Ok(loaded)
}

pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<(Dataset, LoadStats)> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_reader(reader);

    let order = FeatureOrder::canonical();
    let mut stats = LoadStats::default();
    let mut rows = Vec::new();
    let mut labels = Vec::new();

    for (line, result) in csv.deserialize::<RawRow>().enumerate() {
        let raw = result.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        stats.read += 1;

        if !raw.is_plausible() {
            stats.filtered += 1;
            continue;
        }
        let label = match raw.cardio {
            0 => 0u8,
            1 => 1u8,
            other => {
                debug!(id = ?raw.id, cardio = other, "Skipping row with invalid label");
                stats.rejected += 1;
                continue;
            }
        };
        match raw.to_record().and_then(|r| encode(&r)) {
            Ok(features) => {
                rows.push(order.arrange(&features));
                labels.push(label);
            }
            Err(e) => {
                debug!(id = ?raw.id, error = %e, "Skipping invalid row");
                stats.rejected += 1;
            }
        }
    }

    stats.kept = rows.len();
    if rows.is_empty() {
        anyhow::bail!("No usable rows in dataset ({} read)", stats.read);
    }
    Ok((Dataset { order, rows, labels }, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardiorisk_features::Column;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "id;age;gender;height;weight;ap_hi;ap_lo;cholesterol;gluc;smoke;alco;active;cardio";

    fn csv(lines: &[&str]) -> String {
        std::iter::once(HEADER)
            .chain(lines.iter().copied())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_age_in_days_truncates() {
        let data = csv(&["0;18393;2;168;62.0;110;80;1;1;0;0;1;0"]);
        let (dataset, stats) = from_reader(data.as_bytes()).unwrap();

        assert_eq!(stats, LoadStats { read: 1, filtered: 0, rejected: 0, kept: 1 });
        // 18393 / 365 = 50.39
        assert_eq!(dataset.rows[0][Column::AgeYears.index()], 50.0);
        assert_eq!(dataset.rows[0][Column::AgeCat45To60.index()], 1.0);
        assert_eq!(dataset.labels, vec![0]);
    }

    #[test]
    fn test_huge_age_rejected_not_wrapped() {
        // 4294967346 years wraps to 50 under a plain u32 cast
        let days = 4_294_967_346_i64 * 365;
        let huge = format!("0;{days};2;168;62.0;110;80;1;1;0;0;1;0");
        let data = csv(&[&huge, "1;18393;2;168;62.0;110;80;1;1;0;0;1;1"]);
        let (dataset, stats) = from_reader(data.as_bytes()).unwrap();
        assert_eq!(stats.rejected, 1);
        assert_eq!(dataset.labels, vec![1]);
    }

    #[test]
    fn test_outliers_filtered() {
        let data = csv(&[
            "0;18393;2;168;62.0;110;80;1;1;0;0;1;0",
            "1;20228;1;156;85.0;140;90;3;1;0;0;1;1",
            "2;18857;1;165;64.0;1300;80;3;1;0;0;0;1", // ap_hi
            "3;17623;2;169;82.0;150;-100;1;1;0;0;1;1", // ap_lo
            "4;17474;1;125;56.0;100;60;1;1;0;0;0;0",   // height
            "5;21914;1;151;25.0;120;80;2;2;0;0;0;0",   // weight
        ]);
        let (dataset, stats) = from_reader(data.as_bytes()).unwrap();

        assert_eq!(stats, LoadStats { read: 6, filtered: 4, rejected: 0, kept: 2 });
        assert_eq!(dataset.labels, vec![0, 1]);
        assert_eq!(dataset.positives(), 1);
    }

    #[test]
    fn test_invalid_categories_rejected() {
        let data = csv(&[
            "0;18393;3;168;62.0;110;80;1;1;0;0;1;0", // gender 3
            "1;18393;2;168;62.0;110;80;4;1;0;0;1;0", // cholesterol 4
            "2;18393;2;168;62.0;110;80;1;1;0;0;1;7", // label 7
            "3;18393;2;168;62.0;110;80;1;1;0;0;1;1",
        ]);
        let (dataset, stats) = from_reader(data.as_bytes()).unwrap();
        assert_eq!(stats.rejected, 3);
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_rows_use_serving_encoding() {
        let data = csv(&["0;16425;2;170;72.5;130;85;2;1;0;0;1;1"]);
        let (dataset, _) = from_reader(data.as_bytes()).unwrap();

        let raw: RawRow = RawRow {
            id: None,
            age: 16425,
            gender: 2,
            height: 170.0,
            weight: 72.5,
            ap_hi: 130,
            ap_lo: 85,
            cholesterol: 2,
            gluc: 1,
            smoke: 0,
            alco: 0,
            active: 1,
            cardio: 1,
        };
        let expected = FeatureOrder::canonical().arrange(&encode(&raw.to_record().unwrap()).unwrap());
        assert_eq!(dataset.rows[0], expected);
    }

    #[test]
    fn test_empty_dataset_is_error() {
        let data = csv(&["0;18393;2;168;62.0;1000;80;1;1;0;0;1;0"]);
        assert!(from_reader(data.as_bytes()).is_err());
    }
}
