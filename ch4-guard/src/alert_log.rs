//! Append-only CSV log of HSE alerts.
//!
//! Each row records one alert decision:
//!
//! | column        | content                                  |
//! |---------------|------------------------------------------|
//! | datetime_utc  | `%Y-%m-%d %H:%M:%S`, UTC                 |
//! | site          | site name                                |
//! | latitude      | decimal degrees                          |
//! | longitude     | decimal degrees                          |
//! | ch4_ppb       | reading, rounded to 2 decimals           |
//! | z_score       | score, rounded to 2 decimals             |
//! | risk          | tier name                                |
//! | decision      | recommended action                       |
//!
//! The header is written only when the file is new or empty. Existing rows
//! are never rewritten.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::classifier::{RiskAssessment, RiskTier};
use crate::error::{GuardError, Result};
use crate::model::Measurement;

/// Timestamp format of the `datetime_utc` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static ALERT_SCHEMA: Lazy<SchemaRef> = Lazy::new(|| {
    Arc::new(Schema::new(vec![
        Field::new("datetime_utc", DataType::Utf8, false),
        Field::new("site", DataType::Utf8, false),
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("ch4_ppb", DataType::Float64, false),
        Field::new("z_score", DataType::Float64, false),
        Field::new("risk", DataType::Utf8, false),
        Field::new("decision", DataType::Utf8, false),
    ]))
});

/// One row of the alert log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub datetime_utc: DateTime<Utc>,
    pub site: String,
    pub latitude: f64,
    pub longitude: f64,
    pub ch4_ppb: f64,
    pub z_score: f64,
    pub risk: RiskTier,
    pub decision: String,
}

impl AlertRecord {
    /// Builds a record stamped with `logged_at`, rounding the reading and the
    /// score to two decimals.
    pub fn new(
        measurement: &Measurement,
        assessment: &RiskAssessment,
        logged_at: DateTime<Utc>,
    ) -> Self {
        let site = measurement.site();
        Self {
            // The log has second resolution.
            datetime_utc: truncate_to_seconds(logged_at),
            site: site.name.clone(),
            latitude: site.latitude,
            longitude: site.longitude,
            ch4_ppb: round2(measurement.value_ppb()),
            z_score: round2(assessment.score),
            risk: assessment.tier,
            decision: assessment.action.clone(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn truncate_to_seconds(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.timestamp(), 0).unwrap_or(ts)
}

/// CSV alert log at a fixed path.
#[derive(Debug, Clone)]
pub struct AlertLog {
    path: PathBuf,
}

impl AlertLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record, creating the file (with header) if needed.
    #[instrument(skip(self, record), fields(path = %self.path.display(), site = %record.site))]
    pub fn append(&self, record: &AlertRecord) -> Result<()> {
        self.append_all(std::slice::from_ref(record))
    }

    /// Appends several records in order.
    pub fn append_all(&self, records: &[AlertRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let write_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new().with_header(write_header).build(file);
        writer.write(&to_batch(records)?)?;

        info!(
            rows = records.len(),
            new_file = write_header,
            "Appended alert rows"
        );
        Ok(())
    }

    /// Reads every record, oldest first. A missing file is an empty log.
    pub fn read_all(&self) -> Result<Vec<AlertRecord>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let reader = ReaderBuilder::new(ALERT_SCHEMA.clone())
            .with_header(true)
            .build(file)?;

        let mut records = Vec::new();
        for batch in reader {
            records.extend(from_batch(&batch?)?);
        }
        Ok(records)
    }
}

fn to_batch(records: &[AlertRecord]) -> Result<RecordBatch> {
    let timestamps: StringArray = records
        .iter()
        .map(|r| Some(r.datetime_utc.format(TIMESTAMP_FORMAT).to_string()))
        .collect();
    let sites: StringArray = records.iter().map(|r| Some(r.site.as_str())).collect();
    let risks: StringArray = records.iter().map(|r| Some(r.risk.as_str())).collect();
    let decisions: StringArray = records.iter().map(|r| Some(r.decision.as_str())).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(timestamps),
        Arc::new(sites),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.latitude))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.longitude))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.ch4_ppb))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.z_score))),
        Arc::new(risks),
        Arc::new(decisions),
    ];
    Ok(RecordBatch::try_new(ALERT_SCHEMA.clone(), columns)?)
}

fn string_column(batch: &RecordBatch, idx: usize) -> Result<&StringArray> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| GuardError::Internal(format!("alert log column {idx} is not text")))
}

fn float_column(batch: &RecordBatch, idx: usize) -> Result<&Float64Array> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| GuardError::Internal(format!("alert log column {idx} is not numeric")))
}

fn from_batch(batch: &RecordBatch) -> Result<Vec<AlertRecord>> {
    let timestamps = string_column(batch, 0)?;
    let sites = string_column(batch, 1)?;
    let latitudes = float_column(batch, 2)?;
    let longitudes = float_column(batch, 3)?;
    let values = float_column(batch, 4)?;
    let scores = float_column(batch, 5)?;
    let risks = string_column(batch, 6)?;
    let decisions = string_column(batch, 7)?;

    (0..batch.num_rows())
        .map(|i| {
            let datetime_utc = NaiveDateTime::parse_from_str(timestamps.value(i), TIMESTAMP_FORMAT)
                .map_err(|e| {
                    GuardError::Parse(format!(
                        "bad timestamp '{}' in alert log: {e}",
                        timestamps.value(i)
                    ))
                })?
                .and_utc();
            Ok(AlertRecord {
                datetime_utc,
                site: sites.value(i).to_string(),
                latitude: latitudes.value(i),
                longitude: longitudes.value(i),
                ch4_ppb: values.value(i),
                z_score: scores.value(i),
                risk: risks.value(i).parse()?,
                decision: decisions.value(i).to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{assess, ClassifierThresholds};
    use crate::model::{HistoricalSeries, Site};
    use chrono::TimeZone;

    fn record(value: f64) -> AlertRecord {
        let site = Site::new("Hassi R'mel", 32.93, 3.30).unwrap();
        let logged_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 15).unwrap();
        let m = Measurement::new(site, value, logged_at).unwrap();
        let series = HistoricalSeries::new(vec![1870.0, 1880.0, 1890.0, 1900.0]).unwrap();
        let assessment = assess(&m, &series, &ClassifierThresholds::default()).unwrap();
        AlertRecord::new(&m, &assessment, logged_at)
    }

    #[test]
    fn test_record_rounding() {
        let r = record(1950.456);
        assert_eq!(r.ch4_ppb, 1950.46);
        assert_eq!(r.risk, RiskTier::Critical);
        // (1950.456 - 1885) / sqrt(500 / 3) = 5.0702...
        assert_eq!(r.z_score, 5.07);
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = AlertLog::new(dir.path().join("alerts_hse.csv"));
        log.append(&record(1950.0)).unwrap();
        log.append(&record(1960.0)).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "datetime_utc,site,latitude,longitude,ch4_ppb,z_score,risk,decision"
        );
        assert!(lines[1].starts_with("2024-06-01 12:30:15,Hassi R'mel,32.93,3.3,1950"));
        assert_eq!(content.matches("datetime_utc").count(), 1);
    }

    #[test]
    fn test_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = AlertLog::new(dir.path().join("nested/alerts.csv"));
        let first = record(1950.0);
        let second = record(1960.0);
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records, vec![first, second]);
    }

    #[test]
    fn test_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AlertLog::new(dir.path().join("absent.csv"));
        assert!(log.read_all().unwrap().is_empty());
    }
}
