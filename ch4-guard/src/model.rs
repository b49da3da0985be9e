//! Core data model: sites, measurements and historical series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::units::ConcentrationUnit;

/// A monitored oil/gas site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Display name, also the key in the alert log.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Site {
    /// Creates a site, validating the coordinates.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        let site = Self {
            name: name.into(),
            latitude,
            longitude,
        };
        site.validate()?;
        Ok(site)
    }

    /// Checks the name is non-empty and the coordinates are on the globe.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GuardError::invalid_measurement("site name cannot be empty"));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(GuardError::invalid_measurement(format!(
                "latitude {} out of range [-90, 90] for site '{}'",
                self.latitude, self.name
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(GuardError::invalid_measurement(format!(
                "longitude {} out of range [-180, 180] for site '{}'",
                self.longitude, self.name
            )));
        }
        Ok(())
    }
}

/// A single CH4 concentration reading, always in ppb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    value_ppb: f64,
    timestamp: DateTime<Utc>,
    site: Site,
}

impl Measurement {
    /// Creates a measurement from a value already in ppb.
    pub fn new(site: Site, value_ppb: f64, timestamp: DateTime<Utc>) -> Result<Self> {
        Self::from_unit(site, value_ppb, ConcentrationUnit::Ppb, timestamp)
    }

    /// Creates a measurement from a value in `unit`, converting it to ppb.
    pub fn from_unit(
        site: Site,
        value: f64,
        unit: ConcentrationUnit,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let value_ppb = unit.to_ppb(value)?;
        Ok(Self {
            value_ppb,
            timestamp,
            site,
        })
    }

    pub fn value_ppb(&self) -> f64 {
        self.value_ppb
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn site(&self) -> &Site {
        &self.site
    }
}

/// Past CH4 values for one site, oldest first, in ppb.
///
/// The series is only used to derive a baseline mean and standard deviation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    values: Vec<f64>,
}

impl HistoricalSeries {
    /// Creates a series, rejecting non-finite values.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if let Some((idx, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(GuardError::invalid_measurement(format!(
                "historical value at index {idx} is not finite: {v}"
            )));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TryFrom<Vec<f64>> for HistoricalSeries {
    type Error = GuardError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_validation() {
        assert!(Site::new("Hassi R'mel", 32.93, 3.30).is_ok());
        assert!(Site::new("", 32.93, 3.30).is_err());
        assert!(Site::new("North", 91.0, 3.30).is_err());
        assert!(Site::new("East", 32.93, -181.0).is_err());
    }

    #[test]
    fn test_measurement_converts_once() {
        let site = Site::new("Hassi R'mel", 32.93, 3.30).unwrap();
        let m = Measurement::from_unit(site, 1.9, ConcentrationUnit::Ppm, Utc::now()).unwrap();
        assert!((m.value_ppb() - 1900.0).abs() < 1e-9);
    }

    #[test]
    fn test_series_rejects_nan() {
        let err = HistoricalSeries::new(vec![1880.0, f64::NAN]).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }
}
