//! Selection of the latest usable reading from provider observations.
//!
//! A satellite product delivers a stack of scenes over a site; many of them
//! have no value (cloud cover, no overpass). The latest measurement is the
//! newest scene inside the lookback window that actually carries a value.
//!
//! Remote retrieval is not implemented here. [`MeasurementProvider`] is the
//! seam a retrieval client plugs into; [`StaticProvider`] serves observations
//! held in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{GuardError, Result};
use crate::model::{Measurement, Site};
use crate::units::ConcentrationUnit;

/// Default lookback window for the latest reading.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 90;

/// Longest accepted lookback window (about a century).
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Start of the window `[as_of - lookback_days, as_of]`.
///
/// Fails with [`GuardError::InvalidConfiguration`] when `lookback_days` is
/// outside `1..=MAX_LOOKBACK_DAYS` or the start is not a representable date.
pub fn lookback_start(as_of: DateTime<Utc>, lookback_days: i64) -> Result<DateTime<Utc>> {
    if !(1..=MAX_LOOKBACK_DAYS).contains(&lookback_days) {
        return Err(GuardError::invalid_config(format!(
            "lookback must be between 1 and {MAX_LOOKBACK_DAYS} days, got {lookback_days}"
        )));
    }
    Duration::try_days(lookback_days)
        .and_then(|window| as_of.checked_sub_signed(window))
        .ok_or_else(|| {
            GuardError::invalid_config(format!(
                "lookback of {lookback_days} days before {as_of} is out of range"
            ))
        })
}

/// One scene as reported by a provider, in the provider's unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub observed_at: DateTime<Utc>,
    /// `None` when the scene had no usable pixel over the site.
    pub value: Option<f64>,
    pub unit: ConcentrationUnit,
}

impl Observation {
    pub fn new(observed_at: DateTime<Utc>, value: Option<f64>, unit: ConcentrationUnit) -> Self {
        Self {
            observed_at,
            value,
            unit,
        }
    }
}

/// Picks the newest observation in `[as_of - lookback_days, as_of]` with a
/// value and converts it to a ppb [`Measurement`].
///
/// Returns `Ok(None)` when no observation qualifies.
pub fn latest_measurement(
    site: &Site,
    observations: &[Observation],
    as_of: DateTime<Utc>,
    lookback_days: i64,
) -> Result<Option<Measurement>> {
    let since = lookback_start(as_of, lookback_days)?;

    let latest = observations
        .iter()
        .filter(|o| o.observed_at >= since && o.observed_at <= as_of)
        .filter_map(|o| o.value.map(|v| (o, v)))
        .max_by_key(|(o, _)| o.observed_at);

    match latest {
        Some((observation, value)) => {
            debug!(
                site = %site.name,
                observed_at = %observation.observed_at,
                value,
                unit = %observation.unit,
                "Selected latest observation"
            );
            Measurement::from_unit(
                site.clone(),
                value,
                observation.unit,
                observation.observed_at,
            )
            .map(Some)
        }
        None => Ok(None),
    }
}

/// Source of raw observations for a site.
#[async_trait]
pub trait MeasurementProvider: Send + Sync {
    /// Observations for `site` between `since` and `until`, in any order.
    async fn observations(
        &self,
        site: &Site,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Observation>>;

    /// Returns the name of this provider.
    fn name(&self) -> &str;

    /// Fetches observations and selects the latest measurement.
    async fn latest(
        &self,
        site: &Site,
        as_of: DateTime<Utc>,
        lookback_days: i64,
    ) -> Result<Option<Measurement>> {
        let since = lookback_start(as_of, lookback_days)?;
        let observations = self.observations(site, since, as_of).await?;
        debug!(
            provider = self.name(),
            site = %site.name,
            observations = observations.len(),
            "Fetched observations"
        );
        latest_measurement(site, &observations, as_of, lookback_days)
    }
}

/// Provider backed by observations recorded in memory, keyed by site name.
#[derive(Debug, Default)]
pub struct StaticProvider {
    data: RwLock<HashMap<String, Vec<Observation>>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an observation for `site_name`.
    pub async fn record(&self, site_name: impl Into<String>, observation: Observation) {
        self.data
            .write()
            .await
            .entry(site_name.into())
            .or_default()
            .push(observation);
    }
}

#[async_trait]
impl MeasurementProvider for StaticProvider {
    async fn observations(
        &self,
        site: &Site,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Observation>> {
        let data = self.data.read().await;
        Ok(data
            .get(&site.name)
            .map(|obs| {
                obs.iter()
                    .filter(|o| o.observed_at >= since && o.observed_at <= until)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "static"
    }
}
