//! In-memory history source.

use async_trait::async_trait;

use super::HistorySource;
use crate::error::Result;
use crate::model::HistoricalSeries;

/// Serves a series the caller already holds.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistorySource {
    values: Vec<f64>,
}

impl InMemoryHistorySource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }
}

#[async_trait]
impl HistorySource for InMemoryHistorySource {
    async fn load(&self) -> Result<HistoricalSeries> {
        HistoricalSeries::new(self.values.clone())
    }

    fn description(&self) -> String {
        format!("in-memory series ({} values)", self.values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load() {
        let source = InMemoryHistorySource::new(vec![1870.0, 1880.0]);
        assert_eq!(source.load().await.unwrap().len(), 2);
        assert!(source.description().contains("2 values"));
    }
}
