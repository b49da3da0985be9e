//! Sources of historical CH4 series.
//!
//! The classifier never reads files itself; a [`HistorySource`] produces a
//! [`HistoricalSeries`] which is then passed to it explicitly.
//!
//! - [`CsvHistorySource`]: a CSV export (e.g. a multi-year baseline) read
//!   through DataFusion, with the CH4 column located by name pattern.
//! - [`InMemoryHistorySource`]: values already held by the caller.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ch4_guard::sources::{CsvHistorySource, HistorySource};
//!
//! # async fn example() -> ch4_guard::error::Result<()> {
//! let source = CsvHistorySource::new("data/CH4_HassiRmel_2020_2024.csv")?;
//! let series = source.load().await?;
//! println!("{} historical values", series.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::Result;
use crate::model::HistoricalSeries;

mod csv;
mod memory;

pub use csv::{CsvHistoryOptions, CsvHistorySource, DEFAULT_CH4_COLUMN_PATTERN};
pub use memory::InMemoryHistorySource;

/// Something that can produce the historical series of a site.
#[async_trait]
pub trait HistorySource: Debug + Send + Sync {
    /// Loads the full series, oldest value first.
    async fn load(&self) -> Result<HistoricalSeries>;

    /// Returns a human-readable description of this source.
    fn description(&self) -> String;
}
