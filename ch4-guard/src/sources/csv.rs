//! CSV history source backed by DataFusion.

use std::path::Path;

use arrow::array::{Array, Float64Array};
use arrow::datatypes::DataType;
use async_trait::async_trait;
use datafusion::common::Column;
use datafusion::prelude::*;
use regex::Regex;
use tracing::{debug, info, instrument};

use super::HistorySource;
use crate::error::{GuardError, Result};
use crate::model::HistoricalSeries;
use crate::units::ConcentrationUnit;

/// Case-insensitive match on any column containing "ch4".
pub const DEFAULT_CH4_COLUMN_PATTERN: &str = "(?i)ch4";

const TABLE_NAME: &str = "ch4_history";
const VALUE_ALIAS: &str = "ch4_value";

/// Options for reading a historical CSV file.
#[derive(Debug, Clone)]
pub struct CsvHistoryOptions {
    /// Whether the file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Pattern selecting the CH4 column; the first matching column wins
    pub column_pattern: String,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
    /// Unit of the stored values; loaded values are converted to ppb
    pub unit: ConcentrationUnit,
}

impl Default for CsvHistoryOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            column_pattern: DEFAULT_CH4_COLUMN_PATTERN.to_string(),
            schema_infer_max_records: 1000,
            unit: ConcentrationUnit::Ppb,
        }
    }
}

/// A historical series stored as one column of a CSV file.
///
/// Null cells are skipped; the remaining values keep file order.
#[derive(Debug, Clone)]
pub struct CsvHistorySource {
    path: String,
    options: CsvHistoryOptions,
    pattern: Regex,
}

impl CsvHistorySource {
    /// Creates a source for `path` with default options.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::with_options(path, CsvHistoryOptions::default())
    }

    /// Creates a source with custom options.
    pub fn with_options(path: impl Into<String>, options: CsvHistoryOptions) -> Result<Self> {
        let pattern = Regex::new(&options.column_pattern).map_err(|e| {
            GuardError::invalid_config(format!(
                "Invalid CH4 column pattern '{}': {e}",
                options.column_pattern
            ))
        })?;
        Ok(Self {
            path: path.into(),
            options,
            pattern,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn file_extension(&self) -> String {
        Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default()
    }
}

#[async_trait]
impl HistorySource for CsvHistorySource {
    #[instrument(skip(self), fields(path = %self.path))]
    async fn load(&self) -> Result<HistoricalSeries> {
        if !Path::new(&self.path).is_file() {
            return Err(GuardError::data_source(
                "CSV",
                format!("historical file '{}' does not exist", self.path),
            ));
        }

        // A single partition keeps rows in file order.
        let ctx = SessionContext::new_with_config(SessionConfig::new().with_target_partitions(1));
        let extension = self.file_extension();
        let read_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);
        ctx.register_csv(TABLE_NAME, &self.path, read_options)
            .await?;

        let df = ctx.table(TABLE_NAME).await?;
        let column_name = df
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .find(|name| self.pattern.is_match(name))
            .ok_or_else(|| GuardError::ColumnNotFound {
                column: self.options.column_pattern.clone(),
            })?;
        debug!(column = %column_name, "Selected CH4 column");

        let value = cast(Expr::Column(Column::from_name(&column_name)), DataType::Float64)
            .alias(VALUE_ALIAS);
        let batches = df
            .select(vec![value])?
            .filter(col(VALUE_ALIAS).is_not_null())?
            .collect()
            .await?;

        let mut values = Vec::new();
        for batch in &batches {
            let array = batch
                .column(0)
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| {
                    GuardError::Internal(format!(
                        "column '{column_name}' did not cast to Float64"
                    ))
                })?;
            for value in array.iter().flatten() {
                values.push(self.options.unit.to_ppb(value)?);
            }
        }

        info!(
            column = %column_name,
            points = values.len(),
            unit = %self.options.unit,
            "Loaded historical CH4 series"
        );
        HistoricalSeries::new(values)
    }

    fn description(&self) -> String {
        format!("CSV file '{}'", self.path)
    }
}
