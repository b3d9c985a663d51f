//! Score-table queries and row decoding.
//!
//! Decoding fails soft per field: an unparseable month, score, level, or
//! indicator becomes `None` and the row is kept, so no data silently
//! disappears from counts. The one exception is a missing or empty
//! `REGION_NAME`; such a row identifies nothing, can never join or
//! group, and is dropped with a warning.

use gentrimap_analytics::month;
use gentrimap_score_models::{DangerLevel, Indicator, ScoreRecord};

use crate::client::{Table, WarehouseClient};
use crate::WarehouseError;

/// Which result table to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// `GENTRIFICATION_STRICT`: rows with no missing indicator values.
    /// Used for the map and for report generation.
    Strict,
    /// `GENTRIFICATION_SCORE`: all scored rows, missing values allowed.
    Full,
}

impl Dataset {
    /// The warehouse table backing this dataset.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Strict => "GENTRIFICATION_STRICT",
            Self::Full => "GENTRIFICATION_SCORE",
        }
    }
}

/// Loads the full scored table for a dataset.
///
/// # Errors
///
/// Returns [`WarehouseError::Unavailable`] if the query fails.
pub async fn fetch_score_table(
    client: &WarehouseClient,
    dataset: Dataset,
) -> Result<Vec<ScoreRecord>, WarehouseError> {
    let statement = format!("SELECT * FROM {}", dataset.table_name());
    let table = client.execute(&statement, &[]).await?;

    let records = decode_score_rows(&table);
    log::info!(
        "Loaded {} rows from {} ({} raw)",
        records.len(),
        dataset.table_name(),
        table.rows.len()
    );

    Ok(records)
}

/// Decodes a raw result set into score records.
#[must_use]
pub fn decode_score_rows(table: &Table) -> Vec<ScoreRecord> {
    let region_idx = table.column_index("REGION_NAME");
    let month_idx = table.column_index("MONTH");
    let score_idx = table.column_index("FINAL_SCORE");
    let level_idx = table.column_index("DANGER_LEVEL");

    let indicator_idx: Vec<(Indicator, Option<usize>)> = Indicator::ALL
        .iter()
        .map(|&i| (i, table.column_index(i.column())))
        .collect();

    let mut records = Vec::with_capacity(table.rows.len());

    for (row_num, row) in table.rows.iter().enumerate() {
        let region_name = region_idx
            .and_then(|idx| row.get(idx))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or_default();

        if region_name.is_empty() {
            log::warn!("Dropping row {row_num}: empty REGION_NAME");
            continue;
        }

        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));

        records.push(ScoreRecord {
            region_name: region_name.to_string(),
            month: cell(month_idx).and_then(month::normalize),
            final_score: cell(score_idx).and_then(decode_number),
            danger_level: cell(level_idx)
                .and_then(|v| v.as_str())
                .and_then(DangerLevel::parse),
            indicators: indicator_idx
                .iter()
                .map(|&(indicator, idx)| (indicator, cell(idx).and_then(decode_number)))
                .collect(),
        });
    }

    records
}

/// Decodes a numeric cell.
///
/// The statement API returns numbers as JSON strings; native JSON numbers
/// are accepted too. Anything else is a field-level parse failure.
fn decode_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
