#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation result types for the gentrification dashboard.
//!
//! These are the chart-ready shapes the analytics crate produces from the
//! raw score table: per-month means, per-month dominant risk levels, whole
//! table indicator statistics, and the column null profile used for the
//! data-quality view.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use gentrimap_score_models::{DangerLevel, Indicator};
use serde::{Deserialize, Serialize};

/// Mean values for one month bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyMeans {
    /// First day of the month this bucket covers.
    pub month: NaiveDate,
    /// Mean final score over rows with a non-null score (`None` when every
    /// row in the bucket is null for it).
    pub mean_final_score: Option<f64>,
    /// Mean per requested indicator, nulls excluded from each mean.
    pub indicator_means: BTreeMap<Indicator, Option<f64>>,
    /// Number of rows that fell into this bucket.
    pub row_count: usize,
}

/// The most frequent danger level within one month bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDominantLevel {
    /// First day of the month this bucket covers.
    pub month: NaiveDate,
    /// Statistical mode of the bucket's non-null levels; ties resolve to
    /// the lower level. `None` when the bucket has no non-null level.
    pub dominant_level: Option<DangerLevel>,
}

/// Whole-table statistics for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorStats {
    /// The indicator these statistics describe.
    pub indicator: Indicator,
    /// Arithmetic mean over non-null values.
    pub mean: Option<f64>,
    /// Minimum non-null value.
    pub min: Option<f64>,
    /// Maximum non-null value.
    pub max: Option<f64>,
    /// How many rows carried a non-null value.
    pub non_null: usize,
}

/// Null count and percentage for one column of the score table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnNulls {
    /// Column name (warehouse naming: `MONTH`, `FINAL_SCORE`, `NORM_*`, …).
    pub column: String,
    /// Number of rows where the column is null.
    pub null_count: usize,
    /// `100 * null_count / total_rows` (0 when the table is empty).
    pub null_pct: f64,
}
