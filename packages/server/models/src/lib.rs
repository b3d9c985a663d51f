#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the dashboard server.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use gentrimap_analytics_models::{ColumnNulls, IndicatorStats};
use gentrimap_score_models::{DangerLevel, Indicator};
use serde::{Deserialize, Serialize};

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// `GET /api/summary` response: dataset shape and data quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    /// Total rows loaded.
    pub row_count: usize,
    /// Distinct district count.
    pub region_count: usize,
    /// Earliest scored month.
    pub first_month: Option<NaiveDate>,
    /// Latest scored month.
    pub last_month: Option<NaiveDate>,
    /// Whole-table statistics per indicator.
    pub indicator_stats: Vec<IndicatorStats>,
    /// Null profile, worst columns first.
    pub null_profile: Vec<ColumnNulls>,
}

/// `GET /api/timeseries` query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesQueryParams {
    /// District filter; omitted means all districts.
    pub region: Option<String>,
    /// Comma-separated indicator names; omitted means all indicators.
    pub indicators: Option<String>,
}

/// One month bucket of the time-series response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMonthlyPoint {
    /// Month label (`YYYY-MM`).
    pub month: String,
    /// Mean final score over the bucket's non-null scores.
    pub mean_final_score: Option<f64>,
    /// Mean per requested indicator.
    pub indicator_means: BTreeMap<Indicator, Option<f64>>,
    /// Most frequent danger level in the bucket.
    pub dominant_level: Option<DangerLevel>,
    /// Rows in the bucket.
    pub row_count: usize,
}

/// `GET /api/timeseries` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesResponse {
    /// The district filter that was applied, if any.
    pub region: Option<String>,
    /// Monthly buckets, ascending.
    pub points: Vec<ApiMonthlyPoint>,
}

/// `GET /api/map` query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQueryParams {
    /// Month to render (`YYYY-MM`); omitted means the latest month.
    pub month: Option<String>,
}

/// One district marker on the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapPoint {
    /// District name.
    pub region_name: String,
    /// Latitude, `None` when the district had no coordinate match.
    pub lat: Option<f64>,
    /// Longitude, `None` when the district had no coordinate match.
    pub lon: Option<f64>,
    /// Final risk score.
    pub final_score: Option<f64>,
    /// Risk bucket.
    pub danger_level: Option<DangerLevel>,
}

/// `GET /api/map` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    /// The month being rendered (`YYYY-MM`).
    pub month: Option<String>,
    /// District markers, unmatched districts included with null
    /// coordinates.
    pub points: Vec<ApiMapPoint>,
    /// How many rows had no coordinate match.
    pub unmatched_regions: usize,
    /// User-facing warning when coordinates were missing.
    pub warning: Option<String>,
}

/// `GET /api/regions` response: selector contents for the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionsResponse {
    /// Distinct district names, sorted.
    pub regions: Vec<String>,
    /// Distinct years with data, newest first.
    pub years: Vec<i32>,
}

/// `POST /api/report` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// District to report on.
    pub region: String,
    /// Calendar year to report on.
    pub year: i32,
}

/// The downloadable document attached to a report response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDownload {
    /// Suggested file name.
    pub filename: String,
    /// MIME type of `content`.
    pub mime: String,
    /// Document text (UTF-8).
    pub content: String,
}

/// `POST /api/report` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// The district the report covers.
    pub region: String,
    /// The calendar year the report covers.
    pub year: i32,
    /// Generated summary text.
    pub summary: String,
    /// Generation date (`YYYY-MM-DD`).
    pub generated_on: NaiveDate,
    /// The downloadable document.
    pub download: ApiDownload,
    /// One-time cost notice, present on a session's first report call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// User-facing message.
    pub error: String,
}
