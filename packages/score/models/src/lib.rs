#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Domain types for the gentrification risk score table.
//!
//! The score itself is computed upstream by SQL views in the warehouse;
//! these types only carry the precomputed values (`FINAL_SCORE`,
//! `DANGER_LEVEL`, and the normalized indicator columns) through the
//! dashboard pipeline. Nothing in this workspace re-derives or validates
//! the score.

use std::collections::BTreeMap;

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Risk bucket derived upstream from `FINAL_SCORE` via fixed thresholds
/// (low below 0.33, medium 0.33–0.66, high above 0.66).
///
/// The warehouse stores the localized Korean labels; [`DangerLevel::parse`]
/// accepts those as well as the `SCREAMING_SNAKE_CASE` English names.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DangerLevel {
    /// Final score below 0.33.
    Low,
    /// Final score between 0.33 and 0.66.
    Medium,
    /// Final score above 0.66.
    High,
}

impl DangerLevel {
    /// All levels, lowest first.
    pub const ALL: &[Self] = &[Self::Low, Self::Medium, Self::High];

    /// The localized label stored in the warehouse and shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "낮음",
            Self::Medium => "보통",
            Self::High => "높음",
        }
    }

    /// Parses a warehouse value into a level.
    ///
    /// Accepts the Korean labels (`낮음`, `보통`, `높음`) and the English
    /// `SCREAMING_SNAKE_CASE` names. Returns `None` for anything else;
    /// an unrecognized label is a field-level parse failure, not an error.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "낮음" => Some(Self::Low),
            "보통" => Some(Self::Medium),
            "높음" => Some(Self::High),
            other => other.parse().ok(),
        }
    }
}

/// One of the upstream-normalized indicator signals.
///
/// Each indicator is rescaled upstream (log and/or min-max) into a nominal
/// [0,1] range and stored in its own `NORM_*` column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Indicator {
    /// Apartment price level.
    Price,
    /// Foot-traffic volume.
    Mobility,
    /// Resident asset level.
    Asset,
    /// Total commercial sales.
    Sales,
    /// Business closure rate.
    Closure,
    /// Franchise share of storefronts.
    Franchise,
    /// Food-service sales.
    Food,
    /// Specialized-trade share.
    Specialized,
    /// Business-type diversity.
    Diversity,
    /// Brand dominance.
    Dominant,
}

impl Indicator {
    /// All indicators, in warehouse column order.
    pub const ALL: &[Self] = &[
        Self::Price,
        Self::Mobility,
        Self::Asset,
        Self::Sales,
        Self::Closure,
        Self::Franchise,
        Self::Food,
        Self::Specialized,
        Self::Diversity,
        Self::Dominant,
    ];

    /// The warehouse column holding this indicator's normalized value.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Price => "NORM_PRICE",
            Self::Mobility => "NORM_MOBILITY",
            Self::Asset => "NORM_ASSET",
            Self::Sales => "NORM_SALES",
            Self::Closure => "NORM_CLOSE",
            Self::Franchise => "NORM_FRANCHISE",
            Self::Food => "NORM_FOOD",
            Self::Specialized => "NORM_SPECIAL",
            Self::Diversity => "NORM_DIVERSITY",
            Self::Dominant => "NORM_DOMINANT",
        }
    }

    /// Looks up the indicator for a warehouse column name.
    #[must_use]
    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.column() == column)
    }
}

/// One scored row per (region, month).
///
/// Fields that failed to decode from the warehouse are `None`; the row
/// itself is always retained so no data silently disappears from counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// District name (non-empty; rows without one are dropped at decode).
    pub region_name: String,
    /// First day of the scored month, or `None` when the raw value was
    /// unparseable.
    pub month: Option<NaiveDate>,
    /// Upstream-computed weighted risk score, expected range [0,1].
    pub final_score: Option<f64>,
    /// Upstream-derived risk bucket.
    pub danger_level: Option<DangerLevel>,
    /// Normalized indicator values keyed by indicator.
    pub indicators: BTreeMap<Indicator, Option<f64>>,
}

impl ScoreRecord {
    /// The calendar year of this row's month, if the month parsed.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.month.map(|m| m.year())
    }

    /// The `YYYY-MM` label for this row's month, if the month parsed.
    #[must_use]
    pub fn month_label(&self) -> Option<String> {
        self.month.map(|m| m.format("%Y-%m").to_string())
    }

    /// This row's value for one indicator (`None` if missing or null).
    #[must_use]
    pub fn indicator(&self, indicator: Indicator) -> Option<f64> {
        self.indicators.get(&indicator).copied().flatten()
    }
}

/// A district's reference coordinates, loaded once per process from the
/// static mapping file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRecord {
    /// District name, matched exactly against [`ScoreRecord::region_name`].
    #[serde(rename = "REGION_NAME")]
    pub region_name: String,
    /// Latitude in decimal degrees.
    #[serde(rename = "LAT")]
    pub lat: f64,
    /// Longitude in decimal degrees.
    #[serde(rename = "LON")]
    pub lon: f64,
}
