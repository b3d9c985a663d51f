#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Month normalization and in-memory aggregation over the score table.
//!
//! The warehouse hands back one row per (region, month) with the
//! precomputed score columns; everything here reshapes that table into
//! chart-ready aggregates. All functions are pure and total: unparseable
//! dates become `None` and null values are excluded from means rather
//! than surfacing as errors.

pub mod aggregate;
pub mod month;
