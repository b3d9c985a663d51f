#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP statement client for the cloud warehouse that holds the scored
//! table.
//!
//! The warehouse computes `FINAL_SCORE` and `DANGER_LEVEL` in its own SQL
//! views; this crate only reads the result tables over the warehouse's
//! HTTPS statement API. Statements travel with typed positional bind
//! variables, never string-spliced values. Any connect or query failure
//! collapses to a single [`WarehouseError::Unavailable`] condition for the
//! caller to surface; there are no retries and no cancellation.

pub mod client;
pub mod config;
pub mod queries;

pub use client::{Binding, Table, WarehouseClient};
pub use config::WarehouseConfig;
pub use queries::Dataset;

/// Errors from warehouse access.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// The warehouse could not be reached or refused the statement.
    /// Everything from DNS failure to a SQL compilation error lands here:
    /// the dashboard treats them all as "data unavailable".
    #[error("Warehouse unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// The warehouse configuration file is missing or malformed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

impl From<reqwest::Error> for WarehouseError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable {
            message: e.to_string(),
        }
    }
}
