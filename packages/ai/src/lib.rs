#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Narrative report generation for the gentrification dashboard.
//!
//! A region/year slice of the score table is serialized into a fixed
//! Korean prompt template and sent to a hosted text-completion service
//! through the [`providers::LlmProvider`] abstraction. Supported
//! providers: the warehouse's own completion function (what the original
//! deployment runs on), Anthropic Claude, and `OpenAI`. One prompt in,
//! one text block out: no tool use, no streaming, no retries.

pub mod prompt;
pub mod providers;
pub mod report;

use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to an LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The warehouse-backed completion failed.
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] gentrimap_warehouse::WarehouseError),

    /// Provider-specific error (quota, auth, malformed response).
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The selected region and year have no data rows. User-correctable:
    /// callers prompt for another selection instead of reporting a
    /// system failure.
    #[error("No data rows for {region} in {year}")]
    EmptySelection {
        /// The selected region.
        region: String,
        /// The selected year.
        year: i32,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
