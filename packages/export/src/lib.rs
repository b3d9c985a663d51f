#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Downloadable document formatting for generated reports.
//!
//! Produces a UTF-8 plain-text document: a fixed header (title, region,
//! year, generation date) followed by the summary body. UTF-8 end to end;
//! report bodies are Korean, so a single-byte document encoding cannot
//! represent them. Handing the bytes to a browser download or a file on disk is
//! the caller's concern; this crate only builds the payload.

use std::fmt::Write as _;

use gentrimap_ai::report::RegionReport;
use serde::{Deserialize, Serialize};

/// MIME type of the exported document.
pub const REPORT_MIME: &str = "text/plain; charset=utf-8";

/// A file payload ready to be offered for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Download {
    /// Suggested file name.
    pub filename: String,
    /// MIME type of `bytes`.
    pub mime: String,
    /// Document content.
    pub bytes: Vec<u8>,
}

/// Renders a report as UTF-8 document text.
#[must_use]
pub fn render_text(report: &RegionReport) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "[ Gentrification Report ]");
    let _ = writeln!(text, "지역: {}", report.region);
    let _ = writeln!(text, "연도: {}", report.year);
    let _ = writeln!(text, "생성일: {}", report.generated_on.format("%Y-%m-%d"));
    let _ = writeln!(text);
    let _ = writeln!(text, "{}", report.summary.trim());
    text
}

/// Builds the downloadable document for a report.
#[must_use]
pub fn report_download(report: &RegionReport) -> Download {
    Download {
        filename: format!("{}_{}_젠트리피케이션_리포트.txt", report.region, report.year),
        mime: REPORT_MIME.to_string(),
        bytes: render_text(report).into_bytes(),
    }
}
