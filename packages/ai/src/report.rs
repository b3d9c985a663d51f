//! Report generation orchestration.
//!
//! Filters the loaded score table to one region and calendar year, builds
//! the prompt, and runs the completion. A failed completion surfaces as
//! an error with no partial report.

use chrono::NaiveDate;
use gentrimap_score_models::ScoreRecord;

use crate::prompt::build_report_prompt;
use crate::providers::LlmProvider;
use crate::AiError;

/// A generated narrative report for one region and year.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionReport {
    /// The district the report covers.
    pub region: String,
    /// The calendar year the report covers.
    pub year: i32,
    /// The generated summary text.
    pub summary: String,
    /// The date the report was generated.
    pub generated_on: NaiveDate,
}

/// Selects the rows for one region and calendar year, chronologically
/// ordered. Rows whose month failed to normalize have no year and are
/// never selected.
#[must_use]
pub fn filter_region_year(rows: &[ScoreRecord], region: &str, year: i32) -> Vec<ScoreRecord> {
    let mut selected: Vec<ScoreRecord> = rows
        .iter()
        .filter(|r| r.region_name == region && r.year() == Some(year))
        .cloned()
        .collect();
    selected.sort_by_key(|r| r.month);
    selected
}

/// Generates the narrative report for one region and year.
///
/// # Errors
///
/// Returns [`AiError::EmptySelection`] when the selection has no data
/// rows, or any other [`AiError`] when the completion call fails. No
/// partial report is produced.
pub async fn generate_report(
    provider: &dyn LlmProvider,
    rows: &[ScoreRecord],
    region: &str,
    year: i32,
) -> Result<RegionReport, AiError> {
    let selected = filter_region_year(rows, region, year);
    let prompt = build_report_prompt(&selected, region, year)?;

    log::info!(
        "Generating report for {region} {year} ({} rows) via {}",
        selected.len(),
        provider.name()
    );

    let summary = provider.complete(&prompt).await?;

    Ok(RegionReport {
        region: region.to_string(),
        year,
        summary,
        generated_on: chrono::Local::now().date_naive(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use gentrimap_score_models::DangerLevel;

    use super::*;

    struct CannedProvider {
        reply: &'static str,
    }

    #[async_trait::async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(self.reply.to_string())
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn row(region: &str, year: i32, month: u32) -> ScoreRecord {
        ScoreRecord {
            region_name: region.to_string(),
            month: NaiveDate::from_ymd_opt(year, month, 1),
            final_score: Some(0.5),
            danger_level: Some(DangerLevel::Medium),
            indicators: BTreeMap::new(),
        }
    }

    #[test]
    fn filter_selects_one_region_and_year_in_order() {
        let rows = vec![
            row("중구", 2023, 12),
            row("중구", 2023, 1),
            row("중구", 2022, 6),
            row("서초구", 2023, 3),
        ];

        let selected = filter_region_year(&rows, "중구", 2023);
        assert_eq!(selected.len(), 2);
        assert_eq!(
            selected[0].month,
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(
            selected[1].month,
            NaiveDate::from_ymd_opt(2023, 12, 1)
        );
    }

    #[test]
    fn filter_skips_rows_without_a_month() {
        let mut unmonthed = row("중구", 2023, 1);
        unmonthed.month = None;

        let selected = filter_region_year(&[unmonthed], "중구", 2023);
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn generates_a_report_from_the_provider_text() {
        let provider = CannedProvider {
            reply: "요약 본문",
        };
        let rows = vec![row("중구", 2023, 5)];

        let report = generate_report(&provider, &rows, "중구", 2023)
            .await
            .unwrap();
        assert_eq!(report.region, "중구");
        assert_eq!(report.year, 2023);
        assert_eq!(report.summary, "요약 본문");
    }

    #[tokio::test]
    async fn empty_selection_short_circuits_before_the_provider() {
        let provider = CannedProvider { reply: "unused" };
        let err = generate_report(&provider, &[], "중구", 2023)
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::EmptySelection { .. }));
    }
}
