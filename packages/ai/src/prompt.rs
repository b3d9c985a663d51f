//! Report prompt construction.
//!
//! The prompt is a fixed Korean template: a header naming the region and
//! year, one data line per scored month, and an instruction block
//! requesting a bounded-length policy report. The caller passes the
//! already-filtered, chronologically ordered rows for one region and one
//! calendar year.

use std::fmt::Write as _;

use gentrimap_score_models::ScoreRecord;

use crate::AiError;

/// Builds the report prompt for one region/year slice.
///
/// Each row becomes a `<YYYY-MM> - <region>: <score> (<level>)` line with
/// the score rounded to two decimals. Rows missing the month, score, or
/// level cannot be rendered as a data line and are skipped; if nothing
/// remains the selection is empty.
///
/// # Errors
///
/// Returns [`AiError::EmptySelection`] when no row yields a data line;
/// the condition is user-correctable, not a system failure.
pub fn build_report_prompt(
    rows: &[ScoreRecord],
    region: &str,
    year: i32,
) -> Result<String, AiError> {
    let lines: Vec<String> = rows.iter().filter_map(data_line).collect();

    if lines.is_empty() {
        return Err(AiError::EmptySelection {
            region: region.to_string(),
            year,
        });
    }

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "다음은 {year}년 동안 {region}의 월별 젠트리피케이션 위험도 데이터입니다."
    );
    let _ = writeln!(prompt, "각 항목은 [월 - 지역명: 점수 (등급)] 형식입니다.");
    let _ = writeln!(prompt);
    for line in &lines {
        let _ = writeln!(prompt, "{line}");
    }
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "이 데이터를 바탕으로 다음 항목을 포함한 정책 분석 보고서를 작성해주세요 (16~18줄 이내):"
    );
    let _ = writeln!(prompt, "1. 연중 평균 및 최고 위험도 수준과 해당 월");
    let _ = writeln!(prompt, "2. 점수 상승/하락 시기와 원인에 대한 추론");
    let _ = writeln!(prompt, "3. 유동인구, 매출, 폐업률 등 상권 변화 요소와의 관련성");
    let _ = writeln!(prompt, "4. 자영업자 및 저소득층에 미치는 사회적 영향");
    let _ = writeln!(prompt, "5. 향후 정책 개입 또는 모니터링 방향 제언");
    let _ = writeln!(prompt);
    let _ = write!(
        prompt,
        "문체는 도시 정책 보고서처럼 전문적이고 신뢰성 있게 작성해주세요."
    );

    Ok(prompt)
}

/// Renders one row as a prompt data line, if it has the needed fields.
fn data_line(record: &ScoreRecord) -> Option<String> {
    let month = record.month_label()?;
    let score = record.final_score?;
    let level = record.danger_level?;
    Some(format!(
        "{month} - {}: {score:.2} ({})",
        record.region_name,
        level.label()
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;
    use gentrimap_score_models::DangerLevel;

    use super::*;

    fn row(region: &str, year: i32, month: u32, score: f64, level: DangerLevel) -> ScoreRecord {
        ScoreRecord {
            region_name: region.to_string(),
            month: NaiveDate::from_ymd_opt(year, month, 1),
            final_score: Some(score),
            danger_level: Some(level),
            indicators: BTreeMap::new(),
        }
    }

    #[test]
    fn renders_the_documented_data_line() {
        let rows = vec![row("중구", 2023, 5, 0.512, DangerLevel::Medium)];
        let prompt = build_report_prompt(&rows, "중구", 2023).unwrap();
        assert!(prompt.contains("2023-05 - 중구: 0.51 (보통)"));
    }

    #[test]
    fn lists_rows_in_input_order_with_header_and_instructions() {
        let rows = vec![
            row("영등포구", 2023, 1, 0.40, DangerLevel::Medium),
            row("영등포구", 2023, 2, 0.55, DangerLevel::Medium),
            row("영등포구", 2023, 3, 0.70, DangerLevel::High),
        ];
        let prompt = build_report_prompt(&rows, "영등포구", 2023).unwrap();

        assert!(prompt.starts_with("다음은 2023년 동안 영등포구의"));
        let jan = prompt.find("2023-01 - 영등포구: 0.40 (보통)").unwrap();
        let feb = prompt.find("2023-02 - 영등포구: 0.55 (보통)").unwrap();
        let mar = prompt.find("2023-03 - 영등포구: 0.70 (높음)").unwrap();
        assert!(jan < feb && feb < mar);
        assert!(prompt.contains("16~18줄 이내"));
        assert!(prompt.contains("정책 개입 또는 모니터링"));
    }

    #[test]
    fn empty_selection_is_signaled_not_rendered() {
        let err = build_report_prompt(&[], "중구", 2023).unwrap_err();
        assert!(matches!(
            err,
            AiError::EmptySelection { ref region, year: 2023 } if region == "중구"
        ));
    }

    #[test]
    fn rows_without_required_fields_yield_no_data_lines() {
        let mut incomplete = row("중구", 2023, 5, 0.5, DangerLevel::Medium);
        incomplete.final_score = None;

        let err = build_report_prompt(&[incomplete], "중구", 2023).unwrap_err();
        assert!(matches!(err, AiError::EmptySelection { .. }));
    }
}
