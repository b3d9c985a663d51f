//! Grouping and summary statistics over score rows.
//!
//! Monthly buckets are accumulated in a `BTreeMap` keyed by the
//! first-of-month date, so ascending chronological order falls out of
//! iteration. Rows whose month failed to normalize cannot be bucketed and
//! are skipped for grouping only; they still count toward the null
//! profile.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use gentrimap_analytics_models::{ColumnNulls, IndicatorStats, MonthlyDominantLevel, MonthlyMeans};
use gentrimap_score_models::{DangerLevel, Indicator, ScoreRecord};

/// Running sum and count for one mean.
#[derive(Debug, Default, Clone, Copy)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn matches_region(record: &ScoreRecord, region: Option<&str>) -> bool {
    region.is_none_or(|r| record.region_name == r)
}

/// Mean final score and indicator values per distinct month, ascending.
///
/// Each mean covers only the non-null values for that field within the
/// bucket; a month where every row is null for an indicator yields `None`
/// for that indicator, never zero. When `region` is given, only that
/// district's rows are aggregated.
#[must_use]
pub fn monthly_means(
    rows: &[ScoreRecord],
    indicators: &[Indicator],
    region: Option<&str>,
) -> Vec<MonthlyMeans> {
    struct Bucket {
        score: MeanAcc,
        indicators: BTreeMap<Indicator, MeanAcc>,
        row_count: usize,
    }

    let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();

    for record in rows {
        if !matches_region(record, region) {
            continue;
        }
        let Some(month) = record.month else {
            continue;
        };

        let bucket = buckets.entry(month).or_insert_with(|| Bucket {
            score: MeanAcc::default(),
            indicators: indicators.iter().map(|i| (*i, MeanAcc::default())).collect(),
            row_count: 0,
        });

        bucket.row_count += 1;
        bucket.score.push(record.final_score);
        for indicator in indicators {
            if let Some(acc) = bucket.indicators.get_mut(indicator) {
                acc.push(record.indicator(*indicator));
            }
        }
    }

    buckets
        .into_iter()
        .map(|(month, bucket)| MonthlyMeans {
            month,
            mean_final_score: bucket.score.mean(),
            indicator_means: bucket
                .indicators
                .into_iter()
                .map(|(indicator, acc)| (indicator, acc.mean()))
                .collect(),
            row_count: bucket.row_count,
        })
        .collect()
}

/// The most frequent danger level per distinct month, ascending.
///
/// Uses the statistical mode over non-null levels. When two levels tie
/// for the highest count, the lower level wins; the rule is deterministic
/// and independent of input order.
#[must_use]
pub fn dominant_level_by_month(
    rows: &[ScoreRecord],
    region: Option<&str>,
) -> Vec<MonthlyDominantLevel> {
    let mut buckets: BTreeMap<NaiveDate, BTreeMap<DangerLevel, usize>> = BTreeMap::new();

    for record in rows {
        if !matches_region(record, region) {
            continue;
        }
        let (Some(month), Some(level)) = (record.month, record.danger_level) else {
            continue;
        };
        *buckets.entry(month).or_default().entry(level).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(month, counts)| {
            // Ascending level iteration keeps the lower level on ties.
            let mut dominant: Option<(DangerLevel, usize)> = None;
            for (level, count) in counts {
                if dominant.is_none_or(|(_, best)| count > best) {
                    dominant = Some((level, count));
                }
            }
            MonthlyDominantLevel {
                month,
                dominant_level: dominant.map(|(level, _)| level),
            }
        })
        .collect()
}

/// Whole-table {mean, min, max} per indicator, nulls excluded.
#[must_use]
pub fn indicator_stats(rows: &[ScoreRecord], indicators: &[Indicator]) -> Vec<IndicatorStats> {
    indicators
        .iter()
        .map(|&indicator| {
            let mut acc = MeanAcc::default();
            let mut min: Option<f64> = None;
            let mut max: Option<f64> = None;

            for record in rows {
                if let Some(value) = record.indicator(indicator) {
                    acc.push(Some(value));
                    min = Some(min.map_or(value, |m| m.min(value)));
                    max = Some(max.map_or(value, |m| m.max(value)));
                }
            }

            IndicatorStats {
                indicator,
                mean: acc.mean(),
                min,
                max,
                non_null: acc.count,
            }
        })
        .collect()
}

/// Null count and percentage per column, sorted descending by percentage.
///
/// Covers every column of the score table (`REGION_NAME` included, though
/// it can never be null past decode). Equal percentages order by column
/// name so the output is stable.
#[must_use]
pub fn null_profile(rows: &[ScoreRecord]) -> Vec<ColumnNulls> {
    let total = rows.len();

    let mut columns: Vec<(String, usize)> = vec![
        (
            "REGION_NAME".to_string(),
            rows.iter().filter(|r| r.region_name.is_empty()).count(),
        ),
        (
            "MONTH".to_string(),
            rows.iter().filter(|r| r.month.is_none()).count(),
        ),
        (
            "FINAL_SCORE".to_string(),
            rows.iter().filter(|r| r.final_score.is_none()).count(),
        ),
        (
            "DANGER_LEVEL".to_string(),
            rows.iter().filter(|r| r.danger_level.is_none()).count(),
        ),
    ];

    for &indicator in Indicator::ALL {
        let nulls = rows
            .iter()
            .filter(|r| r.indicator(indicator).is_none())
            .count();
        columns.push((indicator.column().to_string(), nulls));
    }

    #[allow(clippy::cast_precision_loss)]
    let mut profile: Vec<ColumnNulls> = columns
        .into_iter()
        .map(|(column, null_count)| {
            let null_pct = if total == 0 {
                0.0
            } else {
                100.0 * null_count as f64 / total as f64
            };
            ColumnNulls {
                column,
                null_count,
                null_pct,
            }
        })
        .collect();

    profile.sort_by(|a, b| {
        b.null_pct
            .total_cmp(&a.null_pct)
            .then_with(|| a.column.cmp(&b.column))
    });

    profile
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn record(
        region: &str,
        month: Option<(i32, u32)>,
        score: Option<f64>,
        level: Option<DangerLevel>,
        mobility: Option<f64>,
    ) -> ScoreRecord {
        ScoreRecord {
            region_name: region.to_string(),
            month: month.and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1)),
            final_score: score,
            danger_level: level,
            indicators: BTreeMap::from([(Indicator::Mobility, mobility)]),
        }
    }

    #[test]
    fn monthly_means_average_non_null_values_only() {
        let rows = vec![
            record("중구", Some((2023, 2)), Some(0.6), None, Some(0.2)),
            record("중구", Some((2023, 2)), Some(0.4), None, None),
            record("중구", Some((2023, 1)), Some(0.3), None, None),
        ];

        let means = monthly_means(&rows, &[Indicator::Mobility], None);
        assert_eq!(means.len(), 2);

        // Ascending month order
        assert_eq!(means[0].month, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(means[1].month, NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());

        // February mobility averages only the single non-null value
        assert_eq!(means[1].indicator_means[&Indicator::Mobility], Some(0.2));
        assert!((means[1].mean_final_score.unwrap() - 0.5).abs() < 1e-9);

        // January mobility is all-null: None, not zero
        assert_eq!(means[0].indicator_means[&Indicator::Mobility], None);
        assert_eq!(means[0].row_count, 1);
    }

    #[test]
    fn monthly_means_respect_region_filter() {
        let rows = vec![
            record("중구", Some((2023, 1)), Some(0.8), None, None),
            record("서초구", Some((2023, 1)), Some(0.2), None, None),
        ];

        let means = monthly_means(&rows, &[], Some("서초구"));
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].mean_final_score, Some(0.2));
        assert_eq!(means[0].row_count, 1);
    }

    #[test]
    fn full_table_scenario_keeps_every_row() {
        // Three 영등포구 rows; February carries a null indicator.
        let rows = vec![
            record(
                "영등포구",
                Some((2023, 1)),
                Some(0.40),
                Some(DangerLevel::Medium),
                Some(0.1),
            ),
            record(
                "영등포구",
                Some((2023, 2)),
                Some(0.55),
                Some(DangerLevel::Medium),
                None,
            ),
            record(
                "영등포구",
                Some((2023, 3)),
                Some(0.70),
                Some(DangerLevel::High),
                Some(0.3),
            ),
        ];

        let stats = indicator_stats(&rows, &[Indicator::Mobility]);
        assert_eq!(stats[0].non_null, 2);
        assert!((stats[0].mean.unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(stats[0].min, Some(0.1));
        assert_eq!(stats[0].max, Some(0.3));

        let means = monthly_means(&rows, &[Indicator::Mobility], Some("영등포구"));
        assert_eq!(means.len(), 3);
        assert_eq!(means.iter().map(|m| m.row_count).sum::<usize>(), 3);
        assert!(means.windows(2).all(|w| w[0].month < w[1].month));
    }

    #[test]
    fn dominant_level_uses_mode() {
        let rows = vec![
            record("중구", Some((2023, 1)), None, Some(DangerLevel::High), None),
            record("중구", Some((2023, 1)), None, Some(DangerLevel::High), None),
            record("중구", Some((2023, 1)), None, Some(DangerLevel::Low), None),
        ];

        let dominant = dominant_level_by_month(&rows, None);
        assert_eq!(dominant.len(), 1);
        assert_eq!(dominant[0].dominant_level, Some(DangerLevel::High));
    }

    #[test]
    fn dominant_level_tie_breaks_to_lower_level() {
        let rows = vec![
            record("중구", Some((2023, 1)), None, Some(DangerLevel::High), None),
            record("중구", Some((2023, 1)), None, Some(DangerLevel::Low), None),
        ];

        let dominant = dominant_level_by_month(&rows, None);
        assert_eq!(dominant[0].dominant_level, Some(DangerLevel::Low));

        // Order-independent: reversed input gives the same answer.
        let reversed: Vec<_> = rows.into_iter().rev().collect();
        let dominant = dominant_level_by_month(&reversed, None);
        assert_eq!(dominant[0].dominant_level, Some(DangerLevel::Low));
    }

    #[test]
    fn null_profile_formula_and_ordering() {
        let rows = vec![
            record("중구", Some((2023, 1)), Some(0.5), Some(DangerLevel::Medium), None),
            record("중구", None, Some(0.6), Some(DangerLevel::Medium), Some(0.2)),
            record("중구", Some((2023, 2)), None, None, None),
            record("중구", Some((2023, 3)), Some(0.7), Some(DangerLevel::High), Some(0.4)),
        ];

        let profile = null_profile(&rows);
        let total = rows.len();

        for entry in &profile {
            #[allow(clippy::cast_precision_loss)]
            let expected = 100.0 * entry.null_count as f64 / total as f64;
            assert!((entry.null_pct - expected).abs() < 1e-9);
        }

        assert!(
            profile
                .windows(2)
                .all(|w| w[0].null_pct >= w[1].null_pct)
        );

        let month = profile.iter().find(|c| c.column == "MONTH").unwrap();
        assert_eq!(month.null_count, 1);
        assert!((month.null_pct - 25.0).abs() < 1e-9);

        // Indicators never set in the fixture are 100% null and sort first.
        assert!((profile[0].null_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn null_profile_of_empty_table_is_all_zero() {
        let profile = null_profile(&[]);
        assert!(profile.iter().all(|c| c.null_count == 0));
        assert!(profile.iter().all(|c| c.null_pct.abs() < f64::EPSILON));
    }
}
