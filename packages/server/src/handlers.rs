//! HTTP handler functions for the dashboard API.
//!
//! Handlers load the cached score table, shape it with the analytics
//! crate, and map every failure to a user-facing message at the boundary:
//! warehouse failures become 503 "data unavailable", an empty report
//! selection becomes 422 (user-correctable), and completion failures
//! become 502 with no partial report.

use std::collections::{BTreeMap, BTreeSet};

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::NaiveDate;
use gentrimap_ai::AiError;
use gentrimap_ai::report::generate_report;
use gentrimap_analytics::{aggregate, month};
use gentrimap_geography::join_coordinates;
use gentrimap_score_models::{CoordinateRecord, DangerLevel, Indicator, ScoreRecord};
use gentrimap_server_models::{
    ApiDownload, ApiError, ApiHealth, ApiMapPoint, ApiMonthlyPoint, MapQueryParams, MapResponse,
    RegionsResponse, ReportRequest, ReportResponse, SummaryResponse, TimeSeriesQueryParams,
    TimeSeriesResponse,
};
use gentrimap_warehouse::{Dataset, WarehouseError};
use uuid::Uuid;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/summary`
///
/// Dataset shape, whole-table indicator statistics, and the null profile.
pub async fn summary(state: web::Data<AppState>) -> HttpResponse {
    let rows = match state.cache.get(&state.warehouse, Dataset::Full).await {
        Ok(rows) => rows,
        Err(e) => return data_unavailable(&e),
    };

    HttpResponse::Ok().json(build_summary(&rows))
}

/// `GET /api/timeseries`
///
/// Monthly mean final score and indicator values, ascending by month,
/// optionally filtered to one district.
pub async fn timeseries(
    state: web::Data<AppState>,
    params: web::Query<TimeSeriesQueryParams>,
) -> HttpResponse {
    let rows = match state.cache.get(&state.warehouse, Dataset::Full).await {
        Ok(rows) => rows,
        Err(e) => return data_unavailable(&e),
    };

    let indicators = parse_indicators(params.indicators.as_deref());
    let points = build_timeseries(&rows, &indicators, params.region.as_deref());

    HttpResponse::Ok().json(TimeSeriesResponse {
        region: params.region.clone(),
        points,
    })
}

/// `GET /api/map`
///
/// One month of the strict dataset joined onto district coordinates.
/// Districts without a coordinate match are included with null
/// coordinates and surfaced via the warning field.
pub async fn map(state: web::Data<AppState>, params: web::Query<MapQueryParams>) -> HttpResponse {
    let rows = match state.cache.get(&state.warehouse, Dataset::Strict).await {
        Ok(rows) => rows,
        Err(e) => return data_unavailable(&e),
    };

    let target = params
        .month
        .as_deref()
        .and_then(month::normalize_str)
        .or_else(|| latest_month(&rows));

    HttpResponse::Ok().json(build_map(&rows, &state.coordinates, target))
}

/// `GET /api/regions`
///
/// Selector contents: district names sorted ascending, years newest
/// first.
pub async fn regions(state: web::Data<AppState>) -> HttpResponse {
    let rows = match state.cache.get(&state.warehouse, Dataset::Strict).await {
        Ok(rows) => rows,
        Err(e) => return data_unavailable(&e),
    };

    HttpResponse::Ok().json(build_regions(&rows))
}

/// `POST /api/report`
///
/// Generates the narrative report for one district and year, attaching
/// the downloadable document and, once per session, the cost notice.
pub async fn report(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ReportRequest>,
) -> HttpResponse {
    let session = session_id(&req);

    let rows = match state.cache.get(&state.warehouse, Dataset::Strict).await {
        Ok(rows) => rows,
        Err(e) => return data_unavailable(&e),
    };

    match generate_report(state.provider.as_ref(), &rows, &body.region, body.year).await {
        Ok(generated) => {
            let download = gentrimap_export::report_download(&generated);
            let response = ReportResponse {
                region: generated.region.clone(),
                year: generated.year,
                summary: generated.summary.clone(),
                generated_on: generated.generated_on,
                download: ApiDownload {
                    filename: download.filename,
                    mime: download.mime,
                    content: String::from_utf8_lossy(&download.bytes).into_owned(),
                },
                tip: state.sessions.cost_tip(session).map(str::to_string),
            };

            HttpResponse::Ok()
                .append_header(("X-Session-Id", session.to_string()))
                .json(response)
        }
        Err(AiError::EmptySelection { .. }) => {
            HttpResponse::UnprocessableEntity().json(ApiError {
                error: "선택한 조건에 맞는 데이터가 없습니다. 다른 지역 또는 연도를 선택해주세요."
                    .to_string(),
            })
        }
        Err(AiError::Warehouse(e)) => data_unavailable(&e),
        Err(e) => {
            log::error!("Report generation failed: {e}");
            HttpResponse::BadGateway().json(ApiError {
                error: "리포트 생성에 실패했습니다.".to_string(),
            })
        }
    }
}

/// `POST /api/refresh`
///
/// Drops the cached score tables so the next request reloads from the
/// warehouse.
pub async fn refresh(state: web::Data<AppState>) -> HttpResponse {
    state.cache.clear().await;
    log::info!("Score cache cleared");
    HttpResponse::NoContent().finish()
}

fn data_unavailable(e: &WarehouseError) -> HttpResponse {
    log::error!("Warehouse failure: {e}");
    HttpResponse::ServiceUnavailable().json(ApiError {
        error: "데이터를 불러오지 못했습니다. 잠시 후 다시 시도해주세요.".to_string(),
    })
}

fn session_id(req: &HttpRequest) -> Uuid {
    req.headers()
        .get("X-Session-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(Uuid::new_v4)
}

fn parse_indicators(raw: Option<&str>) -> Vec<Indicator> {
    raw.map_or_else(
        || Indicator::ALL.to_vec(),
        |s| s.split(',').filter_map(|i| i.trim().parse().ok()).collect(),
    )
}

fn latest_month(rows: &[ScoreRecord]) -> Option<NaiveDate> {
    rows.iter().filter_map(|r| r.month).max()
}

fn build_summary(rows: &[ScoreRecord]) -> SummaryResponse {
    let regions: BTreeSet<&str> = rows.iter().map(|r| r.region_name.as_str()).collect();
    let months: Vec<NaiveDate> = rows.iter().filter_map(|r| r.month).collect();

    SummaryResponse {
        row_count: rows.len(),
        region_count: regions.len(),
        first_month: months.iter().min().copied(),
        last_month: months.iter().max().copied(),
        indicator_stats: aggregate::indicator_stats(rows, Indicator::ALL),
        null_profile: aggregate::null_profile(rows),
    }
}

fn build_timeseries(
    rows: &[ScoreRecord],
    indicators: &[Indicator],
    region: Option<&str>,
) -> Vec<ApiMonthlyPoint> {
    let dominant: BTreeMap<NaiveDate, Option<DangerLevel>> =
        aggregate::dominant_level_by_month(rows, region)
            .into_iter()
            .map(|d| (d.month, d.dominant_level))
            .collect();

    aggregate::monthly_means(rows, indicators, region)
        .into_iter()
        .map(|m| ApiMonthlyPoint {
            month: m.month.format("%Y-%m").to_string(),
            mean_final_score: m.mean_final_score,
            indicator_means: m.indicator_means,
            dominant_level: dominant.get(&m.month).copied().flatten(),
            row_count: m.row_count,
        })
        .collect()
}

fn build_map(
    rows: &[ScoreRecord],
    coordinates: &[CoordinateRecord],
    target: Option<NaiveDate>,
) -> MapResponse {
    let selected: Vec<ScoreRecord> = target.map_or_else(Vec::new, |m| {
        rows.iter().filter(|r| r.month == Some(m)).cloned().collect()
    });

    let joined = join_coordinates(selected, coordinates);
    let unmatched = joined.unmatched;

    let points: Vec<ApiMapPoint> = joined
        .rows
        .into_iter()
        .map(|m| ApiMapPoint {
            region_name: m.record.region_name,
            lat: m.lat,
            lon: m.lon,
            final_score: m.record.final_score,
            danger_level: m.record.danger_level,
        })
        .collect();

    MapResponse {
        month: target.map(|m| m.format("%Y-%m").to_string()),
        points,
        unmatched_regions: unmatched,
        warning: (unmatched > 0).then(|| {
            format!("좌표가 누락된 지역이 {unmatched}개 있습니다. 지도에 표시되지 않을 수 있습니다.")
        }),
    }
}

fn build_regions(rows: &[ScoreRecord]) -> RegionsResponse {
    let regions: BTreeSet<String> = rows.iter().map(|r| r.region_name.clone()).collect();
    let years: BTreeSet<i32> = rows.iter().filter_map(ScoreRecord::year).collect();

    RegionsResponse {
        regions: regions.into_iter().collect(),
        years: years.into_iter().rev().collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn row(region: &str, year: i32, month_num: u32, score: Option<f64>) -> ScoreRecord {
        ScoreRecord {
            region_name: region.to_string(),
            month: NaiveDate::from_ymd_opt(year, month_num, 1),
            final_score: score,
            danger_level: Some(DangerLevel::Medium),
            indicators: BTreeMap::new(),
        }
    }

    fn coordinate(region: &str) -> CoordinateRecord {
        CoordinateRecord {
            region_name: region.to_string(),
            lat: 37.5,
            lon: 127.0,
        }
    }

    #[test]
    fn summary_counts_regions_and_months() {
        let rows = vec![
            row("중구", 2023, 1, Some(0.4)),
            row("중구", 2023, 2, Some(0.5)),
            row("서초구", 2023, 1, None),
        ];

        let summary = build_summary(&rows);
        assert_eq!(summary.row_count, 3);
        assert_eq!(summary.region_count, 2);
        assert_eq!(summary.first_month, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(summary.last_month, NaiveDate::from_ymd_opt(2023, 2, 1));
    }

    #[test]
    fn indicator_param_parsing() {
        assert_eq!(parse_indicators(None).len(), Indicator::ALL.len());
        assert_eq!(
            parse_indicators(Some("price, mobility")),
            vec![Indicator::Price, Indicator::Mobility]
        );
        // Unknown names are dropped rather than failing the request.
        assert_eq!(
            parse_indicators(Some("price,unknown")),
            vec![Indicator::Price]
        );
    }

    #[test]
    fn timeseries_points_are_ascending_with_dominant_levels() {
        let rows = vec![
            row("중구", 2023, 3, Some(0.7)),
            row("중구", 2023, 1, Some(0.4)),
            row("중구", 2023, 2, Some(0.5)),
        ];

        let points = build_timeseries(&rows, &[], Some("중구"));
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].month, "2023-01");
        assert_eq!(points[2].month, "2023-03");
        assert!(points.iter().all(|p| p.dominant_level == Some(DangerLevel::Medium)));
    }

    #[test]
    fn map_defaults_keep_unmatched_rows_and_warn() {
        let rows = vec![
            row("중구", 2023, 5, Some(0.5)),
            row("영등포구", 2023, 5, Some(0.7)),
        ];
        let coordinates = vec![coordinate("중구")];

        let response = build_map(&rows, &coordinates, latest_month(&rows));
        assert_eq!(response.month.as_deref(), Some("2023-05"));
        assert_eq!(response.points.len(), 2);
        assert_eq!(response.unmatched_regions, 1);
        assert!(response.warning.is_some());

        let unmatched = response
            .points
            .iter()
            .find(|p| p.region_name == "영등포구")
            .unwrap();
        assert_eq!(unmatched.lat, None);
        assert_eq!(unmatched.final_score, Some(0.7));
    }

    #[test]
    fn map_without_any_months_is_empty_and_warning_free() {
        let mut unmonthed = row("중구", 2023, 5, Some(0.5));
        unmonthed.month = None;

        let response = build_map(&[unmonthed], &[coordinate("중구")], None);
        assert_eq!(response.month, None);
        assert!(response.points.is_empty());
        assert_eq!(response.unmatched_regions, 0);
        assert_eq!(response.warning, None);
    }

    #[test]
    fn regions_sorted_and_years_newest_first() {
        let rows = vec![
            row("중구", 2022, 1, None),
            row("서초구", 2023, 1, None),
            row("영등포구", 2024, 1, None),
        ];

        let response = build_regions(&rows);
        assert_eq!(response.regions, vec!["서초구", "영등포구", "중구"]);
        assert_eq!(response.years, vec![2024, 2023, 2022]);
    }
}
