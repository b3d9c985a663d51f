#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! District coordinate reference data and the left join onto score rows.
//!
//! Coordinates come from a static CSV (`REGION_NAME, LAT, LON`) loaded
//! once per process. The join is exact string equality on the district
//! name: case- and whitespace-sensitive, with no fuzzy matching. Formatting
//! mismatches between the two sources surface as an unmatched count for
//! the caller to warn about, never as an error and never as a dropped
//! row.

use std::collections::HashMap;
use std::path::Path;

use gentrimap_score_models::{CoordinateRecord, ScoreRecord};

/// Errors from loading the coordinate reference file.
#[derive(Debug, thiserror::Error)]
pub enum GeographyError {
    /// The reference file could not be opened or read.
    #[error("Failed to read coordinate file: {0}")]
    Io(#[from] std::io::Error),

    /// The reference file is not valid CSV.
    #[error("Invalid coordinate CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A score row with its joined coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedScore {
    /// The score row, unchanged.
    pub record: ScoreRecord,
    /// Latitude, `None` when the region had no coordinate match.
    pub lat: Option<f64>,
    /// Longitude, `None` when the region had no coordinate match.
    pub lon: Option<f64>,
}

/// The result of joining score rows onto coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedScores {
    /// Every input row, in input order, with coordinates where matched.
    pub rows: Vec<MappedScore>,
    /// How many rows found no coordinate match (each counted once).
    pub unmatched: usize,
}

/// Loads the coordinate reference CSV.
///
/// Rows whose `LAT`/`LON` fail to parse are skipped with a warning; a
/// partially usable reference file still renders a partial map.
///
/// # Errors
///
/// Returns [`GeographyError`] if the file cannot be read or its header is
/// not valid CSV.
pub fn load_coordinates(path: &Path) -> Result<Vec<CoordinateRecord>, GeographyError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut coordinates = Vec::new();

    for result in reader.deserialize::<CoordinateRecord>() {
        match result {
            Ok(record) => coordinates.push(record),
            Err(e) => log::warn!("Skipping malformed coordinate row: {e}"),
        }
    }

    log::info!(
        "Loaded {} coordinate rows from {}",
        coordinates.len(),
        path.display()
    );

    Ok(coordinates)
}

/// Left-joins score rows onto coordinates by exact region name.
///
/// Every input row is retained. Rows without a match carry `None`
/// coordinates and are counted in [`JoinedScores::unmatched`] so the
/// caller can warn the user; the join itself never fails on a mismatch.
#[must_use]
pub fn join_coordinates(rows: Vec<ScoreRecord>, coordinates: &[CoordinateRecord]) -> JoinedScores {
    let by_region: HashMap<&str, &CoordinateRecord> = coordinates
        .iter()
        .map(|c| (c.region_name.as_str(), c))
        .collect();

    let mut unmatched = 0usize;
    let joined = rows
        .into_iter()
        .map(|record| {
            let coordinate = by_region.get(record.region_name.as_str());
            if coordinate.is_none() {
                unmatched += 1;
            }
            MappedScore {
                lat: coordinate.map(|c| c.lat),
                lon: coordinate.map(|c| c.lon),
                record,
            }
        })
        .collect();

    JoinedScores {
        rows: joined,
        unmatched,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Write as _;

    use super::*;

    fn score(region: &str) -> ScoreRecord {
        ScoreRecord {
            region_name: region.to_string(),
            month: None,
            final_score: Some(0.5),
            danger_level: None,
            indicators: BTreeMap::new(),
        }
    }

    fn coordinate(region: &str, lat: f64, lon: f64) -> CoordinateRecord {
        CoordinateRecord {
            region_name: region.to_string(),
            lat,
            lon,
        }
    }

    #[test]
    fn matched_rows_carry_coordinates() {
        let coords = vec![coordinate("중구", 37.5636, 126.9976)];
        let joined = join_coordinates(vec![score("중구")], &coords);

        assert_eq!(joined.unmatched, 0);
        assert_eq!(joined.rows[0].lat, Some(37.5636));
        assert_eq!(joined.rows[0].lon, Some(126.9976));
    }

    #[test]
    fn unmatched_rows_are_kept_and_counted_once() {
        let coords = vec![coordinate("중구", 37.5636, 126.9976)];
        let joined = join_coordinates(
            vec![score("중구"), score("영등포구"), score("영등포구")],
            &coords,
        );

        assert_eq!(joined.rows.len(), 3);
        assert_eq!(joined.unmatched, 2);
        assert_eq!(joined.rows[1].lat, None);
        assert_eq!(joined.rows[1].record.region_name, "영등포구");
    }

    #[test]
    fn join_is_exact_match_only() {
        // Trailing whitespace and case differences are mismatches by design.
        let coords = vec![coordinate("중구 ", 37.0, 127.0)];
        let joined = join_coordinates(vec![score("중구")], &coords);
        assert_eq!(joined.unmatched, 1);
    }

    #[test]
    fn loads_coordinate_csv_and_skips_bad_rows() {
        let mut file = tempfile_path();
        writeln!(file.1, "REGION_NAME,LAT,LON").unwrap();
        writeln!(file.1, "중구,37.5636,126.9976").unwrap();
        writeln!(file.1, "서초구,not-a-number,127.0").unwrap();
        writeln!(file.1, "영등포구,37.5264,126.8962").unwrap();
        file.1.flush().unwrap();

        let coords = load_coordinates(&file.0).unwrap();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[0].region_name, "중구");
        assert_eq!(coords[1].region_name, "영등포구");

        std::fs::remove_file(&file.0).ok();
    }

    fn tempfile_path() -> (std::path::PathBuf, std::fs::File) {
        let path = std::env::temp_dir().join(format!(
            "gentrimap_coords_{}_{}.csv",
            std::process::id(),
            std::thread::current().name().unwrap_or("test").replace("::", "_")
        ));
        let file = std::fs::File::create(&path).unwrap();
        (path, file)
    }
}
