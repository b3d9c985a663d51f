#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the gentrification dashboard pipeline.
//!
//! Runs the same data-shaping operations the API server exposes, straight
//! from a shell: dataset summary, per-district monthly time series, and
//! LLM report generation with the downloadable document written to disk.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gentrimap_ai::providers::create_provider_from_env;
use gentrimap_ai::report::generate_report;
use gentrimap_analytics::aggregate;
use gentrimap_score_models::Indicator;
use gentrimap_warehouse::{Dataset, WarehouseClient, WarehouseConfig, queries};

#[derive(Parser)]
#[command(name = "gentrimap_cli", about = "Gentrification risk dashboard tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print dataset shape, indicator statistics, and the null profile
    Summary,
    /// Print monthly mean scores for one district
    Timeseries {
        /// District name (e.g., "중구")
        region: String,
        /// Comma-separated indicator names to include (default: none)
        #[arg(long)]
        indicators: Option<String>,
    },
    /// Generate the narrative report for one district and year
    Report {
        /// District name (e.g., "영등포구")
        region: String,
        /// Calendar year (e.g., 2023)
        year: i32,
        /// Write the downloadable document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = WarehouseConfig::from_env()?;
    let client = Arc::new(WarehouseClient::connect(config).await?);

    match cli.command {
        Commands::Summary => {
            let rows = queries::fetch_score_table(&client, Dataset::Full).await?;

            let regions: std::collections::BTreeSet<&str> =
                rows.iter().map(|r| r.region_name.as_str()).collect();
            println!("Rows: {}", rows.len());
            println!("Districts: {}", regions.len());
            println!();

            println!("{:<16} {:>8} {:>8} {:>8} {:>9}", "indicator", "mean", "min", "max", "non-null");
            for stats in aggregate::indicator_stats(&rows, Indicator::ALL) {
                println!(
                    "{:<16} {:>8} {:>8} {:>8} {:>9}",
                    stats.indicator.column(),
                    fmt_opt(stats.mean),
                    fmt_opt(stats.min),
                    fmt_opt(stats.max),
                    stats.non_null
                );
            }
            println!();

            println!("{:<16} {:>6} {:>7}", "column", "nulls", "null %");
            for column in aggregate::null_profile(&rows) {
                println!(
                    "{:<16} {:>6} {:>6.1}%",
                    column.column, column.null_count, column.null_pct
                );
            }
        }
        Commands::Timeseries { region, indicators } => {
            let rows = queries::fetch_score_table(&client, Dataset::Full).await?;
            let indicators = parse_indicators(indicators.as_deref());

            let means = aggregate::monthly_means(&rows, &indicators, Some(&region));
            if means.is_empty() {
                log::warn!("No rows for district {region}");
                return Ok(());
            }

            for bucket in means {
                let mut line = format!(
                    "{}  score {}",
                    bucket.month.format("%Y-%m"),
                    fmt_opt(bucket.mean_final_score)
                );
                for (indicator, mean) in &bucket.indicator_means {
                    line.push_str(&format!("  {} {}", indicator, fmt_opt(*mean)));
                }
                println!("{line} ({} rows)", bucket.row_count);
            }
        }
        Commands::Report { region, year, out } => {
            let rows = queries::fetch_score_table(&client, Dataset::Strict).await?;

            let provider = create_provider_from_env(Some(Arc::clone(&client)))?;
            log::info!("Generating report via {}", provider.name());

            let report = generate_report(provider.as_ref(), &rows, &region, year).await?;
            let download = gentrimap_export::report_download(&report);

            if let Some(path) = out {
                std::fs::write(&path, &download.bytes)?;
                println!("Wrote {} ({} bytes)", path.display(), download.bytes.len());
            } else {
                println!("{}", gentrimap_export::render_text(&report));
            }
        }
    }

    Ok(())
}

fn parse_indicators(raw: Option<&str>) -> Vec<Indicator> {
    raw.map_or_else(Vec::new, |s| {
        s.split(',').filter_map(|i| i.trim().parse().ok()).collect()
    })
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}
