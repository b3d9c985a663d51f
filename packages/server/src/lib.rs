#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the gentrification dashboard.
//!
//! Serves the REST API the dashboard frontend renders from: dataset
//! summary and data quality, monthly time series, the coordinate-joined
//! map view, and LLM report generation with a downloadable document.
//! The score table is loaded from the warehouse once per process and
//! cached until an explicit `/api/refresh`; every warehouse or LLM call
//! is a single awaited request with no retry and no cancellation.

mod handlers;
pub mod session;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use gentrimap_ai::providers::{LlmProvider, create_provider_from_env};
use gentrimap_score_models::{CoordinateRecord, ScoreRecord};
use gentrimap_warehouse::{Dataset, WarehouseClient, WarehouseConfig, WarehouseError, queries};
use tokio::sync::RwLock;

use crate::session::Sessions;

/// Default path of the district coordinate reference file.
pub const DEFAULT_COORDINATES_PATH: &str = "data/seoul_region_coordinates.csv";

/// Per-dataset cache of the loaded score table.
///
/// Loaded on first use and kept for the life of the process; `clear`
/// (the `/api/refresh` endpoint) drops both datasets so the next request
/// reloads. That is the entire invalidation policy.
#[derive(Default)]
pub struct ScoreCache {
    strict: RwLock<Option<Arc<Vec<ScoreRecord>>>>,
    full: RwLock<Option<Arc<Vec<ScoreRecord>>>>,
}

impl ScoreCache {
    fn slot(&self, dataset: Dataset) -> &RwLock<Option<Arc<Vec<ScoreRecord>>>> {
        match dataset {
            Dataset::Strict => &self.strict,
            Dataset::Full => &self.full,
        }
    }

    /// Returns the cached table for a dataset, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`] if the load fails; nothing is cached in
    /// that case.
    pub async fn get(
        &self,
        client: &WarehouseClient,
        dataset: Dataset,
    ) -> Result<Arc<Vec<ScoreRecord>>, WarehouseError> {
        let slot = self.slot(dataset);

        if let Some(rows) = slot.read().await.as_ref() {
            return Ok(Arc::clone(rows));
        }

        let mut guard = slot.write().await;
        if let Some(rows) = guard.as_ref() {
            return Ok(Arc::clone(rows));
        }

        let rows = Arc::new(queries::fetch_score_table(client, dataset).await?);
        *guard = Some(Arc::clone(&rows));
        Ok(rows)
    }

    /// Drops both cached datasets.
    pub async fn clear(&self) {
        *self.strict.write().await = None;
        *self.full.write().await = None;
    }
}

/// Shared application state.
pub struct AppState {
    /// Warehouse statement client.
    pub warehouse: Arc<WarehouseClient>,
    /// Text-completion provider for report generation.
    pub provider: Box<dyn LlmProvider>,
    /// District coordinate reference data, loaded once at startup.
    pub coordinates: Vec<CoordinateRecord>,
    /// Cached score tables.
    pub cache: ScoreCache,
    /// Per-session one-time notice state.
    pub sessions: Sessions,
}

/// Starts the dashboard API server.
///
/// Connects to the warehouse, loads the coordinate reference file,
/// builds the LLM provider from the environment, and serves the REST API
/// on `BIND_ADDR`/`PORT` (default `127.0.0.1:8080`). This is a regular
/// async function — the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an error if the HTTP server fails to bind or encounters a
/// runtime error.
///
/// # Panics
///
/// Panics if the warehouse configuration is invalid, the connection
/// fails, the coordinate file cannot be read, or no LLM provider can be
/// configured.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = WarehouseConfig::from_env().expect("Failed to load warehouse configuration");

    log::info!("Connecting to warehouse...");
    let warehouse = Arc::new(
        WarehouseClient::connect(config)
            .await
            .expect("Failed to connect to warehouse"),
    );

    let coordinates_path = PathBuf::from(
        std::env::var("GENTRIMAP_COORDINATES")
            .unwrap_or_else(|_| DEFAULT_COORDINATES_PATH.to_string()),
    );
    let coordinates = gentrimap_geography::load_coordinates(&coordinates_path)
        .expect("Failed to load coordinate reference file");

    let provider = create_provider_from_env(Some(Arc::clone(&warehouse)))
        .expect("Failed to configure LLM provider");
    log::info!("Report generation provider: {}", provider.name());

    let state = web::Data::new(AppState {
        warehouse,
        provider,
        coordinates,
        cache: ScoreCache::default(),
        sessions: Sessions::default(),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/summary", web::get().to(handlers::summary))
                    .route("/timeseries", web::get().to(handlers::timeseries))
                    .route("/map", web::get().to(handlers::map))
                    .route("/regions", web::get().to(handlers::regions))
                    .route("/report", web::post().to(handlers::report))
                    .route("/refresh", web::post().to(handlers::refresh)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
