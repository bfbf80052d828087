// Poker Bankroll - Web Server
// Read-only JSON API over the session store

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use poker_bankroll::analytics::{bankroll_series, stats_by, BalancePoint, Dimension, GroupRow, SessionFilter, Summary};
use poker_bankroll::entities::{GameType, Location, Session};
use poker_bankroll::validation::{BatchSummary, DataQualityEngine, QualityReport};
use poker_bankroll::wellness::{load_data_dir, WellnessReport};
use poker_bankroll::{Config, DataStore};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<DataStore>>,
    data_dir: PathBuf,
}

impl AppState {
    fn lock(&self) -> Result<MutexGuard<'_, DataStore>, Response> {
        self.store
            .lock()
            .map_err(|_| error_response(StatusCode::INTERNAL_SERVER_ERROR, "store unavailable"))
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

/// Query-string filters shared by the session endpoints
#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    year: Option<i32>,
    game_type: Option<String>,
    location: Option<String>,
    stakes: Option<String>,
    tag: Option<String>,
}

impl FilterQuery {
    fn build(&self) -> Result<SessionFilter, Response> {
        let mut filter = SessionFilter::new();
        if let Some(from) = self.from {
            filter = filter.from_date(from);
        }
        if let Some(to) = self.to {
            filter = filter.to_date(to);
        }
        if let Some(year) = self.year {
            filter = filter.year(year);
        }
        if let Some(raw) = &self.game_type {
            let game_type = GameType::parse(raw).ok_or_else(|| {
                error_response(StatusCode::BAD_REQUEST, &format!("unknown game type: {}", raw))
            })?;
            filter = filter.game_type(game_type);
        }
        if let Some(location) = &self.location {
            filter = filter.location(location);
        }
        if let Some(stakes) = &self.stakes {
            filter = filter.stakes(stakes);
        }
        if let Some(tag) = &self.tag {
            filter = filter.tag(tag);
        }
        Ok(filter)
    }
}

/// Quality response
#[derive(Serialize)]
struct QualityResponse {
    summary: BatchSummary,
    reports: Vec<QualityReport>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

fn filtered_sessions(state: &AppState, query: &FilterQuery) -> Result<Vec<Session>, Response> {
    let filter = query.build()?;
    let store = state.lock()?;
    Ok(filter.apply(&store.all_sessions()))
}

/// GET /api/sessions - All sessions, oldest first
async fn get_sessions(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Response {
    match filtered_sessions(&state, &query) {
        Ok(sessions) => Json(ApiResponse::ok(sessions)).into_response(),
        Err(response) => response,
    }
}

/// GET /api/summary - Scalar statistics
async fn get_summary(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Response {
    match filtered_sessions(&state, &query) {
        Ok(sessions) => Json(ApiResponse::ok(Summary::from_sessions(&sessions))).into_response(),
        Err(response) => response,
    }
}

/// GET /api/stats/:dimension - Grouped statistics
async fn get_grouped_stats(
    State(state): State<AppState>,
    Path(dimension): Path<String>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let Some(dimension) = Dimension::parse(&dimension) else {
        return error_response(
            StatusCode::NOT_FOUND,
            &format!("unknown dimension: {}", dimension),
        );
    };

    match filtered_sessions(&state, &query) {
        Ok(sessions) => {
            let rows: Vec<GroupRow> = stats_by(dimension, &sessions);
            Json(ApiResponse::ok(rows)).into_response()
        }
        Err(response) => response,
    }
}

/// GET /api/bankroll/series - Running balance across every bankroll
async fn get_series(State(state): State<AppState>) -> Response {
    let store = match state.lock() {
        Ok(store) => store,
        Err(response) => return response,
    };

    let points: Vec<BalancePoint> = bankroll_series(&store.all_sessions(), &store.all_transactions());
    Json(ApiResponse::ok(points)).into_response()
}

/// GET /api/locations - Known locations
async fn get_locations(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(store) => {
            let locations: Vec<Location> = store.locations().to_vec();
            Json(ApiResponse::ok(locations)).into_response()
        }
        Err(response) => response,
    }
}

/// GET /api/quality - Data-quality reports for sessions with issues
async fn get_quality(State(state): State<AppState>) -> Response {
    let sessions = match state.lock() {
        Ok(store) => store.all_sessions(),
        Err(response) => return response,
    };

    let engine = DataQualityEngine::new();
    let reports = engine.check_all(&sessions);
    let summary = engine.batch_summary(&reports);

    Json(ApiResponse::ok(QualityResponse {
        summary,
        reports: reports.into_iter().filter(|r| !r.is_clean()).collect(),
    }))
    .into_response()
}

/// GET /api/wellness - Mood, sleep and mindfulness against results.
/// Sleep and mindfulness come from CSV files in the data directory.
async fn get_wellness(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Response {
    let sessions = match filtered_sessions(&state, &query) {
        Ok(sessions) => sessions,
        Err(response) => return response,
    };

    match load_data_dir(&state.data_dir) {
        Ok((sleep, mindfulness)) => {
            let report = WellnessReport::build(&sessions, &sleep, &mindfulness);
            Json(ApiResponse::ok(report)).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/sessions", get(get_sessions))
        .route("/summary", get(get_summary))
        .route("/stats/:dimension", get(get_grouped_stats))
        .route("/bankroll/series", get(get_series))
        .route("/locations", get(get_locations))
        .route("/quality", get(get_quality))
        .route("/wellness", get(get_wellness))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "poker_bankroll=info,tower_http=info,warn".into()),
        ))
        .init();

    println!("🌐 Poker Bankroll - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::load(None)?;
    let store = DataStore::open_configured(&config)?;
    println!(
        "✓ Data opened: {} ({} sessions)",
        config.data_dir.display(),
        store.all_sessions().len()
    );

    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        data_dir: config.data_dir.clone(),
    };
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/summary", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}
