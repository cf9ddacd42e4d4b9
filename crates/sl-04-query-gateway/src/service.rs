//! Query gateway service: router construction and the HTTP server loop.

use crate::domain::config::GatewayConfig;
use crate::domain::error::{ApiError, GatewayError};
use crate::domain::views::{render_table, StatsView, TableView};
use crate::middleware::{cleanup_task, create_cors_layer, RateLimitLayer, RateLimitState};
use axum::{
    extract::State,
    http::Uri,
    response::IntoResponse,
    routing::{get, MethodRouter},
    Json, Router,
};
use sl_02_stake_ledger::LedgerState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

const BUCKET_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);
const BUCKET_MAX_IDLE: Duration = Duration::from_secs(300);

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    /// Latest fully applied ledger state
    ledger: watch::Receiver<Arc<LedgerState>>,
    mask_addresses: bool,
}

impl AppState {
    fn snapshot(&self) -> Arc<LedgerState> {
        self.ledger.borrow().clone()
    }
}

/// Build the gateway router over a published ledger state.
pub fn build_router(
    config: &GatewayConfig,
    ledger: watch::Receiver<Arc<LedgerState>>,
) -> Result<Router, GatewayError> {
    build(config, ledger).map(|(router, _)| router)
}

fn build(
    config: &GatewayConfig,
    ledger: watch::Receiver<Arc<LedgerState>>,
) -> Result<(Router, Vec<Arc<RateLimitState>>), GatewayError> {
    config.validate()?;

    let state = AppState {
        ledger,
        mask_addresses: config.mask_addresses,
    };

    // Each route gets its own limiter, so budgets are per route.
    let mut limiters = Vec::new();
    let current_route = rate_limited(get(current_table), config, &mut limiters)?;
    let next_route = rate_limited(get(next_table), config, &mut limiters)?;
    let stats_route = rate_limited(get(stats), config, &mut limiters)?;

    let router = Router::new()
        .route("/current", current_route)
        .route("/next", next_route)
        .route("/stats", stats_route)
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(create_cors_layer(&config.cors))
        .with_state(state);

    Ok((router, limiters))
}

fn rate_limited(
    handler: MethodRouter<AppState>,
    config: &GatewayConfig,
    limiters: &mut Vec<Arc<RateLimitState>>,
) -> Result<MethodRouter<AppState>, GatewayError> {
    let layer = RateLimitLayer::new(config.rate_limit.clone())?;
    limiters.push(layer.state());
    Ok(handler.layer(layer))
}

/// Serve until `shutdown` flips to `true`.
pub async fn serve(
    config: GatewayConfig,
    ledger: watch::Receiver<Arc<LedgerState>>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), GatewayError> {
    let (router, limiters) = build(&config, ledger)?;

    let addr = config.http_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Bind(format!("{}: {}", addr, e)))?;
    info!(addr = %addr, "[sl-04] 🌐 Query gateway listening");

    let cleanup = tokio::spawn(cleanup_task(
        limiters,
        BUCKET_CLEANUP_INTERVAL,
        BUCKET_MAX_IDLE,
    ));

    let result = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        while !*shutdown.borrow_and_update() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }
        info!("[sl-04] Shutdown signal received");
    })
    .await
    .map_err(|e| GatewayError::Server(e.to_string()));

    cleanup.abort();
    info!("[sl-04] Query gateway stopped");
    result
}

/// Period table.
async fn current_table(State(state): State<AppState>) -> Json<TableView> {
    let ledger = state.snapshot();
    Json(render_table(&ledger.period, state.mask_addresses))
}

/// All-time table.
async fn next_table(State(state): State<AppState>) -> Json<TableView> {
    let ledger = state.snapshot();
    Json(render_table(&ledger.all_time, state.mask_addresses))
}

async fn stats(State(state): State<AppState>) -> Json<StatsView> {
    Json(StatsView::from_state(&state.snapshot()))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "query-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "height": state.snapshot().height,
    }))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}
