//! HTTP API for dashboard state, health checks and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use sense_lib::{
    health::HealthRegistry, ComponentStatus, DashboardState, RefreshCycle, SenseError,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    dashboard: Arc<RwLock<DashboardState>>,
    refresh: Arc<Mutex<RefreshCycle>>,
}

impl AppState {
    pub fn new(health_registry: HealthRegistry, refresh: RefreshCycle) -> Self {
        let dashboard = DashboardState {
            timeframe: refresh.timeframe(),
            ..Default::default()
        };
        Self {
            health_registry,
            dashboard: Arc::new(RwLock::new(dashboard)),
            refresh: Arc::new(Mutex::new(refresh)),
        }
    }

    /// Current published state
    pub async fn dashboard(&self) -> DashboardState {
        self.dashboard.read().await.clone()
    }

    /// Run one refresh and publish its state
    ///
    /// Refreshes are serialized. On failure the previous metrics and
    /// signals stay published and the feed is marked unhealthy.
    pub async fn refresh(&self) -> Result<DashboardState, SenseError> {
        let mut cycle = self.refresh.lock().await;

        {
            let mut dashboard = self.dashboard.write().await;
            *dashboard = DashboardState::ingesting(&dashboard);
        }

        match cycle.run() {
            Ok(state) => {
                if let Some(at) = state.last_ingestion {
                    self.health_registry.record_refresh(at).await;
                }
                *self.dashboard.write().await = state.clone();
                Ok(state)
            }
            Err(e) => {
                self.health_registry
                    .record_refresh_failure(e.to_string())
                    .await;
                self.dashboard.write().await.is_ingesting = false;
                Err(e)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check - 200 once a refresh has succeeded
async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn prometheus_metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard().await)
}

async fn get_signals(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard().await.signals)
}

async fn get_snapshots(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard().await.metrics)
}

async fn post_refresh(State(state): State<AppState>) -> Response {
    match state.refresh().await {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(prometheus_metrics))
        .route("/api/v1/state", get(get_state))
        .route("/api/v1/signals", get(get_signals))
        .route("/api/v1/metrics", get(get_snapshots))
        .route("/api/v1/refresh", post(post_refresh))
        .with_state(state)
}

/// Start the API server, stopping on the shutdown signal
pub async fn serve(
    port: u16,
    state: AppState,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    Ok(())
}
