//! HTTP API: `POST /api/evaluate` and the read-only algorithm catalog.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};

use recur_core::{Algorithm, AlgorithmCatalog, Evaluation, RecurError, RecurrenceParams};
use recur_store::SqliteStore;

use crate::config::WebConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ApiError {
    Recur(RecurError),
    Internal(String),
}

impl From<RecurError> for ApiError {
    fn from(e: RecurError) -> Self {
        Self::Recur(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Recur(ref err) => {
                let status = match err {
                    RecurError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
                    RecurError::NotFound(_) => StatusCode::NOT_FOUND,
                    RecurError::Duplicate(_) => StatusCode::CONFLICT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<SqliteStore>>,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Run a catalog query with the connection locked for its duration only.
    fn with_store<T>(&self, f: impl FnOnce(&SqliteStore) -> Result<T, RecurError>) -> ApiResult<T> {
        let store = self
            .store
            .lock()
            .map_err(|_| ApiError::Internal("catalog lock poisoned".into()))?;
        Ok(f(&store)?)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub a: i64,
    pub b: i64,
    pub k: i64,
}

async fn evaluate(Json(req): Json<EvaluateRequest>) -> ApiResult<Json<Evaluation>> {
    let params = RecurrenceParams::new(req.a, req.b, req.k)?;
    debug!("evaluate {params}");
    Ok(Json(params.evaluate()))
}

async fn list_algorithms(State(state): State<AppState>) -> ApiResult<Json<Vec<Algorithm>>> {
    Ok(Json(state.with_store(|s| s.list())?))
}

async fn get_algorithm(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Algorithm>> {
    state
        .with_store(|s| s.resolve(&id))?
        .map(Json)
        .ok_or(ApiError::Recur(RecurError::NotFound(id)))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let values = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(values)))
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/evaluate", post(evaluate))
        .route("/api/algorithms", get(list_algorithms))
        .route("/api/algorithms/{id}", get(get_algorithm))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl-C.
pub async fn serve(store: SqliteStore, config: &WebConfig) -> anyhow::Result<()> {
    let app = router(AppState::new(store), cors_layer(&config.allowed_origins)?);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl-C handler: {e}");
    }
}
