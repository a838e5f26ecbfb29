//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use vendorscope_core::{ClassificationResult, CompanyIdentity, MatchType};

use crate::engine::{RunError, UsageEngine};

/// Largest accepted request body; larger ones fail JSON extraction and get
/// a 400 like any other malformed body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<UsageEngine>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(engine: UsageEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/v1/usage-checks", post(usage_check))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Company identity as submitted by clients
#[derive(Debug, Default, Deserialize)]
pub struct UsageCheckRequest {
    /// Internal record id; enables caching and status updates
    #[serde(default)]
    pub company_id: Option<String>,

    #[serde(default)]
    pub company_name: Option<String>,

    #[serde(default, alias = "cnpj")]
    pub tax_id: Option<String>,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub industry: Option<String>,
}

impl From<UsageCheckRequest> for CompanyIdentity {
    fn from(req: UsageCheckRequest) -> Self {
        CompanyIdentity {
            record_id: req.company_id,
            name: req.company_name,
            tax_id: req.tax_id,
            domain: req.domain,
            industry: req.industry,
        }
    }
}

/// Run a usage check for one company
async fn usage_check(
    State(state): State<AppState>,
    payload: Result<Json<UsageCheckRequest>, JsonRejection>,
) -> Result<Json<ClassificationResult>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let company = CompanyIdentity::from(req);
    info!(
        company = %company.display_name(),
        record_id = company.record_id.as_deref().unwrap_or(""),
        "Received usage check request"
    );

    // Runs on its own task so a dropped connection does not cancel it
    let engine = state.engine.clone();
    let result = tokio::spawn(async move { engine.run(&company).await })
        .await
        .map_err(|e| AppError::Internal(format!("run task failed: {}", e)))??;

    Ok(Json(result))
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error handling
#[derive(Debug)]
enum AppError {
    InvalidRequest(String),
    Run(RunError),
    Internal(String),
}

impl From<RunError> for AppError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::InvalidInput(msg) => AppError::InvalidRequest(msg),
            other => AppError::Run(other),
        }
    }
}

/// Evidence gathered before a run stopped; already persisted by the engine
fn partial_results(partial: &ClassificationResult) -> serde_json::Value {
    let count = |tier: MatchType| {
        partial
            .evidences
            .iter()
            .filter(|e| e.match_type == tier)
            .count()
    };
    json!({
        "evidences": partial.evidences,
        "tripleMatches": count(MatchType::Triple),
        "doubleMatches": count(MatchType::Double),
        "saved": true,
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Run(RunError::Timeout { partial }) => (
                StatusCode::GATEWAY_TIMEOUT,
                json!({
                    "error": "Usage check timed out; partial results were saved",
                    "status": "timeout",
                    "partialResults": partial_results(&partial),
                }),
            ),
            AppError::Run(RunError::Failed { message, partial }) => {
                error!(error = %message, "Usage check failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": message,
                        "status": "error",
                        "partialResults": partial_results(&partial),
                    }),
                )
            }
            AppError::Run(RunError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::Run(RunError::Config(msg)) | AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };

        (status, Json(body)).into_response()
    }
}
