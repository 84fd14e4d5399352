// Transaction Classifier - Web Server
// REST API with Axum: classify endpoint, health check, service banner.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use transaction_classifier::{
    ClassificationRequest, ClassificationResult, ClassifierContext, ClassifierError,
    TransactionType,
};

/// Shared application state. The context is `None` when artifact loading
/// failed at startup: the process still serves, but reports degraded health
/// and refuses classification.
#[derive(Clone)]
struct AppState {
    classifier: Option<Arc<ClassifierContext>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    status: String,
    timestamp: String,
    request_id: String,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            status: "success".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            request_id: Uuid::new_v4().to_string(),
            data,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    timestamp: String,
    detail: String,
}

impl ErrorResponse {
    fn new(detail: String) -> Self {
        Self {
            status: "error".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            detail,
        }
    }
}

/// Wire form of a classification request. The type field is validated here
/// so the core only ever sees the two recognized values.
#[derive(Deserialize)]
struct ClassifyBody {
    text: String,
    #[serde(rename = "type", default)]
    transaction_type: Option<String>,
}

/// Wire form of the result, flattened for API consumers.
#[derive(Serialize)]
struct ClassifyResponse {
    category: String,
    #[serde(rename = "type")]
    transaction_type: String,
    confidence: f32,
    explanation: String,
    source: transaction_classifier::Source,
    suggestions: Vec<Suggestion>,
}

#[derive(Serialize)]
struct Suggestion {
    category: String,
    confidence: f32,
}

impl From<ClassificationResult> for ClassifyResponse {
    fn from(result: ClassificationResult) -> Self {
        Self {
            category: result.category.name.clone(),
            transaction_type: result.category.kind.as_str().to_string(),
            confidence: result.confidence,
            explanation: result.explanation,
            source: result.source,
            suggestions: result
                .suggestions
                .into_iter()
                .map(|(category, confidence)| Suggestion {
                    category: category.name,
                    confidence,
                })
                .collect(),
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// POST /api/v1/classify - Classify one transaction description
async fn classify(
    State(state): State<AppState>,
    Json(body): Json<ClassifyBody>,
) -> impl IntoResponse {
    let Some(context) = state.classifier else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Model not loaded".to_string())),
        )
            .into_response();
    };

    // Presentation-layer validation: empty type strings mean "absent",
    // anything unrecognized is a 422.
    let requested_type = match body.transaction_type.as_deref() {
        None => None,
        Some(raw) if raw.trim().is_empty() => None,
        Some(raw) => match TransactionType::parse(raw) {
            Some(kind) => Some(kind),
            None => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ErrorResponse::new(format!(
                        "Unknown transaction type: {}",
                        raw
                    ))),
                )
                    .into_response();
            }
        },
    };

    let request = ClassificationRequest::new(&body.text, requested_type);
    match context.decide(&request) {
        Ok(result) => {
            (StatusCode::OK, Json(ApiResponse::ok(ClassifyResponse::from(result))))
                .into_response()
        }
        Err(ClassifierError::Validation(message)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(message)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "classification failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/v1/health - Health check, degraded when artifacts are missing
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let model_loaded = state.classifier.is_some();
    Json(json!({
        "status": if model_loaded { "ok" } else { "degraded" },
        "timestamp": Utc::now().to_rfc3339(),
        "components": {
            "model": if model_loaded { "healthy" } else { "unavailable" },
            "api": "healthy"
        },
        "version": transaction_classifier::VERSION,
    }))
}

/// GET / - Service banner
async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Transaction Classifier API",
        "version": transaction_classifier::VERSION,
    }))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model_dir = env::var("MODEL_DIR").unwrap_or_else(|_| "model_artifacts".to_string());

    // Startup loads everything once. A failure leaves the service up but
    // degraded instead of silently serving with absent state.
    let classifier = match ClassifierContext::from_model_dir(&model_dir) {
        Ok(context) => {
            tracing::info!(model_dir = %model_dir, "classifier context ready");
            Some(Arc::new(context))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load model artifacts, serving degraded");
            None
        }
    };

    let state = AppState { classifier };

    let api_routes = Router::new()
        .route("/classify", post(classify))
        .route("/health", get(health_check))
        .with_state(state.clone());

    let app = Router::new()
        .route("/", get(root))
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive());

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!(addr = %addr, "server running");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
