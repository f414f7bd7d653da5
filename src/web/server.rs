use axum::body::Bytes;
use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::cli::{load_samples, ServeArgs};
use crate::core::document::Document;
use crate::matching::engine::MatchingConfig;
use crate::matching::scoring::leaf_count;
use crate::matching::service::MatchService;
use crate::matching::MatchError;
use crate::store::match_store::MatchStore;
use crate::utils::validation::{validate_document, validate_document_size, MAX_DOCUMENT_BYTES};

/// Default and maximum number of ranked targets returned by `/api/score`
pub const DEFAULT_RANK_LIMIT: usize = 10;
pub const MAX_RANK_LIMIT: usize = 100;

/// Shared application state
pub struct AppState {
    pub service: MatchService,
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Router settings that vary between deployments and tests
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Per-client rate limiting; needs the peer address from the connection
    pub rate_limit: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self { rate_limit: true }
    }
}

#[derive(Deserialize)]
struct ScoreParams {
    /// Number of ranked targets to return (default: 10, max: 100)
    limit: Option<usize>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    // Log detailed error server-side for debugging (not exposed to client)
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the samples cannot be loaded, the tokio runtime cannot
/// be created, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(service: MatchService, options: &RouterOptions) -> anyhow::Result<Router> {
    let state = Arc::new(AppState { service });

    let mut app = Router::new()
        .route("/document", post(submit_handler))
        .route("/api/matches", get(matches_handler))
        .route("/api/unmatched", get(unmatched_handler))
        .route("/api/samples", get(samples_handler))
        .route("/api/score", post(score_handler))
        .route("/api/stats", get(stats_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                // Limit concurrent requests to prevent DOS
                .layer(ConcurrencyLimitLayer::new(100))
                // Headroom above the document limit so oversized documents get a JSON error
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES + 64 * 1024)),
        );

    if options.rate_limit {
        // Configure IP-based rate limiting
        let governor_conf = GovernorConfigBuilder::default()
            .per_second(10) // 10 requests per second per IP
            .burst_size(50) // Allow bursts of 50 requests
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

        app = app.layer(GovernorLayer {
            config: Arc::new(governor_conf),
        });
    }

    // Security headers for browser protection
    let app = app.layer(
        ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-xss-protection"),
                HeaderValue::from_static("1; mode=block"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_static("max-age=31536000; includeSubDomains"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            )),
    );

    Ok(app)
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let catalog = load_samples(args.samples.as_deref())?;
    info!("Loaded {} samples", catalog.len());

    let store = Arc::new(MatchStore::new(Arc::new(catalog)));
    let service = MatchService::new(
        store,
        MatchingConfig {
            reconcile: args.reconcile,
        },
    );

    let options = RouterOptions {
        rate_limit: !args.no_rate_limit,
    };
    let app = create_router(service, &options)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting sample-matcher server at http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Check the body size and decode a request body into a document
fn decode_document(body: &[u8]) -> Result<Document, Response> {
    if let Err(e) = validate_document_size(body) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            create_safe_error_response("validation_error", &e.to_string(), None),
        ));
    }

    let document: Document = serde_json::from_slice(body).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                error: "Request body is not valid JSON".to_string(),
                error_type: "invalid_json".to_string(),
                details: Some(format!("line {}, column {}", e.line(), e.column())),
            },
        )
    })?;

    Ok(document)
}

/// Submit one document for matching
async fn submit_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let document = match decode_document(&body) {
        Ok(document) => document,
        Err(response) => return response,
    };

    // Scoring walks every stored document; keep it off the async workers
    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || service.submit(document)).await;

    match outcome {
        Ok(Ok(submission)) => (StatusCode::OK, Json(submission)).into_response(),
        Ok(Err(MatchError::NoMatchFound { record_id })) => error_response(
            StatusCode::NOT_FOUND,
            ErrorResponse {
                error: "No matching sample found".to_string(),
                error_type: "no_match".to_string(),
                details: Some(format!("Document filed as unmatched {record_id}")),
            },
        ),
        Ok(Err(MatchError::Invalid(e))) => error_response(
            StatusCode::BAD_REQUEST,
            create_safe_error_response("validation_error", &e.to_string(), None),
        ),
        Ok(Err(e)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            create_safe_error_response("store_error", "Failed to record match", Some(&e.to_string())),
        ),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            create_safe_error_response(
                "internal_error",
                "Matching did not complete",
                Some(&e.to_string()),
            ),
        ),
    }
}

/// Return the match index: sample id to matched documents
async fn matches_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(state.service.index()).into_response()
}

/// Return documents that matched nothing, in arrival order
async fn unmatched_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let unmatched = state.service.store().unmatched();
    Json(serde_json::json!({
        "count": unmatched.len(),
        "documents": unmatched,
    }))
}

/// Return list of samples
async fn samples_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let samples: Vec<serde_json::Value> = state
        .service
        .store()
        .samples()
        .iter()
        .map(|s| {
            serde_json::json!({
                "id": s.id,
                "leaf_count": leaf_count(s.document.as_value()),
                "document": s.document,
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": samples.len(),
        "samples": samples,
    }))
}

/// Rank targets for a document without storing it
async fn score_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScoreParams>,
    body: Bytes,
) -> Response {
    let document = match decode_document(&body) {
        Ok(document) => document,
        Err(response) => return response,
    };
    if let Err(e) = validate_document(&document) {
        return error_response(
            StatusCode::BAD_REQUEST,
            create_safe_error_response("validation_error", &e.to_string(), None),
        );
    }

    let limit = params
        .limit
        .unwrap_or(DEFAULT_RANK_LIMIT)
        .clamp(1, MAX_RANK_LIMIT);

    let service = state.service.clone();
    let ranked = tokio::task::spawn_blocking(move || service.explain(&document, limit)).await;

    match ranked {
        Ok(candidates) => Json(serde_json::json!({
            "count": candidates.len(),
            "candidates": candidates,
        }))
        .into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            create_safe_error_response(
                "internal_error",
                "Scoring did not complete",
                Some(&e.to_string()),
            ),
        ),
    }
}

/// Return record counts
async fn stats_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(state.service.store().stats()).into_response()
}
