//! # Portico HTTP Service
//!
//! HTTP layer for the Portico multi-tenant booking portal.
//!
//! This crate provides:
//! - Tenant-context middleware that resolves the `Host` header once per
//!   request and attaches the result to request extensions
//! - Public tenant/services/availability endpoints
//! - A chat stub streaming server-sent events
//! - A signed booking-webhook endpoint (verify-before-parse)
//! - Health and metrics endpoints
//!
//! All domain logic lives in `portico-core`; this crate only adapts it to
//! HTTP.

pub mod chat;
pub mod config;
pub mod errors;
pub mod metrics;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod lib_tests;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::sse::{Event, Sse},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use bytes::Bytes;
use chat::{ChatSession, MemoryChatSessionStore};
use futures::stream;
use portico_core::{
    webhook::{parse_webhook_json, verify_signature, BookingWebhookPayload},
    TenantPublic, TenantRecord, TenantResolver,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

pub use config::{LoggingConfig, ServerConfig, ServiceConfig, TenancyConfig, WebhookConfig};
pub use errors::ApiError;
pub use metrics::ServiceMetrics;

/// Signature header sent by Cal.com webhook deliveries.
const CALCOM_SIGNATURE_HEADER: &str = "x-cal-signature-256";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: ServiceConfig,

    /// Resolver mapping request hostnames to tenants
    pub resolver: Arc<TenantResolver>,

    /// In-memory chat sessions for the assistant stub
    pub chat_sessions: Arc<MemoryChatSessionStore>,

    /// Metrics collector for observability
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: ServiceConfig,
        resolver: Arc<TenantResolver>,
        chat_sessions: Arc<MemoryChatSessionStore>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            config,
            resolver,
            chat_sessions,
            metrics,
        }
    }
}

/// The tenant owning the current request's hostname, if any.
///
/// Inserted into request extensions by [`tenant_context_middleware`]
/// before any tenant-scoped handler runs. `None` means the hostname is
/// valid but owned by nobody — handlers turn that into a 404, not a 500.
#[derive(Clone)]
pub struct ResolvedTenant(pub Option<Arc<TenantRecord>>);

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let tenant_routes = Router::new()
        .route("/v1/public/tenant", get(get_public_tenant))
        .route("/v1/public/services", get(get_public_services))
        .route("/v1/public/availability", get(get_availability))
        .route("/v1/chat/sessions", post(create_chat_session))
        .route("/v1/chat/stream", post(chat_stream))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_context_middleware,
        ));

    // Webhook routes stay outside the tenant context: deliveries are
    // addressed by provider, not by tenant hostname, and the handler
    // needs the raw body bytes with no interference.
    let webhook_routes = Router::new().route("/v1/webhooks/calcom", post(handle_calcom_webhook));

    let health_routes = Router::new()
        .route("/healthz", get(handle_health_check))
        .route("/readyz", get(handle_readiness_check));

    let observability_routes = Router::new().route("/metrics", get(metrics_endpoint));

    let router = Router::new()
        .merge(tenant_routes)
        .merge(webhook_routes)
        .merge(health_routes)
        .merge(observability_routes)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_logging_middleware,
        ));

    let router = if state.config.server.enable_compression {
        router.layer(CompressionLayer::new())
    } else {
        router
    };
    let router = if state.config.server.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

/// Start HTTP server
pub async fn start_server(
    config: ServiceConfig,
    resolver: Arc<TenantResolver>,
) -> Result<(), ServiceError> {
    let metrics = Arc::new(
        ServiceMetrics::new().map_err(|e| ServiceError::Configuration {
            message: format!("Failed to initialize metrics: {}", e),
        })?,
    );

    let state = AppState::new(
        config.clone(),
        resolver,
        Arc::new(MemoryChatSessionStore::new()),
        metrics,
    );
    let app = create_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: format!("{}:{}", config.server.host, config.server.port),
                message: e.to_string(),
            })?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting HTTP server"
    );

    let shutdown_timeout =
        std::time::Duration::from_secs(config.server.shutdown_timeout_seconds);

    let shutdown_signal = async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C signal handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
        }
    };

    // In-flight requests are allowed to complete; new connections are
    // refused as soon as the shutdown signal arrives.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolve the request's `Host` header to a tenant and attach the result
/// to request extensions.
///
/// Runs before every tenant-scoped handler. An absent tenant is a normal
/// outcome carried forward as `ResolvedTenant(None)`; a store fault aborts
/// the request with a generic 500 so an outage is never misread as a
/// missing tenant.
async fn tenant_context_middleware(
    State(state): State<AppState>,
    mut request: axum::extract::Request,
    next: Next,
) -> Result<Response, ApiError> {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());

    let tenant = state.resolver.resolve(host).await?;
    state.metrics.record_resolution(tenant.is_some());

    request.extensions_mut().insert(ResolvedTenant(tenant));
    Ok(next.run(request).await)
}

/// Request logging middleware with correlation ID tracking.
///
/// Extracts or generates a correlation ID, logs request completion with
/// structured fields, and propagates the ID through response headers.
#[instrument(skip(state, request, next), fields(
    method = %request.method(),
    uri = %request.uri(),
    correlation_id
))]
async fn request_logging_middleware(
    State(state): State<AppState>,
    mut request: axum::extract::Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::Span::current().record("correlation_id", correlation_id.as_str());
    request.extensions_mut().insert(correlation_id.clone());

    state.metrics.http_requests_total.inc();

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert("x-correlation-id", header_value);
    }

    let status = response.status();
    if status.is_server_error() {
        error!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        info!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed successfully"
        );
    }

    response
}

// ============================================================================
// Public Handlers
// ============================================================================

/// Public projection of the resolved tenant.
async fn get_public_tenant(
    Extension(tenant): Extension<ResolvedTenant>,
) -> Result<Json<TenantPublic>, ApiError> {
    let tenant = tenant.0.ok_or_else(ApiError::tenant_not_found)?;
    Ok(Json(tenant.to_public()))
}

/// Active services of the resolved tenant.
async fn get_public_services(
    Extension(tenant): Extension<ResolvedTenant>,
) -> Result<Json<ServicesResponse>, ApiError> {
    let tenant = tenant.0.ok_or_else(ApiError::tenant_not_found)?;
    Ok(Json(ServicesResponse {
        services: tenant.active_services(),
    }))
}

/// Availability lookup stub.
///
/// Echoes the query back with an empty slot list; real availability comes
/// from the calendar integration, which is not wired in this service.
async fn get_availability(
    Extension(tenant): Extension<ResolvedTenant>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    if tenant.0.is_none() {
        return Err(ApiError::tenant_not_found());
    }
    Ok(Json(AvailabilityResponse {
        service_id: params.service_id,
        date: params.date,
        slots: vec![],
    }))
}

// ============================================================================
// Chat Handlers
// ============================================================================

/// Create a chat session scoped to the resolved tenant.
#[instrument(skip(state, tenant))]
async fn create_chat_session(
    State(state): State<AppState>,
    Extension(tenant): Extension<ResolvedTenant>,
) -> Result<Json<ChatSessionResponse>, ApiError> {
    let tenant = tenant.0.ok_or_else(ApiError::tenant_not_found)?;
    let session = state.chat_sessions.create(tenant.tenant_id);

    info!(
        session_id = %session.id,
        tenant = %tenant.slug,
        "Created chat session"
    );

    Ok(Json(ChatSessionResponse {
        session_id: session.id,
    }))
}

/// Stream the assistant stub's reply over server-sent events.
///
/// The session must exist and belong to the resolved tenant; a session ID
/// leaked across tenants reads as not-found rather than forbidden so the
/// response does not confirm the session exists elsewhere.
#[instrument(skip(state, tenant, request))]
async fn chat_stream(
    State(state): State<AppState>,
    Extension(tenant): Extension<ResolvedTenant>,
    Json(request): Json<ChatStreamRequest>,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let tenant = tenant.0.ok_or_else(ApiError::tenant_not_found)?;

    if request.message.trim().is_empty() {
        return Err(ApiError::InvalidArgument {
            message: "Invalid chat payload".to_string(),
        });
    }

    let session = lookup_tenant_session(&state, request.session_id, &tenant)?;
    state.chat_sessions.touch(session.id);

    let message = Event::default()
        .event("message")
        .json_data(serde_json::json!({
            "type": "text",
            "text": "Thanks! Our assistant is being set up. We'll be live shortly.",
        }))
        .map_err(|_| ApiError::Internal)?;
    let done = Event::default()
        .event("done")
        .json_data(serde_json::json!({ "ok": true }))
        .map_err(|_| ApiError::Internal)?;

    let events = vec![Ok(message), Ok(done)];
    Ok(Sse::new(stream::iter(events)))
}

/// Fetch a chat session and confirm it belongs to `tenant`.
fn lookup_tenant_session(
    state: &AppState,
    session_id: Uuid,
    tenant: &TenantRecord,
) -> Result<ChatSession, ApiError> {
    let session = state
        .chat_sessions
        .get(session_id)
        .ok_or_else(|| ApiError::NotFound {
            message: "Chat session not found".to_string(),
        })?;

    if session.tenant_id != tenant.tenant_id {
        return Err(ApiError::NotFound {
            message: "Chat session not found".to_string(),
        });
    }

    Ok(session)
}

// ============================================================================
// Webhook Handler
// ============================================================================

/// Handle Cal.com booking webhooks.
///
/// The body arrives as raw bytes — axum performs no content-type parsing
/// for `Bytes`, so the signature is recomputed over the exact wire bytes
/// the provider signed. Verification happens before any parse of the
/// payload; a rejected delivery is never parsed or logged.
#[instrument(skip(state, headers, body))]
async fn handle_calcom_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    state.metrics.webhooks_received_total.inc();

    let secret = state
        .config
        .webhooks
        .calcom_secret
        .as_deref()
        .unwrap_or_default();
    if secret.trim().is_empty() {
        // Configuration fault. Respond with a generic server fault so the
        // caller cannot distinguish a config problem from an attack.
        error!(provider = "calcom", "Webhook secret is not configured; rejecting delivery");
        return Err(ApiError::Internal);
    }

    // HeaderMap::get returns the first value of a multi-valued header.
    let signature = headers
        .get(CALCOM_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if !verify_signature(&body, signature, secret) {
        state.metrics.webhook_verification_failures_total.inc();
        warn!(
            provider = "calcom",
            has_signature = signature.is_some(),
            "Rejected webhook delivery with missing or invalid signature"
        );
        return Err(ApiError::Unauthenticated {
            message: "Invalid webhook signature".to_string(),
        });
    }

    let Some(payload) = parse_webhook_json::<BookingWebhookPayload>(&body) else {
        return Err(ApiError::InvalidArgument {
            message: "Malformed webhook payload".to_string(),
        });
    };

    info!(
        provider = "calcom",
        trigger_event = %payload.trigger_event,
        "Accepted webhook delivery"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(WebhookAckResponse { received: true }),
    ))
}

// ============================================================================
// Health and Observability Handlers
// ============================================================================

/// Liveness check.
async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check for load balancers.
async fn handle_readiness_check() -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "ready".to_string(),
    })
}

/// Prometheus metrics endpoint.
#[instrument(skip_all)]
async fn metrics_endpoint(State(state): State<AppState>) -> Result<String, ApiError> {
    state.metrics.encode().map_err(|e| {
        error!(error = %e, "Failed to encode metrics");
        ApiError::Internal
    })
}

// ============================================================================
// Request / Response Types
// ============================================================================

/// Query parameters for the availability stub.
#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub service_id: Option<String>,
    pub date: Option<String>,
}

/// Availability stub response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub service_id: Option<String>,
    pub date: Option<String>,
    pub slots: Vec<serde_json::Value>,
}

/// Active-services response.
#[derive(Debug, Serialize)]
pub struct ServicesResponse {
    pub services: Vec<portico_core::tenant::TenantService>,
}

/// Chat session creation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionResponse {
    pub session_id: Uuid,
}

/// Chat stream request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStreamRequest {
    pub session_id: Uuid,
    pub message: String,
}

/// Webhook acknowledgement body.
#[derive(Debug, Serialize)]
pub struct WebhookAckResponse {
    pub received: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
}

// ============================================================================
// Error Types
// ============================================================================

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}
