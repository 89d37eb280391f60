use super::*;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use portico_core::tenant::{TenantBranding, TenantFaq, TenantProfile, TenantService};
use portico_core::{
    MemoryTenantStore, TenantId, TenantRecord, TenantResolver, TenantResolverOptions,
};
use sha2::Sha256;
use tower::ServiceExt;

const HOST_SUFFIX: &str = "example.com";
const WEBHOOK_SECRET: &str = "whsec_test_secret";

fn sample_tenant(slug: &str, domains: Vec<String>) -> TenantRecord {
    TenantRecord {
        tenant_id: TenantId::new(),
        slug: slug.to_string(),
        profile: TenantProfile {
            business_name: "Glow Studio".to_string(),
            timezone: "America/New_York".to_string(),
            phone: Some("+1 555 0100".to_string()),
            email: Some("hello@glow.example.com".to_string()),
            website_url: None,
            address_line1: None,
            address_line2: None,
            city: Some("Brooklyn".to_string()),
            region: None,
            postal_code: None,
            country: Some("US".to_string()),
            business_hours: None,
        },
        branding: TenantBranding {
            logo_url: None,
            primary_color: "#4f46e5".to_string(),
            accent_color: "#f59e0b".to_string(),
        },
        services: vec![
            TenantService {
                id: Uuid::new_v4(),
                name: "Signature Facial".to_string(),
                description: Some("60-minute treatment".to_string()),
                duration_minutes: 60,
                price_cents: Some(12000),
                currency: Some("USD".to_string()),
                active: true,
                sort_order: 1,
            },
            TenantService {
                id: Uuid::new_v4(),
                name: "Retired Package".to_string(),
                description: None,
                duration_minutes: 90,
                price_cents: None,
                currency: None,
                active: false,
                sort_order: 2,
            },
        ],
        faqs: vec![TenantFaq {
            id: Uuid::new_v4(),
            question: "Where do I park?".to_string(),
            answer: "Street parking on 5th Ave.".to_string(),
            active: true,
            sort_order: 1,
        }],
        policies: None,
        domains,
    }
}

fn test_state(records: Vec<TenantRecord>, calcom_secret: Option<&str>) -> AppState {
    let mut config = ServiceConfig::default();
    config.tenancy.host_suffix = HOST_SUFFIX.to_string();
    config.webhooks.calcom_secret = calcom_secret.map(|s| s.to_string());

    let store = Arc::new(MemoryTenantStore::new(records));
    let resolver = Arc::new(TenantResolver::new(
        store,
        TenantResolverOptions::new(HOST_SUFFIX),
    ));

    AppState::new(
        config,
        resolver,
        Arc::new(MemoryChatSessionStore::new()),
        Arc::new(ServiceMetrics::new().unwrap()),
    )
}

fn test_router(records: Vec<TenantRecord>, calcom_secret: Option<&str>) -> Router {
    create_router(test_state(records, calcom_secret))
}

async fn send(
    router: Router,
    method: Method,
    uri: &str,
    host: Option<&str>,
    body: Body,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(host) = host {
        builder = builder.header(header::HOST, host);
    }
    let request = builder.body(body).unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}

fn sign(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

// ============================================================================
// Health and Metrics
// ============================================================================

#[tokio::test]
async fn health_endpoints_respond_without_tenant_context() {
    let router = test_router(vec![], None);

    let (status, body) = send(
        router.clone(),
        Method::GET,
        "/healthz",
        None,
        Body::empty(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(router, Method::GET, "/readyz", None, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_text() {
    let state = test_state(vec![sample_tenant("demo", vec![])], None);
    let router = create_router(state);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
}

// ============================================================================
// Public Tenant Endpoints
// ============================================================================

#[tokio::test]
async fn public_tenant_resolves_slug_subdomain() {
    let router = test_router(vec![sample_tenant("glow", vec![])], None);

    let (status, body) = send(
        router,
        Method::GET,
        "/v1/public/tenant",
        Some("glow.example.com"),
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "glow");
    assert_eq!(body["profile"]["businessName"], "Glow Studio");
    // Inactive services never appear in the public projection.
    assert_eq!(body["services"].as_array().unwrap().len(), 1);
    assert_eq!(body["services"][0]["name"], "Signature Facial");
    assert!(body.get("domains").is_none());
}

#[tokio::test]
async fn public_tenant_resolves_custom_domain() {
    let tenant = sample_tenant("glow", vec!["book.glowstudio.com".to_string()]);
    let router = test_router(vec![tenant], None);

    let (status, body) = send(
        router,
        Method::GET,
        "/v1/public/tenant",
        Some("Book.GlowStudio.com:8443"),
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "glow");
}

#[tokio::test]
async fn public_tenant_unknown_host_is_not_found() {
    let router = test_router(vec![sample_tenant("glow", vec![])], None);

    let (status, body) = send(
        router,
        Method::GET,
        "/v1/public/tenant",
        Some("nobody.example.com"),
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "Tenant not found");
}

#[tokio::test]
async fn public_services_returns_active_only() {
    let router = test_router(vec![sample_tenant("glow", vec![])], None);

    let (status, body) = send(
        router,
        Method::GET,
        "/v1/public/services",
        Some("glow.example.com"),
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let services = body["services"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["name"], "Signature Facial");
    assert_eq!(services[0]["durationMinutes"], 60);
}

#[tokio::test]
async fn availability_echoes_query_with_empty_slots() {
    let router = test_router(vec![sample_tenant("glow", vec![])], None);

    let (status, body) = send(
        router,
        Method::GET,
        "/v1/public/availability?service_id=abc&date=2026-09-01",
        Some("glow.example.com"),
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["serviceId"], "abc");
    assert_eq!(body["date"], "2026-09-01");
    assert_eq!(body["slots"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Chat Endpoints
// ============================================================================

#[tokio::test]
async fn chat_session_create_then_stream() {
    let state = test_state(vec![sample_tenant("glow", vec![])], None);
    let router = create_router(state.clone());

    let (status, body) = send(
        router,
        Method::POST,
        "/v1/chat/sessions",
        Some("glow.example.com"),
        Body::empty(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["sessionId"].as_str().unwrap().to_string();
    assert_eq!(state.chat_sessions.len(), 1);

    let router = create_router(state);
    let payload = serde_json::json!({ "sessionId": session_id, "message": "hi" });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/chat/stream")
        .header(header::HOST, "glow.example.com")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let stream_text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(stream_text.contains("event: message"));
    assert!(stream_text.contains("event: done"));
}

#[tokio::test]
async fn chat_stream_rejects_unknown_session() {
    let router = test_router(vec![sample_tenant("glow", vec![])], None);

    let payload = serde_json::json!({ "sessionId": Uuid::new_v4(), "message": "hi" });
    let (status, body) = send(
        router,
        Method::POST,
        "/v1/chat/stream",
        Some("glow.example.com"),
        Body::from(payload.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn chat_stream_rejects_foreign_tenant_session() {
    let state = test_state(
        vec![
            sample_tenant("glow", vec![]),
            sample_tenant("other", vec![]),
        ],
        None,
    );

    // Session created under "glow" must not be usable from "other".
    let router = create_router(state.clone());
    let (_, body) = send(
        router,
        Method::POST,
        "/v1/chat/sessions",
        Some("glow.example.com"),
        Body::empty(),
    )
    .await;
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    let router = create_router(state);
    let payload = serde_json::json!({ "sessionId": session_id, "message": "hi" });
    let (status, body) = send(
        router,
        Method::POST,
        "/v1/chat/stream",
        Some("other.example.com"),
        Body::from(payload.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn chat_stream_rejects_blank_message() {
    let state = test_state(vec![sample_tenant("glow", vec![])], None);
    let router = create_router(state.clone());
    let (_, body) = send(
        router,
        Method::POST,
        "/v1/chat/sessions",
        Some("glow.example.com"),
        Body::empty(),
    )
    .await;
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    let router = create_router(state);
    let payload = serde_json::json!({ "sessionId": session_id, "message": "   " });
    let (status, body) = send(
        router,
        Method::POST,
        "/v1/chat/stream",
        Some("glow.example.com"),
        Body::from(payload.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
}

// ============================================================================
// Webhook Endpoint
// ============================================================================

#[tokio::test]
async fn webhook_accepts_valid_signature() {
    let router = test_router(vec![], Some(WEBHOOK_SECRET));
    let body = br#"{"triggerEvent":"BOOKING_CREATED","payload":{"uid":"abc123"}}"#;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/webhooks/calcom")
        .header("x-cal-signature-256", sign(body))
        .body(Body::from(body.to_vec()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let ack: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(ack["received"], true);
}

#[tokio::test]
async fn webhook_accepts_prefixed_signature() {
    let router = test_router(vec![], Some(WEBHOOK_SECRET));
    let body = br#"{"triggerEvent":"BOOKING_CANCELLED"}"#;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/webhooks/calcom")
        .header("x-cal-signature-256", format!("sha256={}", sign(body)))
        .body(Body::from(body.to_vec()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn webhook_rejects_invalid_signature() {
    let router = test_router(vec![], Some(WEBHOOK_SECRET));
    let body = br#"{"triggerEvent":"BOOKING_CREATED"}"#;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/webhooks/calcom")
        .header("x-cal-signature-256", "a".repeat(64))
        .body(Body::from(body.to_vec()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let envelope: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(envelope["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn webhook_rejects_missing_signature_header() {
    let router = test_router(vec![], Some(WEBHOOK_SECRET));
    let body = br#"{"triggerEvent":"BOOKING_CREATED"}"#;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/webhooks/calcom")
        .body(Body::from(body.to_vec()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_rejects_tampered_body() {
    let router = test_router(vec![], Some(WEBHOOK_SECRET));
    let signed = br#"{"triggerEvent":"BOOKING_CREATED","payload":{"amount":100}}"#;
    let tampered = br#"{"triggerEvent":"BOOKING_CREATED","payload":{"amount":999}}"#;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/webhooks/calcom")
        .header("x-cal-signature-256", sign(signed))
        .body(Body::from(tampered.to_vec()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_without_configured_secret_is_server_fault() {
    let router = test_router(vec![], None);
    let body = br#"{"triggerEvent":"BOOKING_CREATED"}"#;

    // The delivery even carries a plausible signature; configuration
    // absence still wins and reads as a generic server fault.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/webhooks/calcom")
        .header("x-cal-signature-256", "b".repeat(64))
        .body(Body::from(body.to_vec()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let envelope: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(envelope["error"]["code"], "INTERNAL");
}

#[tokio::test]
async fn webhook_rejects_unparseable_payload_after_verification() {
    let router = test_router(vec![], Some(WEBHOOK_SECRET));
    let body = b"this is not json at all";

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/webhooks/calcom")
        .header("x-cal-signature-256", sign(body))
        .body(Body::from(body.to_vec()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let envelope: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(envelope["error"]["code"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn webhook_counts_verification_failures() {
    let state = test_state(vec![], Some(WEBHOOK_SECRET));
    let router = create_router(state.clone());
    let body = br#"{"triggerEvent":"BOOKING_CREATED"}"#;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/webhooks/calcom")
        .header("x-cal-signature-256", "c".repeat(64))
        .body(Body::from(body.to_vec()))
        .unwrap();
    let _ = router.oneshot(request).await.unwrap();

    assert_eq!(state.metrics.webhooks_received_total.get(), 1);
    assert_eq!(state.metrics.webhook_verification_failures_total.get(), 1);
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn responses_carry_correlation_id_header() {
    let router = test_router(vec![], None);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/healthz")
        .header("x-correlation-id", "test-correlation-42")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("x-correlation-id")
            .and_then(|v| v.to_str().ok()),
        Some("test-correlation-42")
    );
}

#[tokio::test]
async fn tenant_resolution_outcomes_are_measured() {
    let state = test_state(vec![sample_tenant("glow", vec![])], None);
    let router = create_router(state.clone());

    let _ = send(
        router.clone(),
        Method::GET,
        "/v1/public/tenant",
        Some("glow.example.com"),
        Body::empty(),
    )
    .await;
    let _ = send(
        router,
        Method::GET,
        "/v1/public/tenant",
        Some("missing.example.com"),
        Body::empty(),
    )
    .await;

    assert_eq!(
        state
            .metrics
            .tenant_resolutions_total
            .with_label_values(&["resolved"])
            .get(),
        1
    );
    assert_eq!(
        state
            .metrics
            .tenant_resolutions_total
            .with_label_values(&["unresolved"])
            .get(),
        1
    );
}
