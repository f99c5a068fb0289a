//! HTTP API gateway for FinAid.
//!
//! Exposes an unauthenticated health check plus the v1 API (tools,
//! resources and context building) behind a bearer-token gate.
//!
//! Built on Axum; all state is built once at start and shared via `Arc`.

pub mod api_v1;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use finaid_config::AppConfig;
use finaid_core::error::RecordError;
use finaid_core::tool::ToolRegistry;
use finaid_security::{
    AuditEvent, AuditLogger, AuditOutcome, AuthGate, TokenAuthenticator, TracingSink,
};
use finaid_tools::{AppContext, ResourceRouter};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub app: AppContext,
    pub tools: ToolRegistry,
    pub resources: ResourceRouter,
    pub auth: Box<dyn AuthGate>,
    pub audit: AuditLogger,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(app: AppContext, auth: Box<dyn AuthGate>) -> Self {
        Self {
            tools: finaid_tools::default_registry(&app),
            resources: ResourceRouter::new(app.clone()),
            app,
            auth,
            audit: AuditLogger::with_sinks(vec![Box::new(TracingSink)]),
        }
    }

    /// Load the record systems and auth settings named in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, RecordError> {
        let app = AppContext::from_config(config)?;
        let auth = TokenAuthenticator::from_config(&config.auth);
        if !auth.is_enabled() {
            warn!("Authentication is disabled; the v1 API is open to every caller");
        }
        Ok(Self::new(app, Box::new(auth)))
    }
}

/// Build the full router: `/health` plus the authenticated `/v1` API.
///
/// Layers applied:
/// - Bearer token authentication on all /v1 routes
/// - CORS restricted to localhost origins
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let v1 = api_v1::v1_router(state.clone())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            let origin = origin.as_bytes();
            origin.starts_with(b"http://localhost") || origin.starts_with(b"http://127.0.0.1")
        }))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", v1)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(GatewayState::from_config(&config)?);
    info!(
        tools = state.tools.names().len(),
        sources = ?state.app.pipeline.engine().registry().names(),
        "Gateway state built"
    );

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub discovery_endpoint: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        name: "Financial Aid Integration MCP".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        description: "Student record, financial aid and context service".into(),
        discovery_endpoint: "/v1/tools".into(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

/// Authentication middleware for the /v1 API.
///
/// Reads `Authorization: Bearer <token>`, asks the gate, and stores the
/// resulting [`finaid_security::Principal`] as a request extension.
async fn auth_middleware(
    State(state): State<SharedState>,
    mut req: axum::extract::Request,
    next: Next,
) -> Response {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match state.auth.authorize(bearer) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            warn!(path = %req.uri().path(), error = %e, "Unauthorized request to /v1 API");
            state.audit.log(
                AuditEvent::AuthFailure,
                "unknown",
                req.uri().path(),
                AuditOutcome::Denied,
                Some(e.to_string()),
            );
            error_response(StatusCode::UNAUTHORIZED, e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use finaid_config::AuthConfig;
    use finaid_core::record::StudentProfile;
    use finaid_records::synthetic::determinations_for;
    use finaid_records::{FinancialAidSystem, RegistrarSystem};

    pub(crate) const STATIC_TOKEN: &str = "gateway-test-token";
    pub(crate) const JWT_SECRET: &str = "gateway-test-secret";

    fn profile(id: &str, name: &str, major: &str, gpa: f64) -> StudentProfile {
        StudentProfile {
            student_id: id.into(),
            name: name.into(),
            major: major.into(),
            program: "Bachelor of Science".into(),
            gpa,
            year: "Senior".into(),
            courses: vec![],
            is_need_based_qualified: true,
            enrollment_status: "Full-time".into(),
        }
    }

    pub(crate) fn app_context() -> AppContext {
        let profiles = vec![
            profile("S00001", "Megan Mcclain", "Law", 2.84),
            profile("S00003", "Alice Smith", "Computer Science", 3.8),
        ];
        let determinations = determinations_for(&profiles);
        AppContext::new(
            &AppConfig::default(),
            Arc::new(RegistrarSystem::from_profiles(profiles)),
            Arc::new(FinancialAidSystem::with_determinations(determinations)),
        )
    }

    /// State with auth disabled.
    pub(crate) fn open_state() -> SharedState {
        Arc::new(GatewayState::new(
            app_context(),
            Box::new(TokenAuthenticator::disabled()),
        ))
    }

    /// State requiring a static token or a signed JWT.
    pub(crate) fn guarded_state() -> SharedState {
        let auth = TokenAuthenticator::from_config(&AuthConfig {
            enabled: true,
            tokens: vec![STATIC_TOKEN.into()],
            jwt_secret: Some(JWT_SECRET.into()),
            ..AuthConfig::default()
        });
        Arc::new(GatewayState::new(app_context(), Box::new(auth)))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(guarded_state());

        let response = app.oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.name, "Financial Aid Integration MCP");
        assert_eq!(health.discovery_endpoint, "/v1/tools");
    }

    #[tokio::test]
    async fn v1_requires_token_when_enabled() {
        let state = guarded_state();

        let response = build_router(state.clone())
            .oneshot(get("/v1/tools", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = build_router(state.clone())
            .oneshot(get("/v1/tools", Some("wrong")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        assert_eq!(
            state.audit.entries_by_outcome(&AuditOutcome::Denied).len(),
            2
        );
    }

    #[tokio::test]
    async fn v1_accepts_static_token_and_jwt() {
        let state = guarded_state();

        let response = build_router(state.clone())
            .oneshot(get("/v1/tools", Some(STATIC_TOKEN)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let jwt = finaid_security::issue_test_token(JWT_SECRET, "TEST_SERVICE1", 600).unwrap();
        let response = build_router(state.clone())
            .oneshot(get("/v1/tools", Some(&jwt)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let outsider = finaid_security::issue_test_token(JWT_SECRET, "SOMEONE_ELSE", 600).unwrap();
        let response = build_router(state)
            .oneshot(get("/v1/tools", Some(&outsider)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn open_state_needs_no_token() {
        let response = build_router(open_state())
            .oneshot(get("/v1/tools", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
