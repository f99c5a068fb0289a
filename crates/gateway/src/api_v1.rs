//! HTTP API v1.
//!
//! Endpoints:
//!
//! - `GET  /v1/tools`                   List available tools
//! - `POST /v1/tools/{name}`            Execute a tool with JSON arguments
//! - `GET  /v1/resources?uri=...`       Read a resource URI
//! - `GET  /v1/resources/templates`     List resource URI templates
//! - `POST /v1/context`                 Build a context-augmented prompt

use axum::{
    Extension, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use finaid_core::error::ToolError;
use finaid_core::source::Metadata;
use finaid_core::tool::{ToolCall, ToolDefinition};
use finaid_rag::{ContextRequest, PromptMode};
use finaid_security::{AuditEvent, AuditOutcome, Principal};
use finaid_tools::ResourceTemplate;

use crate::{SharedState, error_response};

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/tools", get(list_tools_handler))
        .route("/tools/{name}", post(call_tool_handler))
        .route("/resources", get(read_resource_handler))
        .route("/resources/templates", get(list_resource_templates_handler))
        .route("/context", post(context_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolDefinition>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolCallResponse {
    pub call_id: String,
    pub tool: String,
    pub success: bool,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceQuery {
    pub uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceTemplateList {
    pub templates: Vec<ResourceTemplate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContextBody {
    pub query: String,
    #[serde(default)]
    pub context_priority: Vec<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub max_tokens: Option<i64>,
    #[serde(default)]
    pub prompt_mode: Option<String>,
}

fn tool_error_status(err: &ToolError) -> StatusCode {
    match err {
        ToolError::NotFound(_) | ToolError::UnknownResource(_) => StatusCode::NOT_FOUND,
        ToolError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
        ToolError::ExecutionFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn list_tools_handler(State(state): State<SharedState>) -> Json<ToolListResponse> {
    let tools = state.tools.definitions();
    let count = tools.len();
    Json(ToolListResponse { tools, count })
}

async fn call_tool_handler(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::json!({})
    } else {
        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(value) => value,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {e}"));
            }
        }
    };

    let call = ToolCall {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.clone(),
        arguments,
    };
    debug!(tool = %name, call_id = %call.id, subject = %principal.subject, "Tool call");

    match state.tools.execute(&call).await {
        Ok(result) => {
            let outcome = if result.success {
                AuditOutcome::Success
            } else {
                AuditOutcome::Failure
            };
            state.audit.log(
                AuditEvent::ToolExecution {
                    tool_name: name.clone(),
                },
                &principal.subject,
                &name,
                outcome,
                None,
            );
            Json(ToolCallResponse {
                call_id: result.call_id,
                tool: name,
                success: result.success,
                output: result.output,
                data: result.data,
            })
            .into_response()
        }
        Err(e) => {
            state.audit.log(
                AuditEvent::ToolExecution {
                    tool_name: name.clone(),
                },
                &principal.subject,
                &name,
                AuditOutcome::Failure,
                Some(e.to_string()),
            );
            error_response(tool_error_status(&e), e.to_string())
        }
    }
}

async fn read_resource_handler(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ResourceQuery>,
) -> Response {
    let result = state.resources.read(&query.uri);
    let outcome = if result.is_ok() {
        AuditOutcome::Success
    } else {
        AuditOutcome::Failure
    };
    state.audit.log(
        AuditEvent::ResourceRead {
            uri: query.uri.clone(),
        },
        &principal.subject,
        &query.uri,
        outcome,
        None,
    );

    match result {
        Ok(content) => Json(content).into_response(),
        Err(e) => error_response(tool_error_status(&e), e.to_string()),
    }
}

async fn list_resource_templates_handler(
    State(state): State<SharedState>,
) -> Json<ResourceTemplateList> {
    Json(ResourceTemplateList {
        templates: state.resources.templates(),
    })
}

async fn context_handler(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<ContextBody>,
) -> Response {
    if body.query.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Query must not be empty");
    }

    let mut request = ContextRequest::new(body.query).with_priority(body.context_priority);
    request.metadata = body.metadata;
    if let Some(student_id) = body.student_id {
        request = request.with_student_id(student_id);
    }
    request.max_tokens = body.max_tokens;

    let pipeline = match body.prompt_mode.as_deref().map(str::parse::<PromptMode>) {
        None => state.app.pipeline.clone(),
        Some(Ok(mode)) => state.app.pipeline.clone().with_mode(mode),
        Some(Err(e)) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let response = pipeline.run(request).await;
    info!(
        subject = %principal.subject,
        sources = response.sources_used.len(),
        latency_ms = response.latency_ms,
        "Context served"
    );
    state.audit.log(
        AuditEvent::ContextBuilt {
            sources: response.sources_used.len(),
        },
        &principal.subject,
        &response.query,
        AuditOutcome::Success,
        None,
    );

    Json(response).into_response()
}
