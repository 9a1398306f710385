use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use daiso_scraper::DaisoClient;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::mcp::{self, McpReply};
use crate::middleware::{request_id, RequestId};

const MCP_SESSION_ID: &str = "mcp-session-id";
const MCP_PROTOCOL_VERSION: &str = "mcp-protocol-version";
const LAST_EVENT_ID: &str = "last-event-id";

#[derive(Debug, Clone)]
pub struct AppState {
    pub client: DaisoClient,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    description: &'static str,
    endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
struct Endpoints {
    mcp: &'static str,
    health: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(MCP_SESSION_ID),
            HeaderName::from_static(LAST_EVENT_ID),
            HeaderName::from_static(MCP_PROTOCOL_VERSION),
        ])
        .expose_headers([
            HeaderName::from_static(MCP_SESSION_ID),
            HeaderName::from_static(MCP_PROTOCOL_VERSION),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(service_info)
                .post(mcp_endpoint)
                .delete(method_not_allowed),
        )
        .route(
            "/mcp",
            get(method_not_allowed)
                .post(mcp_endpoint)
                .delete(method_not_allowed),
        )
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthData { status: "ok" })
}

async fn service_info() -> impl IntoResponse {
    Json(ServiceInfo {
        name: mcp::SERVER_NAME,
        version: mcp::SERVER_VERSION,
        description: "MCP server for Daiso product search, store search and inventory lookups",
        endpoints: Endpoints {
            mcp: "/ or /mcp (POST) - MCP JSON-RPC endpoint",
            health: "/health (GET) - health check",
        },
    })
}

/// Sessions and server-initiated streams are not offered.
async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST")])
}

async fn mcp_endpoint(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Response {
    match mcp::handle_message(&state.client, &body).await {
        McpReply::Accepted => StatusCode::ACCEPTED.into_response(),
        McpReply::Message(status, response) => {
            if let Some(error) = &response.error {
                tracing::debug!(
                    request_id = %req_id.0,
                    code = error.code,
                    message = %error.message,
                    "MCP request rejected"
                );
            }
            (status, Json(response)).into_response()
        }
    }
}
