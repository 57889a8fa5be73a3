//! Query execution and the HTTP endpoint
//!
//! Provides:
//! - Executing a GraphQL request with the store and a fresh loader attached
//! - Shaping the result into `data` plus string-rendered `errors`
//! - Axum routes for the query endpoint, GraphiQL and a health check

use async_graphql::http::GraphiQLSource;
use async_graphql::{Request, ServerError};
use axum::{
    extract::Extension,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::dataloaders::DocumentLoader;
use crate::schema::schema;
use crate::store::SharedStore;

/// Path the query endpoint and GraphiQL are served on
pub const GRAPHQL_PATH: &str = "/graphql";

/// Result of one executed query
///
/// `data` may be partial; each failing field contributes one entry to
/// `errors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Render an execution error as `message (at path)`
pub fn render_error(error: &ServerError) -> String {
    if error.path.is_empty() {
        return error.message.clone();
    }

    let mut path = String::new();
    for segment in &error.path {
        match segment {
            async_graphql::PathSegment::Field(name) => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(name);
            }
            async_graphql::PathSegment::Index(index) => {
                path.push_str(&format!("[{}]", index));
            }
        }
    }
    format!("{} (at {})", error.message, path)
}

/// Execute a request against the shared schema
///
/// Each call gets its own [`DocumentLoader`], so nothing is cached across
/// requests.
pub async fn execute(store: &SharedStore, mut request: Request) -> QueryResponse {
    request.query = request.query.trim().to_string();
    debug!(
        operation = request.operation_name.as_deref().unwrap_or_default(),
        "executing query"
    );

    let request = request
        .data(store.clone())
        .data(DocumentLoader::for_store(store.clone()));

    let response = schema().execute(request).await;
    for error in &response.errors {
        warn!(error = %render_error(error), "query error");
    }

    let data = serde_json::to_value(&response.data).unwrap_or_else(|err| {
        warn!(%err, "response data is not representable as JSON");
        serde_json::Value::Null
    });

    QueryResponse {
        data,
        errors: response.errors.iter().map(render_error).collect(),
    }
}

/// GraphQL query endpoint
///
/// Accepts `{ query, operationName?, variables? }`.
pub async fn graphql_handler(
    Extension(store): Extension<SharedStore>,
    Json(request): Json<Request>,
) -> Json<QueryResponse> {
    Json(execute(&store, request).await)
}

/// GraphiQL page pointed at the query endpoint
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

pub async fn health_check() -> &'static str {
    "ok"
}

/// Router serving the query endpoint over `store`
pub fn create_router(store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(GRAPHQL_PATH, get(graphiql).post(graphql_handler))
        .layer(Extension(store))
}
