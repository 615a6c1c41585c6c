// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//! Orchestrate search endpoint
//!
//! A small HTTP front for [`OrchestrateClient::search`] over a single
//! collection: `GET /?query=..&limit=..&offset=..` returns the search page as
//! JSON, and service errors are passed through with their own status code.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use orchestrate_client::{OrchestrateClient, SearchResults};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Page size when the request gives none (or an unparseable one).
pub const DEFAULT_LIMIT: usize = 10;

/// Search endpoint errors
#[derive(Error, Debug)]
pub enum SearchError {
    /// The Orchestrate call failed.
    #[error(transparent)]
    Client(#[from] orchestrate_client::Error),
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let SearchError::Client(err) = self;
        let status = err
            .status_code()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY);

        (status, err.to_string()).into_response()
    }
}

/// Query string of a search request. Numbers stay as text so that a bad
/// value falls back to the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SearchParams {
    pub fn limit(&self) -> usize {
        parse_or(self.limit.as_deref(), DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> usize {
        parse_or(self.offset.as_deref(), 0)
    }
}

fn parse_or(value: Option<&str>, default: usize) -> usize {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub collection: String,
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub client: OrchestrateClient,
    pub collection: Arc<str>,
}

impl AppState {
    pub fn new(client: OrchestrateClient, collection: &str) -> Self {
        Self {
            client,
            collection: Arc::from(collection),
        }
    }
}

/// Build the router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(search_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

#[instrument(skip(state))]
async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, SearchError> {
    let (limit, offset) = (params.limit(), params.offset());

    match state
        .client
        .search(&state.collection, &params.query, limit, offset)
        .await
    {
        Ok(results) => {
            info!(count = results.count, total = results.total_count, "Search served");
            Ok(Json(results))
        }
        Err(e) => {
            warn!(error = %e, "Search failed");
            Err(e.into())
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        collection: state.collection.to_string(),
    })
}

/// Bind `addr` and serve until the process ends.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("Search endpoint listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
