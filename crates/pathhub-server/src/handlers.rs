//! HTTP handlers for the share service.
//!
//! Implements:
//! - POST /api/share - Issue a share link for a file path
//! - GET /s/{id} - Share page linking to the protocol URL
//! - GET /api/stats/{id} - Access statistics
//! - GET /health - Health check endpoint

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::Html;
use axum::Json;
use chrono::{DateTime, Utc};
use pathhub_core::{PathHubError, SharePath, ShareStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ApiError, Result};

/// Attempts at finding an unused share id.
const MAX_ID_ATTEMPTS: usize = 5;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ShareStore>,
    /// Base URL for issued links; `None` uses the request's Host header
    pub public_url: Option<String>,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
}

/// GET /health - Health check endpoint.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    #[serde(default)]
    pub file_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub share_id: String,
    pub share_url: String,
    pub auto_share_url: String,
    pub original_path: String,
}

/// POST /api/share - Store the path and return its share links.
///
/// A body that is not a JSON object gets the same error shape as any other
/// rejected request.
pub async fn create_share_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<ShareRequest>, JsonRejection>,
) -> Result<Json<ShareResponse>> {
    let Json(request) = payload?;
    let share = insert_with_fresh_id(state.store.as_ref(), &request.file_path).await?;

    let base = base_url(state.public_url.as_deref(), &headers);
    let share_url = format!("{}/s/{}", base, share.id);
    info!("Shared {} as {}", share.original_path, share.id);

    Ok(Json(ShareResponse {
        auto_share_url: format!("{}?auto=true", share_url),
        share_url,
        share_id: share.id,
        original_path: share.original_path,
    }))
}

async fn insert_with_fresh_id(store: &dyn ShareStore, path: &str) -> Result<SharePath> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let share = SharePath::new(new_share_id(), path)?;
        if store.get(&share.id).await?.is_some() {
            warn!("Share id collision on {}, retrying", share.id);
            continue;
        }
        store.insert(share.clone()).await?;
        return Ok(share);
    }
    Err(ApiError::Internal("could not allocate a share id".to_string()))
}

/// 8 lowercase hex characters.
fn new_share_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

fn base_url(public_url: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(url) = public_url {
        return url.to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

#[derive(Debug, Default, Deserialize)]
pub struct SharePageQuery {
    pub auto: Option<String>,
}

/// GET /s/{id} - Count the visit and link to the protocol URL.
pub async fn share_page_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SharePageQuery>,
) -> Result<Html<String>> {
    let share = state.store.record_access(&id).await?;
    let auto = query.auto.as_deref() == Some("true");
    info!(
        "Share {} viewed ({} total, auto: {})",
        share.id, share.access_count, auto
    );
    Ok(Html(render_share_page(&share, auto)))
}

fn render_share_page(share: &SharePath, auto: bool) -> String {
    let url = html_escape(share.protocol_url().as_str());
    let path = html_escape(&share.original_path);
    let refresh = if auto {
        format!("<meta http-equiv=\"refresh\" content=\"0;url={}\">", url)
    } else {
        String::new()
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>PathHub</title>\n{}\n</head>\n\
         <body>\n<p>{}</p>\n<p><a href=\"{}\">Open in file browser</a></p>\n</body>\n</html>\n",
        refresh, path, url
    )
}

fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub access_count: u64,
    pub created_at: DateTime<Utc>,
}

/// GET /api/stats/{id} - Access statistics for a share.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatsResponse>> {
    let share = state
        .store
        .get(&id)
        .await?
        .ok_or(PathHubError::NotFound(id))?;
    Ok(Json(StatsResponse {
        access_count: share.access_count,
        created_at: share.created_at,
    }))
}
