//! Axum REST API handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use funding_status::{refresh_status, FundingProject, ProjectView};
use reqwest::Client;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::config::Config;
use crate::db;
use crate::records::StatusChangeRecord;
use crate::refresher::SharedProjects;
use crate::upstream;

/// Upstream budget for a per-request lookup. The background sync keeps its
/// own retry policy.
const LOOKUP_ATTEMPTS: u32 = 1;
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub projects: SharedProjects,
    pub client: Client,
    pub config: Config,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/projects", get(list_projects))
        .route("/projects/:id", get(get_project))
        .route("/projects/:id/status-history", get(get_project_status_history))
        .route("/status-changes", get(get_all_status_changes))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProjectsResponse {
    pub count: usize,
    pub projects: Vec<ProjectView>,
}

#[derive(Serialize)]
pub struct StatusHistoryResponse {
    pub project_id: String,
    pub count: usize,
    pub changes: Vec<StatusChangeRecord>,
}

#[derive(Serialize)]
pub struct AllChangesResponse {
    pub count: usize,
    pub changes: Vec<StatusChangeRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// View of `project` with its status re-derived at the moment of the request,
/// so a response is never a full refresh interval stale.
fn current_view(project: &FundingProject) -> ProjectView {
    let now = Utc::now();
    let project = FundingProject {
        status: refresh_status(project, now),
        ..project.clone()
    };
    ProjectView::at(&project, now)
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /projects`
///
/// Every project in the current snapshot, ready to render.
pub async fn list_projects(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let projects: Vec<ProjectView> = state
        .projects
        .read()
        .await
        .iter()
        .map(current_view)
        .collect();

    Json(ProjectsResponse {
        count: projects.len(),
        projects,
    })
}

/// `GET /projects/:id`
///
/// Served from the snapshot; a project created since the last sync is looked
/// up on the platform API directly, once and within [`LOOKUP_TIMEOUT`]. Ids
/// that are not plain tokens are never forwarded.
pub async fn get_project(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Response {
    let cached = state
        .projects
        .read()
        .await
        .iter()
        .find(|p| p.id == project_id)
        .cloned();
    if let Some(project) = cached {
        return (StatusCode::OK, Json(current_view(&project))).into_response();
    }

    let not_found = || {
        error_response(
            StatusCode::NOT_FOUND,
            format!("project {project_id} not found"),
        )
    };
    if !upstream::is_plain_id(&project_id) {
        return not_found();
    }

    let lookup = upstream::fetch_project(
        &state.client,
        &state.config.upstream_url,
        &project_id,
        LOOKUP_ATTEMPTS,
        Utc::now(),
    );
    match tokio::time::timeout(LOOKUP_TIMEOUT, lookup).await {
        Ok(Ok(Some(project))) => (StatusCode::OK, Json(current_view(&project))).into_response(),
        Ok(Ok(None)) => not_found(),
        Ok(Err(e)) => {
            warn!("Upstream lookup for project {project_id} failed: {e}");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
        Err(_) => {
            warn!("Upstream lookup for project {project_id} timed out");
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("platform API did not answer within {}s", LOOKUP_TIMEOUT.as_secs()),
            )
        }
    }
}

/// `GET /projects/:id/status-history`
pub async fn get_project_status_history(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Response {
    match db::get_changes_for_project(&state.pool, &project_id).await {
        Ok(changes) => {
            let count = changes.len();
            (
                StatusCode::OK,
                Json(StatusHistoryResponse {
                    project_id,
                    count,
                    changes,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// `GET /status-changes`
pub async fn get_all_status_changes(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_all_changes(&state.pool).await {
        Ok(changes) => {
            let count = changes.len();
            (StatusCode::OK, Json(AllChangesResponse { count, changes })).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
