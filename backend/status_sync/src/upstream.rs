//! Platform API client. Pulls funding projects and runs them through the
//! typed wire boundary.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied on network errors, rate limiting (429)
//!   and server errors (5xx), up to [`MAX_BACKOFF_SECS`] seconds between tries.
//! * Other client errors (4xx) are hard failures and are not retried.
//! * Each request gives up after `max_attempts` tries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use funding_status::{parse_project, parse_project_list, FundingProject, ProjectBatch};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use crate::errors::{Result, SyncError};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// What to do with an HTTP response status.
#[derive(Debug, PartialEq, Eq)]
enum Disposition {
    Accept,
    NotFound,
    Retry,
    Fail,
}

fn classify(status: StatusCode) -> Disposition {
    if status.is_success() {
        Disposition::Accept
    } else if status == StatusCode::NOT_FOUND {
        Disposition::NotFound
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Disposition::Retry
    } else {
        Disposition::Fail
    }
}

fn next_backoff(backoff: u64) -> u64 {
    (backoff * 2).min(MAX_BACKOFF_SECS)
}

pub fn projects_url(base_url: &str) -> String {
    format!("{}/api/funding/projects", base_url.trim_end_matches('/'))
}

/// Ids the platform issues: non-empty runs of ASCII letters, digits, `-` and `_`.
pub fn is_plain_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// URL of one project. The id always lands as a single path segment under
/// the projects collection.
pub fn project_url(base_url: &str, id: &str) -> Result<Url> {
    if !is_plain_id(id) {
        return Err(SyncError::Upstream(format!("invalid project id {id:?}")));
    }
    let mut url = Url::parse(&projects_url(base_url))
        .map_err(|e| SyncError::Config(format!("Invalid UPSTREAM_URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| SyncError::Config(format!("UPSTREAM_URL {base_url} cannot be a base")))?
        .push(id);
    Ok(url)
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// `GET /api/funding/projects`, validated at `now`.
pub async fn fetch_projects(
    client: &Client,
    base_url: &str,
    max_attempts: u32,
    now: DateTime<Utc>,
) -> Result<ProjectBatch> {
    let url = projects_url(base_url);
    let body = get_with_retry(client, &url, max_attempts)
        .await?
        .ok_or_else(|| SyncError::Upstream(format!("{url} returned 404")))?;

    let batch = parse_project_list(&body, now)?;
    debug!(
        "Fetched {} projects ({} rejected)",
        batch.projects.len(),
        batch.rejected.len()
    );
    Ok(batch)
}

/// `GET /api/funding/projects/:id`. `Ok(None)` when the platform has no such project.
pub async fn fetch_project(
    client: &Client,
    base_url: &str,
    id: &str,
    max_attempts: u32,
    now: DateTime<Utc>,
) -> Result<Option<FundingProject>> {
    let url = project_url(base_url, id)?;
    match get_with_retry(client, url.as_str(), max_attempts).await? {
        Some(body) => Ok(Some(parse_project(&body, now)?)),
        None => Ok(None),
    }
}

/// GET `url` and return the body; `None` on 404.
async fn get_with_retry(client: &Client, url: &str, max_attempts: u32) -> Result<Option<String>> {
    let mut backoff = INITIAL_BACKOFF_SECS;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let failure = match client.get(url).send().await {
            Err(e) => format!("request failed: {e}"),
            Ok(resp) => {
                let status = resp.status();
                match classify(status) {
                    Disposition::Accept => return Ok(Some(resp.text().await?)),
                    Disposition::NotFound => return Ok(None),
                    Disposition::Fail => {
                        return Err(SyncError::Upstream(format!("{url} returned {status}")))
                    }
                    Disposition::Retry => format!("{url} returned {status}"),
                }
            }
        };

        if attempt >= max_attempts {
            return Err(SyncError::Upstream(format!(
                "giving up after {attempt} attempts: {failure}"
            )));
        }

        warn!("Upstream {failure} (will retry in {backoff}s)");
        tokio::time::sleep(Duration::from_secs(backoff)).await;
        backoff = next_backoff(backoff);
    }
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
