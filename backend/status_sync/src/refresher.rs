//! Long-running background task that keeps the project snapshot current.
//!
//! Two timers drive it: a short one re-derives displayed statuses from the
//! project dates, a longer one pulls fresh data from the platform API. The task
//! is owned by a [`StatusRefresher`] handle and runs until
//! [`StatusRefresher::stop`] is called.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use funding_status::{refresh_statuses, FundingProject, StatusChange};
use reqwest::Client;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::upstream;

/// In-memory snapshot shared with the API. Replaced wholesale, never edited in place.
pub type SharedProjects = Arc<RwLock<Vec<FundingProject>>>;

pub struct SyncState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
    pub projects: SharedProjects,
}

pub struct StatusRefresher {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl StatusRefresher {
    /// Spawn the refresher loop as a background [`tokio`] task.
    pub fn start(state: Arc<SyncState>) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(state, cancel.clone()));
        StatusRefresher { cancel, handle }
    }

    /// Cancel the loop and wait for it to wind down.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            error!("Status refresher task failed: {e}");
        }
    }
}

async fn run(state: Arc<SyncState>, cancel: CancellationToken) {
    info!(
        "Status refresher starting. Upstream: {}, refresh every {}s, sync every {}s",
        state.config.upstream_url, state.config.refresh_interval_secs, state.config.sync_interval_secs
    );

    // Serve the last snapshot until the first sync lands.
    match db::load_snapshot(&state.pool).await {
        Ok(projects) => {
            info!("Restored {} projects from snapshot", projects.len());
            *state.projects.write().await = projects;
        }
        Err(e) => error!("Could not restore snapshot: {e}"),
    }

    let mut sync_tick = tokio::time::interval(Duration::from_secs(state.config.sync_interval_secs));
    sync_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut refresh_tick =
        tokio::time::interval(Duration::from_secs(state.config.refresh_interval_secs));
    refresh_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sync_tick.tick() => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    res = sync_once(&state, Utc::now()) => {
                        if let Err(e) = res {
                            error!("Upstream sync error: {e}");
                        }
                    }
                }
            }
            _ = refresh_tick.tick() => {
                if let Err(e) = refresh_once(&state, Utc::now()).await {
                    error!("Status refresh error: {e}");
                }
            }
        }
    }

    info!("Status refresher stopped");
}

/// Re-derive displayed statuses at `now` and persist whatever moved.
pub async fn refresh_once(state: &SyncState, now: DateTime<Utc>) -> Result<Vec<StatusChange>> {
    let refreshed = {
        let current = state.projects.read().await;
        refresh_statuses(&current, now)
    };

    if refreshed.is_unchanged() {
        debug!("Status refresh: no changes");
        return Ok(Vec::new());
    }

    // Memory follows the database: a failed write leaves the old snapshot in
    // place so the next tick derives the same changes again.
    db::apply_status_changes(&state.pool, &refreshed.changes, now).await?;
    *state.projects.write().await = refreshed.projects;
    log_changes(&refreshed.changes);

    Ok(refreshed.changes)
}

/// Pull every project from the platform, replace the snapshot, and record
/// status moves against the previous snapshot.
///
/// The new snapshot is ordered by start date, then id, as
/// [`db::load_snapshot`] restores it. Returns the number of projects kept.
pub async fn sync_once(state: &SyncState, now: DateTime<Utc>) -> Result<usize> {
    let batch = upstream::fetch_projects(
        &state.client,
        &state.config.upstream_url,
        state.config.max_fetch_attempts,
        now,
    )
    .await?;
    let mut projects = batch.projects;
    projects.sort_by(|a, b| (a.start_date, &a.id).cmp(&(b.start_date, &b.id)));

    for rejected in &batch.rejected {
        warn!(
            "Rejected project {}: {}",
            rejected.id.as_deref().unwrap_or("<no id>"),
            rejected.error
        );
    }

    let changes = {
        let current = state.projects.read().await;
        diff_statuses(&current, &projects)
    };

    db::save_snapshot(&state.pool, &projects, &changes, now).await?;
    log_changes(&changes);

    let count = projects.len();
    *state.projects.write().await = projects;

    info!(
        "Synced {count} projects ({} rejected, {} status changes)",
        batch.rejected.len(),
        changes.len()
    );
    Ok(count)
}

/// Status moves between two snapshots. Projects new to `next` are not changes.
fn diff_statuses(previous: &[FundingProject], next: &[FundingProject]) -> Vec<StatusChange> {
    let before: HashMap<&str, _> = previous
        .iter()
        .map(|p| (p.id.as_str(), p.status))
        .collect();

    next.iter()
        .filter_map(|p| {
            let from = *before.get(p.id.as_str())?;
            (from != p.status).then(|| StatusChange {
                project_id: p.id.clone(),
                from,
                to: p.status,
            })
        })
        .collect()
}

fn log_changes(changes: &[StatusChange]) {
    for change in changes {
        if change.is_forward() {
            info!(
                "Project {} status {} → {}",
                change.project_id, change.from, change.to
            );
        } else {
            warn!(
                "Project {} status moved backwards {} → {}",
                change.project_id, change.from, change.to
            );
        }
    }
}
