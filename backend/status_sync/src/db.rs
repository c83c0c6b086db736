//! Database layer: migrations, the project snapshot, and the status-change log.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use funding_status::{FundingProject, StatusChange};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use crate::errors::Result;
use crate::records::{ProjectRow, StatusChangeRecord};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Project snapshot
// ─────────────────────────────────────────────────────────

/// Replace the whole snapshot with `projects` and log `changes` against it,
/// in one transaction. Projects that disappeared upstream are dropped.
pub async fn save_snapshot(
    pool: &SqlitePool,
    projects: &[FundingProject],
    changes: &[StatusChange],
    synced_at: DateTime<Utc>,
) -> Result<usize> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM projects").execute(&mut *tx).await?;
    for p in projects {
        sqlx::query(
            r#"
            INSERT INTO projects
                (id, title, artist, start_date, end_date, current_amount, target_amount,
                 status, synced_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&p.id)
        .bind(&p.title)
        .bind(&p.artist)
        .bind(p.start_date.to_rfc3339_opts(SecondsFormat::Millis, true))
        .bind(p.end_date.to_rfc3339_opts(SecondsFormat::Millis, true))
        .bind(p.current_amount)
        .bind(p.target_amount)
        .bind(p.status.as_str())
        .bind(synced_at.timestamp())
        .execute(&mut *tx)
        .await?;
    }
    let logged = insert_status_changes(&mut *tx, changes, synced_at).await?;

    tx.commit().await?;
    Ok(logged)
}

/// Load the snapshot, ordered by start date. Rows that no longer parse are
/// skipped with a warning.
pub async fn load_snapshot(pool: &SqlitePool) -> Result<Vec<FundingProject>> {
    let rows = sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT id, title, artist, start_date, end_date, current_amount, target_amount, status
        FROM   projects
        ORDER  BY start_date ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut projects = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.id.clone();
        match FundingProject::try_from(row) {
            Ok(project) => projects.push(project),
            Err(e) => warn!("Skipping unreadable snapshot row {id}: {e}"),
        }
    }
    Ok(projects)
}

/// Write the new status of every changed project into the snapshot and log
/// the moves, all or nothing.
pub async fn apply_status_changes(
    pool: &SqlitePool,
    changes: &[StatusChange],
    changed_at: DateTime<Utc>,
) -> Result<usize> {
    let mut tx = pool.begin().await?;
    for change in changes {
        sqlx::query("UPDATE projects SET status = ?1 WHERE id = ?2")
            .bind(change.to.as_str())
            .bind(&change.project_id)
            .execute(&mut *tx)
            .await?;
    }
    let logged = insert_status_changes(&mut *tx, changes, changed_at).await?;
    tx.commit().await?;
    Ok(logged)
}

// ─────────────────────────────────────────────────────────
// Status-change log
// ─────────────────────────────────────────────────────────

async fn insert_status_changes(
    conn: &mut SqliteConnection,
    changes: &[StatusChange],
    changed_at: DateTime<Utc>,
) -> Result<usize> {
    let mut count = 0usize;
    for change in changes {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO status_changes (project_id, from_status, to_status, changed_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&change.project_id)
        .bind(change.from.as_str())
        .bind(change.to.as_str())
        .bind(changed_at.timestamp())
        .execute(&mut *conn)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    Ok(count)
}

/// Status history of one project, oldest first.
pub async fn get_changes_for_project(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<StatusChangeRecord>> {
    let rows = sqlx::query_as::<_, StatusChangeRecord>(
        r#"
        SELECT id, project_id, from_status, to_status, changed_at, created_at
        FROM   status_changes
        WHERE  project_id = ?1
        ORDER  BY changed_at ASC, id ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_all_changes(pool: &SqlitePool) -> Result<Vec<StatusChangeRecord>> {
    let rows = sqlx::query_as::<_, StatusChangeRecord>(
        r#"
        SELECT id, project_id, from_status, to_status, changed_at, created_at
        FROM   status_changes
        ORDER  BY changed_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
