//! Row types for the SQLite snapshot and status-change log.

use funding_status::{parse_instant, FundingError, FundingProject};
use serde::Serialize;

/// A project row as stored in the `projects` snapshot table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub current_amount: f64,
    pub target_amount: f64,
    pub status: String,
}

impl TryFrom<ProjectRow> for FundingProject {
    type Error = FundingError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(FundingProject {
            id: row.id,
            title: row.title,
            artist: row.artist,
            start_date: parse_instant(&row.start_date)?,
            end_date: parse_instant(&row.end_date)?,
            current_amount: row.current_amount,
            target_amount: row.target_amount,
            status: row.status.parse()?,
        })
    }
}

/// A status change as stored in / read from the `status_changes` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusChangeRecord {
    pub id: i64,
    pub project_id: String,
    pub from_status: String,
    pub to_status: String,
    pub changed_at: i64,
    pub created_at: i64,
}
