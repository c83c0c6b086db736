//! Status badges and the UI-facing projection of a project.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::progress::{format_amount, format_percentage};
use crate::timeline::{days_until_end, days_until_start};
use crate::types::{FundingProject, ProjectStatus};

/// Style token attached to a status badge.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Gray,
    Blue,
    Green,
    Red,
    Purple,
    Amber,
    Slate,
}

impl StatusColor {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::Amber => "amber",
            Self::Slate => "slate",
        }
    }
}

pub fn status_label(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Draft => "Coming soon",
        ProjectStatus::Collecting => "Funding",
        ProjectStatus::Succeeded => "Funded",
        ProjectStatus::Failed => "Unsuccessful",
        ProjectStatus::Executing => "In production",
        ProjectStatus::Distributing => "Paying out",
        ProjectStatus::Closed => "Closed",
    }
}

pub fn status_color(status: ProjectStatus) -> StatusColor {
    match status {
        ProjectStatus::Draft => StatusColor::Gray,
        ProjectStatus::Collecting => StatusColor::Blue,
        ProjectStatus::Succeeded => StatusColor::Green,
        ProjectStatus::Failed => StatusColor::Red,
        ProjectStatus::Executing => StatusColor::Purple,
        ProjectStatus::Distributing => StatusColor::Amber,
        ProjectStatus::Closed => StatusColor::Slate,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusBadge {
    pub status: ProjectStatus,
    pub label: &'static str,
    pub color: StatusColor,
}

impl From<ProjectStatus> for StatusBadge {
    fn from(status: ProjectStatus) -> Self {
        StatusBadge {
            status,
            label: status_label(status),
            color: status_color(status),
        }
    }
}

/// Everything a project card needs to render, computed at one instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub current_amount: f64,
    pub target_amount: f64,
    pub badge: StatusBadge,
    /// Unrounded, clamped to `[0, 100]`.
    pub progress: f64,
    pub progress_label: String,
    pub amount_label: String,
    pub target_label: String,
    pub days_until_start: i64,
    pub days_until_end: i64,
}

impl ProjectView {
    /// Project `project` at `now`. Uses the stored status as-is; run the
    /// project through [`crate::refresh_status`] first if it may be stale.
    pub fn at(project: &FundingProject, now: DateTime<Utc>) -> Self {
        let progress = project.progress();
        ProjectView {
            id: project.id.clone(),
            title: project.title.clone(),
            artist: project.artist.clone(),
            start_date: project.start_date,
            end_date: project.end_date,
            current_amount: project.current_amount,
            target_amount: project.target_amount,
            badge: StatusBadge::from(project.status),
            progress,
            progress_label: format_percentage(progress),
            amount_label: format_amount(project.current_amount),
            target_label: format_amount(project.target_amount),
            days_until_start: days_until_start(project.start_date, now),
            days_until_end: days_until_end(project.end_date, now),
        }
    }
}
