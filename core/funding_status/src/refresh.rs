//! Copy-on-write status refresh over a list of projects.
//!
//! Called on a fixed timer by whatever owns the project list. The input slice
//! is never mutated; callers swap in [`Refreshed::projects`] wholesale.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{FundingProject, ProjectStatus};

/// A project whose displayed status moved during a refresh.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub project_id: String,
    pub from: ProjectStatus,
    pub to: ProjectStatus,
}

impl StatusChange {
    /// `false` when the move goes backwards, e.g. `Closed → Collecting`
    /// after the platform extended a project's end date.
    pub fn is_forward(&self) -> bool {
        self.from.can_transition_to(self.to)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Refreshed {
    pub projects: Vec<FundingProject>,
    pub changes: Vec<StatusChange>,
}

impl Refreshed {
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// The status `project` should display at `now`.
///
/// Settlement statuses are owned by the platform and returned untouched.
pub fn refresh_status(project: &FundingProject, now: DateTime<Utc>) -> ProjectStatus {
    if project.status.is_date_derived() {
        project.derived_status(now)
    } else {
        project.status
    }
}

pub fn refresh_statuses(projects: &[FundingProject], now: DateTime<Utc>) -> Refreshed {
    let mut changes = Vec::new();
    let projects = projects
        .iter()
        .map(|project| {
            let status = refresh_status(project, now);
            if status != project.status {
                changes.push(StatusChange {
                    project_id: project.id.clone(),
                    from: project.status,
                    to: status,
                });
            }
            FundingProject {
                status,
                ..project.clone()
            }
        })
        .collect();

    Refreshed { projects, changes }
}
