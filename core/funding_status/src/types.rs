//! # Types
//!
//! Shared data structures used across all modules of the crate.
//!
//! ## Status as a lifecycle
//!
//! [`ProjectStatus`] follows a forward-only lifecycle:
//!
//! ```text
//! Draft ──► Collecting ──► Succeeded ──► Executing ──► Distributing ──► Closed
//!   │           │   └────► Failed ──────────────────────────────────────►┘
//!   │           └───────────────────────────────────────────────────────►┘
//!   └───────────────────────────────────────────────────────────────────►┘
//! ```
//!
//! Only `Draft`, `Collecting` and `Closed` are derived from the project's date
//! window. The settlement states (`Succeeded`, `Failed`, `Executing`,
//! `Distributing`) are written by the platform backend and are carried through
//! untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FundingError;
use crate::progress::calculate_funding_progress;
use crate::timeline::calculate_project_status;

/// Lifecycle status of a funding project.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    /// Created but the collection window has not opened yet.
    Draft,
    /// Accepting pledges.
    Collecting,
    /// Goal reached; settlement confirmed.
    Succeeded,
    /// Goal missed; pledges returned.
    Failed,
    /// Funds disbursed to the artist; work in progress.
    Executing,
    /// Returns being paid out to backers.
    Distributing,
    /// Window over, or the project has fully wound down.
    Closed,
}

impl ProjectStatus {
    /// Every status in lifecycle order.
    pub const ALL: [ProjectStatus; 7] = [
        Self::Draft,
        Self::Collecting,
        Self::Succeeded,
        Self::Failed,
        Self::Executing,
        Self::Distributing,
        Self::Closed,
    ];

    /// Wire identifier, as sent by the platform API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Collecting => "COLLECTING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Executing => "EXECUTING",
            Self::Distributing => "DISTRIBUTING",
            Self::Closed => "CLOSED",
        }
    }

    /// Whether this status is recomputed from the project's date window.
    pub fn is_date_derived(&self) -> bool {
        matches!(self, Self::Draft | Self::Collecting | Self::Closed)
    }

    /// Forward-only lifecycle check. A status never transitions to itself.
    pub fn can_transition_to(&self, next: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, next),
            (Draft, Collecting)
                | (Draft, Closed)
                | (Collecting, Succeeded)
                | (Collecting, Failed)
                | (Collecting, Closed)
                | (Succeeded, Executing)
                | (Succeeded, Closed)
                | (Failed, Closed)
                | (Executing, Distributing)
                | (Executing, Closed)
                | (Distributing, Closed)
        )
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = FundingError;

    /// Case-insensitive; accepts `COLLECTING`, `collecting` and `Collecting`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| FundingError::UnknownStatus(s.to_string()))
    }
}

/// A funding project after it has passed the wire boundary.
///
/// Amounts are in whole currency units and are validated non-negative.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingProject {
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub current_amount: f64,
    pub target_amount: f64,
    pub status: ProjectStatus,
}

impl FundingProject {
    /// Date-derived status at `now`, ignoring whatever is stored in `status`.
    pub fn derived_status(&self, now: DateTime<Utc>) -> ProjectStatus {
        calculate_project_status(self.start_date, self.end_date, now)
    }

    /// Clamped funding progress in percent.
    pub fn progress(&self) -> f64 {
        calculate_funding_progress(self.current_amount, self.target_amount)
    }
}
