//! # Collaboreum funding status
//!
//! Pure status and progress logic for Collaboreum funding projects. Every UI
//! surface that shows a status badge or a progress bar goes through this crate.
//!
//! | Concern            | Entry point(s)                                         |
//! |--------------------|--------------------------------------------------------|
//! | Status derivation  | [`calculate_project_status`], [`is_project_in_progress`] |
//! | Day counts         | [`days_until_start`], [`days_until_end`]               |
//! | Progress           | [`calculate_funding_progress`], [`format_percentage`]  |
//! | Presentation       | [`status_label`], [`status_color`], [`ProjectView`]    |
//! | Wire boundary      | [`parse_project`], [`parse_project_list`]              |
//! | Periodic refresh   | [`refresh_statuses`]                                   |
//!
//! ## Architecture
//!
//! Nothing in this crate performs I/O or reads the clock implicitly: every
//! function that depends on time takes `now` explicitly, except the
//! `*_now` convenience wrappers. Scheduling the periodic refresh is the
//! caller's job (see the `status_sync` service).

mod error;
mod presentation;
mod progress;
mod refresh;
mod timeline;
mod types;
mod wire;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_progress;
#[cfg(test)]
mod test_refresh;

pub use error::{FundingError, Result};
pub use presentation::{status_color, status_label, ProjectView, StatusBadge, StatusColor};
pub use progress::{calculate_funding_progress, format_amount, format_percentage, remaining_amount};
pub use refresh::{refresh_status, refresh_statuses, Refreshed, StatusChange};
pub use timeline::{
    calculate_project_status, calculate_project_status_now, calculate_project_status_str,
    days_until_end, days_until_start, is_project_ended, is_project_in_progress,
    is_project_started, parse_instant,
};
pub use types::{FundingProject, ProjectStatus};
pub use wire::{
    parse_project, parse_project_list, ProjectBatch, RejectedProject, WireAmount, WireId,
    WireProject,
};
