#![allow(dead_code)]

use chrono::{DateTime, Utc};

use crate::types::{FundingProject, ProjectStatus};

/// INV-1: Amounts are never negative.
pub fn assert_amounts_non_negative(project: &FundingProject) {
    assert!(
        project.current_amount >= 0.0 && project.target_amount >= 0.0,
        "INV-1 violated: project {} has a negative amount ({} / {})",
        project.id,
        project.current_amount,
        project.target_amount
    );
}

/// INV-2: The collection window is ordered.
pub fn assert_window_ordered(project: &FundingProject) {
    assert!(
        project.start_date <= project.end_date,
        "INV-2 violated: project {} starts after it ends",
        project.id
    );
}

/// INV-3: Progress stays inside `[0, 100]`.
pub fn assert_progress_bounded(progress: f64) {
    assert!(
        (0.0..=100.0).contains(&progress),
        "INV-3 violated: progress {progress} out of bounds"
    );
}

/// INV-4: A window status always agrees with the dates at `now`.
pub fn assert_window_status_consistent(project: &FundingProject, now: DateTime<Utc>) {
    if project.status.is_date_derived() {
        assert_eq!(
            project.status,
            project.derived_status(now),
            "INV-4 violated: project {} shows {} at {now}",
            project.id,
            project.status
        );
    }
}

/// INV-5: Only forward lifecycle transitions.
pub fn assert_valid_status_transition(from: ProjectStatus, to: ProjectStatus) {
    assert!(
        from.can_transition_to(to),
        "INV-5 violated: invalid status transition from {from:?} to {to:?}"
    );
}

/// Run all stateless project invariants.
pub fn assert_all_project_invariants(project: &FundingProject, now: DateTime<Utc>) {
    assert_amounts_non_negative(project);
    assert_window_ordered(project);
    assert_progress_bounded(project.progress());
    assert_window_status_consistent(project, now);
}
