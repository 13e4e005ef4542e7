use time::OffsetDateTime;

use crate::core::model::{Project, ProjectStatus};

/// Aggregate counts over the currently loaded collection. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Projects still in the `assigned` status.
    pub pending: usize,
    pub overdue: usize,
}

impl DerivedStats {
    pub fn compute(projects: &[Project], now: OffsetDateTime) -> Self {
        let mut stats = DerivedStats {
            total: projects.len(),
            ..Default::default()
        };
        for project in projects {
            match project.status {
                ProjectStatus::Completed => stats.completed += 1,
                ProjectStatus::InProgress => stats.in_progress += 1,
                ProjectStatus::Assigned => stats.pending += 1,
            }
            if project.is_overdue(now) {
                stats.overdue += 1;
            }
        }
        stats
    }
}
