use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};

time::serde::format_description!(due_date_format, Date, "[year]-[month]-[day]");

pub type ProjectId = u64;
pub type UserId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Trainer,
    Trainee,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Trainee, Role::Trainer];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Trainer => "trainer",
            Role::Trainee => "trainee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Trainer => f.write_str("Trainer"),
            Role::Trainee => f.write_str("Trainee"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => f.write_str("Low"),
            Priority::Medium => f.write_str("Medium"),
            Priority::High => f.write_str("High"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown priority {s:?} (expected low, medium or high)"))
    }
}

/// Lifecycle of a mini project. Variants are declared in their forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Assigned,
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Assigned,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Assigned => "assigned",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
        }
    }

    /// Wire value with the underscore replaced, e.g. "in progress".
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Statuses offered as actions from this one. The server decides legality.
    pub fn forward_transitions(self) -> &'static [ProjectStatus] {
        match self {
            ProjectStatus::Assigned => &[ProjectStatus::InProgress, ProjectStatus::Completed],
            ProjectStatus::InProgress => &[ProjectStatus::Completed],
            ProjectStatus::Completed => &[],
        }
    }

    pub fn action_label(self) -> &'static str {
        match self {
            ProjectStatus::Assigned => "Mark as Assigned",
            ProjectStatus::InProgress => "Mark as In Progress",
            ProjectStatus::Completed => "Mark as Completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Assigned => f.write_str("Assigned"),
            ProjectStatus::InProgress => f.write_str("In Progress"),
            ProjectStatus::Completed => f.write_str("Completed"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace([' ', '-'], "_");
        ProjectStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| {
                anyhow::anyhow!("unknown status {s:?} (expected assigned, in_progress or completed)")
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    pub priority: Priority,
    pub status: ProjectStatus,
    #[serde(with = "due_date_format")]
    pub due_date: Date,
}

impl Project {
    /// Due dates carry no time of day; they fall due at midnight UTC.
    pub fn due_at(&self) -> OffsetDateTime {
        self.due_date.with_time(Time::MIDNIGHT).assume_utc()
    }

    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        self.status != ProjectStatus::Completed && self.due_at() < now
    }
}

/// Body for create (`POST`) and full update (`PUT`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPayload {
    pub title: String,
    pub description: String,
    pub assigned_to: UserId,
    pub priority: Priority,
    #[serde(with = "due_date_format")]
    pub due_date: Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainee {
    pub id: UserId,
    pub username: String,
}

impl fmt::Display for Trainee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Constraints applied to the collection fetch. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSet {
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<UserId>,
}

/// A partial filter change; only the `Some` fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterChange {
    pub status: Option<Option<ProjectStatus>>,
    pub priority: Option<Option<Priority>>,
    pub assigned_to: Option<Option<UserId>>,
}

impl FilterSet {
    pub fn is_active(&self) -> bool {
        self.status.is_some() || self.priority.is_some() || self.assigned_to.is_some()
    }

    pub fn merged(&self, change: FilterChange) -> FilterSet {
        FilterSet {
            status: change.status.unwrap_or(self.status),
            priority: change.priority.unwrap_or(self.priority),
            assigned_to: change.assigned_to.unwrap_or(self.assigned_to),
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            query.push(("priority", priority.as_str().to_string()));
        }
        if let Some(assigned_to) = self.assigned_to {
            query.push(("assignedTo", assigned_to.to_string()));
        }
        query
    }
}
