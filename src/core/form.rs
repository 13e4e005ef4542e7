//! Draft state behind the create/edit project form.
//!
//! The form never talks to the server itself: `submit` hands back a
//! [`Mutation`] and the owning view runs it.

use time::{Date, macros::format_description};

use crate::core::{
    api::ApiError,
    dashboard::Mutation,
    model::{Priority, Project, ProjectId, ProjectPayload, Trainee, UserId},
    projects::ProjectRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ProjectId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub assigned_to: Option<UserId>,
    /// Raw `YYYY-MM-DD` text as typed.
    pub due_date: String,
    pub priority: Priority,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            assigned_to: None,
            due_date: String::new(),
            priority: Priority::Medium,
        }
    }
}

impl From<&Project> for ProjectDraft {
    fn from(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            assigned_to: project.assigned_to,
            due_date: format_date(project.due_date),
            priority: project.priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Title(String),
    Description(String),
    AssignedTo(Option<UserId>),
    DueDate(String),
    Priority(Priority),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("due date {0:?} must be written as YYYY-MM-DD")]
    InvalidDueDate(String),
}

#[derive(Debug, Clone)]
pub struct ProjectForm {
    mode: FormMode,
    draft: ProjectDraft,
    trainees: Vec<Trainee>,
}

impl ProjectForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            draft: ProjectDraft::default(),
            trainees: Vec::new(),
        }
    }

    pub fn edit(project: &Project) -> Self {
        Self {
            mode: FormMode::Edit(project.id),
            draft: ProjectDraft::from(project),
            trainees: Vec::new(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &ProjectDraft {
        &self.draft
    }

    pub fn trainees(&self) -> &[Trainee] {
        &self.trainees
    }

    pub fn selected_trainee(&self) -> Option<&Trainee> {
        let id = self.draft.assigned_to?;
        self.trainees.iter().find(|t| t.id == id)
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create New Project",
            FormMode::Edit(_) => "Edit Project",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create Project",
            FormMode::Edit(_) => "Save Changes",
        }
    }

    pub fn apply(&mut self, change: FieldChange) {
        match change {
            FieldChange::Title(v) => self.draft.title = v,
            FieldChange::Description(v) => self.draft.description = v,
            FieldChange::AssignedTo(v) => self.draft.assigned_to = v,
            FieldChange::DueDate(v) => self.draft.due_date = v,
            FieldChange::Priority(v) => self.draft.priority = v,
        }
    }

    /// A failed trainee lookup leaves the selector empty rather than
    /// blocking the form.
    pub fn set_trainees(&mut self, result: Result<Vec<Trainee>, ApiError>) {
        self.trainees = result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to fetch trainees");
            Vec::new()
        });
    }

    pub fn payload(&self) -> Result<ProjectPayload, DraftError> {
        let draft = &self.draft;
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(DraftError::Missing("title"));
        }
        if draft.description.trim().is_empty() {
            return Err(DraftError::Missing("description"));
        }
        let assigned_to = draft.assigned_to.ok_or(DraftError::Missing("assignee"))?;
        let due_text = draft.due_date.trim();
        if due_text.is_empty() {
            return Err(DraftError::Missing("due date"));
        }
        let due_date = parse_date(due_text)
            .ok_or_else(|| DraftError::InvalidDueDate(due_text.to_string()))?;
        Ok(ProjectPayload {
            title: title.to_string(),
            description: draft.description.clone(),
            assigned_to,
            priority: draft.priority,
            due_date,
        })
    }

    pub fn submit(&self) -> Result<Mutation, DraftError> {
        let payload = self.payload()?;
        Ok(match self.mode {
            FormMode::Create => Mutation::Create(payload),
            FormMode::Edit(id) => Mutation::Update(id, payload),
        })
    }
}

/// Fetch the assignable trainees once for a freshly opened form.
pub async fn load_trainees<R: ProjectRepository>(repo: &R) -> Result<Vec<Trainee>, ApiError> {
    repo.list_trainees().await
}

pub fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text, format_description!("[year]-[month]-[day]")).ok()
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}
