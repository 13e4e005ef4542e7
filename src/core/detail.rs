use crate::core::{
    api::ApiError,
    model::{Project, ProjectId, ProjectStatus},
    notice::Notice,
    projects::ProjectRepository,
};

pub const STATUS_UPDATE_FAILED: &str =
    "Failed to update project status. You may not have permission.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    Loaded(Project),
    /// Terminal; there is no retry from here.
    NotFound,
}

/// One project fetched by id, with status actions applied in place.
#[derive(Debug, Clone)]
pub struct ProjectDetail {
    id: ProjectId,
    state: DetailState,
    notice: Option<Notice>,
}

impl ProjectDetail {
    pub fn new(id: ProjectId) -> Self {
        Self {
            id,
            state: DetailState::Loading,
            notice: None,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn project(&self) -> Option<&Project> {
        match &self.state {
            DetailState::Loaded(project) => Some(project),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn offered_transitions(&self) -> &'static [ProjectStatus] {
        self.project()
            .map(|p| p.status.forward_transitions())
            .unwrap_or(&[])
    }

    pub fn load_finished(&mut self, result: Result<Project, ApiError>) {
        self.state = match result {
            Ok(project) => DetailState::Loaded(project),
            Err(e) => {
                tracing::error!(id = self.id, error = %e, "error fetching project");
                DetailState::NotFound
            }
        };
    }

    /// The server's copy replaces the local record; no refetch.
    pub fn status_finished(&mut self, status: ProjectStatus, result: Result<Project, ApiError>) {
        match result {
            Ok(project) => {
                self.notice = Some(Notice::success(format!(
                    "Project status updated to: {}",
                    status.as_str()
                )));
                self.state = DetailState::Loaded(project);
            }
            Err(e) => {
                tracing::error!(id = self.id, error = %e, "error updating project status");
                self.notice = Some(Notice::error(STATUS_UPDATE_FAILED));
            }
        }
    }

    pub async fn load<R: ProjectRepository>(&mut self, repo: &R) {
        let result = repo.get_project(self.id).await;
        self.load_finished(result);
    }

    pub async fn set_status<R: ProjectRepository>(&mut self, repo: &R, status: ProjectStatus) {
        let result = repo.update_status(self.id, status).await;
        self.status_finished(status, result);
    }
}
