//! State behind the project collection view.
//!
//! Each fetch cycle moves through `Loading` and then `Ready` or `Failed`.
//! Mutations never patch the local list: a successful create, update,
//! delete or status change is followed by a fresh fetch with the current
//! filters, and a failed one leaves the list as it was.
//!
//! Fetches are numbered. Only the response to the most recently issued
//! fetch is applied, so a slow response to an older filter set cannot
//! overwrite a newer one.

use time::OffsetDateTime;

use crate::core::{
    api::ApiError,
    model::{
        FilterChange, FilterSet, Project, ProjectId, ProjectPayload, ProjectStatus, Role,
    },
    notice::Notice,
    projects::ProjectRepository,
    stats::DerivedStats,
};

pub const FETCH_FAILED: &str = "Failed to load projects. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Failed(String),
}

/// Handle for one issued list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    filters: FilterSet,
}

impl FetchTicket {
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }
}

/// A delete that went through [`ProjectCollection::confirm_delete`].
///
/// Only that method can build one, so no delete request exists without a
/// confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedDelete(ProjectId);

impl ConfirmedDelete {
    pub fn id(self) -> ProjectId {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(ProjectPayload),
    Update(ProjectId, ProjectPayload),
    Delete(ConfirmedDelete),
    SetStatus(ProjectId, ProjectStatus),
}

impl Mutation {
    pub async fn apply<R: ProjectRepository>(&self, repo: &R) -> Result<(), ApiError> {
        match self {
            Mutation::Create(payload) => repo.create_project(payload).await.map(|_| ()),
            Mutation::Update(id, payload) => repo.update_project(*id, payload).await.map(|_| ()),
            Mutation::Delete(target) => repo.delete_project(target.id()).await,
            Mutation::SetStatus(id, status) => repo.update_status(*id, *status).await.map(|_| ()),
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "Project created successfully!",
            Mutation::Update(..) => "Project updated successfully!",
            Mutation::Delete(_) => "Project deleted successfully!",
            Mutation::SetStatus(..) => "Project status updated successfully!",
        }
    }

    pub fn failure_message(&self, err: &ApiError) -> String {
        let base = match self {
            Mutation::Create(_) => "Failed to create project. Please check the details and try again.",
            Mutation::Update(..) => "Failed to update project. Please check the details and try again.",
            Mutation::Delete(_) => "Failed to delete project. You may not have permission.",
            Mutation::SetStatus(..) => "Failed to update status. You may not have permission.",
        };
        match err {
            ApiError::Validation(fields) if !fields.is_empty() => format!("{base} ({fields})"),
            _ => base.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editor {
    Closed,
    Creating,
    Editing(ProjectId),
}

#[derive(Debug, Clone)]
pub struct ProjectCollection {
    role: Role,
    filters: FilterSet,
    phase: Phase,
    projects: Vec<Project>,
    stats: DerivedStats,
    notice: Option<Notice>,
    editor: Editor,
    pending_delete: Option<ProjectId>,
    issued: u64,
}

impl ProjectCollection {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            filters: FilterSet::default(),
            phase: Phase::Loading,
            projects: Vec::new(),
            stats: DerivedStats::default(),
            notice: None,
            editor: Editor::Closed,
            pending_delete: None,
            issued: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn stats(&self) -> DerivedStats {
        self.stats
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn editor(&self) -> Editor {
        self.editor
    }

    pub fn pending_delete(&self) -> Option<ProjectId> {
        self.pending_delete
    }

    pub fn heading(&self) -> &'static str {
        match self.role {
            Role::Trainer => "Manage Projects",
            Role::Trainee => "My Projects",
        }
    }

    pub fn subheading(&self) -> &'static str {
        match self.role {
            Role::Trainer => "Create, assign, and track mini projects for trainees.",
            Role::Trainee => "View and update your assigned mini projects.",
        }
    }

    /// Hint shown in place of an empty list.
    pub fn empty_hint(&self) -> &'static str {
        if self.filters.is_active() {
            "Try adjusting your filters to see more projects."
        } else {
            match self.role {
                Role::Trainer => "Create your first project to get started.",
                Role::Trainee => "No projects have been assigned to you yet.",
            }
        }
    }

    /// Start a fetch with the current filters.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.phase = Phase::Loading;
        if self.notice.as_ref().is_some_and(Notice::is_error) {
            self.notice = None;
        }
        FetchTicket {
            seq: self.issued,
            filters: self.filters.clone(),
        }
    }

    /// Apply a fetch result. Returns `false` when the ticket was superseded
    /// and the result was discarded.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Project>, ApiError>,
        now: OffsetDateTime,
    ) -> bool {
        if ticket.seq != self.issued {
            tracing::debug!(seq = ticket.seq, latest = self.issued, "discarding superseded fetch");
            return false;
        }
        match result {
            Ok(projects) => {
                self.stats = DerivedStats::compute(&projects, now);
                self.projects = projects;
                self.phase = Phase::Ready;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch projects");
                self.projects.clear();
                self.stats = DerivedStats::default();
                self.phase = Phase::Failed(FETCH_FAILED.to_string());
            }
        }
        true
    }

    /// Replace the filters. Structurally equal filters do not refetch.
    pub fn set_filters(&mut self, filters: FilterSet) -> Option<FetchTicket> {
        if filters == self.filters {
            return None;
        }
        self.filters = filters;
        Some(self.begin_fetch())
    }

    pub fn change_filters(&mut self, change: FilterChange) -> Option<FetchTicket> {
        let merged = self.filters.merged(change);
        self.set_filters(merged)
    }

    pub fn clear_filters(&mut self) -> Option<FetchTicket> {
        self.set_filters(FilterSet::default())
    }

    pub fn open_create(&mut self) {
        self.editor = Editor::Creating;
    }

    /// Opening an editor replaces the create form.
    pub fn open_edit(&mut self, id: ProjectId) {
        self.editor = Editor::Editing(id);
    }

    pub fn close_editor(&mut self) {
        self.editor = Editor::Closed;
    }

    /// First half of a delete: nothing is sent until [`Self::confirm_delete`].
    pub fn request_delete(&mut self, id: ProjectId) {
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Option<Mutation> {
        self.pending_delete
            .take()
            .map(|id| Mutation::Delete(ConfirmedDelete(id)))
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Record a mutation outcome. On success returns the refetch to run.
    pub fn finish_mutation(
        &mut self,
        mutation: &Mutation,
        result: Result<(), ApiError>,
    ) -> Option<FetchTicket> {
        match result {
            Ok(()) => {
                self.notice = Some(Notice::success(mutation.success_message()));
                match (mutation, self.editor) {
                    (Mutation::Create(_), Editor::Creating) => self.editor = Editor::Closed,
                    (Mutation::Update(id, _), Editor::Editing(open)) if *id == open => {
                        self.editor = Editor::Closed
                    }
                    _ => {}
                }
                Some(self.begin_fetch())
            }
            Err(e) => {
                tracing::error!(error = %e, ?mutation, "project mutation failed");
                self.notice = Some(Notice::error(mutation.failure_message(&e)));
                None
            }
        }
    }

    /// Fetch with the current filters and apply the result.
    pub async fn fetch_projects<R: ProjectRepository>(&mut self, repo: &R) {
        let ticket = self.begin_fetch();
        self.run_fetch(repo, ticket).await;
    }

    pub async fn update_filters<R: ProjectRepository>(&mut self, repo: &R, change: FilterChange) {
        if let Some(ticket) = self.change_filters(change) {
            self.run_fetch(repo, ticket).await;
        }
    }

    /// Run a mutation, then refetch if it succeeded.
    pub async fn submit<R: ProjectRepository>(&mut self, repo: &R, mutation: Mutation) {
        let result = mutation.apply(repo).await;
        if let Some(ticket) = self.finish_mutation(&mutation, result) {
            self.run_fetch(repo, ticket).await;
        }
    }

    pub async fn run_fetch<R: ProjectRepository>(&mut self, repo: &R, ticket: FetchTicket) {
        let result = repo.list_projects(ticket.filters()).await;
        self.complete_fetch(ticket, result, OffsetDateTime::now_utc());
    }
}
