use std::future::Future;

use crate::core::{
    api::{ApiClient, ApiError},
    model::{FilterSet, Project, ProjectId, ProjectPayload, ProjectStatus, StatusChange, Trainee},
};

pub trait ProjectRepository {
    fn list_projects(
        &self,
        filters: &FilterSet,
    ) -> impl Future<Output = Result<Vec<Project>, ApiError>> + Send;
    fn get_project(&self, id: ProjectId) -> impl Future<Output = Result<Project, ApiError>> + Send;
    fn create_project(
        &self,
        payload: &ProjectPayload,
    ) -> impl Future<Output = Result<Project, ApiError>> + Send;
    /// Full replacement (`PUT`).
    fn update_project(
        &self,
        id: ProjectId,
        payload: &ProjectPayload,
    ) -> impl Future<Output = Result<Project, ApiError>> + Send;
    /// Partial update (`PATCH`) of the status field only.
    fn update_status(
        &self,
        id: ProjectId,
        status: ProjectStatus,
    ) -> impl Future<Output = Result<Project, ApiError>> + Send;
    fn delete_project(&self, id: ProjectId) -> impl Future<Output = Result<(), ApiError>> + Send;
    fn list_trainees(&self) -> impl Future<Output = Result<Vec<Trainee>, ApiError>> + Send;
}

const PROJECTS_PATH: &str = "mini-projects/";
const TRAINEES_PATH: &str = "auth/trainees/";

fn project_path(id: ProjectId) -> String {
    format!("{PROJECTS_PATH}{id}/")
}

impl ProjectRepository for ApiClient {
    async fn list_projects(&self, filters: &FilterSet) -> Result<Vec<Project>, ApiError> {
        self.get(PROJECTS_PATH, &filters.to_query()).await
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, ApiError> {
        self.get(&project_path(id), &[]).await
    }

    async fn create_project(&self, payload: &ProjectPayload) -> Result<Project, ApiError> {
        self.post(PROJECTS_PATH, payload).await
    }

    async fn update_project(
        &self,
        id: ProjectId,
        payload: &ProjectPayload,
    ) -> Result<Project, ApiError> {
        self.put(&project_path(id), payload).await
    }

    async fn update_status(
        &self,
        id: ProjectId,
        status: ProjectStatus,
    ) -> Result<Project, ApiError> {
        self.patch(&project_path(id), &StatusChange { status }).await
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), ApiError> {
        self.delete(&project_path(id)).await
    }

    async fn list_trainees(&self) -> Result<Vec<Trainee>, ApiError> {
        self.get(TRAINEES_PATH, &[]).await
    }
}
