pub mod api;
pub mod capability;
pub mod dashboard;
pub mod detail;
pub mod display;
pub mod form;
pub mod model;
pub mod notice;
pub mod projects;
pub mod session;
pub mod stats;

pub use api::{ApiClient, ApiConfig, ApiError};
pub use dashboard::{Mutation, ProjectCollection};
pub use detail::ProjectDetail;
pub use form::ProjectForm;
pub use model::{FilterSet, Priority, Project, ProjectPayload, ProjectStatus, Role};
pub use projects::ProjectRepository;
pub use session::{LoginError, SessionStore};
pub use stats::DerivedStats;
