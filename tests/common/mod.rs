#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

use std::{sync::Arc, time::Duration};

pub use minitrack::core::{
    ApiClient, ApiConfig, ApiError, Mutation, ProjectCollection, ProjectDetail, ProjectForm,
    ProjectRepository, SessionStore,
    api::{CredentialStore, FileCredentialStore, MemoryCredentialStore, NetworkFailure},
    model::{FilterChange, FilterSet, Priority, ProjectPayload, ProjectStatus, Role},
};
use time::macros::date;

/// Client against the fake backend with an in-memory credential.
pub fn client_with(
    backend: &Backend,
    credentials: Arc<dyn CredentialStore>,
    timeout: Duration,
) -> ApiClient {
    let config = ApiConfig::new(&backend.base_url(), timeout).expect("valid backend url");
    ApiClient::new(config, credentials).expect("Failed to build client")
}

/// Session with no stored credential.
pub fn anonymous_session(backend: &Backend) -> SessionStore {
    let client = client_with(
        backend,
        Arc::new(MemoryCredentialStore::default()),
        Duration::from_secs(5),
    );
    SessionStore::new(client)
}

/// Session signed in as `user`.
pub async fn signed_in(backend: &Backend, user: (&str, &str)) -> SessionStore {
    let session = anonymous_session(backend);
    session
        .login(user.0, user.1)
        .await
        .expect("seeded user should be able to log in");
    session
}

pub fn make_payload(title: &str, assigned_to: u64) -> ProjectPayload {
    ProjectPayload {
        title: title.to_string(),
        description: format!("{title} description"),
        assigned_to,
        priority: Priority::High,
        due_date: date!(2099 - 06 - 30),
    }
}
