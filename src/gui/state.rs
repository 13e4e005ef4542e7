use crate::core::{ApiClient, SessionStore, model::Role};

/// State shared by every screen.
#[derive(Debug, Clone)]
pub struct AppState {
    pub session: SessionStore,
}

impl AppState {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn api(&self) -> &ApiClient {
        self.session.api()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }
}
