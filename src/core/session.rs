//! Who is signed in.
//!
//! The role is held in a `watch` channel so views can observe it. It is
//! only ever written as a whole: after a completed identity fetch, or back
//! to `None` on logout, a failed check, or a 401 reported by the transport.

use std::sync::Arc;

use tokio::sync::watch;

use crate::core::{
    api::{ApiClient, ApiError},
    model::{Credentials, Identity, Registration, Role, TokenResponse},
};

const LOGIN_PATH: &str = "auth/login/";
const IDENTITY_PATH: &str = "auth/user/";
const REGISTER_PATH: &str = "auth/register/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("Unable to sign in. {}", .0.user_message())]
    Unavailable(ApiError),
    #[error("Unable to save the session: {0}")]
    Storage(String),
}

impl LoginError {
    fn from_api(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized
            | ApiError::Validation(_)
            | ApiError::Forbidden(_)
            | ApiError::NotFound(_) => LoginError::InvalidCredentials,
            other => LoginError::Unavailable(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    api: ApiClient,
    role: Arc<watch::Sender<Option<Role>>>,
}

impl SessionStore {
    /// Wraps the client and subscribes to its unauthorized signal.
    pub fn new(api: ApiClient) -> Self {
        let (sender, _) = watch::channel(None);
        let role = Arc::new(sender);
        let on_expired = role.clone();
        api.on_unauthorized(move || {
            if on_expired.send_if_modified(|role| role.take().is_some()) {
                tracing::info!("session expired, signed out");
            }
        });
        Self { api, role }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn role(&self) -> Option<Role> {
        *self.role.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.role().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Role>> {
        self.role.subscribe()
    }

    /// Validates a stored credential, if any. Always resolves; any failure
    /// leaves the session signed out with the credential dropped.
    pub async fn initialize(&self) -> Option<Role> {
        if self.api.credentials().load().is_none() {
            self.set_role(None);
            return None;
        }
        match self.fetch_identity().await {
            Ok(role) => {
                tracing::info!(%role, "restored session");
                self.set_role(Some(role));
                Some(role)
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored token invalid or expired, signing out");
                self.drop_credential();
                self.set_role(None);
                None
            }
        }
    }

    /// Ends any earlier session before posting; on failure the store stays
    /// signed out.
    pub async fn login(&self, username: &str, password: &str) -> Result<Role, LoginError> {
        self.drop_credential();
        self.set_role(None);
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let token: TokenResponse = self
            .api
            .post(LOGIN_PATH, &credentials)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "login failed");
                LoginError::from_api(e)
            })?;
        self.api
            .credentials()
            .store(&token.token)
            .map_err(|e| LoginError::Storage(e.to_string()))?;

        match self.fetch_identity().await {
            Ok(role) => {
                tracing::info!(%role, "signed in");
                self.set_role(Some(role));
                Ok(role)
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity lookup after login failed");
                self.drop_credential();
                self.set_role(None);
                Err(LoginError::from_api(e))
            }
        }
    }

    /// Session that starts signed in without talking to the server.
    #[cfg(test)]
    pub(crate) fn signed_in_as(api: ApiClient, role: Role) -> Self {
        let session = Self::new(api);
        session.set_role(Some(role));
        session
    }

    /// Local only; the server is not told.
    pub fn logout(&self) {
        self.drop_credential();
        self.set_role(None);
    }

    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.api
            .post::<_, serde_json::Value>(REGISTER_PATH, registration)
            .await
            .map(|_| ())
    }

    async fn fetch_identity(&self) -> Result<Role, ApiError> {
        let identity: Identity = self.api.get(IDENTITY_PATH, &[]).await?;
        Ok(identity.role)
    }

    fn set_role(&self, role: Option<Role>) {
        self.role.send_if_modified(|current| {
            let changed = *current != role;
            *current = role;
            changed
        });
    }

    fn drop_credential(&self) {
        if let Err(e) = self.api.credentials().clear() {
            tracing::error!(error = %e, "failed to clear stored credential");
        }
    }
}

pub const REGISTRATION_SUCCESS: &str = "Registration successful! You can now log in.";

/// Text for a failed registration: username problems first, then password.
pub fn registration_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Validation(fields) => {
            let mut message = String::from("Registration failed: ");
            if let Some(errors) = fields.get("username") {
                message.push_str(&format!("Username: {}", errors.join(", ")));
            } else if let Some(errors) = fields.get("password") {
                message.push_str(&format!("Password: {}", errors.join(", ")));
            } else {
                message.push_str(&fields.to_string());
            }
            message
        }
        _ => "An unexpected error occurred. Please try again.".to_string(),
    }
}
