//! Outbound calls to the project tracker REST service.
//!
//! Every request carries `Authorization: Token <credential>` when a
//! credential is stored. A 401 from any endpoint drops the stored credential
//! and fires the registered unauthorized hooks before the error reaches the
//! caller.

mod credential;
mod error;

use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use reqwest::{Method, Url, header};
use serde::{Serialize, de::DeserializeOwned};

pub use credential::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{ApiError, FieldErrors, NetworkFailure};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Normalizes the base so relative paths join beneath it.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| anyhow::anyhow!("Invalid API base URL {base:?}: {e}"))?;
        Ok(Self { base_url, timeout })
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
    unauthorized_hooks: Arc<RwLock<Vec<UnauthorizedHook>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: ApiConfig, credentials: Arc<dyn CredentialStore>) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url,
            credentials,
            unauthorized_hooks: Arc::new(RwLock::new(Vec::new())),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Register a callback fired on every 401, after the credential is dropped.
    pub fn on_unauthorized<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        match self.unauthorized_hooks.write() {
            Ok(mut hooks) => hooks.push(Arc::new(hook)),
            Err(poisoned) => poisoned.into_inner().push(Arc::new(hook)),
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request::<serde_json::Value>(Method::DELETE, path, &[], None)
            .await
            .map(|_| ())
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Unknown {
                status: None,
                message: format!("invalid request path {path:?}: {e}"),
            })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.url_for(path)?;
        tracing::debug!(%method, %url, "api request");

        let mut request = self.http.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.credentials.load() {
            request = request.header(header::AUTHORIZATION, format!("Token {token}"));
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let err = ApiError::from_transport(e);
            tracing::warn!(%method, path, error = %err, "api request failed");
            err
        })?;

        let status = response.status();
        let text = response.text().await.map_err(ApiError::from_transport)?;

        if !status.is_success() {
            let err = ApiError::from_status(status, text);
            if matches!(err, ApiError::Unauthorized) {
                self.invalidate_session();
            }
            tracing::debug!(%method, path, status = status.as_u16(), "api error response");
            return Err(err);
        }

        decode(&text)
    }

    pub(crate) fn invalidate_session(&self) {
        tracing::warn!("received 401, dropping stored credential");
        if let Err(e) = self.credentials.clear() {
            tracing::error!(error = %e, "failed to clear stored credential");
        }
        let hooks: Vec<UnauthorizedHook> = match self.unauthorized_hooks.read() {
            Ok(hooks) => hooks.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for hook in hooks {
            hook();
        }
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Unknown {
        status: None,
        message: format!("failed to encode request body: {e}"),
    })
}

/// Empty bodies (204, bare 201) decode as JSON `null`.
fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(ApiError::malformed)
}
