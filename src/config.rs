use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Args;

use crate::core::{
    ApiClient, ApiConfig, SessionStore,
    api::{DEFAULT_TIMEOUT, FileCredentialStore},
};

pub const DEFAULT_API_URL: &str = "https://projecttracker1.onrender.com/api/";

/// Connection settings shared by the GUI and the CLI.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Base URL of the project tracker API
    #[arg(long, env = "MINITRACK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "MINITRACK_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// File holding the session token [default: <config dir>/minitrack/token]
    #[arg(long, env = "MINITRACK_TOKEN_FILE", value_name = "FILE")]
    pub token_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            token_file: None,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn token_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.token_file {
            return Ok(path.clone());
        }
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine a config directory for the token file"))?;
        path.push("minitrack");
        path.push("token");
        Ok(path)
    }

    pub fn api_config(&self) -> anyhow::Result<ApiConfig> {
        ApiConfig::new(&self.api_url, self.timeout())
    }

    /// Client and session wired to the token file.
    pub fn connect(&self) -> anyhow::Result<SessionStore> {
        let credentials = Arc::new(FileCredentialStore::new(self.token_path()?));
        let api = ApiClient::new(self.api_config()?, credentials)?;
        Ok(SessionStore::new(api))
    }
}
