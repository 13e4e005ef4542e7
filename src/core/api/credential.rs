use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context;

/// Persistence for the single opaque credential token.
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    fn load(&self) -> Option<String>;
    fn store(&self, token: &str) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// Token kept in a file, typically `<config_dir>/minitrack/token`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<String> {
        let token = fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn store(&self, token: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create token directory {:?}", parent))?;
        }
        fs::write(&self.path, token)
            .with_context(|| format!("Failed to write token file {:?}", self.path))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict token file {:?}", self.path))?;
        }
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove token file {:?}", self.path))
            }
        }
    }
}

/// In-process token, used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<String> {
        self.token.lock().ok()?.clone()
    }

    fn store(&self, token: &str) -> anyhow::Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("credential lock poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("credential lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}
