pub mod config;
pub mod core;
pub mod logging;

pub use config::Settings;
pub use crate::core::{ApiClient, ProjectCollection, ProjectRepository, SessionStore};

#[cfg(feature = "gui")]
pub mod gui;
