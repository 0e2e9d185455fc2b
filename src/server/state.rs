//! Application state management

use crate::session::Session;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::ServerConfig;

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub session: Arc<Session>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_session(config, Session::new())
    }

    /// State around an already configured session
    pub fn with_session(config: ServerConfig, session: Session) -> Self {
        Self {
            config,
            session: Arc::new(session),
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}
