use std::sync::Arc;

use glossa_config::Config;
use glossa_core::Session;
use tokio::sync::{Mutex, RwLock};

use crate::profile::{self, ProfilePaths};

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub session: Mutex<Session>,
    pub profile: ProfilePaths,
}

impl AppState {
    pub fn new(config: Config, session: Session, profile: ProfilePaths) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            session: Mutex::new(session),
            profile,
        }
    }

    /// Persist the session snapshot and stop its search task
    pub async fn save_session(&self) -> anyhow::Result<()> {
        let session = self.session.lock().await;
        session.shutdown();
        profile::save_session(&self.profile, &session.snapshot())
    }
}
