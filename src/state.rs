use crate::config::Config;
use crate::sessions::SessionStore;
use crate::storage::DataSource;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: DataSource,
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let source = DataSource::new(config.data_dir.clone());
        let sessions = SessionStore::new(config.max_sessions);
        Self {
            config: Arc::new(config),
            source,
            sessions: Arc::new(Mutex::new(sessions)),
        }
    }
}
