use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Database;
use crate::media::MediaStorage;
use crate::observer::ObserverPipeline;
use crate::services::UserService;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub media: MediaStorage,
    pub observers: Arc<ObserverPipeline>,
    pub settings: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, settings: AppConfig) -> Self {
        Self {
            media: MediaStorage::new(&settings.media),
            observers: Arc::new(ObserverPipeline::with_defaults(&settings.media)),
            db,
            settings: Arc::new(settings),
        }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.clone(), self.observers.clone())
    }
}
