use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::services::prediction::{Predictor, RandomPredictor};
use crate::services::storage::FileStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: FileStorage,
    pub predictor: Arc<dyn Predictor>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &Config) -> Self {
        Self {
            db,
            storage: FileStorage::new(config.storage_dir.clone(), config.static_url_prefix.clone()),
            predictor: Arc::new(RandomPredictor),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Swap the detector used by the predict endpoint.
    pub fn with_predictor(mut self, predictor: Arc<dyn Predictor>) -> Self {
        self.predictor = predictor;
        self
    }
}
