use sqlx::PgPool;
use std::sync::Arc;

use crate::collaborators::mail::Mailer;
use crate::collaborators::storage::BlobStorage;
use crate::config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub env: config::Config,
    pub mailer: Arc<dyn Mailer>,
    pub storage: Arc<dyn BlobStorage>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        env: config::Config,
        mailer: Arc<dyn Mailer>,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            db,
            env,
            mailer,
            storage,
        }
    }
}
