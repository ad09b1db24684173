use std::sync::Arc;
use tracing::error;

use crate::{
    config::Config,
    database::BlogDatabase,
    error::{AppError, AppResult},
    services::PostService,
};

#[derive(Clone)]
pub struct AppState {
    pub service: PostService,
    pub database: Arc<BlogDatabase>,
    pub config: Config,
}

impl AppState {
    /// Connect, apply the schema and seed default categories.
    /// The pool is closed again if any step after connecting fails.
    pub async fn new(config: Config) -> AppResult<Self> {
        let database = BlogDatabase::connect(&config.database).await?;

        let prepared = async {
            database.init_schema().await?;
            database.seed_default_categories().await?;
            Ok::<(), AppError>(())
        }
        .await;
        if let Err(e) = prepared {
            error!("Store initialisation failed: {}", e);
            database.close().await;
            return Err(e);
        }

        Ok(Self::from_database(Arc::new(database), config))
    }

    /// Wire the service onto an already prepared store handle.
    pub fn from_database(database: Arc<BlogDatabase>, config: Config) -> Self {
        let service = PostService::new(database.clone(), config.blog.default_category_id);
        Self {
            service,
            database,
            config,
        }
    }
}
