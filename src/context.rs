/// Application context and dependency injection
use crate::{
    account::AccountManager,
    authors::AuthorManager,
    config::ServerConfig,
    content::ContentManager,
    db,
    error::ApiResult,
    references::ReferenceManager,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub account_manager: Arc<AccountManager>,
    pub author_manager: Arc<AuthorManager>,
    pub reference_manager: Arc<ReferenceManager>,
    pub content_manager: Arc<ContentManager>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default())
            .await?;

        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let config = Arc::new(config);

        Ok(Self {
            account_manager: Arc::new(AccountManager::new(pool.clone(), Arc::clone(&config))),
            author_manager: Arc::new(AuthorManager::new(pool.clone())),
            reference_manager: Arc::new(ReferenceManager::new(pool.clone())),
            content_manager: Arc::new(ContentManager::new(pool.clone())),
            db: pool,
            config,
        })
    }
}
