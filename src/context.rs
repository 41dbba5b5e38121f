/// Application context and dependency injection
use crate::{
    config::ServerConfig,
    content::ContentStore,
    db,
    directory::AdminDirectory,
    error::PortalResult,
    mailer::Mailer,
    moderation::{ModerationEngine, PendingQueue},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub directory: Arc<AdminDirectory>,
    pub content: Arc<ContentStore>,
    pub queue: Arc<PendingQueue>,
    pub engine: Arc<ModerationEngine>,
    pub mailer: Arc<Mailer>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> PortalResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directory if it doesn't exist
        if !config.storage.data_directory.exists() {
            tokio::fs::create_dir_all(&config.storage.data_directory).await?;
        }

        // Initialize the portal database
        let pool = db::create_pool(&config.storage.portal_db, db::DatabaseOptions::default())
            .await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        // Initialize services
        let directory = AdminDirectory::new(pool.clone());
        let content = Arc::new(ContentStore::new(pool.clone()));
        let queue = PendingQueue::new(pool.clone());
        let mailer = Arc::new(Mailer::new(config.email.clone())?);

        let engine = Arc::new(ModerationEngine::new(
            pool.clone(),
            directory.clone(),
            queue.clone(),
            Arc::clone(&mailer),
            config.service.public_url.clone(),
        ));

        // Seed the queue gauge from persisted state
        crate::metrics::PENDING_QUEUE_DEPTH.set(queue.depth().await?);

        Ok(Self {
            config: Arc::new(config),
            db: pool,
            directory: Arc::new(directory),
            content,
            queue: Arc::new(queue),
            engine,
            mailer,
        })
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        self.config.service.public_url.clone()
    }
}
