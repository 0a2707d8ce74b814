//! Shared application state handed to every handler through axum's `State`.

use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::auth::{JwtUserResolver, UserResolver};
use crate::config::AppConfig;
use crate::database::repository::{CategoryRepository, RepositoryError, TransactionRepository};
use crate::database::{
    DatabaseManager, MemoryCategoryRepository, MemoryTransactionRepository, PgCategoryRepository,
    PgTransactionRepository,
};
use crate::query::{HttpOverviewSource, OverviewSource, QueryCache, RepositoryOverviewSource, UseOverview};
use crate::views::Dashboard;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub categories: Arc<dyn CategoryRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub resolver: Arc<dyn UserResolver>,
    pub overview: UseOverview,
    /// Present when the repositories are backed by Postgres
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Build state from explicit parts; the overview source defaults to the
    /// given repositories unless the config names a remote one.
    pub fn new(
        config: AppConfig,
        categories: Arc<dyn CategoryRepository>,
        transactions: Arc<dyn TransactionRepository>,
        resolver: Arc<dyn UserResolver>,
    ) -> Self {
        let source: Arc<dyn OverviewSource> = match &config.query.overview_source_url {
            Some(url) => {
                let mut source = HttpOverviewSource::new(url.clone());
                if let Some(token) = &config.query.overview_source_token {
                    source = source.with_token(config.security.auth_cookie_name.clone(), token.clone());
                }
                Arc::new(source)
            }
            None => Arc::new(RepositoryOverviewSource::new(categories.clone(), transactions.clone())),
        };
        let cache = QueryCache::new();
        let overview = UseOverview::from_config(cache.clone(), source, &config.query);

        Self {
            config: Arc::new(config),
            categories,
            transactions,
            resolver,
            overview,
            db_pool: None,
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        let resolver = Arc::new(JwtUserResolver::new(config.security.jwt_secret.clone()));
        Self::new(
            config,
            Arc::new(MemoryCategoryRepository::new()),
            Arc::new(MemoryTransactionRepository::new()),
            resolver,
        )
    }

    /// Connect to Postgres when `DATABASE_URL` is configured, otherwise fall
    /// back to the in-memory repositories.
    pub async fn from_config(config: AppConfig) -> Result<Self, RepositoryError> {
        if config.database.url.is_none() {
            info!("DATABASE_URL not set, using in-memory repositories");
            return Ok(Self::in_memory(config));
        }

        let pool = DatabaseManager::connect(&config.database).await?;
        DatabaseManager::ensure_schema(&pool).await?;

        let resolver = Arc::new(JwtUserResolver::new(config.security.jwt_secret.clone()));
        let mut state = Self::new(
            config,
            Arc::new(PgCategoryRepository::new(pool.clone())),
            Arc::new(PgTransactionRepository::new(pool.clone())),
            resolver,
        );
        state.db_pool = Some(pool);
        Ok(state)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            overview: self.overview.clone(),
            categories: self.categories.clone(),
            transactions: self.transactions.clone(),
        }
    }
}
