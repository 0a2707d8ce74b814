use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::cache::{FetchError, QueryCache, QueryOptions};
use crate::config::QueryConfig;
use crate::database::models::Overview;
use crate::database::repository::{CategoryRepository, TransactionRepository};

/// Cache key of the overview query
pub const OVERVIEW_KEY: &str = "overview";

#[async_trait]
pub trait OverviewSource: Send + Sync {
    async fn get_overview(&self) -> Result<Overview, FetchError>;
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Reads the overview from a remote `GET /api/overview`
pub struct HttpOverviewSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    cookie_name: String,
}

impl HttpOverviewSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            cookie_name: "token".to_string(),
        }
    }

    /// Forward an auth token as the given cookie on every request.
    pub fn with_token(mut self, cookie_name: impl Into<String>, token: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self.token = Some(token.into());
        self
    }
}

#[async_trait]
impl OverviewSource for HttpOverviewSource {
    async fn get_overview(&self) -> Result<Overview, FetchError> {
        let url = format!("{}/api/overview", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::COOKIE, format!("{}={}", self.cookie_name, token));
        }

        let response = request.send().await.map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope = response
            .json::<DataEnvelope<Overview>>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }
}

/// Computes the overview from the local repositories
pub struct RepositoryOverviewSource {
    categories: Arc<dyn CategoryRepository>,
    transactions: Arc<dyn TransactionRepository>,
}

impl RepositoryOverviewSource {
    pub fn new(categories: Arc<dyn CategoryRepository>, transactions: Arc<dyn TransactionRepository>) -> Self {
        Self {
            categories,
            transactions,
        }
    }
}

#[async_trait]
impl OverviewSource for RepositoryOverviewSource {
    async fn get_overview(&self) -> Result<Overview, FetchError> {
        let category_count = self
            .categories
            .count()
            .await
            .map_err(|e| FetchError::Source(e.to_string()))?;
        let transactions = self
            .transactions
            .list(None)
            .await
            .map_err(|e| FetchError::Source(e.to_string()))?;

        Ok(Overview::summarize(&transactions, category_count))
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverviewState {
    pub overview: Option<Arc<Overview>>,
    pub is_loading: bool,
    pub error: Option<FetchError>,
}

/// The overview query: key `"overview"`, five minute staleness window and no
/// refetch when the window regains focus.
#[derive(Clone)]
pub struct UseOverview {
    cache: QueryCache,
    source: Arc<dyn OverviewSource>,
    options: QueryOptions,
}

impl UseOverview {
    pub fn new(cache: QueryCache, source: Arc<dyn OverviewSource>) -> Self {
        Self {
            cache,
            source,
            options: Self::default_options(),
        }
    }

    pub fn from_config(cache: QueryCache, source: Arc<dyn OverviewSource>, config: &QueryConfig) -> Self {
        Self::new(cache, source).with_options(QueryOptions {
            stale_time: config.overview_stale_time(),
            refetch_on_window_focus: config.overview_refetch_on_focus,
            retry: config.retry,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    pub fn default_options() -> QueryOptions {
        QueryOptions {
            stale_time: Duration::from_secs(5 * 60),
            refetch_on_window_focus: false,
            ..QueryOptions::default()
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> OverviewState {
        let state = self.cache.state::<Overview>(OVERVIEW_KEY);
        OverviewState {
            overview: state.data,
            is_loading: state.is_loading,
            error: state.error,
        }
    }

    /// Fetch (or reuse) the overview and return the resulting state.
    pub async fn load(&self) -> OverviewState {
        let source = self.source.clone();
        let result = self
            .cache
            .fetch(OVERVIEW_KEY, &self.options, move || {
                let source = source.clone();
                async move { source.get_overview().await }
            })
            .await;

        let mut state = self.state();
        if let Err(err) = result {
            state.error = Some(err);
        }
        state
    }

    pub async fn on_window_focus(&self) -> OverviewState {
        if self.cache.should_refetch_on_focus(OVERVIEW_KEY, &self.options) {
            return self.load().await;
        }
        self.state()
    }

    pub fn invalidate(&self) {
        self.cache.invalidate(OVERVIEW_KEY);
    }
}
