//! Role-gated dashboard pages.
//!
//! Every page renders one of two variants: `Creator` for users whose role is
//! `CREATOR`, `Default` (the admin view) for everyone else. Without a
//! resolved user nothing is rendered.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::auth::{AuthContext, AuthState};
use crate::database::models::{Category, Overview, Transaction, User};
use crate::database::repository::{CategoryRepository, RepositoryError, TransactionRepository};
use crate::query::{FetchError, UseOverview};

/// How many of a creator's own transactions the overview page lists
pub const RECENT_TRANSACTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewVariant {
    Creator,
    Default,
}

impl ViewVariant {
    pub fn for_user(user: &User) -> Self {
        if user.role.is_creator() {
            ViewVariant::Creator
        } else {
            ViewVariant::Default
        }
    }
}

/// Pick the variant for the current auth state; `None` means render nothing.
pub fn select_view(state: &AuthState) -> Option<(ViewVariant, &User)> {
    state.user().map(|user| (ViewVariant::for_user(user), user))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Overview,
    Transactions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ViewBody {
    CreatorOverview {
        overview: Overview,
        recent_transactions: Vec<Transaction>,
    },
    AdminOverview {
        overview: Overview,
        categories: Vec<Category>,
    },
    CreatorTransactions {
        transactions: Vec<Transaction>,
    },
    AdminTransactions {
        transactions: Vec<Transaction>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub page: Page,
    pub variant: ViewVariant,
    pub user: User,
    #[serde(flatten)]
    pub body: ViewBody,
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Data the dashboard pages read from
#[derive(Clone)]
pub struct Dashboard {
    pub overview: UseOverview,
    pub categories: Arc<dyn CategoryRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
}

impl Dashboard {
    async fn overview(&self) -> Result<Overview, ViewError> {
        let state = self.overview.load().await;
        // a failed refetch still serves the last good overview
        match (state.overview, state.error) {
            (Some(overview), _) => Ok((*overview).clone()),
            (None, Some(err)) => Err(err.into()),
            (None, None) => Err(FetchError::Source("overview unavailable".to_string()).into()),
        }
    }
}

pub async fn render_page(page: Page, auth: &AuthContext, dashboard: &Dashboard) -> Result<Option<View>, ViewError> {
    let Some((variant, user)) = select_view(&auth.state) else {
        debug!(?page, state = auth.state.name(), "no user resolved, rendering nothing");
        return Ok(None);
    };

    let body = match (page, variant) {
        (Page::Overview, ViewVariant::Creator) => {
            let overview = dashboard.overview().await?;
            let mut recent_transactions = dashboard.transactions.list(Some(user.id)).await?;
            recent_transactions.truncate(RECENT_TRANSACTIONS);
            ViewBody::CreatorOverview {
                overview,
                recent_transactions,
            }
        }
        (Page::Overview, ViewVariant::Default) => ViewBody::AdminOverview {
            overview: dashboard.overview().await?,
            categories: dashboard.categories.list().await?,
        },
        (Page::Transactions, ViewVariant::Creator) => ViewBody::CreatorTransactions {
            transactions: dashboard.transactions.list(Some(user.id)).await?,
        },
        (Page::Transactions, ViewVariant::Default) => ViewBody::AdminTransactions {
            transactions: dashboard.transactions.list(None).await?,
        },
    };

    Ok(Some(View {
        page,
        variant,
        user: user.clone(),
        body,
    }))
}
