//! Cached remote reads.
//!
//! [`QueryCache`] stores one entry per key with its fetch time and staleness
//! window, joins concurrent fetches of the same key, and records failures as
//! state instead of dropping them. Hooks such as [`UseOverview`] bind a key,
//! a source and a set of [`QueryOptions`].

pub mod cache;
pub mod overview;

pub use cache::{FetchError, QueryCache, QueryOptions, QueryState};
pub use overview::{
    HttpOverviewSource, OverviewSource, OverviewState, RepositoryOverviewSource, UseOverview, OVERVIEW_KEY,
};
