//! Synchronization Mediator
//!
//! Pulls pages from the [`RemoteSource`] and merges them into the
//! [`LocalStore`] when the local cursor runs dry or a refresh is requested.
//!
//! # Load types
//!
//! - `Refresh` fetches page 1, then clears the store and writes the page in
//!   one transaction.
//! - `Append` derives the page from the last loaded item as
//!   `floor(id / page_size) + 1` (page 1 when nothing is loaded) and upserts
//!   it.
//! - `Prepend` is terminal and never touches the remote.
//!
//! The fetch always completes before the transaction opens, so a failed or
//! cancelled fetch leaves the store untouched.

mod types;

pub use types::{InitializeAction, MediatorOutcome};

use crate::error::{Error, PageLoadError};
use crate::model::StoredEntity;
use crate::pager::FIRST_PAGE;
use crate::paging::{PagingConfig, PagingState};
use crate::remote::RemoteSource;
use crate::store::LocalStore;
use crate::types::{LoadType, OptionStringExt};
use chrono::Utc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of a mediator cycle
pub type MediatorResult = std::result::Result<MediatorOutcome, PageLoadError>;

/// Keeps a local store in step with a remote collection
#[derive(Debug)]
pub struct SyncMediator<R, S> {
    source: R,
    store: S,
    filter: Option<String>,
    config: PagingConfig,
    cache_timeout: Option<Duration>,
}

impl<R, S> SyncMediator<R, S>
where
    R: RemoteSource,
    S: LocalStore,
    S::Entity: From<R::Item>,
{
    pub fn new(source: R, store: S) -> Self {
        Self {
            source,
            store,
            filter: None,
            config: PagingConfig::default(),
            cache_timeout: None,
        }
    }

    /// Pass `filter` on every remote request
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter.none_if_empty();
        self
    }

    pub fn with_config(mut self, config: PagingConfig) -> Self {
        self.config = config;
        self
    }

    /// Serve cached rows without refreshing while they are younger than `timeout`
    pub fn with_cache_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.cache_timeout = timeout;
        self
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PagingConfig {
        &self.config
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Decide whether the first load should refresh from the remote
    pub fn initialize(&self) -> InitializeAction {
        let Some(timeout) = self.cache_timeout else {
            return InitializeAction::LaunchInitialRefresh;
        };

        let refreshed_at = match self.store.last_refreshed_at() {
            Ok(Some(at)) => at,
            Ok(None) => return InitializeAction::LaunchInitialRefresh,
            Err(e) => {
                warn!(error = %e, "Could not read refresh stamp, refreshing");
                return InitializeAction::LaunchInitialRefresh;
            }
        };

        // a stamp from the future counts as fresh
        let age = (Utc::now() - refreshed_at).to_std().unwrap_or_default();
        if age < timeout {
            debug!(age_secs = age.as_secs(), "Cache is fresh, skipping initial refresh");
            InitializeAction::SkipInitialRefresh
        } else {
            InitializeAction::LaunchInitialRefresh
        }
    }

    /// Remote page a cycle of `load_type` would fetch; `None` for prepend
    pub fn load_key<K>(
        &self,
        load_type: LoadType,
        state: &PagingState<S::Entity, K>,
    ) -> Option<u32> {
        match load_type {
            LoadType::Refresh => Some(FIRST_PAGE),
            LoadType::Prepend => None,
            LoadType::Append => Some(match state.last_item() {
                None => FIRST_PAGE,
                Some(last) => self.append_page(last.id()),
            }),
        }
    }

    fn append_page(&self, last_id: i64) -> u32 {
        let page_size = i64::try_from(self.config.page_size.max(1)).unwrap_or(i64::MAX);
        let page = last_id.div_euclid(page_size).saturating_add(1);
        u32::try_from(page.max(i64::from(FIRST_PAGE))).unwrap_or(u32::MAX)
    }

    /// Run one cycle
    pub async fn load<K>(
        &self,
        load_type: LoadType,
        state: &PagingState<S::Entity, K>,
    ) -> MediatorResult {
        self.run(load_type, state, None).await
    }

    /// Run one cycle that is abandoned, without merging, once `token` fires
    pub async fn load_cancellable<K>(
        &self,
        load_type: LoadType,
        state: &PagingState<S::Entity, K>,
        token: &CancellationToken,
    ) -> MediatorResult {
        self.run(load_type, state, Some(token)).await
    }

    async fn run<K>(
        &self,
        load_type: LoadType,
        state: &PagingState<S::Entity, K>,
        token: Option<&CancellationToken>,
    ) -> MediatorResult {
        let Some(page) = self.load_key(load_type, state) else {
            debug!(%load_type, "Nothing to load before the first page");
            return Ok(MediatorOutcome::end());
        };
        debug!(%load_type, page, "Mediator fetching page");

        let fetch = self.source.fetch_page(page, self.filter.as_deref());
        let fetched = match token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(Error::Cancelled),
                response = fetch => response,
            },
            None => fetch.await,
        };
        let response = fetched.map_err(|e| {
            warn!(%load_type, page, error = %e, "Mediator fetch failed");
            PageLoadError::from(e)
        })?;

        if token.is_some_and(CancellationToken::is_cancelled) {
            debug!(%load_type, page, "Cycle cancelled before merge");
            return Err(Error::Cancelled.into());
        }

        let fetched = response.results.len();
        let entities: Vec<S::Entity> = response.results.into_iter().map(Into::into).collect();

        self.store
            .transaction(|tx| {
                if load_type == LoadType::Refresh {
                    tx.clear_all()?;
                }
                tx.upsert_all(&entities)?;
                if load_type == LoadType::Refresh {
                    tx.mark_refreshed(Utc::now())?;
                }
                Ok(())
            })
            .map_err(|e| {
                warn!(%load_type, page, error = %e, "Merge rolled back");
                PageLoadError::merge(e)
            })?;

        info!(%load_type, page, fetched, "Merged remote page");
        Ok(MediatorOutcome::merged(fetched))
    }
}

#[cfg(test)]
mod tests;
