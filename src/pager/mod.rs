//! Remote-Only Pager
//!
//! Pages straight from the [`RemoteSource`] with no persistence. Keys are
//! 1-based server page numbers; a missing key means page 1. A page with no
//! items ends pagination.
//!
//! Failures surface as [`PageLoadError`](crate::error::PageLoadError) and are
//! never retried here; re-issuing is the caller's decision.
//!
//! Loads are single-flight: one request is in flight per pager, and a load
//! that waited while the same page was fetched reuses that page.

use crate::paging::{LoadParams, Page, PageResult, PagingConfig, PagingState};
use crate::remote::RemoteSource;
use crate::types::OptionStringExt;
use futures::stream::{self, Stream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// First server page
pub const FIRST_PAGE: u32 = 1;

/// Pager reading one remote collection
pub struct RemotePager<R: RemoteSource> {
    source: R,
    filter: Option<String>,
    config: PagingConfig,
    flight: tokio::sync::Mutex<()>,
    /// Bumped after every successful fetch
    completed: AtomicU64,
    last: Mutex<Option<(u32, Page<R::Item, u32>)>>,
}

impl<R: RemoteSource> RemotePager<R> {
    /// Unfiltered pager
    pub fn new(source: R) -> Self {
        Self {
            source,
            filter: None,
            config: PagingConfig::default(),
            flight: tokio::sync::Mutex::new(()),
            completed: AtomicU64::new(0),
            last: Mutex::new(None),
        }
    }

    /// Pager passing `filter` (e.g. a genre id) on every request
    pub fn with_filter(source: R, filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()).none_if_empty(),
            ..Self::new(source)
        }
    }

    /// Override the page size reported in load requests
    pub fn with_config(mut self, config: PagingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn config(&self) -> &PagingConfig {
        &self.config
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    /// Load the page named by `params.key` (page 1 when absent)
    pub async fn load(&self, params: LoadParams<u32>) -> PageResult<R::Item, u32> {
        let page = params.key.unwrap_or(FIRST_PAGE);
        let observed = self.completed.load(Ordering::Acquire);
        let _flight = self.flight.lock().await;

        if self.completed.load(Ordering::Acquire) != observed {
            if let Some(done) = self.completed_page(page) {
                debug!(page, "Coalesced with a completed load");
                return Ok(done);
            }
        }

        debug!(load_type = %params.load_type, page, "Loading remote page");
        let response = self
            .source
            .fetch_page(page, self.filter.as_deref())
            .await
            .map_err(|e| {
                warn!(page, error = %e, "Remote page load failed");
                e
            })?;

        let prev_key = if page <= FIRST_PAGE {
            None
        } else {
            Some(page - 1)
        };
        let next_key = if response.is_empty() {
            None
        } else {
            page.checked_add(1)
        };

        let loaded = Page::new(response.results, prev_key, next_key);
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some((page, loaded.clone()));
        self.completed.fetch_add(1, Ordering::AcqRel);
        Ok(loaded)
    }

    fn completed_page(&self, page: u32) -> Option<Page<R::Item, u32>> {
        let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        match last.as_ref() {
            Some((key, done)) if *key == page => Some(done.clone()),
            _ => None,
        }
    }

    /// Key to restart from after invalidation: the page around the anchor
    pub fn refresh_key<T>(&self, state: &PagingState<T, u32>) -> Option<u32> {
        let anchor = state.anchor_position?;
        let page = state.closest_page_to_position(anchor)?;
        page.prev_key
            .and_then(|prev| prev.checked_add(1))
            .or_else(|| page.next_key.and_then(|next| next.checked_sub(1)))
    }

    /// Walk the collection forward from page 1.
    ///
    /// Ends after the first page without a next key; a failed load is
    /// yielded and ends the stream.
    pub fn pages(&self) -> impl Stream<Item = PageResult<R::Item, u32>> + '_ {
        let page_size = self.config.page_size;
        let first = LoadParams::refresh(None, page_size);

        stream::unfold(Some(first), move |params| async move {
            let params = params?;
            let result = self.load(params).await;
            let next = match &result {
                Ok(page) => page
                    .next_key
                    .map(|key| LoadParams::append(key, page_size)),
                Err(_) => None,
            };
            Some((result, next))
        })
    }
}

impl<R: RemoteSource> std::fmt::Debug for RemotePager<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemotePager")
            .field("filter", &self.filter)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Build a remote-only pager for `source`, optionally filtered
pub fn remote_pager<R: RemoteSource>(source: R, filter: Option<String>) -> RemotePager<R> {
    match filter {
        Some(filter) => RemotePager::with_filter(source, filter),
        None => RemotePager::new(source),
    }
}
