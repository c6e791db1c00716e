//! Read cursor over the local store, backed by the mediator

use super::local::LocalPagingSource;
use crate::error::{Error, PageLoadError};
use crate::mediator::{InitializeAction, MediatorOutcome, MediatorResult, SyncMediator};
use crate::paging::{LoadParams, PagingConfig, PagingState};
use crate::remote::RemoteSource;
use crate::store::LocalStore;
use crate::types::LoadType;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::MutexGuard;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type LoadResult = std::result::Result<LoadOutcome, PageLoadError>;

/// What a cursor operation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadOutcome {
    /// This many new items became visible
    Loaded(usize),
    /// An identical request finished while this one waited; nothing was done
    Coalesced,
    /// No further items exist in this direction
    EndReached,
}

impl LoadOutcome {
    /// Items made visible by this call
    pub fn loaded(&self) -> usize {
        match self {
            Self::Loaded(n) => *n,
            _ => 0,
        }
    }
}

/// Result of [`CachedPager::start`]
#[derive(Debug)]
pub struct StartReport {
    pub action: InitializeAction,
    /// The initial refresh, when one was launched
    pub refresh: Option<MediatorResult>,
    /// Items visible after the first local read
    pub visible: usize,
}

impl StartReport {
    /// Whether a launched refresh failed and cached rows are served instead
    pub fn is_offline(&self) -> bool {
        matches!(self.refresh, Some(Err(_)))
    }
}

/// Loaded pages and the cursor's position in the store
#[derive(Debug)]
struct Cursor<E> {
    state: PagingState<E, usize>,
    /// Store offset of the first loaded page
    first_offset: usize,
    /// The remote reported an empty page on the last cycle
    remote_exhausted: bool,
}

/// Token of the running cycle and the number of `cancel()` calls so far
#[derive(Debug, Default)]
struct Cancellation {
    token: CancellationToken,
    epoch: u64,
}

/// Exclusive right to run one cycle
struct Cycle<'a> {
    _guard: MutexGuard<'a, ()>,
    token: CancellationToken,
}

fn slot(load_type: LoadType) -> usize {
    match load_type {
        LoadType::Refresh => 0,
        LoadType::Prepend => 1,
        LoadType::Append => 2,
    }
}

/// Infinite-scroll cursor over a cached collection.
///
/// Loads are serialized: one cycle runs at a time and cycles complete in
/// the order they were issued. A request that waited while an identical
/// one completed returns [`LoadOutcome::Coalesced`] instead of repeating the
/// work. [`CachedPager::cancel`] stops the running cycle and every cycle
/// already waiting behind it.
pub struct CachedPager<R, S: LocalStore> {
    mediator: SyncMediator<R, Arc<S>>,
    reader: LocalPagingSource<Arc<S>>,
    cursor: RwLock<Cursor<S::Entity>>,
    initial_offset: usize,
    cycle: tokio::sync::Mutex<()>,
    generations: [AtomicU64; 3],
    cancellation: Mutex<Cancellation>,
}

impl<R, S> CachedPager<R, S>
where
    R: RemoteSource,
    S: LocalStore,
    S::Entity: From<R::Item>,
{
    pub fn new(source: R, store: Arc<S>, config: PagingConfig) -> Self {
        let mediator = SyncMediator::new(source, store).with_config(config);
        Self::with_mediator(mediator)
    }

    /// Wrap an already configured mediator
    pub fn with_mediator(mediator: SyncMediator<R, Arc<S>>) -> Self {
        let config = *mediator.config();
        let reader = LocalPagingSource::new(Arc::clone(mediator.store()), config.page_size);

        Self {
            mediator,
            reader,
            cursor: RwLock::new(Cursor {
                state: PagingState::new(config),
                first_offset: 0,
                remote_exhausted: false,
            }),
            initial_offset: 0,
            cycle: tokio::sync::Mutex::new(()),
            generations: Default::default(),
            cancellation: Mutex::default(),
        }
    }

    /// Start reading at `offset` instead of the first row
    pub fn with_initial_offset(mut self, offset: usize) -> Self {
        self.initial_offset = offset;
        self
    }

    /// Serve cached rows without refreshing while they are younger than `timeout`
    pub fn with_cache_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.mediator = self.mediator.with_cache_timeout(timeout);
        self
    }

    pub fn mediator(&self) -> &SyncMediator<R, Arc<S>> {
        &self.mediator
    }

    pub fn store(&self) -> &Arc<S> {
        self.mediator.store()
    }

    fn page_size(&self) -> usize {
        self.reader.page_size()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Open the cursor.
    ///
    /// Refreshes first unless the cache is still fresh, then reads the first
    /// local page. A failed refresh does not fail the call: the cached rows
    /// are served and the failure is returned in the report.
    pub async fn start(&self) -> std::result::Result<StartReport, PageLoadError> {
        let cycle = self.lock_cycle().await?;

        let action = self.mediator.initialize();
        let refresh = match action {
            InitializeAction::LaunchInitialRefresh => {
                let state = self.snapshot_state();
                Some(
                    self.mediator
                        .load_cancellable(LoadType::Refresh, &state, &cycle.token)
                        .await,
                )
            }
            InitializeAction::SkipInitialRefresh => None,
        };

        if let Some(Err(e)) = &refresh {
            warn!(error = %e, "Initial refresh failed, serving cached rows");
        }
        let exhausted = matches!(&refresh, Some(Ok(outcome)) if outcome.end_of_pagination);

        let visible = self.reset_cursor(self.initial_offset, exhausted)?;
        self.bump(LoadType::Refresh);
        info!(?action, visible, "Cursor started");

        Ok(StartReport {
            action,
            refresh,
            visible,
        })
    }

    /// Refresh from the remote and restart the cursor.
    ///
    /// The new window is centred on the last item read through
    /// [`CachedPager::get`], or starts at the first row when nothing was
    /// read. On failure the loaded pages are left as they were.
    pub async fn refresh(&self) -> LoadResult {
        let Some(cycle) = self.begin(LoadType::Refresh).await? else {
            return Ok(LoadOutcome::Coalesced);
        };

        let state = self.snapshot_state();
        let offset = self.restart_offset();
        let outcome = self
            .mediator
            .load_cancellable(LoadType::Refresh, &state, &cycle.token)
            .await?;

        let mut visible = self.reset_cursor(offset, outcome.end_of_pagination)?;
        if visible == 0 && offset > 0 {
            visible = self.reset_cursor(0, outcome.end_of_pagination)?;
        }
        self.bump(LoadType::Refresh);
        Ok(LoadOutcome::Loaded(visible))
    }

    /// Make the next page visible, fetching from the remote when the local
    /// rows are used up
    pub async fn load_more(&self) -> LoadResult {
        let Some(cycle) = self.begin(LoadType::Append).await? else {
            return Ok(LoadOutcome::Coalesced);
        };

        if let Some(offset) = self.next_local_offset() {
            let page = self
                .reader
                .load(LoadParams::append(offset, self.page_size()))?;
            if !page.is_empty() {
                let loaded = page.len();
                self.write_cursor().state.pages.push(page);
                self.bump(LoadType::Append);
                return Ok(LoadOutcome::Loaded(loaded));
            }
        }

        if self.read_cursor().remote_exhausted {
            self.bump(LoadType::Append);
            return Ok(LoadOutcome::EndReached);
        }

        let state = self.snapshot_state();
        let before = state.item_count();
        let outcome = self
            .mediator
            .load_cancellable(LoadType::Append, &state, &cycle.token)
            .await?;

        let after = self.reread_tail(outcome)?;
        self.bump(LoadType::Append);

        let loaded = after.saturating_sub(before);
        if loaded == 0 {
            if outcome.end_of_pagination {
                return Ok(LoadOutcome::EndReached);
            }
            warn!(
                fetched = outcome.fetched,
                "Append cycle made no new rows visible"
            );
        }
        Ok(LoadOutcome::Loaded(loaded))
    }

    /// Make the page before the first loaded one visible
    pub async fn load_previous(&self) -> LoadResult {
        let Some(cycle) = self.begin(LoadType::Prepend).await? else {
            return Ok(LoadOutcome::Coalesced);
        };

        let (first_offset, has_pages) = {
            let cursor = self.read_cursor();
            (cursor.first_offset, !cursor.state.pages.is_empty())
        };

        if first_offset > 0 && has_pages {
            let start = first_offset.saturating_sub(self.page_size());
            let mut page = self
                .reader
                .load(LoadParams::prepend(start, self.page_size()))?;
            page.items.truncate(first_offset - start);
            page.next_key = Some(first_offset);

            let loaded = page.len();
            let mut cursor = self.write_cursor();
            cursor.state.pages.insert(0, page);
            cursor.first_offset = start;
            if let Some(anchor) = cursor.state.anchor_position.as_mut() {
                *anchor += loaded;
            }
            drop(cursor);

            self.bump(LoadType::Prepend);
            return Ok(LoadOutcome::Loaded(loaded));
        }

        let state = self.snapshot_state();
        self.mediator
            .load_cancellable(LoadType::Prepend, &state, &cycle.token)
            .await?;
        self.bump(LoadType::Prepend);
        Ok(LoadOutcome::EndReached)
    }

    /// Cancel the cycle in flight and every cycle waiting to run.
    ///
    /// None of them merge; each returns a cancelled [`PageLoadError`].
    /// Calls made after this one run normally.
    pub fn cancel(&self) {
        let mut cancellation = self.lock_cancellation();
        debug!(epoch = cancellation.epoch, "Cancelling pending cycles");
        cancellation.epoch += 1;
        cancellation.token.cancel();
    }

    // ========================================================================
    // Snapshot access
    // ========================================================================

    /// Every visible item, first to last
    pub fn items(&self) -> Vec<S::Entity> {
        self.read_cursor()
            .state
            .pages
            .iter()
            .flat_map(|page| page.items.iter().cloned())
            .collect()
    }

    /// The visible item at `index`; also records it as the anchor
    pub fn get(&self, index: usize) -> Option<S::Entity> {
        let mut cursor = self.write_cursor();
        let item = cursor
            .state
            .pages
            .iter()
            .flat_map(|page| page.items.iter())
            .nth(index)
            .cloned();
        if item.is_some() {
            cursor.state.anchor_position = Some(index);
        }
        item
    }

    /// Number of visible items
    pub fn len(&self) -> usize {
        self.read_cursor().state.item_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the remote reported its end on the last cycle
    pub fn remote_exhausted(&self) -> bool {
        self.read_cursor().remote_exhausted
    }

    /// Copy of the loaded pages
    pub fn snapshot_state(&self) -> PagingState<S::Entity, usize> {
        self.read_cursor().state.clone()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Wait for the cycle lock; `None` when an identical request completed
    /// meanwhile
    async fn begin(
        &self,
        load_type: LoadType,
    ) -> std::result::Result<Option<Cycle<'_>>, PageLoadError> {
        let generation = &self.generations[slot(load_type)];
        let observed = generation.load(Ordering::Acquire);
        let cycle = self.lock_cycle().await?;

        if generation.load(Ordering::Acquire) != observed {
            debug!(%load_type, "Coalesced with a completed request");
            return Ok(None);
        }
        Ok(Some(cycle))
    }

    /// Wait for the cycle lock and arm a fresh token for the cycle.
    ///
    /// Fails when `cancel()` was called while waiting.
    async fn lock_cycle(&self) -> std::result::Result<Cycle<'_>, PageLoadError> {
        let epoch = self.lock_cancellation().epoch;
        let guard = self.cycle.lock().await;

        let mut cancellation = self.lock_cancellation();
        if cancellation.epoch != epoch {
            debug!("Cycle cancelled while waiting");
            return Err(Error::Cancelled.into());
        }
        cancellation.token = CancellationToken::new();
        Ok(Cycle {
            _guard: guard,
            token: cancellation.token.clone(),
        })
    }

    fn bump(&self, load_type: LoadType) {
        self.generations[slot(load_type)].fetch_add(1, Ordering::AcqRel);
    }

    fn lock_cancellation(&self) -> std::sync::MutexGuard<'_, Cancellation> {
        self.cancellation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_cursor(&self) -> RwLockReadGuard<'_, Cursor<S::Entity>> {
        self.cursor.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cursor(&self) -> RwLockWriteGuard<'_, Cursor<S::Entity>> {
        self.cursor.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offset of the next unread local window, if the last one was full
    fn next_local_offset(&self) -> Option<usize> {
        let cursor = self.read_cursor();
        match cursor.state.pages.last() {
            None => Some(cursor.first_offset),
            Some(page) => page.next_key,
        }
    }

    /// Store offset to restart from, centred on the anchor
    fn restart_offset(&self) -> usize {
        let cursor = self.read_cursor();
        let mut keyed = PagingState::<S::Entity, usize>::new(cursor.state.config);
        keyed.anchor_position = cursor
            .state
            .anchor_position
            .map(|anchor| cursor.first_offset + anchor);
        self.reader.refresh_key(&keyed).unwrap_or(0)
    }

    /// Drop all pages and read the window at `offset`
    fn reset_cursor(
        &self,
        offset: usize,
        remote_exhausted: bool,
    ) -> std::result::Result<usize, PageLoadError> {
        let page = self
            .reader
            .load(LoadParams::refresh(Some(offset), self.page_size()))?;
        let visible = page.len();

        let mut cursor = self.write_cursor();
        let config = cursor.state.config;
        cursor.state = PagingState::with_pages(vec![page], config);
        cursor.first_offset = offset;
        cursor.remote_exhausted = remote_exhausted;
        Ok(visible)
    }

    /// Re-read from the last loaded window onwards after a merge.
    ///
    /// Returns the number of visible items afterwards.
    fn reread_tail(&self, outcome: MediatorOutcome) -> std::result::Result<usize, PageLoadError> {
        let page_size = self.page_size();
        let mut cursor = self.write_cursor();

        cursor.state.pages.pop();
        let mut offset = cursor.first_offset + cursor.state.item_count();

        loop {
            let page = self.reader.load(LoadParams::append(offset, page_size))?;
            let next = page.next_key;
            if !page.is_empty() {
                cursor.state.pages.push(page);
            }
            match next {
                Some(key) => offset = key,
                None => break,
            }
        }

        cursor.remote_exhausted = outcome.end_of_pagination;
        Ok(cursor.state.item_count())
    }
}

impl<R, S: LocalStore> std::fmt::Debug for CachedPager<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedPager")
            .field("initial_offset", &self.initial_offset)
            .finish_non_exhaustive()
    }
}
