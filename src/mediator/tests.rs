//! Tests for the synchronization mediator

use super::*;
use crate::error::{ErrorKind, Result};
use crate::model::fixtures::movie;
use crate::model::MovieEntity;
use crate::paging::Page;
use crate::remote::testing::{Failure, FakeSource};
use crate::store::{MemoryStore, StoreTransaction};
use crate::types::ItemId;
use chrono::DateTime;
use pretty_assertions::assert_eq;

type Mediator<S = MemoryStore<MovieEntity>> = SyncMediator<FakeSource, S>;

fn mediator(source: FakeSource) -> Mediator {
    SyncMediator::new(source, MemoryStore::new()).with_config(PagingConfig::new(20))
}

fn stored_ids<S: LocalStore<Entity = MovieEntity>>(store: &S) -> Vec<ItemId> {
    store
        .read_page(0, usize::MAX)
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect()
}

/// Everything in the store, as one loaded page
fn state_of<S: LocalStore<Entity = MovieEntity>>(store: &S) -> PagingState<MovieEntity, usize> {
    let rows = store.read_page(0, usize::MAX).unwrap();
    PagingState::with_pages(vec![Page::new(rows, None, None)], PagingConfig::new(20))
}

fn empty_state() -> PagingState<MovieEntity, usize> {
    PagingState::new(PagingConfig::new(20))
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_replaces_store_with_first_page() {
    let source = FakeSource::new().with_page(1, [10, 11, 12]);
    let mediator = mediator(source);
    mediator
        .store()
        .upsert_all(&[MovieEntity::from(movie(99))])
        .unwrap();

    let outcome = mediator
        .load(LoadType::Refresh, &empty_state())
        .await
        .unwrap();

    assert_eq!(outcome, MediatorOutcome::merged(3));
    assert!(!outcome.end_of_pagination);
    assert_eq!(stored_ids(mediator.store()), vec![10, 11, 12]);
    assert_eq!(mediator.source().requested_pages(), vec![1]);
    assert!(mediator.store().last_refreshed_at().unwrap().is_some());
}

#[tokio::test]
async fn test_refresh_stores_exact_mapped_entities() {
    let source = FakeSource::new().with_page(1, [7, 3]);
    let mediator = mediator(source);

    mediator
        .load(LoadType::Refresh, &empty_state())
        .await
        .unwrap();

    let expected: Vec<MovieEntity> = [7, 3].map(|id| MovieEntity::from(movie(id))).to_vec();
    assert_eq!(mediator.store().read_page(0, 10).unwrap(), expected);
}

#[tokio::test]
async fn test_failed_refresh_leaves_store_unchanged() {
    let source = FakeSource::new();
    source.fail_page(1, Failure::Transport);
    let mediator = mediator(source);
    mediator
        .store()
        .upsert_all(&[MovieEntity::from(movie(1)), MovieEntity::from(movie(2))])
        .unwrap();

    let err = mediator
        .load(LoadType::Refresh, &empty_state())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.is_retryable());
    assert_eq!(stored_ids(mediator.store()), vec![1, 2]);
    assert!(mediator.store().last_refreshed_at().unwrap().is_none());
}

#[tokio::test]
async fn test_empty_refresh_ends_pagination() {
    let mediator = mediator(FakeSource::new());

    let outcome = mediator
        .load(LoadType::Refresh, &empty_state())
        .await
        .unwrap();

    assert!(outcome.end_of_pagination);
    assert_eq!(outcome.fetched, 0);
    assert_eq!(mediator.source().calls(), 1);
}

// ============================================================================
// Append
// ============================================================================

#[tokio::test]
async fn test_append_without_items_loads_first_page() {
    let mediator = mediator(FakeSource::new().with_page(1, [10, 11]));

    let outcome = mediator
        .load(LoadType::Append, &empty_state())
        .await
        .unwrap();

    assert_eq!(outcome.fetched, 2);
    assert_eq!(mediator.source().requested_pages(), vec![1]);
}

#[tokio::test]
async fn test_append_refetches_first_page_for_small_ids() {
    // ids below page_size map back onto page 1
    let source = FakeSource::new().with_page(1, [10, 11]).with_page(2, [50]);
    let mediator = mediator(source);

    mediator
        .load(LoadType::Refresh, &empty_state())
        .await
        .unwrap();
    let state = state_of(mediator.store());
    assert_eq!(mediator.load_key(LoadType::Append, &state), Some(1));

    let outcome = mediator.load(LoadType::Append, &state).await.unwrap();

    assert_eq!(outcome.fetched, 2);
    assert_eq!(mediator.source().requested_pages(), vec![1, 1]);
    assert_eq!(stored_ids(mediator.store()), vec![10, 11]);
}

#[tokio::test]
async fn test_append_derives_page_from_last_id() {
    let source = FakeSource::new().with_page(3, [61, 62]);
    let mediator = mediator(source);
    mediator
        .store()
        .upsert_all(&[MovieEntity::from(movie(12)), MovieEntity::from(movie(45))])
        .unwrap();
    let state = state_of(mediator.store());

    let outcome = mediator.load(LoadType::Append, &state).await.unwrap();

    assert_eq!(outcome, MediatorOutcome::merged(2));
    assert_eq!(mediator.source().requested_pages(), vec![3]);
    assert_eq!(stored_ids(mediator.store()), vec![12, 45, 61, 62]);
}

#[tokio::test]
async fn test_empty_append_ends_pagination() {
    let source = FakeSource::new().with_page(1, [1, 2]);
    let mediator =
        SyncMediator::new(source, MemoryStore::new()).with_config(PagingConfig::new(2));
    mediator
        .store()
        .upsert_all(&[MovieEntity::from(movie(1)), MovieEntity::from(movie(2))])
        .unwrap();
    let state = state_of(mediator.store());

    let outcome = mediator.load(LoadType::Append, &state).await.unwrap();

    assert!(outcome.end_of_pagination);
    assert_eq!(mediator.source().requested_pages(), vec![2]);
    assert_eq!(stored_ids(mediator.store()), vec![1, 2]);
}

#[tokio::test]
async fn test_transport_error_during_append_keeps_rows() {
    let source = FakeSource::new();
    source.fail_page(3, Failure::Transport);
    let mediator = mediator(source);
    mediator
        .store()
        .upsert_all(&[MovieEntity::from(movie(40)), MovieEntity::from(movie(41))])
        .unwrap();
    let state = state_of(mediator.store());

    let err = mediator.load(LoadType::Append, &state).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(stored_ids(mediator.store()), vec![40, 41]);
}

#[tokio::test]
async fn test_protocol_error_is_reported() {
    let source = FakeSource::new();
    source.fail_page(1, Failure::Protocol);
    let mediator = mediator(source);

    let err = mediator
        .load(LoadType::Append, &empty_state())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

// ============================================================================
// Prepend
// ============================================================================

#[tokio::test]
async fn test_prepend_is_terminal_without_remote_call() {
    let mediator = mediator(FakeSource::new().with_page(1, [1]));
    mediator
        .store()
        .upsert_all(&[MovieEntity::from(movie(5))])
        .unwrap();

    let outcome = mediator
        .load(LoadType::Prepend, &state_of(mediator.store()))
        .await
        .unwrap();

    assert_eq!(outcome, MediatorOutcome::end());
    assert_eq!(mediator.source().calls(), 0);
    assert_eq!(stored_ids(mediator.store()), vec![5]);
}

// ============================================================================
// Merge failures
// ============================================================================

/// Store whose transactions refuse every upsert
struct RejectingStore(MemoryStore<MovieEntity>);

struct RejectUpserts<'a>(&'a mut dyn StoreTransaction<MovieEntity>);

impl StoreTransaction<MovieEntity> for RejectUpserts<'_> {
    fn clear_all(&mut self) -> Result<usize> {
        self.0.clear_all()
    }

    fn upsert_all(&mut self, _entities: &[MovieEntity]) -> Result<usize> {
        Err(Error::merge("disk full"))
    }

    fn delete(&mut self, id: ItemId) -> Result<bool> {
        self.0.delete(id)
    }

    fn mark_refreshed(&mut self, at: DateTime<Utc>) -> Result<()> {
        self.0.mark_refreshed(at)
    }
}

impl LocalStore for RejectingStore {
    type Entity = MovieEntity;

    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTransaction<MovieEntity>) -> Result<T>,
    {
        self.0.transaction(|tx| f(&mut RejectUpserts(tx)))
    }

    fn read_page(&self, offset: usize, limit: usize) -> Result<Vec<MovieEntity>> {
        self.0.read_page(offset, limit)
    }

    fn last_entity(&self) -> Result<Option<MovieEntity>> {
        self.0.last_entity()
    }

    fn count(&self) -> Result<usize> {
        self.0.count()
    }

    fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.0.last_refreshed_at()
    }
}

#[tokio::test]
async fn test_merge_failure_rolls_back_refresh() {
    let rows = [1, 2].map(|id| MovieEntity::from(movie(id)));
    let store = RejectingStore(MemoryStore::with_rows(rows).unwrap());
    let mediator: Mediator<RejectingStore> =
        SyncMediator::new(FakeSource::new().with_page(1, [8, 9]), store);

    let err = mediator
        .load(LoadType::Refresh, &empty_state())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Merge);
    assert!(err.is_retryable());
    assert_eq!(stored_ids(mediator.store()), vec![1, 2]);
    assert!(mediator.store().last_refreshed_at().unwrap().is_none());
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancelled_token_skips_fetch_and_merge() {
    let mediator = mediator(FakeSource::new().with_page(1, [1]));
    let token = CancellationToken::new();
    token.cancel();

    let err = mediator
        .load_cancellable(LoadType::Refresh, &empty_state(), &token)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(!err.is_retryable());
    assert_eq!(mediator.store().count().unwrap(), 0);
}

#[tokio::test]
async fn test_cancel_during_fetch_suppresses_merge() {
    let source = FakeSource::new()
        .with_page(1, [1, 2])
        .with_delay(Duration::from_millis(500));
    let mediator = mediator(source);
    let token = CancellationToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = mediator
        .load_cancellable(LoadType::Refresh, &empty_state(), &token)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(mediator.source().calls(), 1);
    assert_eq!(mediator.store().count().unwrap(), 0);
}

#[tokio::test]
async fn test_live_token_behaves_like_load() {
    let mediator = mediator(FakeSource::new().with_page(1, [4]));
    let token = CancellationToken::new();

    let outcome = mediator
        .load_cancellable(LoadType::Refresh, &empty_state(), &token)
        .await
        .unwrap();
    assert_eq!(outcome.fetched, 1);
    assert_eq!(stored_ids(mediator.store()), vec![4]);
}

// ============================================================================
// Initialize / filter
// ============================================================================

#[test]
fn test_initialize_without_timeout_refreshes() {
    let mediator = mediator(FakeSource::new());
    assert_eq!(mediator.initialize(), InitializeAction::LaunchInitialRefresh);
}

#[test]
fn test_initialize_respects_cache_timeout() {
    let mediator =
        mediator(FakeSource::new()).with_cache_timeout(Some(Duration::from_secs(3600)));
    assert_eq!(mediator.initialize(), InitializeAction::LaunchInitialRefresh);

    let stamp = |age: chrono::Duration| {
        mediator
            .store()
            .transaction(|tx| tx.mark_refreshed(Utc::now() - age))
            .unwrap();
    };

    stamp(chrono::Duration::minutes(5));
    assert_eq!(mediator.initialize(), InitializeAction::SkipInitialRefresh);

    stamp(chrono::Duration::hours(2));
    assert_eq!(mediator.initialize(), InitializeAction::LaunchInitialRefresh);
}

#[tokio::test]
async fn test_filter_reaches_remote() {
    let mediator = mediator(FakeSource::new()).with_filter(Some("16".to_string()));

    mediator
        .load(LoadType::Refresh, &empty_state())
        .await
        .unwrap();

    assert_eq!(mediator.filter(), Some("16"));
    assert_eq!(
        mediator.source().requested_filters(),
        vec![Some("16".to_string())]
    );
}
