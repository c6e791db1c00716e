//! Tests for the local stores

use super::*;
use crate::error::{Error, ErrorKind};
use crate::model::fixtures::{movie, movies, tv_series};
use crate::model::{MovieEntity, TvSeriesEntity};
use chrono::{Duration, TimeZone};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn entities(ids: impl IntoIterator<Item = ItemId>) -> Vec<MovieEntity> {
    movies(ids).into_iter().map(MovieEntity::from).collect()
}

fn ids<S: LocalStore<Entity = MovieEntity>>(store: &S) -> Vec<ItemId> {
    let count = store.count().unwrap();
    store
        .read_page(0, count)
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect()
}

// ============================================================================
// Shared contract
// ============================================================================

fn check_upsert_keeps_position<S: LocalStore<Entity = MovieEntity>>(store: &S) {
    store.upsert_all(&entities([3, 1, 2])).unwrap();

    let mut renamed = MovieEntity::from(movie(1));
    renamed.title = "Renamed".to_string();
    store
        .upsert_all(&[renamed, MovieEntity::from(movie(4))])
        .unwrap();

    assert_eq!(ids(store), vec![3, 1, 2, 4]);
    let row = store.read_page(1, 1).unwrap();
    assert_eq!(row[0].title, "Renamed");
}

fn check_ids_stay_unique<S: LocalStore<Entity = MovieEntity>>(store: &S) {
    store.upsert_all(&entities([5, 6, 5])).unwrap();
    store.upsert_all(&entities([6, 7])).unwrap();

    assert_eq!(store.count().unwrap(), 3);
    assert_eq!(ids(store), vec![5, 6, 7]);
}

fn check_read_page_windows<S: LocalStore<Entity = MovieEntity>>(store: &S) {
    store.upsert_all(&entities(1..=5)).unwrap();

    let page: Vec<_> = store.read_page(2, 2).unwrap().iter().map(|e| e.id).collect();
    assert_eq!(page, vec![3, 4]);
    assert_eq!(store.read_page(4, 10).unwrap().len(), 1);
    assert!(store.read_page(9, 10).unwrap().is_empty());
    assert_eq!(store.last_entity().unwrap().map(|e| e.id), Some(5));
}

fn check_refresh_replaces_contents<S: LocalStore<Entity = MovieEntity>>(store: &S) {
    store.upsert_all(&entities([1, 2, 3])).unwrap();
    let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let written = store
        .transaction(|tx| {
            tx.clear_all()?;
            let written = tx.upsert_all(&entities([2, 9]))?;
            tx.mark_refreshed(stamp)?;
            Ok(written)
        })
        .unwrap();

    assert_eq!(written, 2);
    assert_eq!(ids(store), vec![2, 9]);
    assert_eq!(store.last_refreshed_at().unwrap(), Some(stamp));
}

fn check_failed_transaction_rolls_back<S: LocalStore<Entity = MovieEntity>>(store: &S) {
    store.upsert_all(&entities([1, 2])).unwrap();

    let result: Result<()> = store.transaction(|tx| {
        tx.clear_all()?;
        tx.upsert_all(&entities([7]))?;
        tx.mark_refreshed(Utc::now())?;
        Err(Error::merge("disk full"))
    });

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Merge);
    assert_eq!(ids(store), vec![1, 2]);
    assert!(store.last_refreshed_at().unwrap().is_none());
}

fn check_delete<S: LocalStore<Entity = MovieEntity>>(store: &S) {
    store.upsert_all(&entities([1, 2, 3])).unwrap();

    assert!(store.delete(2).unwrap());
    assert!(!store.delete(2).unwrap());
    assert_eq!(ids(store), vec![1, 3]);

    assert_eq!(store.clear_all().unwrap(), 2);
    assert_eq!(store.count().unwrap(), 0);
    assert!(store.last_entity().unwrap().is_none());
}

macro_rules! store_contract {
    ($name:ident, $make:expr) => {
        mod $name {
            use super::*;

            #[test]
            fn test_upsert_keeps_position() {
                check_upsert_keeps_position(&$make);
            }

            #[test]
            fn test_ids_stay_unique() {
                check_ids_stay_unique(&$make);
            }

            #[test]
            fn test_read_page_windows() {
                check_read_page_windows(&$make);
            }

            #[test]
            fn test_refresh_replaces_contents() {
                check_refresh_replaces_contents(&$make);
            }

            #[test]
            fn test_failed_transaction_rolls_back() {
                check_failed_transaction_rolls_back(&$make);
            }

            #[test]
            fn test_delete() {
                check_delete(&$make);
            }
        }
    };
}

store_contract!(memory, MemoryStore::<MovieEntity>::new());
store_contract!(duckdb_memory, DuckDbStore::<MovieEntity>::in_memory().unwrap());

// ============================================================================
// DuckDB specifics
// ============================================================================

#[test]
fn test_duckdb_file_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.duckdb");
    let stamp = Utc::now() - Duration::minutes(5);

    {
        let store = DuckDbStore::<MovieEntity>::open(&path).unwrap();
        store
            .transaction(|tx| {
                tx.upsert_all(&entities([10, 11]))?;
                tx.mark_refreshed(stamp)
            })
            .unwrap();
    }

    let store = DuckDbStore::<MovieEntity>::open(&path).unwrap();
    assert_eq!(ids(&store), vec![10, 11]);
    assert_eq!(
        store.last_refreshed_at().unwrap().map(|t| t.timestamp_millis()),
        Some(stamp.timestamp_millis())
    );
}

#[test]
fn test_duckdb_preserves_every_field() {
    let store = DuckDbStore::<MovieEntity>::in_memory().unwrap();
    let original = MovieEntity {
        backdrop_path: None,
        genre_ids: Vec::new(),
        overview: "it's \"quoted\"\nand multi-line".to_string(),
        ..MovieEntity::from(movie(42))
    };
    store.upsert_all(&[original.clone()]).unwrap();

    assert_eq!(store.read_page(0, 1).unwrap(), vec![original]);
}

#[test]
fn test_duckdb_tv_series_table() {
    let store = DuckDbStore::<TvSeriesEntity>::in_memory().unwrap();
    let entity = TvSeriesEntity::from(tv_series(1399));
    store.upsert_all(&[entity.clone()]).unwrap();

    assert_eq!(store.last_entity().unwrap(), Some(entity));
}

#[test]
fn test_duckdb_from_config() {
    let dir = tempdir().unwrap();
    let config = crate::config::StoreConfig {
        path: Some(dir.path().join("catalog.duckdb")),
    };
    let store = DuckDbStore::<MovieEntity>::from_config(&config).unwrap();
    assert_eq!(store.count().unwrap(), 0);
    assert!(dir.path().join("catalog.duckdb").exists());
}

#[test]
fn test_duckdb_open_failure_is_a_store_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("cache.duckdb");

    let err = DuckDbStore::<MovieEntity>::open(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Merge);
}

// ============================================================================
// Memory specifics
// ============================================================================

#[test]
fn test_memory_store_with_rows() {
    let store = MemoryStore::with_rows(entities([4, 5])).unwrap();
    let snapshot: Vec<_> = store.snapshot().unwrap().iter().map(|e| e.id).collect();
    assert_eq!(snapshot, vec![4, 5]);
}

#[test]
fn test_store_behind_arc() {
    let store = Arc::new(MemoryStore::<MovieEntity>::new());
    store.upsert_all(&entities([1])).unwrap();
    assert_eq!(store.count().unwrap(), 1);
}
