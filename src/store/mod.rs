//! Local Store
//!
//! Persistent mirror of a collection. The store owns entity lifetime; the
//! mediator only ever mutates it through [`LocalStore::transaction`], so
//! readers observe either the pre-merge or the post-merge state.
//!
//! # Overview
//!
//! - [`StoreTransaction`] - mutations available inside one atomic scope
//! - [`LocalStore`] - transactional merge plus ordered reads
//! - [`MemoryStore`] - in-process store
//! - [`DuckDbStore`] - DuckDB-backed store (file or in-memory)

mod database;
mod memory;

pub use database::{DuckDbStore, SqlEntity};
pub use memory::MemoryStore;

use crate::error::Result;
use crate::model::StoredEntity;
use crate::types::ItemId;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Mutations applied inside one store transaction
pub trait StoreTransaction<E> {
    /// Remove every entity; returns how many rows were removed
    fn clear_all(&mut self) -> Result<usize>;

    /// Insert or overwrite by id.
    ///
    /// Overwritten rows keep their read position; new rows go to the end in
    /// the order given.
    fn upsert_all(&mut self, entities: &[E]) -> Result<usize>;

    /// Remove one entity; returns whether it existed
    fn delete(&mut self, id: ItemId) -> Result<bool>;

    /// Record when the collection was last fully refreshed
    fn mark_refreshed(&mut self, at: DateTime<Utc>) -> Result<()>;
}

/// A transactional local mirror of one collection
pub trait LocalStore: Send + Sync {
    /// Row type held by the store
    type Entity: StoredEntity;

    /// Run `f` atomically: committed when it returns `Ok`, rolled back on `Err`
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTransaction<Self::Entity>) -> Result<T>;

    /// Read up to `limit` rows starting at `offset`, in read order
    fn read_page(&self, offset: usize, limit: usize) -> Result<Vec<Self::Entity>>;

    /// The last row in read order
    fn last_entity(&self) -> Result<Option<Self::Entity>>;

    /// Number of stored rows
    fn count(&self) -> Result<usize>;

    /// When the last successful refresh was committed
    fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>>;

    fn clear_all(&self) -> Result<usize> {
        self.transaction(|tx| tx.clear_all())
    }

    fn upsert_all(&self, entities: &[Self::Entity]) -> Result<usize> {
        self.transaction(|tx| tx.upsert_all(entities))
    }

    fn delete(&self, id: ItemId) -> Result<bool> {
        self.transaction(|tx| tx.delete(id))
    }
}

impl<S: LocalStore + ?Sized> LocalStore for Arc<S> {
    type Entity = S::Entity;

    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTransaction<Self::Entity>) -> Result<T>,
    {
        (**self).transaction(f)
    }

    fn read_page(&self, offset: usize, limit: usize) -> Result<Vec<Self::Entity>> {
        (**self).read_page(offset, limit)
    }

    fn last_entity(&self) -> Result<Option<Self::Entity>> {
        (**self).last_entity()
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }

    fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>> {
        (**self).last_refreshed_at()
    }
}

#[cfg(test)]
mod tests;
