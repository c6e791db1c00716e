//! In-process store
//!
//! A transaction stages its mutations on a copy of the rows while holding
//! the write lock and swaps the copy in on commit.

use super::{LocalStore, StoreTransaction};
use crate::error::{Error, Result};
use crate::model::StoredEntity;
use crate::types::ItemId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard};

#[derive(Debug, Clone)]
struct MemoryState<E> {
    rows: Vec<E>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl<E> Default for MemoryState<E> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            refreshed_at: None,
        }
    }
}

impl<E: StoredEntity> StoreTransaction<E> for MemoryState<E> {
    fn clear_all(&mut self) -> Result<usize> {
        let removed = self.rows.len();
        self.rows.clear();
        Ok(removed)
    }

    fn upsert_all(&mut self, entities: &[E]) -> Result<usize> {
        let mut index: HashMap<ItemId, usize> = self
            .rows
            .iter()
            .enumerate()
            .map(|(pos, row)| (row.id(), pos))
            .collect();

        for entity in entities {
            match index.get(&entity.id()) {
                Some(&pos) => self.rows[pos] = entity.clone(),
                None => {
                    index.insert(entity.id(), self.rows.len());
                    self.rows.push(entity.clone());
                }
            }
        }
        Ok(entities.len())
    }

    fn delete(&mut self, id: ItemId) -> Result<bool> {
        let before = self.rows.len();
        self.rows.retain(|row| row.id() != id);
        Ok(self.rows.len() != before)
    }

    fn mark_refreshed(&mut self, at: DateTime<Utc>) -> Result<()> {
        self.refreshed_at = Some(at);
        Ok(())
    }
}

/// Store keeping every row in memory
#[derive(Debug)]
pub struct MemoryStore<E> {
    state: RwLock<MemoryState<E>>,
}

impl<E: StoredEntity> MemoryStore<E> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
        }
    }

    /// Create a store pre-populated with `rows` in the given order
    pub fn with_rows(rows: impl IntoIterator<Item = E>) -> Result<Self> {
        let store = Self::new();
        let rows: Vec<E> = rows.into_iter().collect();
        store.upsert_all(&rows)?;
        Ok(store)
    }

    /// Copy of every row in read order
    pub fn snapshot(&self) -> Result<Vec<E>> {
        Ok(self.read()?.rows.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState<E>>> {
        self.state
            .read()
            .map_err(|_| Error::merge("memory store lock poisoned"))
    }
}

impl<E: StoredEntity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: StoredEntity> LocalStore for MemoryStore<E> {
    type Entity = E;

    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTransaction<E>) -> Result<T>,
    {
        let mut state = self
            .state
            .write()
            .map_err(|_| Error::merge("memory store lock poisoned"))?;

        let mut staged = state.clone();
        let value = f(&mut staged)?;
        *state = staged;
        Ok(value)
    }

    fn read_page(&self, offset: usize, limit: usize) -> Result<Vec<E>> {
        Ok(self
            .read()?
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn last_entity(&self) -> Result<Option<E>> {
        Ok(self.read()?.rows.last().cloned())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read()?.rows.len())
    }

    fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read()?.refreshed_at)
    }
}
