//! Offset-keyed reader over a local store

use crate::paging::{LoadParams, Page, PageResult, PagingState};
use crate::store::LocalStore;

/// Reads fixed-size windows of the store in read order.
///
/// Keys are row offsets. A window shorter than the page size is the last
/// one; the window at offset 0 has no previous key.
#[derive(Debug, Clone)]
pub struct LocalPagingSource<S> {
    store: S,
    page_size: usize,
}

impl<S: LocalStore> LocalPagingSource<S> {
    pub fn new(store: S, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the window starting at `params.key` (offset 0 when absent)
    pub fn load(&self, params: LoadParams<usize>) -> PageResult<S::Entity, usize> {
        let offset = params.key.unwrap_or(0);
        let limit = params.page_size.max(1);
        let rows = self.store.read_page(offset, limit)?;

        let prev_key = (offset > 0).then(|| offset.saturating_sub(limit));
        let next_key = (rows.len() >= limit).then(|| offset + rows.len());
        Ok(Page::new(rows, prev_key, next_key))
    }

    /// Offset to restart from after invalidation, centred on the anchor
    pub fn refresh_key<T>(&self, state: &PagingState<T, usize>) -> Option<usize> {
        state
            .anchor_position
            .map(|anchor| anchor.saturating_sub(self.page_size / 2))
    }
}
