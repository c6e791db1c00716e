//! Page, request, and snapshot types

use crate::config::PagingSettings;
use crate::error::PageLoadError;
use crate::types::LoadType;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

// ============================================================================
// Page
// ============================================================================

/// One loaded page and the keys of its neighbours
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T, K> {
    /// Items in remote order
    pub items: Vec<T>,
    /// Key of the page before this one; `None` at the start
    pub prev_key: Option<K>,
    /// Key of the page after this one; `None` once exhausted
    pub next_key: Option<K>,
}

impl<T, K> Page<T, K> {
    pub fn new(items: Vec<T>, prev_key: Option<K>, next_key: Option<K>) -> Self {
        Self {
            items,
            prev_key,
            next_key,
        }
    }

    /// No further page can follow this one
    pub fn end_of_pagination(&self) -> bool {
        self.next_key.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Convert the items, keeping keys and order
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U, K> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            prev_key: self.prev_key,
            next_key: self.next_key,
        }
    }
}

/// Outcome of a page load: a page, or the reason it could not be produced
pub type PageResult<T, K> = std::result::Result<Page<T, K>, PageLoadError>;

// ============================================================================
// Requests
// ============================================================================

/// A request for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadParams<K> {
    pub load_type: LoadType,
    /// `None` only for the first refresh
    pub key: Option<K>,
    pub page_size: usize,
}

impl<K> LoadParams<K> {
    pub fn refresh(key: Option<K>, page_size: usize) -> Self {
        Self {
            load_type: LoadType::Refresh,
            key,
            page_size,
        }
    }

    pub fn append(key: K, page_size: usize) -> Self {
        Self {
            load_type: LoadType::Append,
            key: Some(key),
            page_size,
        }
    }

    pub fn prepend(key: K, page_size: usize) -> Self {
        Self {
            load_type: LoadType::Prepend,
            key: Some(key),
            page_size,
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Paging behaviour shared by both pagers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    /// Items per page; also the divisor of the append key derivation
    pub page_size: usize,
}

impl PagingConfig {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl From<&PagingSettings> for PagingConfig {
    fn from(settings: &PagingSettings) -> Self {
        Self::new(settings.page_size)
    }
}

/// Pages handed to a consumer so far, plus where it was last looking
#[derive(Debug, Clone, PartialEq)]
pub struct PagingState<T, K> {
    pub pages: Vec<Page<T, K>>,
    /// Index of the most recently accessed item, counted across all pages
    pub anchor_position: Option<usize>,
    pub config: PagingConfig,
}

impl<T, K> PagingState<T, K> {
    pub fn new(config: PagingConfig) -> Self {
        Self {
            pages: Vec::new(),
            anchor_position: None,
            config,
        }
    }

    pub fn with_pages(pages: Vec<Page<T, K>>, config: PagingConfig) -> Self {
        Self {
            pages,
            anchor_position: None,
            config,
        }
    }

    /// Whether no loaded page holds an item
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(Page::is_empty)
    }

    /// Total number of loaded items
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    pub fn first_item(&self) -> Option<&T> {
        self.pages.iter().find_map(|page| page.items.first())
    }

    /// Last item of the last non-empty page
    pub fn last_item(&self) -> Option<&T> {
        self.pages.iter().rev().find_map(|page| page.items.last())
    }

    /// The page containing `position`, or the nearest edge page
    pub fn closest_page_to_position(&self, position: usize) -> Option<&Page<T, K>> {
        let mut remaining = position;
        for page in &self.pages {
            if remaining < page.len() {
                return Some(page);
            }
            remaining -= page.len();
        }
        self.pages.last()
    }

    /// The item at `position`, clamped into the loaded range
    pub fn closest_item_to_position(&self, position: usize) -> Option<&T> {
        let count = self.item_count();
        if count == 0 {
            return None;
        }
        self.pages
            .iter()
            .flat_map(|page| page.items.iter())
            .nth(position.min(count - 1))
    }
}
