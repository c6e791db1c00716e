//! Remote Source
//!
//! The catalog service as seen by the pagers: "give me page N, optionally
//! filtered". `CatalogApi` is the HTTP implementation; tests substitute
//! in-memory sources.

mod api;
mod endpoints;

pub use api::{CatalogApi, CatalogSource};
pub use endpoints::{Endpoint, MovieCollection, PeopleCollection, TvCollection};

use crate::error::Result;
use crate::model::CatalogItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One page as returned by the catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Page number reported by the server
    pub page: u32,
    /// Items in server order
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

impl<T> PageResponse<T> {
    /// Build a response without totals
    pub fn new(page: u32, results: Vec<T>) -> Self {
        Self {
            page,
            results,
            total_pages: 0,
            total_results: 0,
        }
    }

    /// Whether the page carried no items
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A paginated remote collection
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Item type served by this source
    type Item: CatalogItem;

    /// Fetch a 1-based page, threading `filter` through unchanged
    async fn fetch_page(
        &self,
        page: u32,
        filter: Option<&str>,
    ) -> Result<PageResponse<Self::Item>>;
}

#[async_trait]
impl<R: RemoteSource + ?Sized> RemoteSource for Arc<R> {
    type Item = R::Item;

    async fn fetch_page(
        &self,
        page: u32,
        filter: Option<&str>,
    ) -> Result<PageResponse<Self::Item>> {
        (**self).fetch_page(page, filter).await
    }
}

#[cfg(test)]
pub(crate) mod testing;
