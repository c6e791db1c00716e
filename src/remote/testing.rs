//! Scripted remote source for unit tests

use super::{PageResponse, RemoteSource};
use crate::error::{Error, Result};
use crate::model::fixtures::movies;
use crate::model::MovieItem;
use crate::types::ItemId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Failure {
    Transport,
    Protocol,
}

impl Failure {
    fn to_error(self) -> Error {
        match self {
            Self::Transport => Error::Timeout { timeout_ms: 40_000 },
            Self::Protocol => Error::http_status(500, "upstream exploded"),
        }
    }
}

/// Serves pages from a table; unknown pages come back empty
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    pages: Mutex<HashMap<u32, Vec<MovieItem>>>,
    failures: Mutex<HashMap<u32, Failure>>,
    requests: Mutex<Vec<(u32, Option<String>)>>,
    delay: Option<Duration>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn with_page(self, page: u32, ids: impl IntoIterator<Item = ItemId>) -> Self {
        self.set_page(page, ids);
        self
    }

    pub(crate) fn set_page(&self, page: u32, ids: impl IntoIterator<Item = ItemId>) {
        self.failures.lock().unwrap().remove(&page);
        self.pages.lock().unwrap().insert(page, movies(ids));
    }

    pub(crate) fn fail_page(&self, page: u32, failure: Failure) {
        self.failures.lock().unwrap().insert(page, failure);
    }

    /// Number of fetches issued so far
    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requested_pages(&self) -> Vec<u32> {
        self.requests.lock().unwrap().iter().map(|(p, _)| *p).collect()
    }

    pub(crate) fn requested_filters(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, f)| f.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteSource for FakeSource {
    type Item = MovieItem;

    async fn fetch_page(
        &self,
        page: u32,
        filter: Option<&str>,
    ) -> Result<PageResponse<MovieItem>> {
        self.requests
            .lock()
            .unwrap()
            .push((page, filter.map(str::to_string)));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(failure) = self.failures.lock().unwrap().get(&page) {
            return Err(failure.to_error());
        }

        let results = self
            .pages
            .lock()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or_default();
        Ok(PageResponse::new(page, results))
    }
}
