//! HTTP catalog client

use super::endpoints::Endpoint;
use super::{PageResponse, RemoteSource};
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::types::OptionStringExt;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Query parameter carrying the genre filter
const GENRE_PARAM: &str = "with_genres";

/// Client for the remote catalog service
#[derive(Debug)]
pub struct CatalogApi {
    client: HttpClient,
}

impl CatalogApi {
    /// Wrap a configured HTTP client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build from an HTTP client configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::with_config(config)?))
    }

    /// Build from the crate configuration; requires an API key
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        config.api_key()?;
        Self::with_config(config.http_client_config())
    }

    /// Fetch one page of a listing endpoint
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
        filter: Option<&str>,
    ) -> Result<PageResponse<T>> {
        let filter = filter.map(str::to_string).none_if_empty();
        debug!(path, page, filter = filter.as_deref(), "Fetching catalog page");

        let request = RequestConfig::new()
            .query("page", page.to_string())
            .query_opt(GENRE_PARAM, filter);
        self.client.get_json_with_config(path, request).await
    }

    /// Bind this client to one collection
    pub fn source<E: Endpoint>(self: &Arc<Self>, endpoint: E) -> CatalogSource<E> {
        CatalogSource {
            api: Arc::clone(self),
            endpoint,
        }
    }
}

/// A [`RemoteSource`] for one collection of the catalog service
#[derive(Debug, Clone)]
pub struct CatalogSource<E> {
    api: Arc<CatalogApi>,
    endpoint: E,
}

impl<E: Endpoint> CatalogSource<E> {
    /// The collection this source reads
    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }
}

#[async_trait]
impl<E: Endpoint> RemoteSource for CatalogSource<E> {
    type Item = E::Item;

    async fn fetch_page(
        &self,
        page: u32,
        filter: Option<&str>,
    ) -> Result<PageResponse<Self::Item>> {
        self.api.fetch(self.endpoint.path(), page, filter).await
    }
}
