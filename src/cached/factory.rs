//! Pager construction

use super::pager::CachedPager;
use crate::config::PagingSettings;
use crate::mediator::SyncMediator;
use crate::pager::RemotePager;
use crate::paging::PagingConfig;
use crate::remote::RemoteSource;
use crate::store::LocalStore;
use std::sync::Arc;
use std::time::Duration;

/// Builds pagers that share one paging configuration
#[derive(Debug, Clone, Default)]
pub struct PagerFactory {
    config: PagingConfig,
    cache_timeout: Option<Duration>,
}

impl PagerFactory {
    pub fn new(config: PagingConfig) -> Self {
        Self {
            config,
            cache_timeout: None,
        }
    }

    pub fn from_settings(settings: &PagingSettings) -> Self {
        Self {
            config: PagingConfig::from(settings),
            cache_timeout: settings.cache_timeout(),
        }
    }

    pub fn config(&self) -> &PagingConfig {
        &self.config
    }

    /// A pager reading straight from `source`
    pub fn remote<R: RemoteSource>(&self, source: R, filter: Option<String>) -> RemotePager<R> {
        crate::pager::remote_pager(source, filter).with_config(self.config)
    }

    /// A pager reading from `store`, kept in step with `source`
    pub fn cached<R, S>(
        &self,
        source: R,
        store: Arc<S>,
        filter: Option<String>,
    ) -> CachedPager<R, S>
    where
        R: RemoteSource,
        S: LocalStore,
        S::Entity: From<R::Item>,
    {
        let mediator = SyncMediator::new(source, store)
            .with_filter(filter)
            .with_config(self.config)
            .with_cache_timeout(self.cache_timeout);
        CachedPager::with_mediator(mediator)
    }
}
