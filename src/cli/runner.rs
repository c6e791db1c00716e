//! CLI runner - executes commands

use crate::cached::{LoadOutcome, PagerFactory};
use crate::cli::commands::{CatalogKind, Cli, Commands, OutputFormat};
use crate::config::CatalogConfig;
use crate::error::{Error, PageLoadError, Result};
use crate::model::{MovieEntity, TvSeriesEntity};
use crate::paging::{LoadParams, Page};
use crate::remote::{CatalogApi, MovieCollection, PeopleCollection, RemoteSource, TvCollection};
use crate::store::{DuckDbStore, LocalStore, SqlEntity};
use crate::types::LogLevel;
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Log level for the subscriber: `--verbose`, else the configured level
    pub fn log_level(&self) -> LogLevel {
        if self.cli.verbose {
            return LogLevel::Debug;
        }
        self.load_config()
            .map(|config| config.log_level)
            .unwrap_or_default()
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Browse {
                collection,
                kind,
                genre,
                pages,
                start_page,
            } => {
                let api = Arc::new(CatalogApi::from_config(&config)?);
                let browse = Browse {
                    factory: PagerFactory::from_settings(&config.paging),
                    genre: genre.clone(),
                    pages: *pages,
                    start_page: *start_page,
                };
                match kind {
                    CatalogKind::Movie => {
                        let endpoint: MovieCollection = collection.parse()?;
                        self.browse(api.source(endpoint), browse).await
                    }
                    CatalogKind::Tv => {
                        let endpoint: TvCollection = collection.parse()?;
                        self.browse(api.source(endpoint), browse).await
                    }
                    CatalogKind::People => {
                        let endpoint: PeopleCollection = collection.parse()?;
                        self.browse(api.source(endpoint), browse).await
                    }
                }
            }
            Commands::Sync {
                collection,
                kind,
                genre,
                pages,
            } => {
                let api = Arc::new(CatalogApi::from_config(&config)?);
                match kind {
                    CatalogKind::Movie => {
                        let endpoint: MovieCollection = collection.parse()?;
                        let store =
                            Arc::new(DuckDbStore::<MovieEntity>::from_config(&config.store)?);
                        self.sync(&config, api.source(endpoint), store, genre.clone(), *pages)
                            .await
                    }
                    CatalogKind::Tv => {
                        let endpoint: TvCollection = collection.parse()?;
                        let store =
                            Arc::new(DuckDbStore::<TvSeriesEntity>::from_config(&config.store)?);
                        self.sync(&config, api.source(endpoint), store, genre.clone(), *pages)
                            .await
                    }
                    CatalogKind::People => Err(Self::not_cached(*kind)),
                }
            }
            Commands::Cache {
                kind,
                offset,
                limit,
            } => {
                let limit = limit.unwrap_or(config.paging.page_size);
                match kind {
                    CatalogKind::Movie => self.show_cache::<MovieEntity>(&config, *offset, limit),
                    CatalogKind::Tv => self.show_cache::<TvSeriesEntity>(&config, *offset, limit),
                    CatalogKind::People => Err(Self::not_cached(*kind)),
                }
            }
            Commands::Clear { kind } => match kind {
                CatalogKind::Movie => self.clear::<MovieEntity>(&config),
                CatalogKind::Tv => self.clear::<TvSeriesEntity>(&config),
                CatalogKind::People => Err(Self::not_cached(*kind)),
            },
            Commands::Delete { id, kind } => match kind {
                CatalogKind::Movie => self.delete::<MovieEntity>(&config, *id),
                CatalogKind::Tv => self.delete::<TvSeriesEntity>(&config, *id),
                CatalogKind::People => Err(Self::not_cached(*kind)),
            },
        }
    }

    /// Load configuration: file (if given), environment, then flags
    fn load_config(&self) -> Result<CatalogConfig> {
        let mut config = match &self.cli.config {
            Some(path) => CatalogConfig::from_file(path)?,
            None => CatalogConfig::default(),
        }
        .with_env();

        if let Some(key) = &self.cli.api_key {
            config.api.api_key = Some(key.clone());
        }
        if let Some(db) = &self.cli.db {
            config.store.path = Some(db.clone());
        }

        config.validate()?;
        Ok(config)
    }

    fn not_cached(kind: CatalogKind) -> Error {
        Error::invalid_value("kind", format!("{kind:?} listings are not cached"))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Page through a remote collection
    async fn browse<R>(&self, source: R, browse: Browse) -> Result<()>
    where
        R: RemoteSource,
        R::Item: Serialize,
    {
        let pager = browse.factory.remote(source, browse.genre);

        match browse.start_page {
            None => {
                let mut pages = Box::pin(pager.pages().take(browse.pages));
                let mut key = 1;
                while let Some(page) = pages.next().await {
                    let page = page.map_err(PageLoadError::into_cause)?;
                    self.output_page(key, &page);
                    key += 1;
                }
            }
            Some(start) => {
                let mut key = Some(start);
                for _ in 0..browse.pages {
                    let Some(page_key) = key else { break };
                    let params = LoadParams::append(page_key, pager.config().page_size);
                    let page = pager
                        .load(params)
                        .await
                        .map_err(PageLoadError::into_cause)?;
                    self.output_page(page_key, &page);
                    key = page.next_key;
                }
            }
        }

        Ok(())
    }

    /// Refresh the cache and make `pages` local pages visible
    async fn sync<R, E>(
        &self,
        config: &CatalogConfig,
        source: R,
        store: Arc<DuckDbStore<E>>,
        genre: Option<String>,
        pages: usize,
    ) -> Result<()>
    where
        R: RemoteSource,
        E: SqlEntity + Serialize + From<R::Item>,
    {
        let factory = PagerFactory::from_settings(&config.paging);
        let pager = factory.cached(source, Arc::clone(&store), genre);

        let report = pager.start().await.map_err(PageLoadError::into_cause)?;
        let refresh = match &report.refresh {
            None => Value::Null,
            Some(Ok(outcome)) => json!(outcome),
            Some(Err(e)) => json!({ "error": e.to_string(), "kind": e.kind().to_string() }),
        };
        self.output_message(&json!({
            "type": "START",
            "action": report.action,
            "refresh": refresh,
            "visible": report.visible,
        }));

        for _ in 1..pages {
            let outcome = pager.load_more().await.map_err(PageLoadError::into_cause)?;
            self.output_message(&json!({
                "type": "LOAD",
                "outcome": outcome,
                "visible": pager.len(),
            }));
            match outcome {
                LoadOutcome::EndReached => break,
                LoadOutcome::Loaded(0) => {
                    debug!("No new rows became visible, stopping");
                    break;
                }
                _ => {}
            }
        }

        self.output_message(&json!({
            "type": "SUMMARY",
            "visible": pager.len(),
            "stored": store.count()?,
            "remote_exhausted": pager.remote_exhausted(),
            "last_refreshed_at": store.last_refreshed_at()?,
        }));
        Ok(())
    }

    fn show_cache<E: SqlEntity + Serialize>(
        &self,
        config: &CatalogConfig,
        offset: usize,
        limit: usize,
    ) -> Result<()> {
        let store = DuckDbStore::<E>::from_config(&config.store)?;
        let rows = store.read_page(offset, limit)?;

        self.output_message(&json!({
            "type": "CACHE",
            "table": E::TABLE,
            "offset": offset,
            "rows": rows,
            "total": store.count()?,
            "last_refreshed_at": store.last_refreshed_at()?,
        }));
        Ok(())
    }

    fn clear<E: SqlEntity>(&self, config: &CatalogConfig) -> Result<()> {
        let store = DuckDbStore::<E>::from_config(&config.store)?;
        let removed = store.clear_all()?;

        self.output_message(&json!({
            "type": "CLEARED",
            "table": E::TABLE,
            "removed": removed,
        }));
        Ok(())
    }

    fn delete<E: SqlEntity>(&self, config: &CatalogConfig, id: i64) -> Result<()> {
        let store = DuckDbStore::<E>::from_config(&config.store)?;
        let deleted = store.delete(id)?;

        self.output_message(&json!({
            "type": "DELETED",
            "table": E::TABLE,
            "id": id,
            "deleted": deleted,
        }));
        Ok(())
    }

    // ========================================================================
    // Output
    // ========================================================================

    fn output_page<T: Serialize>(&self, key: u32, page: &Page<T, u32>) {
        self.output_message(&json!({
            "type": "PAGE",
            "page": key,
            "prev_key": page.prev_key,
            "next_key": page.next_key,
            "items": page.items,
        }));
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Arguments of the `browse` command
struct Browse {
    factory: PagerFactory,
    genre: Option<String>,
    pages: usize,
    start_page: Option<u32>,
}
