// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # catalog-pager
//!
//! Paginated access to a remote catalog service (movies, TV series,
//! people), either straight from the network or through a local cache that
//! survives restarts and tolerates being offline.
//!
//! ## Features
//!
//! - **Remote-only paging**: page-number keyed pages straight from the API
//! - **Mediated caching**: a local read cursor that pulls and merges remote
//!   pages transactionally when it runs dry
//! - **Pluggable stores**: in-memory or DuckDB-backed
//! - **Uniform failures**: every load reports a [`PageLoadError`] and is
//!   never retried behind the caller's back
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog_pager::{
//!     CatalogApi, CatalogConfig, DuckDbStore, MovieCollection, MovieEntity, PagerFactory,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> catalog_pager::Result<()> {
//!     let config = CatalogConfig::from_file("catalog.yaml")?.with_env();
//!     let api = Arc::new(CatalogApi::from_config(&config)?);
//!     let store = Arc::new(DuckDbStore::<MovieEntity>::from_config(&config.store)?);
//!
//!     let pager = PagerFactory::from_settings(&config.paging)
//!         .cached(api.source(MovieCollection::NowPlaying), store, None);
//!
//!     pager.start().await?;
//!     while pager.load_more().await?.loaded() > 0 {}
//!     println!("{} movies cached", pager.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐        ┌─────────────────────────────┐
//! │   RemotePager      │        │        CachedPager          │
//! │ page-number keys   │        │ offset keys, single-flight  │
//! └─────────┬──────────┘        └──────┬───────────────┬──────┘
//!           │                          │ read          │ exhausted / refresh
//!           │                          ▼               ▼
//!           │                  ┌──────────────┐ ┌──────────────┐
//!           │                  │  LocalStore  │◄┤ SyncMediator │
//!           │                  │ Memory/DuckDB│ └──────┬───────┘
//!           │                  └──────────────┘        │
//!           ▼                                          ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │              RemoteSource (CatalogApi over reqwest)           │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Configuration loading
pub mod config;

/// HTTP client with rate limiting and optional retry
pub mod http;

/// Items, entities and the mapping between them
pub mod model;

/// Remote catalog source
pub mod remote;

/// Local stores
pub mod store;

/// Pages, load requests and paging state
pub mod paging;

/// Remote-only pager
pub mod pager;

/// Synchronization mediator
pub mod mediator;

/// Cached pager and pager factory
pub mod cached;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use cached::{CachedPager, LoadOutcome, LocalPagingSource, PagerFactory, StartReport};
pub use config::CatalogConfig;
pub use error::{Error, ErrorKind, PageLoadError, Result};
pub use mediator::{InitializeAction, MediatorOutcome, SyncMediator};
pub use model::{CatalogItem, MovieEntity, MovieItem, StoredEntity, TvSeriesEntity, TvSeriesItem};
pub use pager::{remote_pager, RemotePager};
pub use paging::{LoadParams, Page, PagingConfig, PagingState};
pub use remote::{
    CatalogApi, CatalogSource, MovieCollection, PageResponse, PeopleCollection, RemoteSource,
    TvCollection,
};
pub use store::{DuckDbStore, LocalStore, MemoryStore, StoreTransaction};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
