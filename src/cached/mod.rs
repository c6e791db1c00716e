//! Mediated Cache Pager
//!
//! Serves pages from the [`LocalStore`](crate::store::LocalStore) and asks
//! the [`SyncMediator`](crate::mediator::SyncMediator) for more data when
//! the local rows run out or a refresh is requested. Consumers only ever
//! see rows that were read back from the store.
//!
//! # Overview
//!
//! - [`LocalPagingSource`] - offset-keyed reader over the store
//! - [`CachedPager`] - the read cursor plus its load scheduling
//! - [`PagerFactory`] - builds remote-only and cached pagers from settings

mod factory;
mod local;
mod pager;

pub use factory::PagerFactory;
pub use local::LocalPagingSource;
pub use pager::{CachedPager, LoadOutcome, StartReport};
