//! Catalog records and their persisted form
//!
//! Items are what the remote returns; entities are what the local store
//! owns. The mapper converts between them field for field, so
//! `Item -> Entity -> Item` is an identity.

mod entity;
mod item;
mod mapper;

pub use entity::{MovieEntity, TvSeriesEntity};
pub use item::{Celebrity, KnownFor, MovieItem, TvSeriesItem};

use crate::types::ItemId;

/// A record served by a paginated collection.
///
/// The engine only looks at `id`; every other field is opaque payload.
pub trait CatalogItem: Clone + Send + Sync + 'static {
    /// Identifier, unique within the collection
    fn id(&self) -> ItemId;
}

/// A row owned by a [`LocalStore`](crate::store::LocalStore)
pub trait StoredEntity: Clone + Send + Sync + 'static {
    /// Primary key of the row
    fn id(&self) -> ItemId;
}

#[cfg(test)]
pub(crate) mod fixtures;
