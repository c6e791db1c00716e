//! Remote item payloads
//!
//! Field names follow the catalog service's JSON. Nullable image paths and
//! dates are `Option`s; missing collections default to empty.

use super::CatalogItem;
use crate::types::ItemId;
use serde::{Deserialize, Serialize};

/// A movie listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieItem {
    pub id: ItemId,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub video: bool,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
}

impl CatalogItem for MovieItem {
    fn id(&self) -> ItemId {
        self.id
    }
}

/// A TV series listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvSeriesItem {
    pub id: ItemId,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub origin_country: Vec<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
}

impl CatalogItem for TvSeriesItem {
    fn id(&self) -> ItemId {
        self.id
    }
}

/// A person listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Celebrity {
    pub id: ItemId,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub gender: i32,
    #[serde(default)]
    pub known_for: Vec<KnownFor>,
    #[serde(default)]
    pub known_for_department: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl CatalogItem for Celebrity {
    fn id(&self) -> ItemId {
        self.id
    }
}

/// A title a person is known for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownFor {
    pub id: ItemId,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}
