//! Persisted rows

use super::StoredEntity;
use crate::types::ItemId;
use serde::{Deserialize, Serialize};

/// Row of the `movie` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieEntity {
    pub id: ItemId,
    pub adult: bool,
    pub backdrop_path: Option<String>,
    pub genre_ids: Vec<i64>,
    pub original_language: String,
    pub original_title: String,
    pub overview: String,
    pub popularity: f64,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub title: String,
    pub video: bool,
    pub vote_average: f64,
    pub vote_count: i64,
}

impl StoredEntity for MovieEntity {
    fn id(&self) -> ItemId {
        self.id
    }
}

/// Row of the `tv_series` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvSeriesEntity {
    pub id: ItemId,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub genre_ids: Vec<i64>,
    pub name: String,
    pub origin_country: Vec<String>,
    pub original_language: String,
    pub original_name: String,
    pub overview: String,
    pub popularity: f64,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
}

impl StoredEntity for TvSeriesEntity {
    fn id(&self) -> ItemId {
        self.id
    }
}
