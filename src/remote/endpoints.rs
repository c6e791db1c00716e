//! Paginated collections exposed by the catalog service

use crate::error::Error;
use crate::model::{CatalogItem, Celebrity, MovieItem, TvSeriesItem};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::str::FromStr;

/// A listing endpoint and the item type it returns
pub trait Endpoint: Debug + Clone + Send + Sync + 'static {
    /// Item type in the `results` array
    type Item: CatalogItem + DeserializeOwned;

    /// Path relative to the API base URL
    fn path(&self) -> &'static str;
}

/// Movie listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieCollection {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
    /// Discovery listing, normally filtered by genre
    Discover,
}

impl Endpoint for MovieCollection {
    type Item = MovieItem;

    fn path(&self) -> &'static str {
        match self {
            Self::NowPlaying => "movie/now_playing",
            Self::Popular => "movie/popular",
            Self::TopRated => "movie/top_rated",
            Self::Upcoming => "movie/upcoming",
            Self::Discover => "discover/movie",
        }
    }
}

impl FromStr for MovieCollection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "now_playing" | "now-playing" => Ok(Self::NowPlaying),
            "popular" => Ok(Self::Popular),
            "top_rated" | "top-rated" => Ok(Self::TopRated),
            "upcoming" => Ok(Self::Upcoming),
            "discover" => Ok(Self::Discover),
            other => Err(Error::invalid_value(
                "collection",
                format!("unknown movie collection '{other}'"),
            )),
        }
    }
}

/// TV series listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvCollection {
    AiringToday,
    OnTheAir,
    Popular,
    TopRated,
}

impl Endpoint for TvCollection {
    type Item = TvSeriesItem;

    fn path(&self) -> &'static str {
        match self {
            Self::AiringToday => "tv/airing_today",
            Self::OnTheAir => "tv/on_the_air",
            Self::Popular => "tv/popular",
            Self::TopRated => "tv/top_rated",
        }
    }
}

impl FromStr for TvCollection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "airing_today" | "airing-today" => Ok(Self::AiringToday),
            "on_the_air" | "on-the-air" => Ok(Self::OnTheAir),
            "popular" => Ok(Self::Popular),
            "top_rated" | "top-rated" => Ok(Self::TopRated),
            other => Err(Error::invalid_value(
                "collection",
                format!("unknown tv collection '{other}'"),
            )),
        }
    }
}

/// People listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeopleCollection {
    Popular,
    /// Weekly trending people
    Trending,
}

impl Endpoint for PeopleCollection {
    type Item = Celebrity;

    fn path(&self) -> &'static str {
        match self {
            Self::Popular => "person/popular",
            Self::Trending => "trending/person/week",
        }
    }
}

impl FromStr for PeopleCollection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(Self::Popular),
            "trending" => Ok(Self::Trending),
            other => Err(Error::invalid_value(
                "collection",
                format!("unknown people collection '{other}'"),
            )),
        }
    }
}
