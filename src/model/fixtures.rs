//! Test fixtures shared by the unit tests

use super::{MovieItem, TvSeriesItem};
use crate::types::ItemId;

pub(crate) fn movie(id: ItemId) -> MovieItem {
    MovieItem {
        id,
        adult: false,
        backdrop_path: Some(format!("/backdrop/{id}.jpg")),
        genre_ids: vec![28, 12],
        original_language: "en".to_string(),
        original_title: format!("Original {id}"),
        overview: format!("Overview of {id}"),
        popularity: id as f64 * 1.5,
        poster_path: Some(format!("/poster/{id}.jpg")),
        release_date: Some("2024-05-01".to_string()),
        title: format!("Movie {id}"),
        video: false,
        vote_average: 7.25,
        vote_count: id * 10,
    }
}

pub(crate) fn movies(ids: impl IntoIterator<Item = ItemId>) -> Vec<MovieItem> {
    ids.into_iter().map(movie).collect()
}

pub(crate) fn tv_series(id: ItemId) -> TvSeriesItem {
    TvSeriesItem {
        id,
        backdrop_path: None,
        first_air_date: Some("2011-04-17".to_string()),
        genre_ids: vec![18, 10765],
        name: format!("Series {id}"),
        origin_country: vec!["US".to_string()],
        original_language: "en".to_string(),
        original_name: format!("Series {id}"),
        overview: String::new(),
        popularity: 300.5,
        poster_path: Some("/s.jpg".to_string()),
        vote_average: 8.4,
        vote_count: 21000,
    }
}
