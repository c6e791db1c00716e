//! Item <-> Entity conversions
//!
//! Total and side-effect free. No normalization happens here: whatever the
//! deserializer accepted is persisted as is.

use super::{MovieEntity, MovieItem, TvSeriesEntity, TvSeriesItem};

impl From<MovieItem> for MovieEntity {
    fn from(item: MovieItem) -> Self {
        Self {
            id: item.id,
            adult: item.adult,
            backdrop_path: item.backdrop_path,
            genre_ids: item.genre_ids,
            original_language: item.original_language,
            original_title: item.original_title,
            overview: item.overview,
            popularity: item.popularity,
            poster_path: item.poster_path,
            release_date: item.release_date,
            title: item.title,
            video: item.video,
            vote_average: item.vote_average,
            vote_count: item.vote_count,
        }
    }
}

impl From<MovieEntity> for MovieItem {
    fn from(entity: MovieEntity) -> Self {
        Self {
            id: entity.id,
            adult: entity.adult,
            backdrop_path: entity.backdrop_path,
            genre_ids: entity.genre_ids,
            original_language: entity.original_language,
            original_title: entity.original_title,
            overview: entity.overview,
            popularity: entity.popularity,
            poster_path: entity.poster_path,
            release_date: entity.release_date,
            title: entity.title,
            video: entity.video,
            vote_average: entity.vote_average,
            vote_count: entity.vote_count,
        }
    }
}

impl From<TvSeriesItem> for TvSeriesEntity {
    fn from(item: TvSeriesItem) -> Self {
        Self {
            id: item.id,
            backdrop_path: item.backdrop_path,
            first_air_date: item.first_air_date,
            genre_ids: item.genre_ids,
            name: item.name,
            origin_country: item.origin_country,
            original_language: item.original_language,
            original_name: item.original_name,
            overview: item.overview,
            popularity: item.popularity,
            poster_path: item.poster_path,
            vote_average: item.vote_average,
            vote_count: item.vote_count,
        }
    }
}

impl From<TvSeriesEntity> for TvSeriesItem {
    fn from(entity: TvSeriesEntity) -> Self {
        Self {
            id: entity.id,
            backdrop_path: entity.backdrop_path,
            first_air_date: entity.first_air_date,
            genre_ids: entity.genre_ids,
            name: entity.name,
            origin_country: entity.origin_country,
            original_language: entity.original_language,
            original_name: entity.original_name,
            overview: entity.overview,
            popularity: entity.popularity,
            poster_path: entity.poster_path,
            vote_average: entity.vote_average,
            vote_count: entity.vote_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{movie, tv_series};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_movie_round_trip() {
        let fixtures = vec![
            movie(10),
            MovieItem {
                backdrop_path: None,
                poster_path: None,
                release_date: None,
                genre_ids: Vec::new(),
                ..movie(11)
            },
            MovieItem {
                adult: true,
                video: true,
                overview: "multi\nline \u{1F3AC}".to_string(),
                ..movie(987_654_321)
            },
        ];

        for item in fixtures {
            let back = MovieItem::from(MovieEntity::from(item.clone()));
            assert_eq!(back, item);
        }
    }

    #[test]
    fn test_tv_series_round_trip() {
        let item = tv_series(1399);
        let back = TvSeriesItem::from(TvSeriesEntity::from(item.clone()));
        assert_eq!(back, item);
    }

    #[test]
    fn test_mapping_keeps_id() {
        let entity = MovieEntity::from(movie(42));
        assert_eq!(entity.id, 42);
        assert_eq!(entity.title, "Movie 42");
    }
}
