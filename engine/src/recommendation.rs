use dataset::{Movie, MovieId, UserId};
use std::cmp::Ordering;

/// A scored movie plus the metadata callers display. `contributors` holds the
/// similar users whose ratings produced the score; strategies without that
/// notion leave it empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub score: f64,
    pub genres: String,
    pub contributors: Vec<UserId>,
}

impl Recommendation {
    pub fn new(movie: &Movie, score: f64) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            score,
            genres: movie.genres.clone(),
            contributors: Vec::new(),
        }
    }
}

/// What a recommendation strategy hands back: the ranked items and whether
/// they came from the popularity fallback instead of a personal signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommended {
    pub items: Vec<Recommendation>,
    pub cold_start: bool,
}

/// Single definition of the ranking order: score descending, ids ascending
/// on exact ties.
pub fn sort_and_truncate(items: &mut Vec<Recommendation>, top_n: usize) {
    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.movie_id.cmp(&b.movie_id))
    });
    items.truncate(top_n);
}

pub(crate) fn genre_matches(genres: &str, filter: Option<&str>) -> bool {
    match filter {
        Some(filter) => genres.to_lowercase().contains(&filter.to_lowercase()),
        None => true,
    }
}
