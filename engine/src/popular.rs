use crate::matrix::RatingMatrix;
use crate::recommendation::Recommendation;
use dataset::{Catalog, UserId};
use std::cmp::Ordering;

/// Items need at least this many observed ratings before they qualify as
/// popular.
pub const DEFAULT_MIN_RATINGS: usize = 10;

/// Best-rated widely-seen items: the cold-start answer when no personal
/// signal exists, and the catalog-wide popularity listing when no user is
/// excluded.
pub fn recommend(
    matrix: &RatingMatrix,
    catalog: &Catalog,
    exclude: Option<UserId>,
    top_n: usize,
    genre_filter: Option<&str>,
    min_ratings: usize,
) -> Vec<Recommendation> {
    let rated = exclude.and_then(|user_id| matrix.user_ratings(user_id));

    let mut scored: Vec<(Recommendation, usize)> = Vec::new();
    for (&movie_id, ratings) in matrix.items_ratings() {
        if ratings.len() < min_ratings {
            continue;
        }

        if let Some(rated) = rated {
            if rated.contains_key(&movie_id) {
                continue;
            }
        }

        let movie = match catalog.get(movie_id) {
            Some(movie) => movie,
            None => continue,
        };

        if let Some(filter) = genre_filter {
            if !movie.matches_genre(filter) {
                continue;
            }
        }

        let count = ratings.len();
        let mean = ratings.values().sum::<f64>() / count as f64;
        scored.push((Recommendation::new(movie, mean), count));
    }

    // Better means first, more ratings on equal means, ids on exact ties.
    scored.sort_by(|a, b| {
        b.0.score
            .partial_cmp(&a.0.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| a.0.movie_id.cmp(&b.0.movie_id))
    });
    scored.truncate(top_n);

    scored.into_iter().map(|(item, _)| item).collect()
}
