use crate::matrix::RatingMatrix;
use crate::popular;
use crate::predict::{predict_rating, users_who_rated};
use crate::recommendation::{sort_and_truncate, Recommendation, Recommended};
use crate::similarity::similar_users;
use crate::SearchParams;
use dataset::{Catalog, UserId};

/// Contributing user ids attached to each recommendation.
pub const MAX_CONTRIBUTORS: usize = 10;

/// User-based collaborative filtering over the target's unrated matrix
/// columns.
///
/// An unknown target returns empty items with `cold_start: false`; a target
/// with no usable neighbours gets the popularity fallback and
/// `cold_start: true`.
pub fn recommend(
    target: UserId,
    matrix: &RatingMatrix,
    catalog: &Catalog,
    top_n: usize,
    params: SearchParams,
    genre_filter: Option<&str>,
) -> Recommended {
    let rated = match matrix.user_ratings(target) {
        Some(ratings) => ratings,
        None => return Recommended::default(),
    };

    let neighbours = similar_users(target, matrix, params.min_common);
    if neighbours.is_empty() {
        return fallback(target, matrix, catalog, top_n, genre_filter);
    }

    log::debug!(
        "Scoring unrated items for user {} with {} neighbours",
        target,
        neighbours.len()
    );

    let mut items = Vec::new();
    for &movie_id in matrix.items() {
        if rated.contains_key(&movie_id) {
            continue;
        }

        let movie = match catalog.get(movie_id) {
            Some(movie) => movie,
            None => continue,
        };

        let score = match predict_rating(movie_id, matrix, &neighbours, params.top_k) {
            Some(score) => score,
            None => continue,
        };

        // The filter narrows predicted items; it never narrows the ratings
        // predictions are made from.
        if let Some(filter) = genre_filter {
            if !movie.matches_genre(filter) {
                continue;
            }
        }

        items.push(Recommendation::new(movie, score));
    }

    if items.is_empty() {
        return fallback(target, matrix, catalog, top_n, genre_filter);
    }

    sort_and_truncate(&mut items, top_n);
    for item in &mut items {
        item.contributors = users_who_rated(item.movie_id, matrix, &neighbours, MAX_CONTRIBUTORS);
    }

    Recommended {
        items,
        cold_start: false,
    }
}

fn fallback(
    target: UserId,
    matrix: &RatingMatrix,
    catalog: &Catalog,
    top_n: usize,
    genre_filter: Option<&str>,
) -> Recommended {
    let items = popular::recommend(
        matrix,
        catalog,
        Some(target),
        top_n,
        genre_filter,
        popular::DEFAULT_MIN_RATINGS,
    );

    Recommended {
        items,
        cold_start: true,
    }
}
