use crate::matrix::RatingMatrix;
use crate::recommendation::{sort_and_truncate, Recommendation};
use dataset::{Catalog, Movie, UserId};
use std::collections::HashMap;

/// Ratings at or above this score count as "liked" when building profiles.
pub const DEFAULT_MIN_RATING: f64 = 3.5;

/// Normalized genre preferences, values summing to 1.
pub type GenreProfile = HashMap<String, f64>;

/// Build the target's genre profile from the movies they liked. Each genre
/// of each qualifying movie accumulates `rating - min_rating + 1`, and the
/// result is normalized across all (genre, movie) contributions.
pub fn genre_profile(
    target: UserId,
    matrix: &RatingMatrix,
    catalog: &Catalog,
    min_rating: f64,
) -> GenreProfile {
    let mut profile = GenreProfile::new();

    let ratings = match matrix.user_ratings(target) {
        Some(ratings) => ratings,
        None => return profile,
    };

    let mut total_weight = 0.0;
    for (&movie_id, &score) in ratings {
        if score < min_rating {
            continue;
        }

        let movie = match catalog.get(movie_id) {
            Some(movie) => movie,
            None => continue,
        };

        // A 5.0 at the default threshold weighs 2.5, a bare pass weighs 1.0.
        let weight = score - min_rating + 1.0;
        for genre in movie.genre_set() {
            *profile.entry(genre.to_string()).or_insert(0.0) += weight;
            total_weight += weight;
        }
    }

    if total_weight > 0.0 {
        for value in profile.values_mut() {
            *value /= total_weight;
        }
    }

    profile
}

// Cosine between the movie's binary genre vector and the profile weights,
// taken over the union of both genre sets.
fn profile_similarity(movie: &Movie, profile: &GenreProfile) -> f64 {
    let genres = movie.genre_set();
    if genres.is_empty() || profile.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    for genre in &genres {
        if let Some(weight) = profile.get(*genre) {
            dot += *weight;
        }
    }

    let movie_norm = (genres.len() as f64).sqrt();
    let profile_norm = profile.values().map(|w| w * w).sum::<f64>().sqrt();

    if movie_norm > 0.0 && profile_norm > 0.0 {
        dot / (movie_norm * profile_norm)
    } else {
        0.0
    }
}

/// Content-based recommendation over the target's unrated matrix columns.
///
/// An empty profile means the user liked nothing at the threshold; that
/// returns empty items and is a different outcome than cold start.
pub fn recommend(
    target: UserId,
    matrix: &RatingMatrix,
    catalog: &Catalog,
    top_n: usize,
    min_rating: f64,
    genre_filter: Option<&str>,
) -> Vec<Recommendation> {
    let rated = match matrix.user_ratings(target) {
        Some(ratings) => ratings,
        None => return Vec::new(),
    };

    let profile = genre_profile(target, matrix, catalog, min_rating);
    if profile.is_empty() {
        log::debug!("User {} has no ratings above {}", target, min_rating);
        return Vec::new();
    }

    let mut items = Vec::new();
    for &movie_id in matrix.items() {
        if rated.contains_key(&movie_id) {
            continue;
        }

        let movie = match catalog.get(movie_id) {
            Some(movie) => movie,
            None => continue,
        };

        // Unlike the collaborative path, the filter runs before scoring.
        if let Some(filter) = genre_filter {
            if !movie.matches_genre(filter) {
                continue;
            }
        }

        let similarity = profile_similarity(movie, &profile);
        if similarity > 0.0 {
            items.push(Recommendation::new(movie, similarity));
        }
    }

    sort_and_truncate(&mut items, top_n);
    items
}
