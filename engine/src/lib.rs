// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod cf;
pub mod content;
pub mod error;
pub mod hybrid;
pub mod matrix;
pub mod popular;
pub mod predict;
pub mod recommendation;
pub mod similarity;

mod utils;

use dataset::{Catalog, MovieId, UserId};

pub use content::GenreProfile;
pub use error::ErrorKind;
pub use hybrid::HybridMethod;
pub use matrix::{MatrixBuilder, RatingMatrix};
pub use recommendation::{Recommendation, Recommended};
pub use similarity::Similarity;

/// Neighbourhood knobs shared by every strategy: how much two users must
/// have in common before they correlate, and how many ranked neighbours
/// feed each prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub min_common: usize,
    pub top_k: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            min_common: 5,
            top_k: 50,
        }
    }
}

/// Facade over a borrowed matrix and catalog. Strategy entry points never
/// fail for "nothing to recommend"; empty lists and the cold-start flag
/// carry those outcomes, and only malformed input errors.
pub struct Engine<'a> {
    matrix: &'a RatingMatrix,
    catalog: &'a Catalog,
    params: SearchParams,
}

impl<'a> Engine<'a> {
    pub fn new(matrix: &'a RatingMatrix, catalog: &'a Catalog) -> Self {
        Self::with_params(matrix, catalog, SearchParams::default())
    }

    pub fn with_params(matrix: &'a RatingMatrix, catalog: &'a Catalog, params: SearchParams) -> Self {
        Self {
            matrix,
            catalog,
            params,
        }
    }

    pub fn similar_users(&self, target: UserId) -> Vec<Similarity> {
        similarity::similar_users(target, self.matrix, self.params.min_common)
    }

    pub fn predict(&self, target: UserId, movie_id: MovieId) -> Option<f64> {
        let neighbours = self.similar_users(target);
        predict::predict_rating(movie_id, self.matrix, &neighbours, self.params.top_k)
    }

    pub fn genre_profile(&self, target: UserId) -> GenreProfile {
        content::genre_profile(target, self.matrix, self.catalog, content::DEFAULT_MIN_RATING)
    }

    pub fn collaborative(
        &self,
        target: UserId,
        top_n: usize,
        genre_filter: Option<&str>,
    ) -> Recommended {
        cf::recommend(
            target,
            self.matrix,
            self.catalog,
            top_n,
            self.params,
            genre_filter,
        )
    }

    pub fn content_based(
        &self,
        target: UserId,
        top_n: usize,
        genre_filter: Option<&str>,
    ) -> Vec<Recommendation> {
        content::recommend(
            target,
            self.matrix,
            self.catalog,
            top_n,
            content::DEFAULT_MIN_RATING,
            genre_filter,
        )
    }

    pub fn popular(
        &self,
        top_n: usize,
        genre_filter: Option<&str>,
        exclude: Option<UserId>,
    ) -> Vec<Recommendation> {
        popular::recommend(
            self.matrix,
            self.catalog,
            exclude,
            top_n,
            genre_filter,
            popular::DEFAULT_MIN_RATINGS,
        )
    }

    /// The single serving entry point: hybrid recommendation under the
    /// given weights and method.
    pub fn recommend(
        &self,
        target: UserId,
        top_n: usize,
        genre_filter: Option<&str>,
        cf_weight: f64,
        cb_weight: f64,
        method: HybridMethod,
    ) -> Result<Recommended, ErrorKind> {
        hybrid::recommend(
            target,
            self.matrix,
            self.catalog,
            top_n,
            cf_weight,
            cb_weight,
            method,
            self.params,
            genre_filter,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use common_macros::hash_map;
    use dataset::Movie;

    fn movie(id: MovieId, title: &str, genres: &str) -> Movie {
        Movie {
            id,
            title: title.into(),
            genres: genres.into(),
        }
    }

    #[test]
    fn facade_wires_the_strategies_together() {
        let matrix = RatingMatrix::from_users(hash_map! {
            1 => hash_map! { 10 => 5.0, 20 => 3.0 },
            2 => hash_map! { 10 => 5.0, 20 => 3.0, 30 => 4.0 },
            3 => hash_map! { 10 => 1.0, 20 => 1.0, 30 => 5.0 },
        });
        let catalog = Catalog::from_movies(vec![
            movie(10, "Item A (1999)", "Action"),
            movie(20, "Item B (2000)", "Comedy"),
            movie(30, "Item C (2001)", "Action"),
            movie(40, "Item D (2002)", "Drama"),
        ]);

        let params = SearchParams {
            min_common: 2,
            top_k: 50,
        };
        let engine = Engine::with_params(&matrix, &catalog, params);

        let neighbours = engine.similar_users(1);
        assert_eq!(neighbours.len(), 1);
        assert_eq!(neighbours[0].user_id, 2);

        assert_approx_eq!(engine.predict(1, 30).unwrap(), 4.0);
        assert_eq!(engine.predict(1, 40), None);

        let result = engine
            .recommend(1, 10, None, 1.0, 0.0, HybridMethod::Weighted)
            .unwrap();
        assert!(!result.cold_start);
        assert_eq!(result.items[0].movie_id, 30);

        // The default neighbourhood floor asks for five co-rated items,
        // more than any pair in this fixture shares.
        let defaults = Engine::new(&matrix, &catalog);
        assert!(defaults.similar_users(1).is_empty());
    }
}
