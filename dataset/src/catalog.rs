// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::models::{Movie, NO_GENRES};
use crate::MovieId;
use std::collections::{HashMap, HashSet};

/// Lookup table for movie metadata, keyed by movie id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: HashMap<MovieId, Movie>,
}

impl Catalog {
    pub fn from_movies(movies: Vec<Movie>) -> Self {
        let movies = movies.into_iter().map(|movie| (movie.id, movie)).collect();
        Self { movies }
    }

    pub fn get(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.movies.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    /// All genre labels present in the catalog, sorted, without the
    /// "no genres" placeholder.
    pub fn genres(&self) -> Vec<String> {
        let mut labels: HashSet<&str> = HashSet::new();
        for movie in self.iter() {
            for genre in movie.genre_set() {
                if genre != NO_GENRES {
                    labels.insert(genre);
                }
            }
        }

        let mut labels: Vec<String> = labels.into_iter().map(String::from).collect();
        labels.sort();
        labels
    }
}
