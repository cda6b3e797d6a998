// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::{MovieId, UserId};
use std::collections::HashSet;

/// Genre label used in the MovieLens dumps for movies without any genre.
/// It survives `parse_genre_set` like any other label but is skipped when
/// listing the catalog's genres.
pub const NO_GENRES: &str = "(no genres listed)";

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub genres: String,
}

impl Movie {
    /// Split the `|`-separated genre string into a set of labels.
    pub fn genre_set(&self) -> HashSet<&str> {
        parse_genre_set(&self.genres)
    }

    /// Case-insensitive substring match against the raw genre string, so
    /// `"sci"` matches both `Sci-Fi` and `Science Fiction` style labels.
    pub fn matches_genre(&self, filter: &str) -> bool {
        self.genres.to_lowercase().contains(&filter.to_lowercase())
    }

    /// Extract the `" (YYYY)"` suffix most MovieLens titles carry.
    pub fn release_year(&self) -> Option<u16> {
        let title = self.title.trim();
        if !title.ends_with(')') {
            return None;
        }

        let open = title.rfind('(')?;
        let inner = &title[open + 1..title.len() - 1];
        if inner.len() == 4 {
            inner.parse().ok()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub score: f64,
}

pub fn parse_genre_set(genres: &str) -> HashSet<&str> {
    genres
        .split('|')
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .collect()
}
