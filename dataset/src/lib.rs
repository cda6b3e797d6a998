// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod catalog;
pub mod error;
pub mod loader;
pub mod models;
pub mod table;

use anyhow::Error;
use std::collections::HashMap;

pub use catalog::Catalog;
pub use loader::{load_movies, load_ratings};
pub use models::{parse_genre_set, Movie, Rating, NO_GENRES};
pub use table::ToTable;

pub type Result<T> = std::result::Result<T, Error>;

pub type UserId = i32;
pub type MovieId = i32;

/// One user's (or item's) sparse rating row. A missing key means "unrated",
/// never a zero score.
pub type Ratings<I = MovieId, Value = f64> = HashMap<I, Value>;
pub type MapedRatings<K = UserId, I = MovieId, Value = f64> = HashMap<K, Ratings<I, Value>>;
