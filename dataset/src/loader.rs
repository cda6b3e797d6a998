// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::error::ErrorKind;
use crate::models::{Movie, Rating};
use crate::Result;
use indicatif::ProgressIterator;
use std::path::Path;
use std::str::FromStr;

fn field<'a>(record: &'a csv::StringRecord, index: usize, name: &'static str) -> Result<&'a str> {
    let line = record.position().map_or(0, |pos| pos.line());
    let value = record
        .get(index)
        .ok_or(ErrorKind::MissingColumn(name, line))?;

    Ok(value)
}

fn parse_field<T: FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &'static str,
) -> Result<T> {
    let line = record.position().map_or(0, |pos| pos.line());
    field(record, index, name)?
        .trim()
        .parse()
        .map_err(|_| ErrorKind::InvalidValue(name, line).into())
}

/// Load `movies.csv` (`movieId,title,genres`).
pub fn load_movies(path: impl AsRef<Path>) -> Result<Vec<Movie>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .from_path(path)?;

    let mut movies = Vec::new();
    let records: Vec<_> = csv.records().collect();

    for record in records.iter().progress() {
        if let Ok(record) = record {
            let id = parse_field(record, 0, "movieId")?;
            let title = field(record, 1, "title")?.to_string();
            let genres = field(record, 2, "genres")?.to_string();

            movies.push(Movie { id, title, genres });
        }
    }

    log::info!("Loaded {} movies", movies.len());
    Ok(movies)
}

/// Load `ratings.csv` (`userId,movieId,rating,timestamp`). The timestamp
/// column is ignored.
pub fn load_ratings(path: impl AsRef<Path>) -> Result<Vec<Rating>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .from_path(path)?;

    let mut ratings = Vec::new();
    for record in csv.records().progress() {
        if let Ok(record) = record {
            let user_id = parse_field(&record, 0, "userId")?;
            let movie_id = parse_field(&record, 1, "movieId")?;
            let score = parse_field(&record, 2, "rating")?;

            ratings.push(Rating {
                user_id,
                movie_id,
                score,
            });
        }
    }

    log::info!("Loaded {} ratings", ratings.len());
    Ok(ratings)
}
