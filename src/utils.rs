// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use engine::{GenreProfile, Recommendation, Similarity};
use prettytable::{cell, format::consts::FORMAT_NO_LINESEP, row, Table};
use std::cmp::Ordering;

pub(crate) fn recommendations_table(items: &[Recommendation]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["id", "title", "score", "genres", "contributors"]);

    for item in items {
        let contributors = item
            .contributors
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        table.add_row(row![
            item.movie_id,
            item.title,
            format!("{:.2}", item.score),
            item.genres,
            contributors
        ]);
    }

    table.set_format(*FORMAT_NO_LINESEP);
    table
}

pub(crate) fn similarities_table(neighbours: &[Similarity]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["user", "similarity"]);

    for neighbour in neighbours {
        table.add_row(row![neighbour.user_id, format!("{:.4}", neighbour.score)]);
    }

    table.set_format(*FORMAT_NO_LINESEP);
    table
}

pub(crate) fn profile_table(profile: &GenreProfile) -> Table {
    let mut entries: Vec<(&str, f64)> = profile
        .iter()
        .map(|(genre, weight)| (genre.as_str(), *weight))
        .collect();

    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    let mut table = Table::new();
    table.set_titles(row!["genre", "weight"]);

    for (genre, weight) in entries {
        table.add_row(row![genre, format!("{:.3}", weight)]);
    }

    table.set_format(*FORMAT_NO_LINESEP);
    table
}
