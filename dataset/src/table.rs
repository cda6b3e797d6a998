// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::models::Movie;
use prettytable::{cell, format::consts::FORMAT_NO_LINESEP, row, table, Table};
use std::collections::HashMap;

pub trait ToTable {
    fn to_table(&self) -> Table;
}

impl ToTable for Movie {
    fn to_table(&self) -> Table {
        let mut table = table![["id", self.id], ["title", self.title]];

        table.add_row(row!["genres", self.genres]);
        if let Some(year) = self.release_year() {
            table.add_row(row!["year", year]);
        }

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}

impl<K, V, B> ToTable for HashMap<K, V, B>
where
    K: ToString,
    V: ToString,
{
    fn to_table(&self) -> Table {
        let mut table = Table::new();

        for (key, val) in self {
            table.add_row(row![key, val]);
        }

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}
