// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use dataset::UserId;
use engine::similarity::similar_users;
use engine::{RatingMatrix, Similarity};
use std::collections::HashMap;

/// Caller-owned cache of ranked neighbour lists.
///
/// Entries are keyed by `(target, min_common)` and computed once; the cache
/// holds no reference to the matrix, so it must be dropped or cleared when
/// the matrix it was filled from changes.
#[derive(Debug, Default)]
pub struct SimilarityCache {
    entries: HashMap<(UserId, usize), Vec<Similarity>>,
}

impl SimilarityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranked neighbours of `target`, computing and storing them on the
    /// first request.
    pub fn similar_users(
        &mut self,
        target: UserId,
        matrix: &RatingMatrix,
        min_common: usize,
    ) -> &[Similarity] {
        self.entries
            .entry((target, min_common))
            .or_insert_with(|| similar_users(target, matrix, min_common))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
