#![allow(clippy::implicit_hasher)]

use crate::matrix::RatingMatrix;
use crate::utils::common_keys_iter;
use dataset::{Ratings, UserId};
use num_traits::float::Float;
use std::cmp::Ordering;
use std::hash::Hash;
use std::ops::{AddAssign, Mul, Sub};

/// Another user and how strongly their ratings correlate with the target's,
/// always in (0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Similarity {
    pub user_id: UserId,
    pub score: f64,
}

/// Pearson correlation over the keys both rows share. Fewer than two shared
/// keys, zero variance on either side, or a non-finite result give `None`,
/// which callers treat as no correlation at all.
pub fn pearson_correlation<ItemId, Value>(
    a: &Ratings<ItemId, Value>,
    b: &Ratings<ItemId, Value>,
) -> Option<Value>
where
    ItemId: Hash + Eq,
    Value: Float + AddAssign + Sub + Mul,
{
    let mut mean_x = None;
    let mut mean_y = None;
    let mut n = 0;

    for (x, y) in common_keys_iter(a, b) {
        *mean_x.get_or_insert_with(Value::zero) += *x;
        *mean_y.get_or_insert_with(Value::zero) += *y;
        n += 1;
    }

    if n < 2 {
        return None;
    }

    let n = Value::from(n)?;
    let mean_x = mean_x? / n;
    let mean_y = mean_y? / n;

    let mut cov = None;
    let mut std_dev_a = None;
    let mut std_dev_b = None;

    for (x, y) in common_keys_iter(a, b) {
        *cov.get_or_insert_with(Value::zero) += (*x - mean_x) * (*y - mean_y);
        *std_dev_a.get_or_insert_with(Value::zero) += (*x - mean_x).powi(2);
        *std_dev_b.get_or_insert_with(Value::zero) += (*y - mean_y).powi(2);
    }

    let std_dev = std_dev_a?.sqrt() * std_dev_b?.sqrt();
    let pearson = cov? / std_dev;

    if pearson.is_nan() || pearson.is_infinite() {
        None
    } else {
        Some(pearson)
    }
}

/// Rank every other user of the matrix by correlation with the target.
///
/// Pairs sharing fewer than `min_common` items are skipped, and only
/// strictly positive correlations make the list. An unknown target gives an
/// empty list, which callers can tell apart because known users always have
/// at least a row.
pub fn similar_users(target: UserId, matrix: &RatingMatrix, min_common: usize) -> Vec<Similarity> {
    let target_ratings = match matrix.user_ratings(target) {
        Some(ratings) => ratings,
        None => return Vec::new(),
    };

    let mut similarities = Vec::new();
    for (&user_id, ratings) in matrix.users_ratings() {
        if user_id == target {
            continue;
        }

        let common = common_keys_iter(target_ratings, ratings).count();
        if common < min_common {
            continue;
        }

        match pearson_correlation(target_ratings, ratings) {
            Some(score) if score > 0.0 => similarities.push(Similarity { user_id, score }),
            _ => continue,
        }
    }

    // Strongest correlation first, ids ascending on exact ties.
    similarities.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    log::debug!(
        "Found {} similar users for user {}",
        similarities.len(),
        target
    );

    similarities
}
