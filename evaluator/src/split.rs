// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use dataset::{Rating, UserId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

/// Per-user hold-out split of a ratings log.
///
/// Every user keeps `max(1, floor(n * test_ratio))` of their shuffled ratings
/// in the test set, except users with fewer than `min_ratings_per_user`
/// ratings, which go entirely into train. Each user shuffles with their own
/// seed (`seed + user_id`) so the same user splits identically whether the
/// run covers the full log or a sampled subset.
pub fn train_test_split(
    records: &[Rating],
    test_ratio: f64,
    min_ratings_per_user: usize,
    seed: u64,
) -> (Vec<Rating>, Vec<Rating>) {
    let mut by_user: HashMap<UserId, Vec<Rating>> = HashMap::new();
    for rating in records {
        by_user
            .entry(rating.user_id)
            .or_insert_with(Vec::new)
            .push(rating.clone());
    }

    let mut user_ids: Vec<UserId> = by_user.keys().copied().collect();
    user_ids.sort();

    let mut train = Vec::new();
    let mut test = Vec::new();

    for user_id in user_ids {
        let mut ratings = match by_user.remove(&user_id) {
            Some(ratings) => ratings,
            None => continue,
        };

        if ratings.len() < min_ratings_per_user {
            train.append(&mut ratings);
            continue;
        }

        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(user_id as u64));
        ratings.shuffle(&mut rng);

        let held_out = ((ratings.len() as f64 * test_ratio) as usize)
            .max(1)
            .min(ratings.len());

        test.extend(ratings.drain(..held_out));
        train.append(&mut ratings);
    }

    (train, test)
}
