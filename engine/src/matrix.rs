use dataset::{MapedRatings, MovieId, Rating, Ratings, UserId};
use std::collections::{HashMap, HashSet};

/// Sparse user by item rating table, with the transposed item index kept
/// alongside so both row and column lookups stay cheap.
#[derive(Debug, Clone, Default)]
pub struct RatingMatrix {
    by_user: MapedRatings,
    by_item: MapedRatings<MovieId, UserId>,
}

impl RatingMatrix {
    /// Build the matrix from user rows, deriving the item index.
    pub fn from_users(by_user: MapedRatings) -> Self {
        let mut by_item: MapedRatings<MovieId, UserId> = HashMap::new();
        for (user_id, ratings) in &by_user {
            for (movie_id, score) in ratings {
                by_item
                    .entry(*movie_id)
                    .or_insert_with(HashMap::new)
                    .insert(*user_id, *score);
            }
        }

        Self { by_user, by_item }
    }

    pub fn users(&self) -> impl Iterator<Item = &UserId> {
        self.by_user.keys()
    }

    pub fn items(&self) -> impl Iterator<Item = &MovieId> {
        self.by_item.keys()
    }

    pub fn users_ratings(&self) -> impl Iterator<Item = (&UserId, &Ratings)> {
        self.by_user.iter()
    }

    pub fn items_ratings(&self) -> impl Iterator<Item = (&MovieId, &Ratings<UserId>)> {
        self.by_item.iter()
    }

    pub fn user_ratings(&self, user_id: UserId) -> Option<&Ratings> {
        self.by_user.get(&user_id)
    }

    pub fn item_ratings(&self, movie_id: MovieId) -> Option<&Ratings<UserId>> {
        self.by_item.get(&movie_id)
    }

    /// `None` means unrated, never a zero score.
    pub fn rating(&self, user_id: UserId, movie_id: MovieId) -> Option<f64> {
        self.by_user.get(&user_id)?.get(&movie_id).copied()
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.by_user.contains_key(&user_id)
    }

    pub fn contains_item(&self, movie_id: MovieId) -> bool {
        self.by_item.contains_key(&movie_id)
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    pub fn item_count(&self) -> usize {
        self.by_item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

/// Caps the matrix axes by activity so huge dumps stay within memory. Both
/// caps rank by rating count and never look at rating pairs.
#[derive(Debug, Clone, Default)]
pub struct MatrixBuilder {
    max_users: Option<usize>,
    max_items: Option<usize>,
    required_user: Option<UserId>,
}

impl MatrixBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn max_users(mut self, cap: impl Into<Option<usize>>) -> Self {
        self.max_users = cap.into();
        self
    }

    pub fn max_items(mut self, cap: impl Into<Option<usize>>) -> Self {
        self.max_items = cap.into();
        self
    }

    /// Keep this user even when the cap would drop them. Users absent from
    /// the records are not invented.
    pub fn required_user(mut self, user_id: impl Into<Option<UserId>>) -> Self {
        self.required_user = user_id.into();
        self
    }

    pub fn build(&self, records: &[Rating]) -> RatingMatrix {
        let mut user_counts: HashMap<UserId, usize> = HashMap::new();
        for rating in records {
            *user_counts.entry(rating.user_id).or_insert(0) += 1;
        }

        let retained_users = match self.max_users {
            Some(cap) if user_counts.len() > cap => {
                let mut keep = most_active(&user_counts, cap);
                if let Some(required) = self.required_user {
                    if user_counts.contains_key(&required) {
                        keep.insert(required);
                    }
                }

                Some(keep)
            }
            _ => None,
        };

        let user_kept = |user_id: UserId| {
            retained_users
                .as_ref()
                .map_or(true, |keep| keep.contains(&user_id))
        };

        let mut item_counts: HashMap<MovieId, usize> = HashMap::new();
        for rating in records {
            if user_kept(rating.user_id) {
                *item_counts.entry(rating.movie_id).or_insert(0) += 1;
            }
        }

        let retained_items = match self.max_items {
            Some(cap) if item_counts.len() > cap => Some(most_active(&item_counts, cap)),
            _ => None,
        };

        let item_kept = |movie_id: MovieId| {
            retained_items
                .as_ref()
                .map_or(true, |keep| keep.contains(&movie_id))
        };

        // Every retained user keeps a row, even when the item cap dropped
        // all of their ratings.
        let mut by_user: MapedRatings = HashMap::new();
        for rating in records {
            if !user_kept(rating.user_id) {
                continue;
            }

            let row = by_user
                .entry(rating.user_id)
                .or_insert_with(HashMap::new);

            if item_kept(rating.movie_id) {
                row.insert(rating.movie_id, rating.score);
            }
        }

        let matrix = RatingMatrix::from_users(by_user);
        log::info!(
            "Built rating matrix with {} users and {} items",
            matrix.user_count(),
            matrix.item_count()
        );

        matrix
    }
}

// Ties break toward the smaller id so capped builds stay deterministic.
fn most_active<K>(counts: &HashMap<K, usize>, cap: usize) -> HashSet<K>
where
    K: Copy + Ord + std::hash::Hash,
{
    let mut ranked: Vec<(K, usize)> = counts.iter().map(|(id, n)| (*id, *n)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    ranked.into_iter().take(cap).map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_macros::hash_map;

    fn rec(user_id: UserId, movie_id: MovieId, score: f64) -> Rating {
        Rating {
            user_id,
            movie_id,
            score,
        }
    }

    fn sample_records() -> Vec<Rating> {
        vec![
            rec(1, 10, 5.0),
            rec(1, 20, 3.0),
            rec(1, 30, 4.0),
            rec(2, 10, 4.0),
            rec(2, 20, 2.0),
            rec(3, 30, 1.0),
        ]
    }

    #[test]
    fn uncapped_build_keeps_everything() {
        let matrix = MatrixBuilder::new().build(&sample_records());

        let mut user_ids: Vec<UserId> = matrix.users().copied().collect();
        user_ids.sort();
        assert_eq!(user_ids, vec![1, 2, 3]);

        assert_eq!(matrix.item_count(), 3);
        assert_eq!(matrix.rating(1, 10), Some(5.0));
        assert_eq!(matrix.rating(3, 30), Some(1.0));
    }

    #[test]
    fn absent_cells_are_none_not_zero() {
        let matrix = MatrixBuilder::new().build(&sample_records());

        assert_eq!(matrix.rating(3, 10), None);
        assert_eq!(matrix.rating(99, 10), None);
    }

    #[test]
    fn user_cap_keeps_most_active() {
        let matrix = MatrixBuilder::new().max_users(2).build(&sample_records());

        assert!(matrix.contains_user(1));
        assert!(matrix.contains_user(2));
        assert!(!matrix.contains_user(3));
    }

    #[test]
    fn user_cap_ties_break_by_ascending_id() {
        let records = vec![rec(7, 10, 3.0), rec(5, 10, 3.0), rec(9, 10, 3.0)];
        let matrix = MatrixBuilder::new().max_users(2).build(&records);

        assert!(matrix.contains_user(5));
        assert!(matrix.contains_user(7));
        assert!(!matrix.contains_user(9));
    }

    #[test]
    fn required_user_survives_the_cap() {
        let matrix = MatrixBuilder::new()
            .max_users(1)
            .required_user(3)
            .build(&sample_records());

        assert!(matrix.contains_user(1));
        assert!(matrix.contains_user(3));
        assert!(!matrix.contains_user(2));
    }

    #[test]
    fn required_user_missing_from_records_is_not_invented() {
        let matrix = MatrixBuilder::new()
            .max_users(1)
            .required_user(42)
            .build(&sample_records());

        assert!(!matrix.contains_user(42));
    }

    #[test]
    fn item_cap_counts_only_retained_users() {
        // User 3 is capped away, so item 30 keeps a single rating and
        // loses against items 10 and 20.
        let matrix = MatrixBuilder::new()
            .max_users(2)
            .max_items(2)
            .build(&sample_records());

        assert!(matrix.contains_item(10));
        assert!(matrix.contains_item(20));
        assert!(!matrix.contains_item(30));
    }

    #[test]
    fn capped_out_items_leave_user_rows_in_place() {
        let records = vec![
            rec(1, 10, 5.0),
            rec(2, 10, 4.0),
            rec(3, 30, 1.0),
        ];

        let matrix = MatrixBuilder::new().max_items(1).build(&records);

        assert!(matrix.contains_user(3));
        assert_eq!(matrix.user_ratings(3).map(|row| row.len()), Some(0));
        assert!(!matrix.contains_item(30));
    }

    #[test]
    fn transposed_index_matches_rows() {
        let matrix = RatingMatrix::from_users(hash_map! {
            1 => hash_map! { 10 => 5.0, 20 => 3.0 },
            2 => hash_map! { 10 => 4.0 },
        });

        let raters = matrix.item_ratings(10).unwrap();
        assert_eq!(raters.len(), 2);
        assert_eq!(raters.get(&1), Some(&5.0));
        assert_eq!(raters.get(&2), Some(&4.0));
        assert_eq!(matrix.item_ratings(20).map(|row| row.len()), Some(1));
    }
}
