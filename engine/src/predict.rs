use crate::matrix::RatingMatrix;
use crate::similarity::Similarity;
use dataset::{MovieId, Ratings, UserId};

/// Similarity-weighted average of the ratings the first `top_k` ranked
/// neighbours gave this item. `None` when none of them rated it; a missing
/// prediction is a signal, not a zero.
pub fn predict_rating(
    movie_id: MovieId,
    matrix: &RatingMatrix,
    neighbours: &[Similarity],
    top_k: usize,
) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for neighbour in neighbours.iter().take(top_k) {
        if let Some(score) = matrix.rating(neighbour.user_id, movie_id) {
            weighted_sum += neighbour.score * score;
            total_weight += neighbour.score.abs();
        }
    }

    if total_weight > 0.0 {
        Some(weighted_sum / total_weight)
    } else {
        None
    }
}

/// Batch prediction restricted to a caller-supplied candidate set. Items
/// without a prediction are simply absent from the result.
pub fn predict_candidates(
    candidates: &[MovieId],
    matrix: &RatingMatrix,
    neighbours: &[Similarity],
    top_k: usize,
) -> Ratings {
    let mut predictions = Ratings::new();
    for &movie_id in candidates {
        if let Some(score) = predict_rating(movie_id, matrix, neighbours, top_k) {
            predictions.insert(movie_id, score);
        }
    }

    predictions
}

/// Up to `top_k` neighbours who rated the item, in rank order. Scans at most
/// the first `2 * top_k` ranked entries.
pub fn users_who_rated(
    movie_id: MovieId,
    matrix: &RatingMatrix,
    neighbours: &[Similarity],
    top_k: usize,
) -> Vec<UserId> {
    let mut raters = Vec::new();
    for neighbour in neighbours.iter().take(top_k * 2) {
        if raters.len() == top_k {
            break;
        }

        if matrix.rating(neighbour.user_id, movie_id).is_some() {
            raters.push(neighbour.user_id);
        }
    }

    raters
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use common_macros::hash_map;

    fn neighbour(user_id: UserId, score: f64) -> Similarity {
        Similarity { user_id, score }
    }

    fn matrix() -> RatingMatrix {
        RatingMatrix::from_users(hash_map! {
            2 => hash_map! { 30 => 4.0 },
            3 => hash_map! { 30 => 2.0, 40 => 5.0 },
            4 => hash_map! { 40 => 1.0 },
        })
    }

    #[test]
    fn weighted_average_over_rating_neighbours() {
        let matrix = matrix();
        let ranked = vec![neighbour(2, 1.0), neighbour(3, 0.5)];

        // (1.0 * 4.0 + 0.5 * 2.0) / 1.5
        let predicted = predict_rating(30, &matrix, &ranked, 50).unwrap();
        assert_approx_eq!(predicted, 10.0 / 3.0);
    }

    #[test]
    fn no_rater_among_top_k_gives_none() {
        let matrix = matrix();
        let ranked = vec![neighbour(2, 1.0), neighbour(3, 0.5)];

        // Only user 3 rated item 40, but the top-1 cut stops at user 2.
        assert_eq!(predict_rating(40, &matrix, &ranked, 1), None);
        assert!(predict_rating(40, &matrix, &ranked, 2).is_some());
    }

    #[test]
    fn unrated_everywhere_gives_none() {
        let matrix = matrix();
        let ranked = vec![neighbour(2, 1.0)];

        assert_eq!(predict_rating(99, &matrix, &ranked, 50), None);
    }

    #[test]
    fn candidate_batch_skips_unpredictable_items() {
        let matrix = matrix();
        let ranked = vec![neighbour(2, 1.0), neighbour(3, 0.5)];

        let predictions = predict_candidates(&[30, 40, 99], &matrix, &ranked, 50);

        assert_eq!(predictions.len(), 2);
        assert!(predictions.contains_key(&30));
        assert!(predictions.contains_key(&40));
        assert!(!predictions.contains_key(&99));
    }

    #[test]
    fn raters_come_back_in_rank_order() {
        let matrix = matrix();
        let ranked = vec![neighbour(4, 0.9), neighbour(3, 0.8), neighbour(2, 0.1)];

        assert_eq!(users_who_rated(40, &matrix, &ranked, 10), vec![4, 3]);
        assert_eq!(users_who_rated(40, &matrix, &ranked, 1), vec![4]);
    }

    #[test]
    fn rater_scan_stops_after_twice_top_k() {
        let mut rows = hash_map! {
            9 => hash_map! { 30 => 4.0 },
        };
        for user_id in 1..=8 {
            rows.insert(user_id, hash_map! { 40 => 3.0 });
        }

        let matrix = RatingMatrix::from_users(rows);
        let mut ranked: Vec<_> = (1..=8).map(|id| neighbour(id, 0.9)).collect();
        ranked.push(neighbour(9, 0.1));

        // The only rater of item 30 sits at position 9, past the window of
        // 2 * top_k = 8 entries.
        assert!(users_who_rated(30, &matrix, &ranked, 4).is_empty());
        assert_eq!(users_who_rated(30, &matrix, &ranked, 5), vec![9]);
    }
}
