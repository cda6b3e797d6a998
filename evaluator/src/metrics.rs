// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use dataset::MovieId;
use engine::Recommendation;
use std::collections::HashSet;

/// MovieLens defines 19 genre labels plus the "no genres" placeholder, so
/// genre coverage is reported against a ceiling of 20.
const GENRE_CEILING: usize = 20;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub count: usize,
}

/// Mean absolute and root mean squared error over `(actual, predicted)`
/// pairs. An empty slice yields zeroed metrics.
pub fn rating_metrics(pairs: &[(f64, f64)]) -> RatingMetrics {
    if pairs.is_empty() {
        return RatingMetrics::default();
    }

    let count = pairs.len();
    let mut absolute_sum = 0.0;
    let mut squared_sum = 0.0;

    for (actual, predicted) in pairs {
        let error = actual - predicted;
        absolute_sum += error.abs();
        squared_sum += error * error;
    }

    RatingMetrics {
        mae: absolute_sum / count as f64,
        rmse: (squared_sum / count as f64).sqrt(),
        count,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub ndcg: f64,
}

/// Precision, recall, F1 and NDCG of the first `k` recommended ids against
/// the relevant set. Gains are binary, discounted by `1 / log2(rank + 1)`
/// with ranks starting at 1; the ideal ranking packs `min(|relevant|, k)`
/// hits at the top.
pub fn ranking_metrics(
    recommended: &[MovieId],
    relevant: &HashSet<MovieId>,
    k: usize,
) -> RankingMetrics {
    let top: Vec<MovieId> = recommended.iter().take(k).copied().collect();
    if top.is_empty() || relevant.is_empty() {
        return RankingMetrics::default();
    }

    let hits = top.iter().filter(|id| relevant.contains(id)).count() as f64;
    let precision = hits / top.len() as f64;
    let recall = hits / relevant.len() as f64;
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    let mut dcg = 0.0;
    for (position, movie_id) in top.iter().enumerate() {
        if relevant.contains(movie_id) {
            dcg += 1.0 / ((position + 2) as f64).log2();
        }
    }

    let ideal_hits = relevant.len().min(k);
    let idcg: f64 = (0..ideal_hits)
        .map(|position| 1.0 / ((position + 2) as f64).log2())
        .sum();

    let ndcg = if idcg > 0.0 { dcg / idcg } else { 0.0 };

    RankingMetrics {
        precision,
        recall,
        f1,
        ndcg,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiversityMetrics {
    /// Mean pairwise Jaccard distance between the genre sets of the list.
    pub intra_list: f64,
    pub unique_genres: usize,
    /// Unique genres over the MovieLens ceiling, capped at 1.
    pub genre_coverage: f64,
}

/// Genre diversity of a recommendation list. Lists shorter than two items
/// have no pairs, so their intra-list distance is zero.
pub fn diversity(recommendations: &[Recommendation]) -> DiversityMetrics {
    let genre_sets: Vec<HashSet<&str>> = recommendations
        .iter()
        .map(|item| dataset::models::parse_genre_set(&item.genres))
        .collect();

    let mut unique: HashSet<&str> = HashSet::new();
    for set in &genre_sets {
        unique.extend(set.iter().copied());
    }

    let mut distance_sum = 0.0;
    let mut pairs = 0;
    for i in 0..genre_sets.len() {
        for j in (i + 1)..genre_sets.len() {
            distance_sum += 1.0 - jaccard_index(&genre_sets[i], &genre_sets[j]);
            pairs += 1;
        }
    }

    let intra_list = if pairs > 0 {
        distance_sum / pairs as f64
    } else {
        0.0
    };

    DiversityMetrics {
        intra_list,
        unique_genres: unique.len(),
        genre_coverage: (unique.len() as f64 / GENRE_CEILING as f64).min(1.0),
    }
}

fn jaccard_index(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }

    a.intersection(b).count() as f64 / union as f64
}

/// Share of the catalog that received at least one recommendation.
pub fn catalog_coverage(recommended_items: usize, total_items: usize) -> f64 {
    if total_items == 0 {
        return 0.0;
    }

    recommended_items as f64 / total_items as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use common_macros::hash_set;

    fn recommendation(movie_id: MovieId, genres: &str) -> Recommendation {
        Recommendation {
            movie_id,
            title: format!("Movie {}", movie_id),
            score: 4.0,
            genres: genres.to_string(),
            contributors: Vec::new(),
        }
    }

    #[test]
    fn rating_errors_match_hand_computation() {
        let pairs = vec![(4.0, 3.0), (2.0, 4.0)];
        let metrics = rating_metrics(&pairs);

        assert_eq!(metrics.count, 2);
        assert_approx_eq!(metrics.mae, 1.5);
        assert_approx_eq!(metrics.rmse, 2.5_f64.sqrt());
    }

    #[test]
    fn empty_pairs_yield_zeroes() {
        assert_eq!(rating_metrics(&[]), RatingMetrics::default());
    }

    #[test]
    fn ranking_metrics_match_hand_computation() {
        let recommended = vec![1, 2, 3, 4];
        let relevant = hash_set! { 1, 3, 5 };

        let metrics = ranking_metrics(&recommended, &relevant, 3);

        assert_approx_eq!(metrics.precision, 2.0 / 3.0);
        assert_approx_eq!(metrics.recall, 2.0 / 3.0);
        assert_approx_eq!(metrics.f1, 2.0 / 3.0);

        // Hits at ranks 1 and 3; the ideal list has three hits up front.
        let dcg = 1.0 + 1.0 / 4.0_f64.log2();
        let idcg = 1.0 + 1.0 / 3.0_f64.log2() + 1.0 / 4.0_f64.log2();
        assert_approx_eq!(metrics.ndcg, dcg / idcg);
    }

    #[test]
    fn perfect_ranking_scores_one() {
        let recommended = vec![7, 8];
        let relevant = hash_set! { 7, 8 };

        let metrics = ranking_metrics(&recommended, &relevant, 2);

        assert_approx_eq!(metrics.precision, 1.0);
        assert_approx_eq!(metrics.recall, 1.0);
        assert_approx_eq!(metrics.f1, 1.0);
        assert_approx_eq!(metrics.ndcg, 1.0);
    }

    #[test]
    fn no_relevant_items_yield_zeroes() {
        let metrics = ranking_metrics(&[1, 2], &HashSet::new(), 2);
        assert_eq!(metrics, RankingMetrics::default());
    }

    #[test]
    fn short_lists_cap_the_precision_denominator() {
        let recommended = vec![1];
        let relevant = hash_set! { 1, 2, 3 };

        let metrics = ranking_metrics(&recommended, &relevant, 10);

        assert_approx_eq!(metrics.precision, 1.0);
        assert_approx_eq!(metrics.recall, 1.0 / 3.0);
    }

    #[test]
    fn disjoint_genres_maximize_intra_list_distance() {
        let items = vec![
            recommendation(1, "Action"),
            recommendation(2, "Comedy"),
        ];

        let metrics = diversity(&items);

        assert_approx_eq!(metrics.intra_list, 1.0);
        assert_eq!(metrics.unique_genres, 2);
        assert_approx_eq!(metrics.genre_coverage, 0.1);
    }

    #[test]
    fn identical_genres_have_zero_distance() {
        let items = vec![
            recommendation(1, "Action|Comedy"),
            recommendation(2, "Action|Comedy"),
        ];

        let metrics = diversity(&items);

        assert_approx_eq!(metrics.intra_list, 0.0);
        assert_eq!(metrics.unique_genres, 2);
    }

    #[test]
    fn single_item_lists_have_no_pairs() {
        let metrics = diversity(&[recommendation(1, "Drama")]);

        assert_approx_eq!(metrics.intra_list, 0.0);
        assert_eq!(metrics.unique_genres, 1);
    }

    #[test]
    fn coverage_is_a_simple_share() {
        assert_approx_eq!(catalog_coverage(5, 20), 0.25);
        assert_approx_eq!(catalog_coverage(0, 0), 0.0);
    }
}
