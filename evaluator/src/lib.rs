// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

//! Offline evaluation of the recommendation engine.
//!
//! The evaluator holds out part of each user's ratings, rebuilds the rating
//! matrix from the remainder and scores the engine's predictions and top-N
//! lists against the held-out part. Neighbour lists are computed once per
//! user through [`SimilarityCache`], and users are processed in chunks so
//! long runs report progress as they go.

pub mod cache;
pub mod metrics;
pub mod split;

pub use cache::SimilarityCache;
pub use metrics::{DiversityMetrics, RankingMetrics, RatingMetrics};
pub use split::train_test_split;

use config::EvaluationConfig;
use dataset::{Catalog, MovieId, Rating, Ratings, ToTable, UserId};
use engine::recommendation::sort_and_truncate;
use engine::{popular, predict, MatrixBuilder, RatingMatrix, Recommendation, SearchParams};
use prettytable::{cell, format::consts::FORMAT_NO_LINESEP, row, table, Table};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

const DEFAULT_TOP_N: usize = 10;

/// Outcome of one evaluation run. Ranking metrics are averaged over the
/// users that had at least one relevant held-out item; diversity over the
/// users that received at least one recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub top_n: usize,
    pub train_ratings: usize,
    pub test_ratings: usize,
    pub users_evaluated: usize,
    pub cold_start_users: usize,
    pub rating: RatingMetrics,
    pub ranking: RankingMetrics,
    pub intra_list_diversity: f64,
    pub genre_coverage: f64,
    pub catalog_coverage: f64,
    pub elapsed_secs: f64,
}

impl EvaluationReport {
    pub fn cold_start_rate(&self) -> f64 {
        if self.users_evaluated == 0 {
            0.0
        } else {
            self.cold_start_users as f64 / self.users_evaluated as f64
        }
    }
}

impl ToTable for EvaluationReport {
    fn to_table(&self) -> Table {
        let mut table = table![
            ["train ratings", self.train_ratings],
            ["test ratings", self.test_ratings],
            ["users evaluated", self.users_evaluated]
        ];

        table.add_row(row![
            "cold start users",
            format!(
                "{} ({:.1}%)",
                self.cold_start_users,
                self.cold_start_rate() * 100.0
            )
        ]);
        table.add_row(row!["rated pairs", self.rating.count]);
        table.add_row(row!["mae", format!("{:.4}", self.rating.mae)]);
        table.add_row(row!["rmse", format!("{:.4}", self.rating.rmse)]);
        table.add_row(row![
            format!("precision@{}", self.top_n),
            format!("{:.4}", self.ranking.precision)
        ]);
        table.add_row(row![
            format!("recall@{}", self.top_n),
            format!("{:.4}", self.ranking.recall)
        ]);
        table.add_row(row![
            format!("f1@{}", self.top_n),
            format!("{:.4}", self.ranking.f1)
        ]);
        table.add_row(row![
            format!("ndcg@{}", self.top_n),
            format!("{:.4}", self.ranking.ndcg)
        ]);
        table.add_row(row![
            "intra-list diversity",
            format!("{:.4}", self.intra_list_diversity)
        ]);
        table.add_row(row!["genre coverage", format!("{:.4}", self.genre_coverage)]);
        table.add_row(row![
            "catalog coverage",
            format!("{:.4}", self.catalog_coverage)
        ]);
        table.add_row(row!["elapsed", format!("{:.2}s", self.elapsed_secs)]);

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}

/// Drives one hold-out evaluation over a ratings log and its catalog.
pub struct Evaluator<'a> {
    records: &'a [Rating],
    catalog: &'a Catalog,
    params: SearchParams,
    top_n: usize,
    max_users: Option<usize>,
    max_items: Option<usize>,
}

impl<'a> Evaluator<'a> {
    pub fn new(records: &'a [Rating], catalog: &'a Catalog) -> Self {
        Self {
            records,
            catalog,
            params: SearchParams::default(),
            top_n: DEFAULT_TOP_N,
            max_users: None,
            max_items: None,
        }
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    pub fn max_users(mut self, cap: impl Into<Option<usize>>) -> Self {
        self.max_users = cap.into();
        self
    }

    pub fn max_items(mut self, cap: impl Into<Option<usize>>) -> Self {
        self.max_items = cap.into();
        self
    }

    /// Run the evaluation. Users whose target is missing from the train
    /// matrix, or who end up with no neighbours, count as cold starts and
    /// contribute nothing to the error metrics.
    pub fn evaluate(&self, config: &EvaluationConfig) -> EvaluationReport {
        let started = Instant::now();

        let (train, test) = split::train_test_split(
            self.records,
            config.test_ratio,
            config.min_ratings_per_user,
            config.seed,
        );

        let matrix = MatrixBuilder::new()
            .max_users(self.max_users)
            .max_items(self.max_items)
            .build(&train);

        let mut test_by_user: HashMap<UserId, Vec<&Rating>> = HashMap::new();
        for rating in &test {
            test_by_user
                .entry(rating.user_id)
                .or_insert_with(Vec::new)
                .push(rating);
        }

        let user_ids = self.cohort(&test_by_user, config);
        let total = user_ids.len();

        let mut cache = SimilarityCache::new();
        let mut rating_pairs: Vec<(f64, f64)> = Vec::new();
        let mut per_user_ranking: Vec<RankingMetrics> = Vec::new();
        let mut per_user_diversity: Vec<DiversityMetrics> = Vec::new();
        let mut recommended_items: Ratings = Ratings::new();
        let mut cold_start_users = 0;
        let mut users_evaluated = 0;

        for chunk in user_ids.chunks(config.chunk_size.max(1)) {
            for &user_id in chunk {
                users_evaluated += 1;

                let held_out = match test_by_user.get(&user_id) {
                    Some(ratings) => ratings,
                    None => continue,
                };

                if !matrix.contains_user(user_id) {
                    cold_start_users += 1;
                    continue;
                }

                let neighbours = cache.similar_users(user_id, &matrix, self.params.min_common);
                if neighbours.is_empty() {
                    cold_start_users += 1;
                    continue;
                }

                let candidates: Vec<MovieId> =
                    held_out.iter().map(|rating| rating.movie_id).collect();
                let predictions =
                    predict::predict_candidates(&candidates, &matrix, neighbours, self.params.top_k);

                for rating in held_out {
                    if let Some(predicted) = predictions.get(&rating.movie_id) {
                        rating_pairs.push((rating.score, *predicted));
                    }
                }

                let recommendations = self.top_recommendations(user_id, &matrix, &predictions);
                for item in &recommendations {
                    let best = recommended_items.entry(item.movie_id).or_insert(item.score);
                    if item.score > *best {
                        *best = item.score;
                    }
                }

                let relevant: HashSet<MovieId> = held_out
                    .iter()
                    .filter(|rating| rating.score >= config.rating_threshold)
                    .map(|rating| rating.movie_id)
                    .collect();

                if !relevant.is_empty() {
                    let ids: Vec<MovieId> =
                        recommendations.iter().map(|item| item.movie_id).collect();
                    per_user_ranking.push(metrics::ranking_metrics(&ids, &relevant, self.top_n));
                }

                if !recommendations.is_empty() {
                    per_user_diversity.push(metrics::diversity(&recommendations));
                }
            }

            log::info!("Evaluated {}/{} users", users_evaluated, total);
        }

        let (intra_list_diversity, genre_coverage) = mean_diversity(&per_user_diversity);

        EvaluationReport {
            top_n: self.top_n,
            train_ratings: train.len(),
            test_ratings: test.len(),
            users_evaluated,
            cold_start_users,
            rating: metrics::rating_metrics(&rating_pairs),
            ranking: mean_ranking(&per_user_ranking),
            intra_list_diversity,
            genre_coverage,
            catalog_coverage: metrics::catalog_coverage(
                recommended_items.len(),
                matrix.item_count(),
            ),
            elapsed_secs: started.elapsed().as_secs_f64(),
        }
    }

    /// Test users in ascending order, optionally sampled down to
    /// `config.sample_users` with the run's seed.
    fn cohort(
        &self,
        test_by_user: &HashMap<UserId, Vec<&Rating>>,
        config: &EvaluationConfig,
    ) -> Vec<UserId> {
        let mut user_ids: Vec<UserId> = test_by_user.keys().copied().collect();
        user_ids.sort();

        if let Some(cap) = config.sample_users {
            if user_ids.len() > cap {
                let mut rng = StdRng::seed_from_u64(config.seed);
                user_ids.shuffle(&mut rng);
                user_ids.truncate(cap);
                user_ids.sort();
            }
        }

        user_ids
    }

    /// Top-N list for one user: their predicted held-out candidates first,
    /// topped up from the popularity fallback when predictions run short.
    fn top_recommendations(
        &self,
        user_id: UserId,
        matrix: &RatingMatrix,
        predictions: &Ratings,
    ) -> Vec<Recommendation> {
        let mut items: Vec<Recommendation> = predictions
            .iter()
            .filter_map(|(&movie_id, &score)| {
                self.catalog
                    .get(movie_id)
                    .map(|movie| Recommendation::new(movie, score))
            })
            .collect();

        sort_and_truncate(&mut items, self.top_n);

        if items.len() < self.top_n {
            let fill = popular::recommend(
                matrix,
                self.catalog,
                Some(user_id),
                self.top_n * 2,
                None,
                popular::DEFAULT_MIN_RATINGS,
            );

            for candidate in fill {
                if items.len() >= self.top_n {
                    break;
                }

                if items.iter().any(|item| item.movie_id == candidate.movie_id) {
                    continue;
                }

                items.push(candidate);
            }

            sort_and_truncate(&mut items, self.top_n);
        }

        items
    }
}

fn mean_ranking(per_user: &[RankingMetrics]) -> RankingMetrics {
    if per_user.is_empty() {
        return RankingMetrics::default();
    }

    let n = per_user.len() as f64;
    RankingMetrics {
        precision: per_user.iter().map(|m| m.precision).sum::<f64>() / n,
        recall: per_user.iter().map(|m| m.recall).sum::<f64>() / n,
        f1: per_user.iter().map(|m| m.f1).sum::<f64>() / n,
        ndcg: per_user.iter().map(|m| m.ndcg).sum::<f64>() / n,
    }
}

fn mean_diversity(per_user: &[DiversityMetrics]) -> (f64, f64) {
    if per_user.is_empty() {
        return (0.0, 0.0);
    }

    let n = per_user.len() as f64;
    let intra = per_user.iter().map(|m| m.intra_list).sum::<f64>() / n;
    let coverage = per_user.iter().map(|m| m.genre_coverage).sum::<f64>() / n;
    (intra, coverage)
}
