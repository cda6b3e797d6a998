use crate::error::ErrorKind;
use crate::matrix::RatingMatrix;
use crate::recommendation::{genre_matches, sort_and_truncate, Recommendation, Recommended};
use crate::{cf, content, SearchParams};
use dataset::{Catalog, MovieId, UserId};
use std::collections::HashMap;
use std::str::FromStr;

/// Lifts content scores (cosine in [0, 1]) onto the rating scale before
/// they are combined with predicted ratings.
const RATING_SCALE: f64 = 5.0;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HybridMethod {
    Weighted,
    Mixed,
    Switching,
}

impl Default for HybridMethod {
    fn default() -> Self {
        HybridMethod::Weighted
    }
}

impl FromStr for HybridMethod {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weighted" => Ok(HybridMethod::Weighted),
            "mixed" => Ok(HybridMethod::Mixed),
            "switching" => Ok(HybridMethod::Switching),
            other => Err(ErrorKind::UnknownMethod(other.into())),
        }
    }
}

/// Combine the collaborative and content strategies under the given method.
///
/// Weights only need to be non-negative with a positive sum; they are
/// normalized before use, so (7, 3) behaves exactly like (0.7, 0.3). An
/// unknown target returns empty items with `cold_start: false`, the same
/// signal the collaborative strategy gives.
#[allow(clippy::too_many_arguments)]
pub fn recommend(
    target: UserId,
    matrix: &RatingMatrix,
    catalog: &Catalog,
    top_n: usize,
    cf_weight: f64,
    cb_weight: f64,
    method: HybridMethod,
    params: SearchParams,
    genre_filter: Option<&str>,
) -> Result<Recommended, ErrorKind> {
    let (cf_weight, cb_weight) = normalize_weights(cf_weight, cb_weight)?;

    if !matrix.contains_user(target) {
        return Ok(Recommended::default());
    }

    let result = match method {
        HybridMethod::Switching => switching(target, matrix, catalog, top_n, params, genre_filter),
        HybridMethod::Mixed => mixed(
            target, matrix, catalog, top_n, cf_weight, cb_weight, params, genre_filter,
        ),
        HybridMethod::Weighted => weighted(
            target, matrix, catalog, top_n, cf_weight, cb_weight, params, genre_filter,
        ),
    };

    Ok(result)
}

fn normalize_weights(cf_weight: f64, cb_weight: f64) -> Result<(f64, f64), ErrorKind> {
    let total = cf_weight + cb_weight;
    let valid = cf_weight.is_finite()
        && cb_weight.is_finite()
        && cf_weight >= 0.0
        && cb_weight >= 0.0
        && total > 0.0;

    if valid {
        Ok((cf_weight / total, cb_weight / total))
    } else {
        Err(ErrorKind::InvalidWeights(cf_weight, cb_weight))
    }
}

/// Collaborative results when they carry a personal signal, content results
/// otherwise, popularity only implicitly through the collaborative fallback.
fn switching(
    target: UserId,
    matrix: &RatingMatrix,
    catalog: &Catalog,
    top_n: usize,
    params: SearchParams,
    genre_filter: Option<&str>,
) -> Recommended {
    let cf = cf::recommend(target, matrix, catalog, top_n, params, genre_filter);
    if !cf.cold_start && !cf.items.is_empty() {
        return cf;
    }

    let mut items = content::recommend(
        target,
        matrix,
        catalog,
        top_n,
        content::DEFAULT_MIN_RATING,
        genre_filter,
    );

    for item in &mut items {
        item.score *= RATING_SCALE;
    }

    Recommended {
        items,
        cold_start: true,
    }
}

struct Combined {
    recommendation: Recommendation,
    cf_score: f64,
    cb_score: f64,
}

// Union by movie id; the collaborative record wins the metadata when both
// strategies scored the same movie.
fn combine(
    cf_items: Vec<Recommendation>,
    cb_items: Vec<Recommendation>,
) -> HashMap<MovieId, Combined> {
    let mut union: HashMap<MovieId, Combined> = HashMap::new();

    for item in cf_items {
        union.insert(
            item.movie_id,
            Combined {
                cf_score: item.score,
                cb_score: 0.0,
                recommendation: item,
            },
        );
    }

    for item in cb_items {
        match union.get_mut(&item.movie_id) {
            Some(entry) => entry.cb_score = item.score,
            None => {
                union.insert(
                    item.movie_id,
                    Combined {
                        cf_score: 0.0,
                        cb_score: item.score,
                        recommendation: item,
                    },
                );
            }
        }
    }

    union
}

#[allow(clippy::too_many_arguments)]
fn mixed(
    target: UserId,
    matrix: &RatingMatrix,
    catalog: &Catalog,
    top_n: usize,
    cf_weight: f64,
    cb_weight: f64,
    params: SearchParams,
    genre_filter: Option<&str>,
) -> Recommended {
    let cf = cf::recommend(target, matrix, catalog, top_n, params, genre_filter);
    let cb = content::recommend(
        target,
        matrix,
        catalog,
        top_n,
        content::DEFAULT_MIN_RATING,
        genre_filter,
    );

    let cold_start = cf.cold_start && cb.is_empty();

    let mut items = Vec::new();
    for (_, entry) in combine(cf.items, cb) {
        let score = entry.cf_score * cf_weight + entry.cb_score * RATING_SCALE * cb_weight;
        if score > 0.0 {
            let mut item = entry.recommendation;
            item.score = score;
            items.push(item);
        }
    }

    sort_and_truncate(&mut items, top_n);

    Recommended { items, cold_start }
}

#[allow(clippy::too_many_arguments)]
fn weighted(
    target: UserId,
    matrix: &RatingMatrix,
    catalog: &Catalog,
    top_n: usize,
    cf_weight: f64,
    cb_weight: f64,
    params: SearchParams,
    genre_filter: Option<&str>,
) -> Recommended {
    // Both strategies run unfiltered on a wider pool; the filter applies
    // once to the combined candidates, so neither side starves the union.
    let cf = cf::recommend(target, matrix, catalog, top_n * 2, params, None);
    let cb = content::recommend(
        target,
        matrix,
        catalog,
        top_n * 2,
        content::DEFAULT_MIN_RATING,
        None,
    );

    let mut cold_start = cf.cold_start && cb.is_empty();

    let mut items = Vec::new();
    for (_, entry) in combine(cf.items, cb) {
        if entry.cf_score <= 0.0 && entry.cb_score <= 0.0 {
            continue;
        }

        if !genre_matches(&entry.recommendation.genres, genre_filter) {
            continue;
        }

        let mut item = entry.recommendation;
        item.score = entry.cf_score * cf_weight + entry.cb_score * RATING_SCALE * cb_weight;
        items.push(item);
    }

    sort_and_truncate(&mut items, top_n);
    if items.is_empty() {
        cold_start = true;
    }

    Recommended { items, cold_start }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use common_macros::hash_map;
    use dataset::{Movie, MovieId};

    fn params() -> SearchParams {
        SearchParams {
            min_common: 2,
            top_k: 50,
        }
    }

    fn catalog() -> Catalog {
        let movie = |id: MovieId, title: &str, genres: &str| Movie {
            id,
            title: title.into(),
            genres: genres.into(),
        };

        Catalog::from_movies(vec![
            movie(10, "Item A (1999)", "Action"),
            movie(20, "Item B (2000)", "Comedy"),
            movie(30, "Item C (2001)", "Action|Sci-Fi"),
            movie(40, "Item D (2002)", "Action"),
        ])
    }

    // User 1 likes action and agrees with user 2, who also rated items 30
    // and 40.
    fn matrix() -> RatingMatrix {
        RatingMatrix::from_users(hash_map! {
            1 => hash_map! { 10 => 5.0, 20 => 3.0 },
            2 => hash_map! { 10 => 5.0, 20 => 3.0, 30 => 4.0, 40 => 2.0 },
        })
    }

    #[test]
    fn unknown_method_name_is_rejected() {
        let err = "smart".parse::<HybridMethod>().unwrap_err();
        assert_eq!(err, ErrorKind::UnknownMethod("smart".into()));

        assert_eq!("weighted".parse(), Ok(HybridMethod::Weighted));
        assert_eq!("mixed".parse(), Ok(HybridMethod::Mixed));
        assert_eq!("switching".parse(), Ok(HybridMethod::Switching));
    }

    #[test]
    fn invalid_weights_are_rejected_before_any_work() {
        let matrix = matrix();
        let catalog = catalog();

        for (cf_w, cb_w) in &[(-1.0, 0.5), (0.0, 0.0), (f64::NAN, 0.3)] {
            let result = recommend(
                1,
                &matrix,
                &catalog,
                10,
                *cf_w,
                *cb_w,
                HybridMethod::Weighted,
                params(),
                None,
            );

            assert!(matches!(result, Err(ErrorKind::InvalidWeights(..))));
        }
    }

    #[test]
    fn weights_are_scale_invariant() {
        let matrix = matrix();
        let catalog = catalog();

        let small = recommend(
            1, &matrix, &catalog, 10, 0.7, 0.3,
            HybridMethod::Weighted, params(), None,
        )
        .unwrap();
        let large = recommend(
            1, &matrix, &catalog, 10, 7.0, 3.0,
            HybridMethod::Weighted, params(), None,
        )
        .unwrap();

        assert_eq!(small.cold_start, large.cold_start);
        assert_eq!(small.items.len(), large.items.len());
        for (a, b) in small.items.iter().zip(large.items.iter()) {
            assert_eq!(a.movie_id, b.movie_id);
            assert_approx_eq!(a.score, b.score);
        }
    }

    #[test]
    fn pure_cf_weights_match_collaborative_ranking() {
        let matrix = matrix();
        let catalog = catalog();

        let hybrid = recommend(
            1, &matrix, &catalog, 10, 1.0, 0.0,
            HybridMethod::Weighted, params(), None,
        )
        .unwrap();
        let cf = cf::recommend(1, &matrix, &catalog, 20, params(), None);

        let hybrid_ids: Vec<_> = hybrid.items.iter().map(|item| item.movie_id).collect();
        let cf_ids: Vec<_> = cf.items.iter().map(|item| item.movie_id).collect();
        assert_eq!(hybrid_ids, cf_ids);

        for (combined, original) in hybrid.items.iter().zip(cf.items.iter()) {
            assert_approx_eq!(combined.score, original.score);
        }
    }

    #[test]
    fn weighted_blends_both_scores() {
        let matrix = matrix();
        let catalog = catalog();

        let result = recommend(
            1, &matrix, &catalog, 10, 0.5, 0.5,
            HybridMethod::Weighted, params(), None,
        )
        .unwrap();

        assert!(!result.cold_start);

        // CF predicts 30 => 4.0 and 40 => 2.0; the action profile scores
        // 40 => 1.0 and 30 => 1/sqrt(2).
        let by_id: HashMap<_, _> = result
            .items
            .iter()
            .map(|item| (item.movie_id, item.score))
            .collect();

        assert_approx_eq!(by_id[&30], 0.5 * 4.0 + 0.5 * 5.0 / 2.0_f64.sqrt());
        assert_approx_eq!(by_id[&40], 0.5 * 2.0 + 0.5 * 5.0);
    }

    #[test]
    fn weighted_keeps_cf_metadata_for_shared_movies() {
        let result = recommend(
            1, &matrix(), &catalog(), 10, 0.5, 0.5,
            HybridMethod::Weighted, params(), None,
        )
        .unwrap();

        let item = result
            .items
            .iter()
            .find(|item| item.movie_id == 30)
            .unwrap();

        // Contributor lists only exist on the collaborative side.
        assert_eq!(item.contributors, vec![2]);
    }

    #[test]
    fn weighted_filters_on_the_combined_union() {
        let result = recommend(
            1, &matrix(), &catalog(), 10, 0.5, 0.5,
            HybridMethod::Weighted, params(), Some("sci"),
        )
        .unwrap();

        let ids: Vec<_> = result.items.iter().map(|item| item.movie_id).collect();
        assert_eq!(ids, vec![30]);
    }

    #[test]
    fn mixed_combines_filtered_lists() {
        let result = recommend(
            1, &matrix(), &catalog(), 10, 0.5, 0.5,
            HybridMethod::Mixed, params(), Some("action"),
        )
        .unwrap();

        assert!(!result.cold_start);

        // 30 combines 0.5 * 4.0 with 0.5 * 5 / sqrt(2), edging out 40 at
        // 0.5 * 2.0 + 0.5 * 5.0.
        let ids: Vec<_> = result.items.iter().map(|item| item.movie_id).collect();
        assert_eq!(ids, vec![30, 40]);
    }

    #[test]
    fn switching_prefers_collaborative_results() {
        let result = recommend(
            1, &matrix(), &catalog(), 10, 0.5, 0.5,
            HybridMethod::Switching, params(), None,
        )
        .unwrap();

        assert!(!result.cold_start);
        let ids: Vec<_> = result.items.iter().map(|item| item.movie_id).collect();
        assert_eq!(ids, vec![30, 40]);
        assert_approx_eq!(result.items[0].score, 4.0);
    }

    #[test]
    fn switching_falls_through_to_scaled_content() {
        // User 5 shares a single item with everyone, so no pair reaches
        // min_common and the fallback threshold is out of reach too.
        let matrix = RatingMatrix::from_users(hash_map! {
            1 => hash_map! { 10 => 5.0, 20 => 3.0 },
            2 => hash_map! { 10 => 5.0, 20 => 3.0, 30 => 4.0 },
            5 => hash_map! { 10 => 5.0 },
        });

        let result = recommend(
            5, &matrix, &catalog(), 10, 0.5, 0.5,
            HybridMethod::Switching, params(), None,
        )
        .unwrap();

        assert!(result.cold_start);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].movie_id, 30);

        // Content cosine lifted onto the rating scale.
        assert_approx_eq!(result.items[0].score, 5.0 / 2.0_f64.sqrt());
        assert!(result.items[0].contributors.is_empty());
    }

    #[test]
    fn unknown_user_reports_no_cold_start() {
        let result = recommend(
            99, &matrix(), &catalog(), 10, 0.5, 0.5,
            HybridMethod::Weighted, params(), None,
        )
        .unwrap();

        assert!(result.items.is_empty());
        assert!(!result.cold_start);
    }
}
