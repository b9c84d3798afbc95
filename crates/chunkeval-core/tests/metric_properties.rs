//! Property-based checks for per-query scoring and aggregation.
//!
//! Rankings and ground truths are drawn from a small id alphabet so that
//! hits, misses, duplicates and substring overlaps all occur often.

use chunkeval_core::{
    calculate_mean_metrics, GroundTruth, MatchPolicy, MetricCalculator, MetricResult,
    DEFAULT_NOISE_PENALTY,
};
use proptest::{
    collection::vec,
    option,
    prelude::{prop_assert, prop_assert_eq, Strategy},
    proptest,
    test_runner::Config as ProptestConfig,
};

const METRIC_PROP_CASES: u32 = 256;
const EPS: f64 = 1e-9;

type Judged = (String, f64, f64);

fn ranking_strategy() -> impl Strategy<Value = Vec<String>> {
    vec("[a-f]{1,2}", 0..12)
}

fn judged_strategy() -> impl Strategy<Value = Vec<Judged>> {
    vec(("[a-f]{1,2}", 0.0_f64..5.0, 0.0_f64..3.0), 0..8)
}

fn ground_truth(judged: &[Judged]) -> GroundTruth {
    let ids: Vec<&str> = judged.iter().map(|(id, _, _)| id.as_str()).collect();
    let rels: Vec<f64> = judged.iter().map(|(_, rel, _)| *rel).collect();
    let noises: Vec<f64> = judged.iter().map(|(_, _, noise)| *noise).collect();
    GroundTruth::from_parallel(
        ids.as_slice(),
        Some(rels.as_slice()),
        Some(noises.as_slice()),
    )
    .expect("aligned by construction")
}

fn in_unit_range(result: &MetricResult) -> bool {
    [result.precision, result.recall, result.ap, result.ndcg]
        .iter()
        .all(|v| (0.0..=1.0).contains(v))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: METRIC_PROP_CASES,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_exact_metrics_are_bounded(
        retrieved in ranking_strategy(),
        judged in judged_strategy(),
        k in option::of(0_usize..15),
    ) {
        let gt = ground_truth(&judged);
        let result = MetricCalculator::new().evaluate(retrieved.as_slice(), &gt, k);

        prop_assert!(in_unit_range(&result), "{result:?}");
        prop_assert!(result.noise.is_some_and(|n| n >= 0.0));
        prop_assert!(result.ap <= result.recall + EPS);
    }

    #[test]
    fn prop_containment_metrics_are_bounded(
        retrieved in vec("[a-f]{1,4}", 0..12),
        judged in judged_strategy(),
        k in option::of(0_usize..15),
    ) {
        let gt = ground_truth(&judged);
        let result = MetricCalculator::new()
            .with_predicate(MatchPolicy::Containment)
            .evaluate(retrieved.as_slice(), &gt, k);

        prop_assert!(in_unit_range(&result), "{result:?}");
        prop_assert!(result.ap <= result.recall + EPS);
    }

    #[test]
    fn prop_disjoint_ranking_scores_zero_with_full_penalty(
        retrieved in vec("[g-k]{1,2}", 1..12),
        judged in vec(("[a-f]{1,2}", 0.0_f64..5.0, 0.0_f64..3.0), 1..8),
    ) {
        let gt = ground_truth(&judged);
        let result = MetricCalculator::new().evaluate(retrieved.as_slice(), &gt, None);

        prop_assert_eq!(result.precision, 0.0);
        prop_assert_eq!(result.recall, 0.0);
        prop_assert_eq!(result.ap, 0.0);
        prop_assert_eq!(result.ndcg, 0.0);
        let noise = result.noise.unwrap_or_default();
        prop_assert!((noise - DEFAULT_NOISE_PENALTY).abs() < EPS, "noise {noise}");
    }

    #[test]
    fn prop_ideal_ranking_has_unit_ndcg(
        judged in vec(("[a-f]{1,2}", 0.1_f64..5.0, 0.0_f64..3.0), 1..8),
    ) {
        let gt = ground_truth(&judged);
        let mut ideal: Vec<(&str, f64)> = gt.iter().map(|(id, j)| (id, j.relevance)).collect();
        ideal.sort_by(|a, b| b.1.total_cmp(&a.1));
        let retrieved: Vec<&str> = ideal.iter().map(|(id, _)| *id).collect();

        let result = MetricCalculator::new().evaluate(retrieved.as_slice(), &gt, None);

        prop_assert!((result.ndcg - 1.0).abs() < EPS, "ndcg {}", result.ndcg);
        prop_assert!((result.recall - 1.0).abs() < EPS);
        prop_assert!((result.ap - 1.0).abs() < EPS);
    }

    #[test]
    fn prop_mean_lies_between_extremes(
        rankings in vec((ranking_strategy(), judged_strategy()), 1..10),
    ) {
        let calc = MetricCalculator::new();
        let results: Vec<MetricResult> = rankings
            .iter()
            .map(|(retrieved, judged)| {
                calc.evaluate(retrieved.as_slice(), &ground_truth(judged), None)
            })
            .collect();

        let summary = calculate_mean_metrics(&results).expect("uniformly noisy");
        let precisions = results.iter().map(|r| r.precision);
        let lo = precisions.clone().fold(f64::INFINITY, f64::min);
        let hi = precisions.fold(f64::NEG_INFINITY, f64::max);

        prop_assert_eq!(summary.queries, results.len());
        prop_assert!(summary.precision >= lo - EPS && summary.precision <= hi + EPS);
        prop_assert!(summary.noise.is_some());
    }
}
