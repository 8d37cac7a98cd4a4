//! Property-based tests for the scoring stage
//!
//! These tests verify invariants that should hold for all inputs:
//! - Normalized scores stay on the 0-100 scale
//! - Constant metrics fall back to the midpoint
//! - The composite score is a convex combination of its components
//! - Star ratings and categories never decrease as quality rises
//! - Tied scores share a rank and the best score sits at the 100th percentile

use carescore::config::ScoreWeights;
use carescore::core::{Error, Metric, NormalizedScores, PerformanceCategory};
use carescore::scoring::{
    classify, effective_weights, gather_scores, min_ranks, normalize_series, percentiles,
    quality_score, star_rating,
};
use proptest::prelude::*;

/// Raw metric values in a plausible clinical range
fn metric_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..200.0, 2..40)
}

/// Already-normalized component scores
fn component_scores() -> impl Strategy<Value = NormalizedScores> {
    (
        0.0f64..=100.0,
        0.0f64..=100.0,
        0.0f64..=100.0,
        0.0f64..=100.0,
    )
        .prop_map(|(m, r, i, p)| NormalizedScores {
            mortality: m,
            readmission: r,
            infection: i,
            patient_experience: p,
        })
}

fn with_component(mut scores: NormalizedScores, metric: Metric, value: f64) -> NormalizedScores {
    match metric {
        Metric::Mortality => scores.mortality = value,
        Metric::Readmission => scores.readmission = value,
        Metric::Infection => scores.infection = value,
        Metric::PatientExperience => scores.patient_experience = value,
    }
    scores
}

proptest! {
    /// Property: every normalized score lands on the 0-100 scale,
    /// whichever direction the metric points
    #[test]
    fn prop_normalized_scores_stay_in_bounds(values in metric_values()) {
        let wrapped: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        for metric in Metric::ALL {
            for score in normalize_series(metric, &wrapped).into_iter().flatten() {
                prop_assert!((0.0..=100.0).contains(&score), "{metric}: {score} out of bounds");
            }
        }
    }

    /// Property: a metric with no variance maps every hospital to the
    /// 50-point midpoint
    #[test]
    fn prop_constant_series_maps_to_midpoint(value in 0.0f64..200.0, len in 2usize..30) {
        let series = vec![Some(value); len];
        for metric in Metric::ALL {
            for score in normalize_series(metric, &series) {
                prop_assert_eq!(score, Some(50.0));
            }
        }
    }

    /// Property: on a two-point series the worse raw value always scores 0
    /// and the better one 100, so inverted metrics reverse the raw order
    #[test]
    fn prop_two_point_series_spans_the_scale(lo in 0.0f64..100.0, delta in 0.001f64..100.0) {
        let series = vec![Some(lo), Some(lo + delta)];
        for metric in Metric::ALL {
            let scored = normalize_series(metric, &series);
            if metric.lower_is_better() {
                prop_assert_eq!(&scored, &vec![Some(100.0), Some(0.0)]);
            } else {
                prop_assert_eq!(&scored, &vec![Some(0.0), Some(100.0)]);
            }
        }
    }

    /// Property: the composite never leaves the range spanned by its
    /// components
    #[test]
    fn prop_quality_score_is_a_convex_combination(scores in component_scores()) {
        let weights = ScoreWeights::default();
        let quality = quality_score(&scores, &weights);

        let components = [
            scores.mortality,
            scores.readmission,
            scores.infection,
            scores.patient_experience,
        ];
        let lo = components.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = components.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(quality >= lo - 1e-9 && quality <= hi + 1e-9);
    }

    /// Property: improving any single component never lowers the composite
    #[test]
    fn prop_quality_score_is_monotone_per_component(
        scores in component_scores(),
        bump in 0.0f64..50.0
    ) {
        let weights = ScoreWeights::default();
        let base = quality_score(&scores, &weights);
        for metric in Metric::ALL {
            let raised = (scores.get(metric) + bump).min(100.0);
            let improved = quality_score(&with_component(scores, metric, raised), &weights);
            prop_assert!(improved >= base - 1e-9);
        }
    }

    /// Property: rescaled weights keep their proportions and land within
    /// tolerance of summing to one
    #[test]
    fn prop_effective_weights_preserve_proportions(
        m in 0.01f64..10.0,
        r in 0.01f64..10.0,
        i in 0.01f64..10.0,
        p in 0.01f64..10.0
    ) {
        let raw = ScoreWeights {
            mortality: m,
            readmission: r,
            infection: i,
            patient_experience: p,
        };
        let eff = effective_weights(&raw).unwrap();
        prop_assert!((eff.sum() - 1.0).abs() <= 0.01 + 1e-12);
        // Cross-multiplied to avoid dividing; relative scale stays modest
        prop_assert!((eff.mortality * raw.readmission - raw.mortality * eff.readmission).abs() < 1e-6);
        prop_assert!((eff.infection * raw.patient_experience - raw.infection * eff.patient_experience).abs() < 1e-6);
    }

    /// Property: star ratings never decrease as the quality score rises
    #[test]
    fn prop_star_ratings_never_decrease(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(star_rating(lo) <= star_rating(hi));
    }

    /// Property: the star rating and the category name always describe the
    /// same band
    #[test]
    fn prop_stars_and_categories_agree(quality in 0.0f64..=100.0) {
        let (stars, category) = classify(quality);
        let expected = match stars {
            1 => PerformanceCategory::Poor,
            2 => PerformanceCategory::BelowAverage,
            3 => PerformanceCategory::Average,
            4 => PerformanceCategory::AboveAverage,
            5 => PerformanceCategory::Excellent,
            other => panic!("impossible star rating {other}"),
        };
        prop_assert_eq!(category, expected);
    }

    /// Property: ranks start at 1, tied scores share a rank, and a strictly
    /// better score always ranks strictly higher
    #[test]
    fn prop_min_ranks_respect_ties_and_order(
        scores in prop::collection::vec(0.0f64..=100.0, 2..40)
    ) {
        let ranks = min_ranks(&scores);
        prop_assert_eq!(ranks.len(), scores.len());
        prop_assert!(ranks.contains(&1));
        for (i, &ri) in ranks.iter().enumerate() {
            prop_assert!(ri >= 1 && ri <= scores.len());
            for (j, &rj) in ranks.iter().enumerate() {
                if scores[i] == scores[j] {
                    prop_assert_eq!(ri, rj);
                } else if scores[i] > scores[j] {
                    prop_assert!(ri < rj, "score {} ranked {} vs score {} ranked {}", scores[i], ri, scores[j], rj);
                }
            }
        }
    }

    /// Property: the best score always sits at the 100th percentile and no
    /// percentile leaves (0, 100]
    #[test]
    fn prop_best_score_is_the_top_percentile(
        scores in prop::collection::vec(0.0f64..=100.0, 1..40)
    ) {
        let pcts = percentiles(&scores);
        let best = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        prop_assert_eq!(pcts[best], 100.0);
        for &pct in &pcts {
            prop_assert!(pct > 0.0 && pct <= 100.0);
        }
    }

    /// Property: a missing component is reported against the column it
    /// came from
    #[test]
    fn prop_missing_component_names_its_column(
        scores in component_scores(),
        missing_idx in 0usize..4
    ) {
        let missing = Metric::ALL[missing_idx];
        let result = gather_scores("H001", |metric| {
            if metric == missing {
                None
            } else {
                Some(scores.get(metric))
            }
        });
        match result {
            Err(Error::MissingField { hospital_id, field }) => {
                prop_assert_eq!(hospital_id, "H001");
                prop_assert_eq!(field, missing.column());
            }
            other => prop_assert!(false, "expected MissingField, got {other:?}"),
        }
    }
}
