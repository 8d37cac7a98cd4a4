mod common;

use carescore::clustering::{
    kmeans, mean_silhouette, run_clustering, standardized_features, ward_cluster, Algorithm,
    ClusterLabel,
};
use carescore::config::{ClusterConfig, KChoice};
use carescore::core::Error;
use common::{same_partition, tier_of, tiered_scores};

fn cluster_config(k: usize) -> ClusterConfig {
    ClusterConfig {
        k: KChoice::Fixed(k),
        restarts: 80,
        ..ClusterConfig::default()
    }
}

#[test]
fn test_both_algorithms_recover_planted_tiers() {
    let (scores, quality) = tiered_scores(3, 6);
    let report = run_clustering(&scores, &quality, &cluster_config(3)).unwrap();

    assert_eq!(report.k, 3);
    let expected: Vec<usize> = (0..18).map(|i| tier_of(i, 6)).collect();
    assert!(same_partition(&report.kmeans.assignments, &expected));
    assert!(same_partition(&report.ward.assignments, &expected));
    assert!(same_partition(
        &report.kmeans.assignments,
        &report.ward.assignments
    ));
}

#[test]
fn test_cluster_ids_are_one_based_and_dense() {
    let (scores, quality) = tiered_scores(3, 6);
    let report = run_clustering(&scores, &quality, &cluster_config(3)).unwrap();

    for run in [&report.kmeans, &report.ward] {
        let mut seen: Vec<usize> = run.assignments.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec![1, 2, 3]);
        // First hospital always opens cluster 1
        assert_eq!(run.assignments[0], 1);
    }
}

#[test]
fn test_same_config_reproduces_the_exact_report() {
    let (scores, quality) = tiered_scores(4, 4);
    let config = cluster_config(4);

    let first = run_clustering(&scores, &quality, &config).unwrap();
    let second = run_clustering(&scores, &quality, &config).unwrap();

    assert_eq!(first.kmeans.assignments, second.kmeans.assignments);
    assert_eq!(first.ward.assignments, second.ward.assignments);
    assert_eq!(first.kmeans.mean_silhouette, second.kmeans.mean_silhouette);
    assert_eq!(first.recommended_k, second.recommended_k);
}

#[test]
fn test_member_counts_are_conserved_across_seeds() {
    let (scores, quality) = tiered_scores(3, 5);
    for seed in [1, 7, 42, 9999] {
        let config = ClusterConfig {
            k: KChoice::Fixed(3),
            seed,
            ..ClusterConfig::default()
        };
        let report = run_clustering(&scores, &quality, &config).unwrap();
        for run in [&report.kmeans, &report.ward] {
            let total: usize = run.summaries.iter().map(|s| s.n_hospitals).sum();
            assert_eq!(total, 15, "seed {seed} lost or duplicated members");
        }
    }
}

#[test]
fn test_silhouette_stays_in_unit_interval_across_k() {
    let (scores, quality) = tiered_scores(4, 5);
    let matrix = standardized_features(&scores, &quality);

    for k in 2..=6 {
        let fit = kmeans(&matrix, k, 25, 100, 42).unwrap();
        let labels: Vec<usize> = fit.labels.iter().map(|&l| l + 1).collect();
        if let Some(s) = mean_silhouette(&matrix, &labels) {
            assert!((-1.0..=1.0).contains(&s), "silhouette {s} out of range at k = {k}");
        }
    }
}

#[test]
fn test_auto_k_recommends_the_planted_structure() {
    let (scores, quality) = tiered_scores(3, 6);
    let config = ClusterConfig {
        k: KChoice::Auto,
        max_k: 6,
        restarts: 80,
        ..ClusterConfig::default()
    };

    let report = run_clustering(&scores, &quality, &config).unwrap();

    assert_eq!(report.recommended_k, Some(3));
    assert_eq!(report.k, 3);
    // The sweep covers every candidate it reported
    assert!(report.sweep.iter().any(|c| c.k == 2));
    assert!(report.sweep.iter().any(|c| c.k == 6));
    for candidate in &report.sweep {
        assert!(candidate.wss >= 0.0);
    }
}

#[test]
fn test_fixed_k_still_surfaces_the_recommendation() {
    let (scores, quality) = tiered_scores(3, 6);
    let config = ClusterConfig {
        k: KChoice::Fixed(2),
        max_k: 6,
        restarts: 80,
        ..ClusterConfig::default()
    };

    let report = run_clustering(&scores, &quality, &config).unwrap();
    assert_eq!(report.k, 2);
    assert_eq!(report.recommended_k, Some(3));
}

#[test]
fn test_more_clusters_than_hospitals_is_insufficient_data() {
    let (scores, quality) = tiered_scores(2, 2);
    let err = run_clustering(&scores, &quality, &cluster_config(5)).unwrap_err();
    match err {
        Error::InsufficientData {
            stage,
            needed,
            actual,
        } => {
            assert_eq!(stage, "clustering");
            assert_eq!(needed, 5);
            assert_eq!(actual, 4);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

#[test]
fn test_ward_alone_recovers_tiers_without_randomness() {
    let (scores, quality) = tiered_scores(4, 4);
    let matrix = standardized_features(&scores, &quality);

    let labels = ward_cluster(&matrix, 4).unwrap();
    let expected: Vec<usize> = (0..16).map(|i| tier_of(i, 4)).collect();
    assert!(same_partition(&labels, &expected));
}

#[test]
fn test_summaries_are_labeled_by_quality_quartile() {
    let (scores, quality) = tiered_scores(4, 5);
    let report = run_clustering(&scores, &quality, &cluster_config(4)).unwrap();

    for run in [&report.kmeans, &report.ward] {
        let best = run
            .summaries
            .iter()
            .max_by(|a, b| a.avg_quality_score.total_cmp(&b.avg_quality_score))
            .unwrap();
        let worst = run
            .summaries
            .iter()
            .min_by(|a, b| a.avg_quality_score.total_cmp(&b.avg_quality_score))
            .unwrap();
        assert_eq!(best.cluster_label, ClusterLabel::HighPerformers);
        assert_eq!(worst.cluster_label, ClusterLabel::NeedsImprovement);
    }
}

#[test]
fn test_identical_silhouettes_declare_no_winner() {
    // Eight coincident points: every partition scores silhouette 0, so
    // neither algorithm separates the cohort better than the other.
    let scores = vec![
        carescore::core::NormalizedScores {
            mortality: 50.0,
            readmission: 50.0,
            infection: 50.0,
            patient_experience: 50.0,
        };
        8
    ];
    let quality = vec![50.0; 8];

    let report = run_clustering(&scores, &quality, &cluster_config(2)).unwrap();
    assert_eq!(report.kmeans.mean_silhouette, Some(0.0));
    assert_eq!(report.ward.mean_silhouette, Some(0.0));
    assert_eq!(report.better_separation, None);
}

#[test]
fn test_separated_tiers_produce_a_decisive_or_tied_verdict() {
    let (scores, quality) = tiered_scores(3, 6);
    let report = run_clustering(&scores, &quality, &cluster_config(3)).unwrap();

    // Both algorithms recover the same partition here, so the verdict
    // must be a tie; a winner would mean the partitions diverged.
    if same_partition(&report.kmeans.assignments, &report.ward.assignments) {
        assert_eq!(report.better_separation, None);
    } else {
        assert!(matches!(
            report.better_separation,
            Some(Algorithm::KMeans) | Some(Algorithm::Ward)
        ));
    }
}
