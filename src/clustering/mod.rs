//! Cluster engine: groups hospitals by their standardized score profiles.
//!
//! Two interchangeable algorithms run over the same feature matrix, a
//! centroid partitioner and Ward-linkage agglomeration, and their mean
//! silhouette scores decide which separated the cohort better.

pub mod characterize;
pub mod hierarchical;
pub mod kmeans;
pub mod silhouette;

pub use characterize::{characterize, ClusterLabel, ClusterSummary};
pub use hierarchical::{ward_cluster, ward_tree, MergeStep, MergeTree};
pub use kmeans::{kmeans, kmeans_with_rng, KMeansFit};
pub use silhouette::mean_silhouette;

use std::collections::HashMap;
use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{ClusterConfig, KChoice};
use crate::core::{stats, Error, NormalizedScores, Result};

/// Feature dimensions per hospital: four normalized scores plus the
/// composite quality score.
pub const FEATURE_DIMS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    KMeans,
    Ward,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::KMeans => write!(f, "k-means"),
            Algorithm::Ward => write!(f, "ward"),
        }
    }
}

/// One algorithm's partition of the cohort, with its validation score
/// and per-cluster summary table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmRun {
    pub algorithm: Algorithm,
    /// 1-based cluster id per hospital, parallel to the cohort.
    /// Ids are algorithm-local and not comparable across algorithms.
    pub assignments: Vec<usize>,
    pub mean_silhouette: Option<f64>,
    pub summaries: Vec<ClusterSummary>,
}

/// One k evaluated during the selection sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KCandidate {
    pub k: usize,
    /// Total within-cluster sum of squares, for the elbow heuristic.
    /// Informational only; no automated cutoff reads it.
    pub wss: f64,
    pub mean_silhouette: Option<f64>,
}

/// Everything the cluster engine produced in one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringReport {
    /// Cluster count the partitions below actually used
    pub k: usize,
    /// k that maximized mean silhouette over the sweep. Surfaced even
    /// when an explicit k overrode it.
    pub recommended_k: Option<usize>,
    pub sweep: Vec<KCandidate>,
    pub kmeans: AlgorithmRun,
    pub ward: AlgorithmRun,
    /// Algorithm with the strictly higher mean silhouette; `None` when
    /// tied or undefined.
    pub better_separation: Option<Algorithm>,
}

/// Run the full cluster engine over a scored cohort.
///
/// Builds the standardized feature matrix, sweeps k for the silhouette
/// recommendation, resolves the operational k, runs both algorithms at
/// that k, and characterizes every cluster. A cohort smaller than the
/// requested k is an [`Error::InsufficientData`]; callers decide whether
/// that aborts the run or just this stage.
pub fn run_clustering(
    scores: &[NormalizedScores],
    quality: &[f64],
    config: &ClusterConfig,
) -> Result<ClusteringReport> {
    let n = scores.len();
    let matrix = standardized_features(scores, quality);

    let sweep = sweep_k(&matrix, config);
    let recommended_k = best_by_silhouette(&sweep);

    let k = match config.k {
        KChoice::Fixed(k) => k,
        KChoice::Auto => recommended_k
            .ok_or_else(|| Error::insufficient("k-selection", 2, n))?,
    };
    if n < k {
        return Err(Error::insufficient("clustering", k, n));
    }
    info!(
        "clustering {n} hospitals into k={k} (recommended k: {})",
        recommended_k.map_or_else(|| "none".to_string(), |k| k.to_string())
    );

    let fit = kmeans(&matrix, k, config.restarts, config.max_iterations, config.seed)?;
    let kmeans_run = algorithm_run(
        Algorithm::KMeans,
        relabel_by_first_appearance(&fit.labels),
        &matrix,
        scores,
        quality,
    );
    let ward_run = algorithm_run(
        Algorithm::Ward,
        ward_cluster(&matrix, k)?,
        &matrix,
        scores,
        quality,
    );

    let better_separation = match (kmeans_run.mean_silhouette, ward_run.mean_silhouette) {
        (Some(a), Some(b)) if a > b => Some(Algorithm::KMeans),
        (Some(a), Some(b)) if b > a => Some(Algorithm::Ward),
        _ => None,
    };
    match better_separation {
        Some(algorithm) => info!("better separation: {algorithm}"),
        None => info!("both algorithms separated the cohort equally well"),
    }

    Ok(ClusteringReport {
        k,
        recommended_k,
        sweep,
        kmeans: kmeans_run,
        ward: ward_run,
        better_separation,
    })
}

fn algorithm_run(
    algorithm: Algorithm,
    assignments: Vec<usize>,
    matrix: &[Vec<f64>],
    scores: &[NormalizedScores],
    quality: &[f64],
) -> AlgorithmRun {
    let mean_silhouette = mean_silhouette(matrix, &assignments);
    let summaries = characterize(scores, quality, &assignments);
    AlgorithmRun {
        algorithm,
        assignments,
        mean_silhouette,
        summaries,
    }
}

/// Evaluate k = 2..=max_k with the centroid algorithm, recording WSS and
/// mean silhouette for each. Values of k the cohort cannot support are
/// skipped rather than treated as errors.
fn sweep_k(matrix: &[Vec<f64>], config: &ClusterConfig) -> Vec<KCandidate> {
    let n = matrix.len();
    let mut sweep = Vec::new();
    for k in 2..=config.max_k.min(n) {
        match kmeans(matrix, k, config.restarts, config.max_iterations, config.seed) {
            Ok(fit) => {
                let silhouette = mean_silhouette(matrix, &fit.labels);
                debug!(
                    "k={k}: wss={:.4}, mean silhouette={}",
                    fit.wss,
                    silhouette.map_or_else(|| "undefined".to_string(), |s| format!("{s:.4}"))
                );
                sweep.push(KCandidate {
                    k,
                    wss: fit.wss,
                    mean_silhouette: silhouette,
                });
            }
            Err(err) => warn!("k={k} skipped during sweep: {err}"),
        }
    }
    sweep
}

/// k with the highest mean silhouette; the smallest such k on a tie.
fn best_by_silhouette(sweep: &[KCandidate]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for candidate in sweep {
        let Some(score) = candidate.mean_silhouette else {
            continue;
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((candidate.k, score)),
        }
    }
    best.map(|(k, _)| k)
}

/// Standardized feature matrix: one row per hospital, [`FEATURE_DIMS`]
/// columns, each column rescaled to zero mean and unit variance so no
/// single score dominates the distance metric. A zero-variance column
/// standardizes to all zeros.
pub fn standardized_features(scores: &[NormalizedScores], quality: &[f64]) -> Vec<Vec<f64>> {
    debug_assert_eq!(scores.len(), quality.len());
    let mut matrix: Vec<Vec<f64>> = scores
        .iter()
        .zip(quality)
        .map(|(s, &q)| {
            vec![s.mortality, s.readmission, s.infection, s.patient_experience, q]
        })
        .collect();
    standardize_columns(&mut matrix);
    matrix
}

fn standardize_columns(matrix: &mut [Vec<f64>]) {
    let dims = matrix.first().map_or(0, Vec::len);
    for dim in 0..dims {
        let column: Vec<f64> = matrix.iter().map(|row| row[dim]).collect();
        let Some(mu) = stats::mean(&column) else {
            continue;
        };
        let spread = stats::population_std(&column).unwrap_or(0.0);
        for row in matrix.iter_mut() {
            row[dim] = if spread > 0.0 { (row[dim] - mu) / spread } else { 0.0 };
        }
    }
}

/// Squared Euclidean distance between two equal-length feature rows.
pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Rewrite arbitrary labels as 1-based ids numbered in order of first
/// appearance, so equivalent partitions always present identically.
pub(crate) fn relabel_by_first_appearance(labels: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let mut out = Vec::with_capacity(labels.len());
    for &label in labels {
        let next = mapping.len() + 1;
        let id = *mapping.entry(label).or_insert(next);
        out.push(id);
    }
    out
}
