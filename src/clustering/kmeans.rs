//! Centroid-based partitioning with seeded random restarts.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::squared_distance;
use crate::core::{Error, Result};

/// One fitted partition: the best of all restarts by within-cluster
/// sum of squares.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// 0-based cluster index per row, parallel to the input matrix
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Total within-cluster sum of squared distances
    pub wss: f64,
    /// Iterations used by the winning restart
    pub iterations: usize,
    /// Whether the winning restart reached a fixed point before the cap
    pub converged: bool,
}

/// Partition `matrix` into `k` clusters with a fresh generator seeded
/// from `seed`. Identical inputs and seed always produce identical fits.
pub fn kmeans(
    matrix: &[Vec<f64>],
    k: usize,
    restarts: usize,
    max_iterations: usize,
    seed: u64,
) -> Result<KMeansFit> {
    let mut rng = StdRng::seed_from_u64(seed);
    kmeans_with_rng(matrix, k, restarts, max_iterations, &mut rng)
}

/// Partition `matrix` into `k` clusters, drawing all randomness from a
/// caller-supplied generator.
///
/// Every restart draws fresh initial centroids from the same generator,
/// so determinism is entirely the caller's contract. The restart with
/// the strictly lowest within-cluster sum of squares wins, which keeps
/// the result stable when two restarts land on the same optimum.
pub fn kmeans_with_rng<R: Rng + ?Sized>(
    matrix: &[Vec<f64>],
    k: usize,
    restarts: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<KMeansFit> {
    let n = matrix.len();
    if n < k {
        return Err(Error::insufficient("clustering", k, n));
    }
    if k == 0 {
        return Err(Error::Configuration("cluster count must be positive".to_string()));
    }

    let mut best: Option<KMeansFit> = None;
    for _ in 0..restarts.max(1) {
        let fit = fit_once(matrix, k, max_iterations, rng);
        if best.as_ref().map_or(true, |b| fit.wss < b.wss) {
            best = Some(fit);
        }
    }

    // restarts.max(1) guarantees at least one fit
    best.ok_or_else(|| Error::insufficient("clustering", k, n))
}

fn fit_once<R: Rng + ?Sized>(
    matrix: &[Vec<f64>],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> KMeansFit {
    let mut centroids: Vec<Vec<f64>> = matrix.choose_multiple(rng, k).cloned().collect();
    let mut labels = assign_labels(matrix, &centroids);
    rescue_empty_clusters(matrix, &centroids, &mut labels, k);

    let mut converged = false;
    let mut iterations = 0;
    for _ in 0..max_iterations {
        iterations += 1;
        centroids = centroid_means(matrix, &labels, k, &centroids);
        let mut next = assign_labels(matrix, &centroids);
        rescue_empty_clusters(matrix, &centroids, &mut next, k);
        if next == labels {
            converged = true;
            break;
        }
        labels = next;
    }

    let centroids = centroid_means(matrix, &labels, k, &centroids);
    let wss = total_wss(matrix, &centroids, &labels);
    KMeansFit {
        labels,
        centroids,
        wss,
        iterations,
        converged,
    }
}

/// Nearest centroid per row; distance ties go to the lowest cluster index.
fn assign_labels(matrix: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    matrix
        .iter()
        .map(|row| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (idx, centroid) in centroids.iter().enumerate() {
                let dist = squared_distance(row, centroid);
                if dist < best_dist {
                    best = idx;
                    best_dist = dist;
                }
            }
            best
        })
        .collect()
}

/// Reassign the point farthest from its centroid into each empty cluster,
/// always stealing from a cluster that keeps at least one member. With
/// n >= k this leaves every cluster non-empty.
fn rescue_empty_clusters(
    matrix: &[Vec<f64>],
    centroids: &[Vec<f64>],
    labels: &mut [usize],
    k: usize,
) {
    loop {
        let mut counts = vec![0usize; k];
        for &label in labels.iter() {
            counts[label] += 1;
        }
        let Some(empty) = counts.iter().position(|&c| c == 0) else {
            return;
        };

        let mut farthest: Option<(usize, f64)> = None;
        for (idx, row) in matrix.iter().enumerate() {
            if counts[labels[idx]] <= 1 {
                continue;
            }
            let dist = squared_distance(row, &centroids[labels[idx]]);
            if farthest.map_or(true, |(_, best)| dist > best) {
                farthest = Some((idx, dist));
            }
        }

        match farthest {
            Some((idx, _)) => labels[idx] = empty,
            None => return,
        }
    }
}

/// Per-cluster mean of member rows; an empty cluster keeps its previous
/// centroid rather than collapsing to the origin.
fn centroid_means(
    matrix: &[Vec<f64>],
    labels: &[usize],
    k: usize,
    previous: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let dims = matrix.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dims]; k];
    let mut counts = vec![0usize; k];
    for (row, &label) in matrix.iter().zip(labels) {
        counts[label] += 1;
        for (total, value) in sums[label].iter_mut().zip(row) {
            *total += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .enumerate()
        .map(|(idx, (sum, count))| {
            if count == 0 {
                previous[idx].clone()
            } else {
                sum.into_iter().map(|v| v / count as f64).collect()
            }
        })
        .collect()
}

fn total_wss(matrix: &[Vec<f64>], centroids: &[Vec<f64>], labels: &[usize]) -> f64 {
    matrix
        .iter()
        .zip(labels)
        .map(|(row, &label)| squared_distance(row, &centroids[label]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two tight groups far apart on the first axis
    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, -0.1],
            vec![-0.1, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 9.9],
            vec![9.9, 10.1],
        ]
    }

    #[test]
    fn separates_two_obvious_blobs() {
        let matrix = two_blobs();
        let fit = kmeans(&matrix, 2, 10, 100, 42).unwrap();

        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[1], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[4], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);
        assert!(fit.converged);
    }

    #[test]
    fn identical_seed_reproduces_the_fit() {
        let matrix = two_blobs();
        let first = kmeans(&matrix, 2, 10, 100, 7).unwrap();
        let second = kmeans(&matrix, 2, 10, 100, 7).unwrap();
        assert_eq!(first.labels, second.labels);
        assert_eq!(first.wss, second.wss);
    }

    #[test]
    fn seeded_entry_point_matches_a_caller_supplied_generator() {
        let matrix = two_blobs();
        let seeded = kmeans(&matrix, 2, 10, 100, 7).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let supplied = kmeans_with_rng(&matrix, 2, 10, 100, &mut rng).unwrap();
        assert_eq!(seeded.labels, supplied.labels);
        assert_eq!(seeded.wss, supplied.wss);
    }

    #[test]
    fn cohort_smaller_than_k_is_insufficient() {
        let matrix = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let err = kmeans(&matrix, 5, 10, 100, 42).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { needed: 5, actual: 4, .. }));
    }

    #[test]
    fn k_equal_to_n_gives_singletons_with_zero_wss() {
        let matrix = vec![vec![0.0, 0.0], vec![5.0, 5.0], vec![9.0, 1.0]];
        let fit = kmeans(&matrix, 3, 10, 100, 42).unwrap();

        let mut seen = fit.labels.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 3);
        assert!(fit.wss.abs() < 1e-12);
    }

    #[test]
    fn every_cluster_ends_up_non_empty() {
        // All points identical: initial centroids coincide, empties must be rescued
        let matrix = vec![vec![1.0, 1.0]; 5];
        let fit = kmeans(&matrix, 3, 10, 100, 42).unwrap();
        let mut counts = vec![0usize; 3];
        for &label in &fit.labels {
            counts[label] += 1;
        }
        assert!(counts.iter().all(|&c| c > 0));
    }

    #[test]
    fn wss_never_increases_with_more_restarts() {
        let matrix = two_blobs();
        let few = kmeans(&matrix, 3, 1, 100, 13).unwrap();
        let many = kmeans(&matrix, 3, 40, 100, 13).unwrap();
        assert!(many.wss <= few.wss + 1e-12);
    }
}
