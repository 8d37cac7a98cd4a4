//! Silhouette coefficient for cluster validation.

use std::collections::BTreeMap;

use super::squared_distance;

/// Mean silhouette over all points: for each point, `(b - a) / max(a, b)`
/// with `a` the mean distance to its own cluster and `b` the mean distance
/// to the nearest other cluster. Points alone in their cluster contribute
/// 0. Undefined (`None`) with fewer than 2 points or fewer than 2 clusters.
pub fn mean_silhouette(matrix: &[Vec<f64>], labels: &[usize]) -> Option<f64> {
    let n = matrix.len();
    debug_assert_eq!(n, labels.len());
    if n < 2 {
        return None;
    }

    let mut clusters: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        clusters.entry(label).or_default().push(idx);
    }
    if clusters.len() < 2 {
        return None;
    }

    let total: f64 = (0..n).map(|i| point_silhouette(matrix, labels, &clusters, i)).sum();
    Some(total / n as f64)
}

fn point_silhouette(
    matrix: &[Vec<f64>],
    labels: &[usize],
    clusters: &BTreeMap<usize, Vec<usize>>,
    point: usize,
) -> f64 {
    let own = &clusters[&labels[point]];
    if own.len() < 2 {
        return 0.0;
    }

    let a = mean_distance_to(matrix, point, own, true);
    let b = clusters
        .iter()
        .filter(|(&label, _)| label != labels[point])
        .map(|(_, members)| mean_distance_to(matrix, point, members, false))
        .fold(f64::INFINITY, f64::min);

    let denom = a.max(b);
    if denom == 0.0 {
        0.0
    } else {
        (b - a) / denom
    }
}

fn mean_distance_to(matrix: &[Vec<f64>], point: usize, members: &[usize], exclude_self: bool) -> f64 {
    let mut total = 0.0;
    let mut count = 0;
    for &other in members {
        if exclude_self && other == point {
            continue;
        }
        total += squared_distance(&matrix[point], &matrix[other]).sqrt();
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
