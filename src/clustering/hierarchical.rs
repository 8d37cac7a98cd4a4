//! Agglomerative clustering with Ward's minimum-variance linkage.

use std::collections::HashMap;

use super::squared_distance;
use crate::core::{Error, Result};

/// One merge in the agglomeration sequence. Leaves are nodes `0..n`;
/// the merge at step `t` creates node `n + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeStep {
    pub left: usize,
    pub right: usize,
    /// Ward merge cost, in squared-distance units
    pub dissimilarity: f64,
    /// Points contained in the merged node
    pub size: usize,
}

/// Full agglomeration history: `n - 1` merges from singletons down to a
/// single root. A flat partition at any k is recovered by [`MergeTree::cut`].
#[derive(Debug, Clone)]
pub struct MergeTree {
    pub n_points: usize,
    pub steps: Vec<MergeStep>,
}

impl MergeTree {
    /// Flat partition into exactly `k` clusters, obtained by replaying
    /// the first `n - k` merges. Labels are 1-based and numbered in order
    /// of first appearance over the input rows.
    pub fn cut(&self, k: usize) -> Result<Vec<usize>> {
        let n = self.n_points;
        if k == 0 {
            return Err(Error::Configuration("cluster count must be positive".to_string()));
        }
        if n < k {
            return Err(Error::insufficient("clustering", k, n));
        }

        // component[i] = id of the node currently containing leaf i
        let mut component: Vec<usize> = (0..n).collect();
        for (t, step) in self.steps.iter().take(n - k).enumerate() {
            let merged = n + t;
            for slot in component.iter_mut() {
                if *slot == step.left || *slot == step.right {
                    *slot = merged;
                }
            }
        }

        Ok(super::relabel_by_first_appearance(&component))
    }
}

/// Build the full Ward merge tree over the rows of `matrix`.
///
/// Pairwise dissimilarities start as squared Euclidean distances and are
/// updated with the Lance-Williams recurrence for Ward's criterion, so
/// each merge is the pair whose union least increases total within-cluster
/// variance. Cost ties resolve to the lowest node-id pair, which keeps
/// the tree deterministic.
pub fn ward_tree(matrix: &[Vec<f64>]) -> Result<MergeTree> {
    let n = matrix.len();
    if n == 0 {
        return Err(Error::insufficient("clustering", 1, 0));
    }

    let mut distances = PairMatrix::from_points(matrix);
    // (node id, point count), kept in ascending id order
    let mut active: Vec<(usize, usize)> = (0..n).map(|id| (id, 1)).collect();
    let mut steps = Vec::with_capacity(n.saturating_sub(1));

    for t in 0..n.saturating_sub(1) {
        let Some((a, b, cost)) = closest_pair(&active, &distances) else {
            break;
        };
        let (left, left_size) = active[a];
        let (right, right_size) = active[b];
        let merged = n + t;
        let merged_size = left_size + right_size;

        // Ward update for every other active node
        for &(other, other_size) in &active {
            if other == left || other == right {
                continue;
            }
            let total = (merged_size + other_size) as f64;
            let updated = ((left_size + other_size) as f64 * distances.get(left, other)
                + (right_size + other_size) as f64 * distances.get(right, other)
                - other_size as f64 * cost)
                / total;
            distances.set(merged, other, updated);
        }

        // b > a, so remove the later index first
        active.remove(b);
        active.remove(a);
        active.push((merged, merged_size));

        steps.push(MergeStep {
            left,
            right,
            dissimilarity: cost,
            size: merged_size,
        });
    }

    Ok(MergeTree { n_points: n, steps })
}

/// Ward partition into `k` clusters: full tree, then a flat cut.
pub fn ward_cluster(matrix: &[Vec<f64>], k: usize) -> Result<Vec<usize>> {
    ward_tree(matrix)?.cut(k)
}

/// Active pair with the lowest merge cost; ties take the first pair in
/// ascending id order.
fn closest_pair(active: &[(usize, usize)], distances: &PairMatrix) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for i in 0..active.len() {
        for j in (i + 1)..active.len() {
            let cost = distances.get(active[i].0, active[j].0);
            if best.map_or(true, |(_, _, lowest)| cost < lowest) {
                best = Some((i, j, cost));
            }
        }
    }
    best
}

/// Symmetric dissimilarity matrix keyed by unordered node-id pairs.
struct PairMatrix {
    entries: HashMap<(usize, usize), f64>,
}

impl PairMatrix {
    fn from_points(matrix: &[Vec<f64>]) -> Self {
        let mut entries = HashMap::new();
        for i in 0..matrix.len() {
            for j in (i + 1)..matrix.len() {
                entries.insert((i, j), squared_distance(&matrix[i], &matrix[j]));
            }
        }
        Self { entries }
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        let key = if i < j { (i, j) } else { (j, i) };
        self.entries.get(&key).copied().unwrap_or(f64::INFINITY)
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        let key = if i < j { (i, j) } else { (j, i) };
        self.entries.insert(key, value);
    }
}
