use std::collections::BTreeMap;

use crate::core::RankInfo;

/// Competition ("min") ranks, descending by score: rank 1 is the highest
/// score, and tied scores all take the lowest position in the tied group,
/// so [90, 90, 70] ranks as [1, 1, 3].
pub fn min_ranks(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut ranks = vec![0; scores.len()];
    let mut current = 0;
    for (position, &idx) in order.iter().enumerate() {
        if position == 0 || scores[idx] != scores[order[position - 1]] {
            current = position + 1;
        }
        ranks[idx] = current;
    }
    ranks
}

/// Percentile of each score within its cohort: the share of the cohort
/// scoring at or below it, scaled to [0,100]. The top score is always at
/// the 100th percentile.
pub fn percentiles(scores: &[f64]) -> Vec<f64> {
    let n = scores.len();
    if n == 0 {
        return Vec::new();
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);

    scores
        .iter()
        .map(|&score| {
            let at_or_below = sorted.partition_point(|&x| x <= score);
            at_or_below as f64 / n as f64 * 100.0
        })
        .collect()
}

/// Rank every record nationally and within its state.
///
/// `states` and `scores` are parallel to the cohort. State scopes are
/// ranked independently, so a mid-field hospital nationally can still be
/// first in a small state.
pub fn rank_cohort(states: &[&str], scores: &[f64]) -> Vec<RankInfo> {
    debug_assert_eq!(states.len(), scores.len());

    let national_ranks = min_ranks(scores);
    let national_pcts = percentiles(scores);

    let mut by_state: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, state) in states.iter().enumerate() {
        by_state.entry(state).or_default().push(idx);
    }

    let mut state_ranks = vec![0; scores.len()];
    let mut state_pcts = vec![0.0; scores.len()];
    for members in by_state.values() {
        let subset: Vec<f64> = members.iter().map(|&i| scores[i]).collect();
        let ranks = min_ranks(&subset);
        let pcts = percentiles(&subset);
        for (slot, &i) in members.iter().enumerate() {
            state_ranks[i] = ranks[slot];
            state_pcts[i] = pcts[slot];
        }
    }

    (0..scores.len())
        .map(|i| RankInfo {
            state_rank: state_ranks[i],
            state_percentile: state_pcts[i],
            national_rank: national_ranks[i],
            national_percentile: national_pcts[i],
        })
        .collect()
}
