//! Shared cluster characterization: score means and quartile labels.
//!
//! Both clustering algorithms feed their assignment vector through this
//! one routine, so their summaries can never drift apart in semantics.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::NormalizedScores;

/// Performance band of a cluster, from its rank among all clusters'
/// mean quality scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterLabel {
    #[serde(rename = "High Performers")]
    HighPerformers,
    #[serde(rename = "Above Average")]
    AboveAverage,
    #[serde(rename = "Below Average")]
    BelowAverage,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl ClusterLabel {
    pub fn label(self) -> &'static str {
        match self {
            ClusterLabel::HighPerformers => "High Performers",
            ClusterLabel::AboveAverage => "Above Average",
            ClusterLabel::BelowAverage => "Below Average",
            ClusterLabel::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-cluster aggregate row: member count, mean of every score
/// dimension, and the quartile label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: usize,
    pub n_hospitals: usize,
    pub avg_mortality_score: f64,
    pub avg_readmission_score: f64,
    pub avg_infection_score: f64,
    pub avg_patient_exp_score: f64,
    pub avg_quality_score: f64,
    pub cluster_label: ClusterLabel,
}

/// Characterize a flat partition of the cohort.
///
/// `assignments` carries a 1-based cluster id per hospital. Means are
/// taken over the normalized 0-100 scores rather than the standardized
/// features, so summaries read in the same units as the hospital table.
/// Clusters are ordered descending by mean quality and labeled by
/// quartile position; with 4 clusters that is exactly one label each.
/// The returned rows are sorted by cluster id.
pub fn characterize(
    scores: &[NormalizedScores],
    quality: &[f64],
    assignments: &[usize],
) -> Vec<ClusterSummary> {
    debug_assert_eq!(scores.len(), quality.len());
    debug_assert_eq!(scores.len(), assignments.len());

    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &cluster) in assignments.iter().enumerate() {
        members.entry(cluster).or_default().push(idx);
    }

    let mut summaries: Vec<ClusterSummary> = members
        .iter()
        .map(|(&cluster_id, rows)| summarize(cluster_id, rows, scores, quality))
        .collect();

    // Rank positions by mean quality decide each cluster's label
    let mut order: Vec<usize> = (0..summaries.len()).collect();
    order.sort_by(|&a, &b| {
        summaries[b]
            .avg_quality_score
            .total_cmp(&summaries[a].avg_quality_score)
    });
    let k = order.len();
    for (position, &slot) in order.iter().enumerate() {
        summaries[slot].cluster_label = quartile_label(position, k);
    }

    summaries
}

fn summarize(
    cluster_id: usize,
    rows: &[usize],
    scores: &[NormalizedScores],
    quality: &[f64],
) -> ClusterSummary {
    let n = rows.len() as f64;
    let mut summary = ClusterSummary {
        cluster_id,
        n_hospitals: rows.len(),
        avg_mortality_score: 0.0,
        avg_readmission_score: 0.0,
        avg_infection_score: 0.0,
        avg_patient_exp_score: 0.0,
        avg_quality_score: 0.0,
        cluster_label: ClusterLabel::NeedsImprovement,
    };
    for &row in rows {
        summary.avg_mortality_score += scores[row].mortality / n;
        summary.avg_readmission_score += scores[row].readmission / n;
        summary.avg_infection_score += scores[row].infection / n;
        summary.avg_patient_exp_score += scores[row].patient_experience / n;
        summary.avg_quality_score += quality[row] / n;
    }
    summary
}

/// Quartile band for rank `position` (0 = best) among `k` clusters.
fn quartile_label(position: usize, k: usize) -> ClusterLabel {
    match (position * 4 / k.max(1)).min(3) {
        0 => ClusterLabel::HighPerformers,
        1 => ClusterLabel::AboveAverage,
        2 => ClusterLabel::BelowAverage,
        _ => ClusterLabel::NeedsImprovement,
    }
}
