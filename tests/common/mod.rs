// Test utility module for carescore integration tests
#![allow(dead_code)]

use carescore::config::{AnalysisConfig, KChoice};
use carescore::core::{HospitalRecord, NormalizedScores};

/// Build one complete record with every metric present.
pub fn record(id: &str, state: &str, m: f64, r: f64, i: f64, p: f64) -> HospitalRecord {
    HospitalRecord {
        hospital_id: id.to_string(),
        name: Some(format!("Hospital {id}")),
        state: state.to_string(),
        mortality_rate: Some(m),
        readmission_rate: Some(r),
        infection_rate: Some(i),
        patient_experience_score: Some(p),
    }
}

/// Cohort of `tiers` well-separated performance tiers, `per_tier`
/// hospitals each. Tier 0 is the best on every metric; raw values within
/// a tier differ by far less than the gap between tiers, so any sane
/// partition into `tiers` clusters recovers the tiers exactly.
pub fn tiered_cohort(tiers: usize, per_tier: usize) -> Vec<HospitalRecord> {
    let mut records = Vec::with_capacity(tiers * per_tier);
    for tier in 0..tiers {
        let base = tier as f64 * 20.0;
        for j in 0..per_tier {
            let jitter = j as f64 * 0.1;
            let idx = tier * per_tier + j;
            records.push(record(
                &format!("H{idx:03}"),
                if idx % 2 == 0 { "CA" } else { "TX" },
                5.0 + base + jitter,
                10.0 + base + jitter,
                1.0 + base / 10.0 + jitter,
                95.0 - base - jitter,
            ));
        }
    }
    records
}

/// Tier index of a hospital produced by [`tiered_cohort`].
pub fn tier_of(index: usize, per_tier: usize) -> usize {
    index / per_tier
}

/// Normalized-score blobs matching [`tiered_cohort`], for calling the
/// cluster engine directly without running the scoring stages first.
pub fn tiered_scores(tiers: usize, per_tier: usize) -> (Vec<NormalizedScores>, Vec<f64>) {
    let mut scores = Vec::with_capacity(tiers * per_tier);
    let mut quality = Vec::with_capacity(tiers * per_tier);
    for tier in 0..tiers {
        let level = 90.0 - tier as f64 * 25.0;
        for j in 0..per_tier {
            let jitter = j as f64 * 0.2;
            scores.push(NormalizedScores {
                mortality: level + jitter,
                readmission: level - jitter,
                infection: level + jitter,
                patient_experience: level - jitter,
            });
            quality.push(level);
        }
    }
    (scores, quality)
}

/// Config with a fixed cluster count and everything else at defaults.
pub fn config_with_k(k: usize) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.cluster.k = KChoice::Fixed(k);
    config
}

/// Check that two flat partitions induce the same grouping, ignoring
/// which numeric id each group got.
pub fn same_partition(a: &[usize], b: &[usize]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut forward = std::collections::HashMap::new();
    let mut backward = std::collections::HashMap::new();
    for (&x, &y) in a.iter().zip(b) {
        if *forward.entry(x).or_insert(y) != y || *backward.entry(y).or_insert(x) != x {
            return false;
        }
    }
    true
}
