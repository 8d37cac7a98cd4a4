//! Seeded synthetic cohorts for demos and benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::HospitalRecord;

const STATES: &[&str] = &["CA", "TX", "NY", "FL", "IL", "PA", "OH", "GA", "NC", "MI"];

/// Share of metric values inflated into outliers, so the clamping pass has
/// realistic work to do.
const OUTLIER_SHARE: f64 = 0.02;

/// Generate `n` plausible hospital records, fully determined by `seed`.
///
/// `missing_rate` is the probability that any single metric value is left
/// blank; pass 0.0 for a complete cohort.
pub fn generate_cohort(n: usize, missing_rate: f64, seed: u64) -> Vec<HospitalRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| generate_record(i, missing_rate, &mut rng))
        .collect()
}

fn generate_record(index: usize, missing_rate: f64, rng: &mut StdRng) -> HospitalRecord {
    let state = STATES[rng.gen_range(0..STATES.len())];
    HospitalRecord {
        hospital_id: format!("H{:05}", index + 1),
        name: Some(format!("General Hospital {}", index + 1)),
        state: state.to_string(),
        mortality_rate: metric_value(rng, missing_rate, 5.0, 20.0),
        readmission_rate: metric_value(rng, missing_rate, 10.0, 25.0),
        infection_rate: metric_value(rng, missing_rate, 0.5, 5.0),
        patient_experience_score: metric_value(rng, missing_rate, 40.0, 100.0),
    }
}

fn metric_value(rng: &mut StdRng, missing_rate: f64, lo: f64, hi: f64) -> Option<f64> {
    if missing_rate > 0.0 && rng.gen_bool(missing_rate.min(1.0)) {
        return None;
    }
    let value = rng.gen_range(lo..hi);
    if rng.gen_bool(OUTLIER_SHARE) {
        Some(value * 3.0)
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_generates_the_same_cohort() {
        let first = generate_cohort(50, 0.02, 42);
        let second = generate_cohort(50, 0.02, 42);
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_diverge() {
        let first = generate_cohort(50, 0.0, 1);
        let second = generate_cohort(50, 0.0, 2);
        assert_ne!(first, second);
    }

    #[test]
    fn zero_missing_rate_generates_a_complete_cohort() {
        let cohort = generate_cohort(100, 0.0, 3);
        for record in &cohort {
            assert!(record.mortality_rate.is_some());
            assert!(record.readmission_rate.is_some());
            assert!(record.infection_rate.is_some());
            assert!(record.patient_experience_score.is_some());
        }
    }

    #[test]
    fn high_missing_rate_leaves_gaps() {
        let cohort = generate_cohort(100, 0.5, 3);
        let gaps = cohort
            .iter()
            .filter(|r| r.mortality_rate.is_none() || r.infection_rate.is_none())
            .count();
        assert!(gaps > 0, "a 50% missing rate should leave visible gaps");
    }

    #[test]
    fn ids_are_unique_and_states_are_known() {
        let cohort = generate_cohort(200, 0.02, 7);
        let mut ids: Vec<&str> = cohort.iter().map(|r| r.hospital_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert!(cohort.iter().all(|r| STATES.contains(&r.state.as_str())));
    }

    #[test]
    fn observed_values_sit_in_plausible_ranges() {
        let cohort = generate_cohort(300, 0.02, 11);
        for record in &cohort {
            if let Some(m) = record.mortality_rate {
                // Outlier inflation triples at most
                assert!((5.0..60.0).contains(&m));
            }
            if let Some(p) = record.patient_experience_score {
                assert!((40.0..300.0).contains(&p));
            }
        }
    }
}
