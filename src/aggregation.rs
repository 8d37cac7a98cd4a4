//! State-level summaries and leaderboard extracts from the scored table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{stats, HospitalQuality, PerformanceCategory};

/// Leaderboard row: just enough of a hospital to print in an extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalExtract {
    pub hospital_id: String,
    pub name: Option<String>,
    pub state: String,
    pub quality_score: f64,
    pub star_rating: u8,
    pub national_rank: usize,
}

impl From<&HospitalQuality> for HospitalExtract {
    fn from(row: &HospitalQuality) -> Self {
        Self {
            hospital_id: row.hospital_id.clone(),
            name: row.name.clone(),
            state: row.state.clone(),
            quality_score: row.quality_score,
            star_rating: row.star_rating,
            national_rank: row.national_rank,
        }
    }
}

/// Per-state rollup of the scored cohort. Percentages and means stay at
/// full precision here; rounding happens only at output time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub state: String,
    pub n_hospitals: usize,
    pub mean_quality_score: f64,
    pub median_quality_score: f64,
    pub mean_mortality_rate: f64,
    pub mean_readmission_rate: f64,
    pub mean_infection_rate: f64,
    pub mean_patient_experience_score: f64,
    /// Share of the state's hospitals rated Excellent, in percent
    pub pct_excellent: f64,
    /// Share of the state's hospitals rated Poor, in percent
    pub pct_poor: f64,
}

/// Best and worst hospital of one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateExtremes {
    pub state: String,
    pub best: HospitalExtract,
    pub worst: HospitalExtract,
}

/// Everything the aggregation stage derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub national_top: Vec<HospitalExtract>,
    pub national_bottom: Vec<HospitalExtract>,
    pub state_summaries: Vec<StateSummary>,
    pub state_extremes: Vec<StateExtremes>,
}

/// Aggregate a fully scored, ranked cohort.
pub fn aggregate(cohort: &[HospitalQuality], top_n: usize) -> Aggregates {
    Aggregates {
        national_top: national_top(cohort, top_n),
        national_bottom: national_bottom(cohort, top_n),
        state_summaries: state_summaries(cohort),
        state_extremes: state_extremes(cohort),
    }
}

/// Top `n` hospitals nationally by quality score. The sort is stable, so
/// tied hospitals keep their original record order.
pub fn national_top(cohort: &[HospitalQuality], n: usize) -> Vec<HospitalExtract> {
    let mut order: Vec<&HospitalQuality> = cohort.iter().collect();
    order.sort_by(|a, b| b.quality_score.total_cmp(&a.quality_score));
    order.into_iter().take(n).map(HospitalExtract::from).collect()
}

/// Bottom `n` hospitals nationally by quality score, worst first.
pub fn national_bottom(cohort: &[HospitalQuality], n: usize) -> Vec<HospitalExtract> {
    let mut order: Vec<&HospitalQuality> = cohort.iter().collect();
    order.sort_by(|a, b| a.quality_score.total_cmp(&b.quality_score));
    order.into_iter().take(n).map(HospitalExtract::from).collect()
}

/// Summary statistics per state, sorted by state code.
pub fn state_summaries(cohort: &[HospitalQuality]) -> Vec<StateSummary> {
    by_state(cohort)
        .into_iter()
        .map(|(state, rows)| summarize_state(state, &rows))
        .collect()
}

/// Best and worst hospital of each state, sorted by state code. Among
/// tied scores the earliest record wins, matching the extract sorts.
pub fn state_extremes(cohort: &[HospitalQuality]) -> Vec<StateExtremes> {
    by_state(cohort)
        .into_iter()
        .filter_map(|(state, rows)| {
            let best = rows
                .iter()
                .copied()
                .reduce(|best, row| if row.quality_score > best.quality_score { row } else { best })?;
            let worst = rows
                .iter()
                .copied()
                .reduce(|worst, row| if row.quality_score < worst.quality_score { row } else { worst })?;
            Some(StateExtremes {
                state,
                best: best.into(),
                worst: worst.into(),
            })
        })
        .collect()
}

fn by_state(cohort: &[HospitalQuality]) -> BTreeMap<String, Vec<&HospitalQuality>> {
    let mut groups: BTreeMap<String, Vec<&HospitalQuality>> = BTreeMap::new();
    for row in cohort {
        groups.entry(row.state.clone()).or_default().push(row);
    }
    groups
}

fn summarize_state(state: String, rows: &[&HospitalQuality]) -> StateSummary {
    let quality: Vec<f64> = rows.iter().map(|r| r.quality_score).collect();
    let n = rows.len();
    let share = |category: PerformanceCategory| {
        let hits = rows.iter().filter(|r| r.performance_category == category).count();
        hits as f64 / n as f64 * 100.0
    };

    StateSummary {
        state,
        n_hospitals: n,
        mean_quality_score: stats::mean(&quality).unwrap_or(0.0),
        median_quality_score: stats::median(&quality).unwrap_or(0.0),
        mean_mortality_rate: mean_of(rows, |r| r.mortality_rate),
        mean_readmission_rate: mean_of(rows, |r| r.readmission_rate),
        mean_infection_rate: mean_of(rows, |r| r.infection_rate),
        mean_patient_experience_score: mean_of(rows, |r| r.patient_experience_score),
        pct_excellent: share(PerformanceCategory::Excellent),
        pct_poor: share(PerformanceCategory::Poor),
    }
}

fn mean_of(rows: &[&HospitalQuality], field: impl Fn(&HospitalQuality) -> f64) -> f64 {
    let values: Vec<f64> = rows.iter().map(|r| field(r)).collect();
    stats::mean(&values).unwrap_or(0.0)
}
