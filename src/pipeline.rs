//! End-to-end orchestration: normalize, score, rate, rank, cluster,
//! aggregate. Each stage consumes the previous stage's table in full and
//! produces a new one; nothing is mutated across stage boundaries.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::aggregation::{aggregate, Aggregates};
use crate::clustering::{run_clustering, ClusteringReport};
use crate::config::AnalysisConfig;
use crate::core::{Error, HospitalQuality, HospitalRecord, Metric, NormalizedScores, RankInfo, Result};
use crate::scoring;

/// Complete result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAnalysis {
    pub generated_at: DateTime<Utc>,
    /// Configuration as applied; `weights` reflects any off-unity rescale.
    pub config: AnalysisConfig,
    pub hospitals: Vec<HospitalQuality>,
    /// `None` when the cohort could not support the requested clustering;
    /// scoring and aggregation still complete.
    pub clustering: Option<ClusteringReport>,
    pub aggregates: Aggregates,
}

/// Run the full pipeline over a cleaned cohort.
///
/// Scoring failures (missing required fields, unusable configuration)
/// abort the run. An undersized cohort only skips the clustering stage:
/// the report then carries scores, ranks, and aggregates with
/// `clustering: None`.
pub fn run(records: &[HospitalRecord], config: &AnalysisConfig) -> Result<QualityAnalysis> {
    config.validate().map_err(Error::Configuration)?;
    if records.is_empty() {
        return Err(Error::insufficient("scoring", 1, 0));
    }
    info!("analyzing {} hospitals", records.len());

    let normalized = normalize_cohort(records);
    let weights = scoring::effective_weights(&config.weights)?;

    let mut scores = Vec::with_capacity(records.len());
    let mut quality = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let row =
            scoring::gather_scores(&record.hospital_id, |metric| normalized.get(metric, idx))?;
        quality.push(scoring::quality_score(&row, &weights));
        scores.push(row);
    }

    let states: Vec<&str> = records.iter().map(|r| r.state.as_str()).collect();
    let ranks = scoring::rank_cohort(&states, &quality);

    let clustering = match run_clustering(&scores, &quality, &config.cluster) {
        Ok(report) => Some(report),
        Err(Error::InsufficientData { stage, needed, actual }) => {
            warn!(
                "clustering skipped: {stage} needs at least {needed} records, cohort has {actual}"
            );
            None
        }
        Err(other) => return Err(other),
    };

    let hospitals: Result<Vec<HospitalQuality>> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            build_row(
                record,
                &scores[idx],
                quality[idx],
                &ranks[idx],
                clustering.as_ref().map(|c| c.kmeans.assignments[idx]),
                clustering.as_ref().map(|c| c.ward.assignments[idx]),
            )
        })
        .collect();
    let hospitals = hospitals?;

    let aggregates = aggregate(&hospitals, config.top_n);

    let mut applied = config.clone();
    applied.weights = weights;

    Ok(QualityAnalysis {
        generated_at: Utc::now(),
        config: applied,
        hospitals,
        clustering,
        aggregates,
    })
}

/// One normalized column per metric, all computed over the full cohort.
struct NormalizedColumns {
    columns: Vec<(Metric, Vec<Option<f64>>)>,
}

impl NormalizedColumns {
    fn get(&self, metric: Metric, idx: usize) -> Option<f64> {
        self.columns
            .iter()
            .find(|(m, _)| *m == metric)
            .and_then(|(_, column)| column[idx])
    }
}

fn normalize_cohort(records: &[HospitalRecord]) -> NormalizedColumns {
    let columns = Metric::ALL
        .into_iter()
        .map(|metric| {
            let raw: Vec<Option<f64>> = records.iter().map(|r| r.metric(metric)).collect();
            (metric, scoring::normalize_series(metric, &raw))
        })
        .collect();
    NormalizedColumns { columns }
}

fn build_row(
    record: &HospitalRecord,
    scores: &NormalizedScores,
    quality: f64,
    ranks: &RankInfo,
    kmeans_cluster: Option<usize>,
    ward_cluster: Option<usize>,
) -> Result<HospitalQuality> {
    let raw = |metric: Metric| -> Result<f64> {
        record
            .metric(metric)
            .ok_or_else(|| Error::missing_field(&record.hospital_id, metric.column()))
    };
    let (star_rating, performance_category) = scoring::classify(quality);

    Ok(HospitalQuality {
        hospital_id: record.hospital_id.clone(),
        name: record.name.clone(),
        state: record.state.clone(),
        mortality_rate: raw(Metric::Mortality)?,
        readmission_rate: raw(Metric::Readmission)?,
        infection_rate: raw(Metric::Infection)?,
        patient_experience_score: raw(Metric::PatientExperience)?,
        mortality_score: scores.mortality,
        readmission_score: scores.readmission,
        infection_score: scores.infection,
        patient_exp_score: scores.patient_experience,
        quality_score: quality,
        star_rating,
        performance_category,
        state_rank: ranks.state_rank,
        state_percentile: ranks.state_percentile,
        national_rank: ranks.national_rank,
        national_percentile: ranks.national_percentile,
        kmeans_cluster,
        ward_cluster,
    })
}
