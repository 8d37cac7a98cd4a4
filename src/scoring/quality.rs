use log::warn;

use crate::config::{ScoreWeights, WEIGHT_SUM_TOLERANCE};
use crate::core::{Error, Metric, NormalizedScores, Result};

/// Resolve the weights actually used for scoring.
///
/// Unusable weights (negative, non-finite, all zero) are a configuration
/// error. A weight sum further than [`WEIGHT_SUM_TOLERANCE`] from 1.0 is
/// rescaled proportionally and logged; the run continues.
pub fn effective_weights(weights: &ScoreWeights) -> Result<ScoreWeights> {
    weights.validate().map_err(Error::Configuration)?;

    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        warn!("quality-score weights sum to {sum:.4}, not 1.0; rescaling proportionally");
        Ok(weights.normalized())
    } else {
        Ok(*weights)
    }
}

/// Weighted composite of the four normalized scores.
///
/// With weights summing to 1.0 this is a convex combination, so the
/// result stays in [0,100] whenever the inputs do.
pub fn quality_score(scores: &NormalizedScores, weights: &ScoreWeights) -> f64 {
    weights.mortality * scores.mortality
        + weights.readmission * scores.readmission
        + weights.infection * scores.infection
        + weights.patient_experience * scores.patient_experience
}

/// Assemble one record's normalized scores. A metric still missing after
/// upstream cleaning is a [`Error::MissingField`]; this stage never
/// fabricates a stand-in value.
pub fn gather_scores<F>(hospital_id: &str, score_of: F) -> Result<NormalizedScores>
where
    F: Fn(Metric) -> Option<f64>,
{
    let need = |metric: Metric| -> Result<f64> {
        score_of(metric).ok_or_else(|| Error::missing_field(hospital_id, metric.column()))
    };

    Ok(NormalizedScores {
        mortality: need(Metric::Mortality)?,
        readmission: need(Metric::Readmission)?,
        infection: need(Metric::Infection)?,
        patient_experience: need(Metric::PatientExperience)?,
    })
}
