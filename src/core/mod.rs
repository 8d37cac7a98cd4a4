pub mod errors;
pub mod stats;

pub use errors::{Error, Result};

use serde::{Deserialize, Serialize};

/// The four raw quality measures every hospital is scored on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Mortality,
    Readmission,
    Infection,
    PatientExperience,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Mortality,
        Metric::Readmission,
        Metric::Infection,
        Metric::PatientExperience,
    ];

    /// Whether a lower raw value means better care. Normalization inverts
    /// these metrics so that 100 is always the good end of the scale.
    pub fn lower_is_better(self) -> bool {
        !matches!(self, Metric::PatientExperience)
    }

    /// Column name of the raw metric in the uniform input schema.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Mortality => "mortality_rate",
            Metric::Readmission => "readmission_rate",
            Metric::Infection => "infection_rate",
            Metric::PatientExperience => "patient_experience_score",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// One hospital as delivered by the loader: identity, location, and the raw
/// metric fields. Metrics are optional until the cleaning pass has run; the
/// scorer refuses records that still have gaps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HospitalRecord {
    pub hospital_id: String,
    pub name: Option<String>,
    pub state: String,
    pub mortality_rate: Option<f64>,
    pub readmission_rate: Option<f64>,
    pub infection_rate: Option<f64>,
    pub patient_experience_score: Option<f64>,
}

impl HospitalRecord {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Mortality => self.mortality_rate,
            Metric::Readmission => self.readmission_rate,
            Metric::Infection => self.infection_rate,
            Metric::PatientExperience => self.patient_experience_score,
        }
    }

    pub fn set_metric(&mut self, metric: Metric, value: Option<f64>) {
        match metric {
            Metric::Mortality => self.mortality_rate = value,
            Metric::Readmission => self.readmission_rate = value,
            Metric::Infection => self.infection_rate = value,
            Metric::PatientExperience => self.patient_experience_score = value,
        }
    }
}

/// Per-hospital normalized metric scores, each on the 0-100 scale with 100
/// always the good end.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedScores {
    pub mortality: f64,
    pub readmission: f64,
    pub infection: f64,
    pub patient_experience: f64,
}

impl NormalizedScores {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mortality => self.mortality,
            Metric::Readmission => self.readmission,
            Metric::Infection => self.infection,
            Metric::PatientExperience => self.patient_experience,
        }
    }
}

/// Ordered performance band derived from the composite quality score.
///
/// The derive order is the comparison order: `Poor` sorts lowest and
/// `Excellent` highest, so rankings and summaries can compare categories
/// directly instead of re-parsing labels.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PerformanceCategory {
    #[serde(rename = "Poor")]
    Poor,
    #[serde(rename = "Below Average")]
    BelowAverage,
    #[serde(rename = "Average")]
    Average,
    #[serde(rename = "Above Average")]
    AboveAverage,
    #[serde(rename = "Excellent")]
    Excellent,
}

impl PerformanceCategory {
    pub fn label(self) -> &'static str {
        match self {
            PerformanceCategory::Poor => "Poor",
            PerformanceCategory::BelowAverage => "Below Average",
            PerformanceCategory::Average => "Average",
            PerformanceCategory::AboveAverage => "Above Average",
            PerformanceCategory::Excellent => "Excellent",
        }
    }
}

impl std::fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Rank and percentile of one hospital within its state and nationally.
/// Rank 1 is the best score in the scope; ties share the minimum rank.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankInfo {
    pub state_rank: usize,
    pub state_percentile: f64,
    pub national_rank: usize,
    pub national_percentile: f64,
}

/// One row of the produced output table: the input record extended with every
/// derived column the pipeline computes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HospitalQuality {
    pub hospital_id: String,
    pub name: Option<String>,
    pub state: String,

    // Raw metrics after cleaning
    pub mortality_rate: f64,
    pub readmission_rate: f64,
    pub infection_rate: f64,
    pub patient_experience_score: f64,

    // Normalized 0-100 scores
    pub mortality_score: f64,
    pub readmission_score: f64,
    pub infection_score: f64,
    pub patient_exp_score: f64,

    // Composite score and rating
    pub quality_score: f64,
    pub star_rating: u8,
    pub performance_category: PerformanceCategory,

    // Ranks
    pub state_rank: usize,
    pub state_percentile: f64,
    pub national_rank: usize,
    pub national_percentile: f64,

    // Cluster ids per algorithm (1-based, algorithm-local), absent when the
    // clustering stage was skipped
    pub kmeans_cluster: Option<usize>,
    pub ward_cluster: Option<usize>,
}
