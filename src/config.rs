use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::core::Result;

/// Tolerance for the quality-score weight sum before the scorer rescales.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Weights of the composite quality score, one per normalized metric.
///
/// Weights must be non-negative and should sum to 1.0; a sum off by more
/// than [`WEIGHT_SUM_TOLERANCE`] is rescaled proportionally at scoring time
/// with a logged warning rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight for the mortality score (0.0-1.0)
    #[serde(default = "default_mortality_weight")]
    pub mortality: f64,

    /// Weight for the readmission score (0.0-1.0)
    #[serde(default = "default_readmission_weight")]
    pub readmission: f64,

    /// Weight for the infection score (0.0-1.0)
    #[serde(default = "default_infection_weight")]
    pub infection: f64,

    /// Weight for the patient experience score (0.0-1.0)
    #[serde(default = "default_patient_experience_weight")]
    pub patient_experience: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            mortality: default_mortality_weight(),
            readmission: default_readmission_weight(),
            infection: default_infection_weight(),
            patient_experience: default_patient_experience_weight(),
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.mortality + self.readmission + self.infection + self.patient_experience
    }

    // Pure function: a usable weight is finite and non-negative
    fn is_valid_weight(weight: f64) -> bool {
        weight.is_finite() && weight >= 0.0
    }

    fn validate_weight(weight: f64, name: &str) -> std::result::Result<(), String> {
        if Self::is_valid_weight(weight) {
            Ok(())
        } else {
            Err(format!("{} weight must be a non-negative number", name))
        }
    }

    /// Validate the weights are individually usable and not all zero.
    /// A sum merely off 1.0 is not an error here; the scorer rescales it.
    pub fn validate(&self) -> std::result::Result<(), String> {
        Self::validate_weight(self.mortality, "mortality")?;
        Self::validate_weight(self.readmission, "readmission")?;
        Self::validate_weight(self.infection, "infection")?;
        Self::validate_weight(self.patient_experience, "patient_experience")?;

        if self.sum() <= 0.0 {
            return Err("quality-score weights must not all be zero".to_string());
        }
        Ok(())
    }

    /// Proportionally rescaled copy whose components sum to 1.0.
    pub fn normalized(&self) -> Self {
        let sum = self.sum();
        Self {
            mortality: self.mortality / sum,
            readmission: self.readmission / sum,
            infection: self.infection / sum,
            patient_experience: self.patient_experience / sum,
        }
    }
}

// Default weights for the composite score - mortality carries the most
// weight, patient experience the least
fn default_mortality_weight() -> f64 {
    0.30
}
fn default_readmission_weight() -> f64 {
    0.25
}
fn default_infection_weight() -> f64 {
    0.25
}
fn default_patient_experience_weight() -> f64 {
    0.20
}

/// Requested cluster count: a fixed value, or the silhouette-recommended k.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KChoice {
    /// Use the k that maximizes mean silhouette over the search range
    Auto,
    /// Use exactly this many clusters
    #[serde(untagged)]
    Fixed(usize),
}

impl FromStr for KChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(KChoice::Auto);
        }
        s.parse::<usize>()
            .map(KChoice::Fixed)
            .map_err(|_| format!("expected a cluster count or \"auto\", got {s:?}"))
    }
}

impl std::fmt::Display for KChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KChoice::Auto => write!(f, "auto"),
            KChoice::Fixed(k) => write!(f, "{k}"),
        }
    }
}

/// Configuration for the cluster engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Operational cluster count, or "auto" for the silhouette recommendation
    #[serde(default = "default_k")]
    pub k: KChoice,

    /// Upper bound of the k-selection sweep (inclusive)
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Random restarts of the centroid algorithm
    #[serde(default = "default_restarts")]
    pub restarts: usize,

    /// Iteration cap per restart
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Seed for the centroid algorithm's random initialization
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            max_k: default_max_k(),
            restarts: default_restarts(),
            max_iterations: default_max_iterations(),
            seed: default_seed(),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let KChoice::Fixed(k) = self.k {
            if k < 2 {
                return Err(format!("k must be at least 2, got {k}"));
            }
        }
        if self.max_k < 2 {
            return Err(format!("max_k must be at least 2, got {}", self.max_k));
        }
        if self.restarts < 10 {
            return Err(format!(
                "restarts must be at least 10 to escape poor local optima, got {}",
                self.restarts
            ));
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be positive".to_string());
        }
        Ok(())
    }
}

fn default_k() -> KChoice {
    KChoice::Fixed(4)
}
fn default_max_k() -> usize {
    10
}
fn default_restarts() -> usize {
    25
}
fn default_max_iterations() -> usize {
    100
}
fn default_seed() -> u64 {
    42
}

/// Configuration for the upstream cleaning pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// IQR multiplier for the outlier fences; values beyond
    /// [Q1 - m*IQR, Q3 + m*IQR] are clamped to the fence
    #[serde(default = "default_outlier_iqr_multiplier")]
    pub outlier_iqr_multiplier: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            outlier_iqr_multiplier: default_outlier_iqr_multiplier(),
        }
    }
}

impl CleaningConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.outlier_iqr_multiplier.is_finite() || self.outlier_iqr_multiplier <= 0.0 {
            return Err(format!(
                "outlier_iqr_multiplier must be a positive number, got {}",
                self.outlier_iqr_multiplier
            ));
        }
        Ok(())
    }
}

fn default_outlier_iqr_multiplier() -> f64 {
    1.5
}

/// Full pipeline configuration, passed by value through every stage entry
/// point. There is no ambient or global configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Size of the national top/bottom extracts
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub weights: ScoreWeights,

    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub cleaning: CleaningConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            weights: ScoreWeights::default(),
            cluster: ClusterConfig::default(),
            cleaning: CleaningConfig::default(),
        }
    }
}

fn default_top_n() -> usize {
    10
}

impl AnalysisConfig {
    /// Load a configuration from a TOML file. Missing keys fall back to
    /// their defaults; the result is not yet validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        self.weights.validate()?;
        self.cluster.validate()?;
        self.cleaning.validate()?;
        if self.top_n == 0 {
            return Err("top_n must be positive".to_string());
        }
        Ok(())
    }
}
