// Export modules for library usage
pub mod aggregation;
pub mod cli;
pub mod clustering;
pub mod commands;
pub mod config;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod scoring;

// Re-export commonly used types
pub use crate::core::{
    Error, HospitalQuality, HospitalRecord, Metric, NormalizedScores, PerformanceCategory,
    RankInfo, Result,
};

pub use crate::config::{AnalysisConfig, CleaningConfig, ClusterConfig, KChoice, ScoreWeights};

pub use crate::clustering::{
    Algorithm, AlgorithmRun, ClusterLabel, ClusterSummary, ClusteringReport, KCandidate,
};

pub use crate::aggregation::{Aggregates, HospitalExtract, StateExtremes, StateSummary};

pub use crate::io::output::{OutputFormat, OutputWriter};

pub use crate::pipeline::QualityAnalysis;
