//! CSV ingestion and upstream cleaning.
//!
//! The loader produces the uniform record set the pipeline consumes:
//! one row per hospital, metrics present or explicitly missing. Cleaning
//! clamps outliers to IQR fences and imputes remaining gaps with the
//! metric median, so scoring-critical fields reach the scorer complete.

use std::collections::HashSet;
use std::path::Path;

use csv::ReaderBuilder;
use log::{info, warn};
use serde::Deserialize;

use crate::config::CleaningConfig;
use crate::core::{stats, Error, HospitalRecord, Metric, Result};

#[derive(Debug, Deserialize)]
struct RawRow {
    hospital_id: String,
    #[serde(default, alias = "hospital_name")]
    name: Option<String>,
    state: String,
    #[serde(default)]
    mortality_rate: Option<f64>,
    #[serde(default)]
    readmission_rate: Option<f64>,
    #[serde(default)]
    infection_rate: Option<f64>,
    #[serde(default)]
    patient_experience_score: Option<f64>,
}

impl RawRow {
    fn into_record(self) -> HospitalRecord {
        let mut record = HospitalRecord {
            hospital_id: self.hospital_id,
            name: self.name.filter(|n| !n.is_empty()),
            state: self.state,
            mortality_rate: self.mortality_rate,
            readmission_rate: self.readmission_rate,
            infection_rate: self.infection_rate,
            patient_experience_score: self.patient_experience_score,
        };
        // Non-finite values cannot be scored; treat them as missing so
        // imputation handles them like any other gap
        for metric in Metric::ALL {
            if let Some(value) = record.metric(metric) {
                if !value.is_finite() {
                    warn!(
                        "{}: non-finite {} treated as missing",
                        record.hospital_id,
                        metric.column()
                    );
                    record.set_metric(metric, None);
                }
            }
        }
        record
    }
}

/// Load hospital records from a headered CSV file.
///
/// Empty metric cells become missing values. Duplicate hospital ids are
/// rejected outright; every downstream join keys on them.
pub fn load_records(path: &Path) -> Result<Vec<HospitalRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    for row in reader.deserialize::<RawRow>() {
        let record = row?.into_record();
        if !seen.insert(record.hospital_id.clone()) {
            return Err(Error::DuplicateId(record.hospital_id));
        }
        records.push(record);
    }

    info!("loaded {} hospital records from {}", records.len(), path.display());
    Ok(records)
}

/// Write a raw cohort back out as CSV, in the same shape `load_records`
/// reads. Missing metrics become empty cells.
pub fn write_records(records: &[HospitalRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "hospital_id",
        "name",
        "state",
        "mortality_rate",
        "readmission_rate",
        "infection_rate",
        "patient_experience_score",
    ])?;
    let cell = |value: Option<f64>| value.map_or_else(String::new, |v| v.to_string());
    for record in records {
        writer.write_record([
            record.hospital_id.clone(),
            record.name.clone().unwrap_or_default(),
            record.state.clone(),
            cell(record.mortality_rate),
            cell(record.readmission_rate),
            cell(record.infection_rate),
            cell(record.patient_experience_score),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Clean a cohort: clamp each metric to its IQR fences, then impute
/// missing values with the metric's post-clamp median.
///
/// Returns a new table; the input cohort is left untouched. A metric with
/// no observed values at all stays missing and is left for the scorer to
/// refuse, since inventing a cohort-wide constant would be fabrication.
pub fn clean_records(records: &[HospitalRecord], config: &CleaningConfig) -> Vec<HospitalRecord> {
    let mut cleaned = records.to_vec();
    for metric in Metric::ALL {
        clamp_outliers(&mut cleaned, metric, config.outlier_iqr_multiplier);
        impute_missing(&mut cleaned, metric);
    }
    cleaned
}

fn clamp_outliers(records: &mut [HospitalRecord], metric: Metric, multiplier: f64) {
    let observed: Vec<f64> = records.iter().filter_map(|r| r.metric(metric)).collect();
    let (Some(q1), Some(q3)) = (stats::quantile(&observed, 0.25), stats::quantile(&observed, 0.75))
    else {
        return;
    };

    let iqr = q3 - q1;
    let lo = q1 - multiplier * iqr;
    let hi = q3 + multiplier * iqr;

    let mut clamped = 0usize;
    for record in records.iter_mut() {
        if let Some(value) = record.metric(metric) {
            if value < lo || value > hi {
                record.set_metric(metric, Some(value.clamp(lo, hi)));
                clamped += 1;
            }
        }
    }
    if clamped > 0 {
        info!(
            "{}: clamped {clamped} outlier value(s) to [{lo:.3}, {hi:.3}]",
            metric.column()
        );
    }
}

fn impute_missing(records: &mut [HospitalRecord], metric: Metric) {
    let observed: Vec<f64> = records.iter().filter_map(|r| r.metric(metric)).collect();
    let Some(median) = stats::median(&observed) else {
        warn!(
            "{}: no observed values to impute from; leaving gaps in place",
            metric.column()
        );
        return;
    };

    let mut imputed = 0usize;
    for record in records.iter_mut() {
        if record.metric(metric).is_none() {
            record.set_metric(metric, Some(median));
            imputed += 1;
        }
    }
    if imputed > 0 {
        info!("{}: imputed {imputed} missing value(s) with median {median:.3}", metric.column());
    }
}
