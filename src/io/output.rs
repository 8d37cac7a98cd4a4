use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use colored::*;

use crate::clustering::AlgorithmRun;
use crate::pipeline::QualityAnalysis;

#[derive(Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Terminal,
}

pub trait OutputWriter {
    fn write_report(&mut self, analysis: &QualityAnalysis) -> anyhow::Result<()>;
}

/// Full-precision JSON report; the machine-readable interface to the
/// dashboard. Nothing is rounded here.
pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, analysis: &QualityAnalysis) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(analysis)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Human-readable summary for the terminal. Scores are rounded for
/// display only.
pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, analysis: &QualityAnalysis) -> anyhow::Result<()> {
        self.write_header(analysis)?;
        self.write_leaderboards(analysis)?;
        self.write_clustering(analysis)?;
        self.write_states(analysis)?;
        Ok(())
    }
}

impl<W: Write> TerminalWriter<W> {
    fn write_header(&mut self, analysis: &QualityAnalysis) -> anyhow::Result<()> {
        writeln!(self.writer, "Hospital Quality Analysis")?;
        writeln!(self.writer, "=========================")?;
        writeln!(
            self.writer,
            "Generated: {}",
            analysis.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            self.writer,
            "Cohort: {} hospitals across {} states",
            analysis.hospitals.len().to_string().bold(),
            analysis.aggregates.state_summaries.len()
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_leaderboards(&mut self, analysis: &QualityAnalysis) -> anyhow::Result<()> {
        writeln!(self.writer, "Top hospitals by quality score")?;
        for extract in &analysis.aggregates.national_top {
            writeln!(
                self.writer,
                "  {:>4}.  {:<10} {:<2}  {:>6}  {}",
                extract.national_rank,
                extract.hospital_id,
                extract.state,
                format!("{:.2}", extract.quality_score).green(),
                "*".repeat(extract.star_rating as usize)
            )?;
        }
        writeln!(self.writer)?;

        writeln!(self.writer, "Bottom hospitals by quality score")?;
        for extract in &analysis.aggregates.national_bottom {
            writeln!(
                self.writer,
                "  {:>4}.  {:<10} {:<2}  {:>6}  {}",
                extract.national_rank,
                extract.hospital_id,
                extract.state,
                format!("{:.2}", extract.quality_score).red(),
                "*".repeat(extract.star_rating as usize)
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_clustering(&mut self, analysis: &QualityAnalysis) -> anyhow::Result<()> {
        let Some(report) = &analysis.clustering else {
            writeln!(
                self.writer,
                "Clustering: {}",
                "skipped (cohort too small for the requested k)".yellow()
            )?;
            writeln!(self.writer)?;
            return Ok(());
        };

        writeln!(
            self.writer,
            "Clustering (k = {}, recommended k = {})",
            report.k,
            report
                .recommended_k
                .map_or_else(|| "none".to_string(), |k| k.to_string())
        )?;
        match report.better_separation {
            Some(algorithm) => writeln!(
                self.writer,
                "Better separation: {}",
                algorithm.to_string().cyan()
            )?,
            None => writeln!(self.writer, "Both algorithms separated the cohort equally")?,
        }
        for run in [&report.kmeans, &report.ward] {
            self.write_cluster_table(run)?;
        }
        Ok(())
    }

    fn write_cluster_table(&mut self, run: &AlgorithmRun) -> anyhow::Result<()> {
        let silhouette = run
            .mean_silhouette
            .map_or_else(|| "undefined".to_string(), |s| format!("{s:.3}"));
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "  {} (mean silhouette {silhouette})",
            run.algorithm.to_string().bold()
        )?;
        for summary in &run.summaries {
            writeln!(
                self.writer,
                "    cluster {}: {:>4} hospitals, avg quality {:>6.2}  {}",
                summary.cluster_id,
                summary.n_hospitals,
                summary.avg_quality_score,
                summary.cluster_label
            )?;
        }
        Ok(())
    }

    fn write_states(&mut self, analysis: &QualityAnalysis) -> anyhow::Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "State summaries")?;
        writeln!(
            self.writer,
            "  {:<5} {:>5} {:>8} {:>8} {:>6} {:>6}",
            "state", "n", "mean", "median", "%exc", "%poor"
        )?;
        for summary in &analysis.aggregates.state_summaries {
            writeln!(
                self.writer,
                "  {:<5} {:>5} {:>8.2} {:>8.2} {:>6.1} {:>6.1}",
                summary.state,
                summary.n_hospitals,
                summary.mean_quality_score,
                summary.median_quality_score,
                summary.pct_excellent,
                summary.pct_poor
            )?;
        }
        Ok(())
    }
}

/// Write the flat report tables as CSV files under `dir`: the full
/// hospital table, one cluster summary per algorithm, the k-selection
/// curve, and the aggregate extracts. Scores are rounded to display
/// precision.
pub fn write_csv_tables(analysis: &QualityAnalysis, dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    write_hospitals_csv(analysis, &dir.join("hospitals.csv"))?;
    if let Some(report) = &analysis.clustering {
        write_cluster_csv(&report.kmeans, &dir.join("kmeans_clusters.csv"))?;
        write_cluster_csv(&report.ward, &dir.join("ward_clusters.csv"))?;
        write_k_selection_csv(report, &dir.join("k_selection.csv"))?;
    }
    write_state_summaries_csv(analysis, &dir.join("state_summaries.csv"))?;
    write_extract_csv(&analysis.aggregates.national_top, &dir.join("national_top.csv"))?;
    write_extract_csv(
        &analysis.aggregates.national_bottom,
        &dir.join("national_bottom.csv"),
    )?;
    Ok(())
}

fn write_hospitals_csv(analysis: &QualityAnalysis, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writer.write_record([
        "hospital_id",
        "name",
        "state",
        "mortality_rate",
        "readmission_rate",
        "infection_rate",
        "patient_experience_score",
        "mortality_score",
        "readmission_score",
        "infection_score",
        "patient_exp_score",
        "quality_score",
        "star_rating",
        "performance_category",
        "state_rank",
        "state_percentile",
        "national_rank",
        "national_percentile",
        "kmeans_cluster",
        "ward_cluster",
    ])?;
    for row in &analysis.hospitals {
        writer.write_record([
            row.hospital_id.clone(),
            row.name.clone().unwrap_or_default(),
            row.state.clone(),
            format!("{:.2}", row.mortality_rate),
            format!("{:.2}", row.readmission_rate),
            format!("{:.2}", row.infection_rate),
            format!("{:.2}", row.patient_experience_score),
            format!("{:.2}", row.mortality_score),
            format!("{:.2}", row.readmission_score),
            format!("{:.2}", row.infection_score),
            format!("{:.2}", row.patient_exp_score),
            format!("{:.2}", row.quality_score),
            row.star_rating.to_string(),
            row.performance_category.to_string(),
            row.state_rank.to_string(),
            format!("{:.1}", row.state_percentile),
            row.national_rank.to_string(),
            format!("{:.1}", row.national_percentile),
            row.kmeans_cluster.map_or_else(String::new, |c| c.to_string()),
            row.ward_cluster.map_or_else(String::new, |c| c.to_string()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_cluster_csv(run: &AlgorithmRun, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writer.write_record([
        "cluster_id",
        "n_hospitals",
        "avg_mortality_score",
        "avg_readmission_score",
        "avg_infection_score",
        "avg_patient_exp_score",
        "avg_quality_score",
        "cluster_label",
    ])?;
    for summary in &run.summaries {
        writer.write_record([
            summary.cluster_id.to_string(),
            summary.n_hospitals.to_string(),
            format!("{:.2}", summary.avg_mortality_score),
            format!("{:.2}", summary.avg_readmission_score),
            format!("{:.2}", summary.avg_infection_score),
            format!("{:.2}", summary.avg_patient_exp_score),
            format!("{:.2}", summary.avg_quality_score),
            summary.cluster_label.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_k_selection_csv(
    report: &crate::clustering::ClusteringReport,
    path: &Path,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writer.write_record(["k", "wss", "mean_silhouette"])?;
    for candidate in &report.sweep {
        writer.write_record([
            candidate.k.to_string(),
            format!("{:.4}", candidate.wss),
            candidate
                .mean_silhouette
                .map_or_else(String::new, |s| format!("{s:.4}")),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_state_summaries_csv(analysis: &QualityAnalysis, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writer.write_record([
        "state",
        "n_hospitals",
        "mean_quality_score",
        "median_quality_score",
        "mean_mortality_rate",
        "mean_readmission_rate",
        "mean_infection_rate",
        "mean_patient_experience_score",
        "pct_excellent",
        "pct_poor",
    ])?;
    for summary in &analysis.aggregates.state_summaries {
        writer.write_record([
            summary.state.clone(),
            summary.n_hospitals.to_string(),
            format!("{:.2}", summary.mean_quality_score),
            format!("{:.2}", summary.median_quality_score),
            format!("{:.2}", summary.mean_mortality_rate),
            format!("{:.2}", summary.mean_readmission_rate),
            format!("{:.2}", summary.mean_infection_rate),
            format!("{:.2}", summary.mean_patient_experience_score),
            format!("{:.1}", summary.pct_excellent),
            format!("{:.1}", summary.pct_poor),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_extract_csv(
    extracts: &[crate::aggregation::HospitalExtract],
    path: &Path,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writer.write_record([
        "hospital_id",
        "name",
        "state",
        "quality_score",
        "star_rating",
        "national_rank",
    ])?;
    for extract in extracts {
        writer.write_record([
            extract.hospital_id.clone(),
            extract.name.clone().unwrap_or_default(),
            extract.state.clone(),
            format!("{:.2}", extract.quality_score),
            extract.star_rating.to_string(),
            extract.national_rank.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
