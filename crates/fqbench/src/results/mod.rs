//! Results processing: console output, aggregate statistics, and the
//! structured JSON report.

pub mod printer;
pub mod stats;

pub use printer::{format_duration, format_size, BenchPrinter};
pub use stats::{compute_stats, CodecStats, ElapsedStats};

use std::path::Path;

use serde::Serialize;

use crate::bench::{FileReport, FileState, RunResult, RunSummary};
use crate::config::BenchConfig;

/// JSON-serializable report for downstream analysis.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub metadata: ReportMetadata,
    pub files: Vec<FileReportJson>,
    pub results: Vec<RunResultJson>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub platform: String,
    pub fqbench_version: String,
    pub iterations: usize,
    pub codecs: Vec<String>,
    pub extension: String,
    pub verify: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReportJson {
    pub path: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_bytes: Option<u64>,
}

impl FileReportJson {
    fn from_report(report: &FileReport) -> Self {
        let error = match &report.state {
            FileState::AbortedRestored { error } => Some(error.clone()),
            FileState::Skipped { reason } => Some(reason.to_string()),
            FileState::Restored => None,
        };
        Self {
            path: report.path.display().to_string(),
            state: report.state.label().to_string(),
            error,
            baseline_bytes: report.baseline_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResultJson {
    pub file: String,
    pub codec: String,
    pub iteration: usize,
    pub compress_ms: f64,
    pub compressed_bytes: u64,
    pub decompress_ms: f64,
    pub decompressed_bytes: u64,
}

impl RunResultJson {
    fn from_result(result: &RunResult) -> Self {
        Self {
            file: result.file.display().to_string(),
            codec: result.codec.clone(),
            iteration: result.iteration,
            compress_ms: result.compress_elapsed.as_secs_f64() * 1000.0,
            compressed_bytes: result.compressed_bytes,
            decompress_ms: result.decompress_elapsed.as_secs_f64() * 1000.0,
            decompressed_bytes: result.decompressed_bytes,
        }
    }
}

/// Assemble the structured report for a finished run.
pub fn build_report(summary: &RunSummary, config: &BenchConfig) -> BenchReport {
    BenchReport {
        metadata: ReportMetadata {
            timestamp: chrono::Utc::now().to_rfc3339(),
            platform: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
            fqbench_version: env!("CARGO_PKG_VERSION").to_string(),
            iterations: config.iterations,
            codecs: config.codec_names.clone(),
            extension: config.extension.clone(),
            verify: config.verify,
        },
        files: summary.files.iter().map(FileReportJson::from_report).collect(),
        results: summary.results.iter().map(RunResultJson::from_result).collect(),
    }
}

/// Export the structured report to a JSON file.
pub fn export_json(
    summary: &RunSummary,
    config: &BenchConfig,
    path: &Path,
) -> anyhow::Result<()> {
    let report = build_report(summary, config);
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn summary() -> RunSummary {
        RunSummary {
            results: vec![RunResult {
                file: PathBuf::from("/data/reads.fastq.gz"),
                codec: "gzip".to_string(),
                iteration: 1,
                compress_elapsed: Duration::from_millis(120),
                compressed_bytes: 400,
                decompress_elapsed: Duration::from_millis(60),
                decompressed_bytes: 1000,
            }],
            files: vec![FileReport {
                path: PathBuf::from("/data/reads.fastq.gz"),
                baseline_bytes: Some(1000),
                state: FileState::Restored,
            }],
        }
    }

    #[test]
    fn report_carries_config_and_results() {
        let config = BenchConfig::new(vec![PathBuf::from("/data/reads.fastq.gz")]);
        let report = build_report(&summary(), &config);

        assert_eq!(report.metadata.iterations, 2);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].codec, "gzip");
        assert!((report.results[0].compress_ms - 120.0).abs() < 1e-9);
        assert_eq!(report.files[0].state, "restored");
        assert!(report.files[0].error.is_none());
    }

    #[test]
    fn export_writes_parseable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let config = BenchConfig::new(vec![]);

        export_json(&summary(), &config, &path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["results"][0]["compressed_bytes"], 400);
        assert_eq!(parsed["metadata"]["codecs"][0], "gzip");
    }

    #[test]
    fn aborted_file_serializes_its_error() {
        let mut s = summary();
        s.files[0].state = FileState::AbortedRestored {
            error: "codec bzip2 failed".to_string(),
        };
        let config = BenchConfig::new(vec![]);
        let report = build_report(&s, &config);
        assert_eq!(report.files[0].state, "aborted (restored)");
        assert_eq!(report.files[0].error.as_deref(), Some("codec bzip2 failed"));
    }
}
