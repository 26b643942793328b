//! Benchmark configuration and input classification.

use std::path::{Path, PathBuf};

/// Configuration for a benchmark run, produced by `Cli::into_config()`.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Candidate input files, in CLI order.
    pub files: Vec<PathBuf>,
    /// Ordered codec names to benchmark.
    pub codec_names: Vec<String>,
    /// Codec used for the one-time baseline decompress of each input.
    pub baseline: String,
    /// Compress/decompress cycles per (file, codec).
    pub iterations: usize,
    /// Required input extension (without the leading dot), e.g. `fastq.gz`.
    pub extension: String,
    /// Byte-compare each decompress output against the baseline.
    pub verify: bool,
    /// Colored console output.
    pub color: bool,
    /// Verbose logging requested.
    pub verbose: bool,
    /// Optional JSON report path.
    pub json: Option<PathBuf>,
}

impl BenchConfig {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            codec_names: crate::codec::codec_names()
                .into_iter()
                .map(String::from)
                .collect(),
            baseline: "gzip".to_string(),
            iterations: 2,
            extension: "fastq.gz".to_string(),
            verify: false,
            color: false,
            verbose: false,
            json: None,
        }
    }
}

/// Why an input was excluded from the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The filename does not end with the configured extension.
    ExtensionMismatch,
    /// The path does not exist or is not a regular file.
    NotAFile,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExtensionMismatch => write!(f, "extension mismatch"),
            Self::NotAFile => write!(f, "not a regular file"),
        }
    }
}

/// A classified input path.
#[derive(Debug, Clone)]
pub enum InputFile {
    /// Eligible for benchmarking.
    Benchmark(PathBuf),
    /// Excluded; the run records and logs the reason instead of silently
    /// dropping the argument.
    Skipped { path: PathBuf, reason: SkipReason },
}

/// Classify a CLI path argument against the configured extension.
pub fn classify(path: &Path, extension: &str) -> InputFile {
    if !matches_extension(path, extension) {
        return InputFile::Skipped {
            path: path.to_path_buf(),
            reason: SkipReason::ExtensionMismatch,
        };
    }
    if !path.is_file() {
        return InputFile::Skipped {
            path: path.to_path_buf(),
            reason: SkipReason::NotAFile,
        };
    }
    InputFile::Benchmark(path.to_path_buf())
}

/// True if the file name ends with `.{extension}`.
fn matches_extension(path: &Path, extension: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let dotted = format!(".{extension}");
    name.ends_with(&dotted) && name.len() > dotted.len()
}
