//! Benchmark execution: result records, the restore guard, and the runner.

mod guard;
mod runner;

pub use guard::RestoreGuard;
pub use runner::BenchmarkRunner;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::codec::CodecError;
use crate::config::SkipReason;

/// One measured compress/decompress cycle for a (file, codec, iteration)
/// triple. Immutable once recorded.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub file: PathBuf,
    pub codec: String,
    /// 1-based iteration index.
    pub iteration: usize,
    pub compress_elapsed: Duration,
    pub compressed_bytes: u64,
    pub decompress_elapsed: Duration,
    pub decompressed_bytes: u64,
}

/// Terminal state of one input file's benchmark.
#[derive(Debug, Clone)]
pub enum FileState {
    /// All cycles completed and the original was restored.
    Restored,
    /// A cycle failed; the original was still restored. Partial results
    /// collected before the failure are retained.
    AbortedRestored { error: String },
    /// Excluded before benchmarking started.
    Skipped { reason: SkipReason },
}

impl FileState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Restored => "restored",
            Self::AbortedRestored { .. } => "aborted (restored)",
            Self::Skipped { .. } => "skipped",
        }
    }
}

/// Per-file outcome.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    /// Size of the uncompressed baseline, once known.
    pub baseline_bytes: Option<u64>,
    pub state: FileState,
}

/// Everything a run produced, in (file, iteration, codec) insertion order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<RunResult>,
    pub files: Vec<FileReport>,
}

impl RunSummary {
    /// True if any file's benchmark aborted mid-run.
    pub fn any_aborted(&self) -> bool {
        self.files
            .iter()
            .any(|f| matches!(f.state, FileState::AbortedRestored { .. }))
    }

    /// Number of files that actually ran (skips excluded).
    pub fn benchmarked_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !matches!(f.state, FileState::Skipped { .. }))
            .count()
    }
}

/// Harness-level failures.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Could not create the backup copy that the restore contract depends
    /// on. Nothing has been touched yet when this fires.
    #[error("failed to back up {path}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backup could not be copied back over the working file. This
    /// risks data loss and must reach the operator immediately.
    #[error("failed to restore {path} from backup {backup}")]
    RestoreFailed {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external tool invocation failed; fatal for this file's run.
    #[error("codec {codec} failed on {}", file.display())]
    Codec {
        codec: String,
        file: PathBuf,
        #[source]
        source: CodecError,
    },

    /// `--verify`: a codec's decompress output differs from the baseline.
    #[error("round-trip mismatch: {codec} output differs from baseline for {}", file.display())]
    RoundTripMismatch { codec: String, file: PathBuf },

    /// Filesystem bookkeeping (sizing artifacts, re-seeding the working
    /// file) failed.
    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operator requested shutdown (Ctrl+C).
    #[error("interrupted")]
    Interrupted,
}
