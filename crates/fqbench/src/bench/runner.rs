//! The sequential measurement loop.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::codec::{CodecAdapter, Executor};
use crate::config::{classify, BenchConfig, InputFile};
use crate::results::BenchPrinter;

use super::{FileReport, FileState, HarnessError, RestoreGuard, RunResult, RunSummary};

/// Executes compress/decompress cycles for each input file.
///
/// Strictly sequential: one file, one codec, one iteration at a time.
/// Benchmarks intentionally measure unshared use of disk and CPU, so
/// parallelism would invalidate the timings.
pub struct BenchmarkRunner {
    config: BenchConfig,
    codecs: Vec<Box<dyn CodecAdapter>>,
    baseline: Box<dyn CodecAdapter>,
    executor: Arc<dyn Executor>,
    shutdown: Arc<AtomicBool>,
}

impl BenchmarkRunner {
    pub fn new(
        config: BenchConfig,
        codecs: Vec<Box<dyn CodecAdapter>>,
        baseline: Box<dyn CodecAdapter>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            config,
            codecs,
            baseline,
            executor,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use an externally-owned shutdown flag (set from the Ctrl+C handler).
    /// The runner polls it between external invocations so an interrupt
    /// unwinds through the restore guards instead of killing the process
    /// with backups still on disk.
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = flag;
        self
    }

    fn should_stop(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    fn check_interrupted(&self) -> Result<(), HarnessError> {
        if self.should_stop() {
            return Err(HarnessError::Interrupted);
        }
        Ok(())
    }

    /// Run every eligible file through every codec for the configured
    /// number of iterations.
    ///
    /// Failures are isolated per file: a codec failure aborts that file's
    /// run (after restoring it) and the loop moves on. A restore failure is
    /// fatal for the whole run since it risks data loss.
    pub fn run(&self) -> Result<RunSummary, HarnessError> {
        let printer = BenchPrinter::new(self.config.color);
        let mut summary = RunSummary::default();

        for path in &self.config.files {
            match classify(path, &self.config.extension) {
                InputFile::Skipped { path, reason } => {
                    tracing::warn!("skipping {}: {}", path.display(), reason);
                    printer.print_skip(&path, reason);
                    summary.files.push(FileReport {
                        path,
                        baseline_bytes: None,
                        state: FileState::Skipped { reason },
                    });
                }
                InputFile::Benchmark(path) => {
                    printer.print_file_header(&path);
                    let mut baseline_bytes = None;
                    let outcome = self.bench_file(
                        &path,
                        &printer,
                        &mut summary.results,
                        &mut baseline_bytes,
                    );
                    match outcome {
                        Ok(()) => {
                            printer.print_restored(&path);
                            summary.files.push(FileReport {
                                path,
                                baseline_bytes,
                                state: FileState::Restored,
                            });
                        }
                        Err(e @ HarnessError::RestoreFailed { .. }) => return Err(e),
                        Err(HarnessError::Interrupted) => {
                            summary.files.push(FileReport {
                                path,
                                baseline_bytes,
                                state: FileState::AbortedRestored {
                                    error: "interrupted".to_string(),
                                },
                            });
                            return Err(HarnessError::Interrupted);
                        }
                        Err(e) => {
                            tracing::error!("benchmark of {} aborted: {:#}", path.display(), e);
                            printer.print_abort(&path, &e.to_string());
                            summary.files.push(FileReport {
                                path,
                                baseline_bytes,
                                state: FileState::AbortedRestored {
                                    error: e.to_string(),
                                },
                            });
                        }
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Benchmark one file. Results are pushed into `results` as they are
    /// measured so partial work survives an abort. The original file is
    /// restored on every exit path via [`RestoreGuard`].
    fn bench_file(
        &self,
        path: &Path,
        printer: &BenchPrinter,
        results: &mut Vec<RunResult>,
        baseline_bytes: &mut Option<u64>,
    ) -> Result<(), HarnessError> {
        self.check_interrupted()?;
        let mut guard = RestoreGuard::new(path)?;
        let outcome = self.run_cycles(path, &mut guard, printer, results, baseline_bytes);

        // Restore explicitly on success and on failure. A restore failure
        // risks data loss and outranks whatever stopped the cycles.
        guard.finish()?;
        outcome
    }

    /// Baseline decompress plus the (iteration, codec) cycle loop. The
    /// caller owns the guard so restoration is decided on both outcomes.
    fn run_cycles(
        &self,
        path: &Path,
        guard: &mut RestoreGuard,
        printer: &BenchPrinter,
        results: &mut Vec<RunResult>,
        baseline_bytes: &mut Option<u64>,
    ) -> Result<(), HarnessError> {
        // One-time decompress of the source to get the uncompressed
        // working file every codec will be measured against.
        let baseline_run = self
            .baseline
            .decompress(path, self.executor.as_ref())
            .map_err(|source| HarnessError::Codec {
                codec: self.baseline.name().to_string(),
                file: path.to_path_buf(),
                source,
            })?;
        let working = baseline_run.output;
        guard.track(working.clone());

        let size = file_size(&working)?;
        *baseline_bytes = Some(size);
        printer.print_baseline(&working, size);

        // Second backup: in-place tools consume the working file, so each
        // cycle re-seeds it from this copy.
        let seed = super::guard::backup_path(&working);
        fs::copy(&working, &seed).map_err(|source| HarnessError::BackupFailed {
            path: working.clone(),
            source,
        })?;
        guard.track(seed.clone());

        for iteration in 1..=self.config.iterations {
            for codec in &self.codecs {
                self.check_interrupted()?;
                self.run_cycle(
                    path,
                    codec.as_ref(),
                    iteration,
                    &working,
                    &seed,
                    guard,
                    printer,
                    results,
                )?;
            }
        }

        Ok(())
    }

    /// One compress/decompress cycle for a single codec.
    #[allow(clippy::too_many_arguments)]
    fn run_cycle(
        &self,
        source: &Path,
        codec: &dyn CodecAdapter,
        iteration: usize,
        working: &Path,
        seed: &Path,
        guard: &mut RestoreGuard,
        printer: &BenchPrinter,
        results: &mut Vec<RunResult>,
    ) -> Result<(), HarnessError> {
        let codec_err = |err: crate::codec::CodecError| HarnessError::Codec {
            codec: codec.name().to_string(),
            file: source.to_path_buf(),
            source: err,
        };

        // Re-seed if the previous cycle's tool consumed the working file.
        if !working.exists() {
            fs::copy(seed, working).map_err(|source| HarnessError::Io {
                path: working.to_path_buf(),
                source,
            })?;
        }

        let compressed = codec
            .compress(working, self.executor.as_ref())
            .map_err(&codec_err)?;
        guard.track(compressed.output.clone());
        let compressed_bytes = file_size(&compressed.output)?;

        self.check_interrupted()?;

        let decompressed = codec
            .decompress(&compressed.output, self.executor.as_ref())
            .map_err(&codec_err)?;
        let decompressed_bytes = file_size(&decompressed.output)?;

        if self.config.verify {
            self.verify_round_trip(codec, seed, &decompressed.output)?;
        }

        // Tools differ in whether they delete the compressed artifact on
        // decompress; remove whatever survived. The decompressed output is
        // the working file for the next cycle and stays.
        remove_if_present(&compressed.output)?;

        let result = RunResult {
            file: source.to_path_buf(),
            codec: codec.name().to_string(),
            iteration,
            compress_elapsed: compressed.elapsed,
            compressed_bytes,
            decompress_elapsed: decompressed.elapsed,
            decompressed_bytes,
        };
        printer.print_cycle(&result);
        results.push(result);
        Ok(())
    }

    /// Byte-compare a decompress output against the baseline seed copy.
    fn verify_round_trip(
        &self,
        codec: &dyn CodecAdapter,
        seed: &Path,
        output: &Path,
    ) -> Result<(), HarnessError> {
        let expected = fs::read(seed).map_err(|source| HarnessError::Io {
            path: seed.to_path_buf(),
            source,
        })?;
        let actual = fs::read(output).map_err(|source| HarnessError::Io {
            path: output.to_path_buf(),
            source,
        })?;
        if expected != actual {
            return Err(HarnessError::RoundTripMismatch {
                codec: codec.name().to_string(),
                file: output.to_path_buf(),
            });
        }
        tracing::debug!("{}: round-trip verified ({} bytes)", codec.name(), actual.len());
        Ok(())
    }
}

fn file_size(path: &Path) -> Result<u64, HarnessError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn remove_if_present(path: &Path) -> Result<(), HarnessError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(HarnessError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
