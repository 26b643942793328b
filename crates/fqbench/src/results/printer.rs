//! Console output for the benchmark run.

use std::path::Path;
use std::time::Duration;

use owo_colors::OwoColorize;

use crate::bench::RunResult;
use crate::config::SkipReason;

use super::stats::CodecStats;

/// Formats run progress and the final summary on stdout.
pub struct BenchPrinter {
    color: bool,
}

impl BenchPrinter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn print_file_header(&self, path: &Path) {
        println!();
        if self.color {
            println!("{} {}", "Benchmarking".cyan().bold(), path.display());
        } else {
            println!("Benchmarking {}", path.display());
        }
    }

    pub fn print_baseline(&self, path: &Path, bytes: u64) {
        println!(
            "  baseline: {} ({})",
            path.display(),
            format_size(bytes)
        );
    }

    pub fn print_cycle(&self, result: &RunResult) {
        let line = format!(
            "  [iter {}] {:<10} compress {:>9} -> {:>10}   decompress {:>9} -> {:>10}",
            result.iteration,
            result.codec,
            format_duration(result.compress_elapsed),
            format_size(result.compressed_bytes),
            format_duration(result.decompress_elapsed),
            format_size(result.decompressed_bytes),
        );
        if self.color {
            println!("{}", line.dimmed());
        } else {
            println!("{line}");
        }
    }

    pub fn print_skip(&self, path: &Path, reason: SkipReason) {
        if self.color {
            println!(
                "{} {} ({reason})",
                "Skipping".yellow().bold(),
                path.display()
            );
        } else {
            println!("Skipping {} ({reason})", path.display());
        }
    }

    pub fn print_abort(&self, path: &Path, error: &str) {
        if self.color {
            println!(
                "{} {} - {error} (original restored)",
                "Aborted".red().bold(),
                path.display()
            );
        } else {
            println!("Aborted {} - {error} (original restored)", path.display());
        }
    }

    pub fn print_restored(&self, path: &Path) {
        if self.color {
            println!("  {} {}", "restored".green(), path.display());
        } else {
            println!("  restored {}", path.display());
        }
    }

    /// Final per-(file, codec) summary.
    ///
    /// Example output:
    /// ```text
    /// Summary: reads.fastq.gz
    ///   gzip       compress 1.20 s (1.10 s ... 1.30 s)   size 34.1 MB (ratio 0.34)   decompress 450 ms
    /// ```
    pub fn print_summary(&self, stats: &[CodecStats]) {
        if stats.is_empty() {
            return;
        }

        let mut current_file: Option<&Path> = None;
        println!();
        for s in stats {
            if current_file != Some(s.file.as_path()) {
                current_file = Some(s.file.as_path());
                if self.color {
                    println!("{}: {}", "Summary".bold(), s.file.display());
                } else {
                    println!("Summary: {}", s.file.display());
                }
            }

            let ratio = s
                .ratio
                .map(|r| format!(" (ratio {r:.2})"))
                .unwrap_or_default();
            let line = format!(
                "  {:<10} compress {} ({} ... {})   size {}{}   decompress {} ({} ... {})",
                s.codec,
                format_duration(s.compress.mean),
                format_duration(s.compress.min),
                format_duration(s.compress.max),
                format_size(s.mean_compressed_bytes),
                ratio,
                format_duration(s.decompress.mean),
                format_duration(s.decompress.min),
                format_duration(s.decompress.max),
            );
            println!("{line}");
        }
    }
}

/// Human-readable duration: picks the largest unit that keeps the value
/// above 1.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1} min", secs / 60.0)
    } else if secs >= 1.0 {
        format!("{secs:.2} s")
    } else if secs >= 0.001 {
        format!("{:.1} ms", secs * 1000.0)
    } else {
        format!("{:.0} us", secs * 1_000_000.0)
    }
}

/// Human-readable size in decimal units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
