//! Command-line interface for the benchmark harness.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use crate::codec::{codec_names, resolve_codec};
use crate::config::BenchConfig;

/// Benchmark harness for external FASTQ compression tools.
///
/// Runs each input file through every selected codec for a configurable
/// number of compress/decompress cycles, measuring wall time and file
/// sizes. Input files are backed up before benchmarking and restored
/// byte-for-byte afterwards, on success and on failure.
#[derive(Parser, Debug)]
#[command(name = "fqbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input files. Only arguments ending in the configured extension are
    /// benchmarked; others are reported as skipped.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Codec(s) to benchmark, in order. May be given multiple times.
    ///
    /// Valid values: gzip, bzip2, fqz_comp, quip.
    /// Defaults to all of them.
    #[arg(short = 'c', long = "codec", value_name = "NAME")]
    pub codecs: Vec<String>,

    /// Codec used for the one-time baseline decompress of each input.
    #[arg(long, default_value = "gzip", value_name = "NAME")]
    pub baseline: String,

    /// Compress/decompress cycles per (file, codec).
    #[arg(long, default_value = "2")]
    pub iterations: usize,

    /// Required input extension, without the leading dot.
    #[arg(long, default_value = "fastq.gz", value_name = "EXT")]
    pub extension: String,

    /// Byte-compare each decompress output against the baseline.
    ///
    /// Costs a full read of the uncompressed file per cycle, which is why
    /// it is off by default.
    #[arg(long)]
    pub verify: bool,

    /// Export a structured report to a JSON file.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, conflicts_with = "color")]
    pub no_color: bool,

    /// Force colored output (even when not a TTY).
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Verbose output.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Validate arguments and build the run configuration.
    pub fn into_config(self) -> Result<BenchConfig> {
        if self.iterations == 0 {
            bail!("Iterations must be at least 1");
        }

        let codec_names_selected = if self.codecs.is_empty() {
            codec_names().into_iter().map(String::from).collect()
        } else {
            self.codecs.clone()
        };
        // Fail early on unknown names instead of mid-run.
        for name in &codec_names_selected {
            resolve_codec(name)?;
        }
        resolve_codec(&self.baseline)?;

        if self.extension.is_empty() || self.extension.starts_with('.') {
            bail!(
                "Extension must be non-empty and given without the leading dot (got {:?})",
                self.extension
            );
        }

        let color = self.color || (!self.no_color && supports_color());

        let mut config = BenchConfig::new(self.files);
        config.codec_names = codec_names_selected;
        config.baseline = self.baseline;
        config.iterations = self.iterations;
        config.extension = self.extension;
        config.verify = self.verify;
        config.color = color;
        config.verbose = self.verbose;
        config.json = self.json;
        Ok(config)
    }
}

/// Check if the terminal supports colors.
fn supports_color() -> bool {
    // Check NO_COLOR environment variable (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Check FORCE_COLOR environment variable (common convention)
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    // Check if stdout is a TTY
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        unsafe { libc::isatty(std::io::stdout().as_raw_fd()) != 0 }
    }

    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fqbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&["reads.fastq.gz", "--no-color"])
            .into_config()
            .unwrap();
        assert_eq!(config.iterations, 2);
        assert_eq!(config.extension, "fastq.gz");
        assert_eq!(config.codec_names, ["gzip", "bzip2", "fqz_comp", "quip"]);
        assert_eq!(config.baseline, "gzip");
        assert!(!config.verify);
    }

    #[test]
    fn codec_selection_keeps_order() {
        let config = parse(&["reads.fastq.gz", "-c", "bzip2", "-c", "gzip"])
            .into_config()
            .unwrap();
        assert_eq!(config.codec_names, ["bzip2", "gzip"]);
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = parse(&["reads.fastq.gz", "--iterations", "0"])
            .into_config()
            .unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn unknown_codec_rejected() {
        let err = parse(&["reads.fastq.gz", "-c", "xz"])
            .into_config()
            .unwrap_err();
        assert!(err.to_string().contains("unknown codec: xz"));
    }

    #[test]
    fn extension_with_leading_dot_rejected() {
        let err = parse(&["reads.fastq.gz", "--extension", ".fastq.gz"])
            .into_config()
            .unwrap_err();
        assert!(err.to_string().contains("leading dot"));
    }

    #[test]
    fn json_path_is_carried_into_config() {
        let config = parse(&["reads.fastq.gz", "--json", "out.json"])
            .into_config()
            .unwrap();
        assert_eq!(config.json, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn no_files_is_a_parse_error() {
        assert!(Cli::try_parse_from(["fqbench"]).is_err());
    }
}
