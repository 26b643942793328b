//! Aggregate statistics over the recorded run results.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::bench::{FileReport, RunResult};

/// Mean/min/max over the iterations of one operation.
#[derive(Debug, Clone, Copy)]
pub struct ElapsedStats {
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl ElapsedStats {
    fn from_samples(samples: &[Duration]) -> Self {
        debug_assert!(!samples.is_empty());
        let total: Duration = samples.iter().sum();
        Self {
            mean: total / samples.len() as u32,
            min: samples.iter().min().copied().unwrap_or(Duration::ZERO),
            max: samples.iter().max().copied().unwrap_or(Duration::ZERO),
        }
    }
}

/// Aggregated outcome for one (file, codec) pair across iterations.
#[derive(Debug, Clone)]
pub struct CodecStats {
    pub file: PathBuf,
    pub codec: String,
    pub iterations: usize,
    pub compress: ElapsedStats,
    pub decompress: ElapsedStats,
    pub mean_compressed_bytes: u64,
    /// compressed size / uncompressed baseline size, when the baseline is
    /// known.
    pub ratio: Option<f64>,
}

/// Group results by (file, codec), preserving first-seen order.
pub fn compute_stats(results: &[RunResult], files: &[FileReport]) -> Vec<CodecStats> {
    let baselines: HashMap<&PathBuf, u64> = files
        .iter()
        .filter_map(|f| f.baseline_bytes.map(|b| (&f.path, b)))
        .collect();

    let mut order: Vec<(PathBuf, String)> = Vec::new();
    let mut grouped: HashMap<(PathBuf, String), Vec<&RunResult>> = HashMap::new();
    for result in results {
        let key = (result.file.clone(), result.codec.clone());
        if !grouped.contains_key(&key) {
            order.push(key.clone());
        }
        grouped.entry(key).or_default().push(result);
    }

    order
        .into_iter()
        .map(|key| {
            let samples = &grouped[&key];
            let (file, codec) = key;

            let compress: Vec<Duration> = samples.iter().map(|r| r.compress_elapsed).collect();
            let decompress: Vec<Duration> =
                samples.iter().map(|r| r.decompress_elapsed).collect();
            let mean_compressed_bytes = samples.iter().map(|r| r.compressed_bytes).sum::<u64>()
                / samples.len() as u64;
            let ratio = baselines
                .get(&file)
                .filter(|&&b| b > 0)
                .map(|&b| mean_compressed_bytes as f64 / b as f64);

            CodecStats {
                file,
                codec,
                iterations: samples.len(),
                compress: ElapsedStats::from_samples(&compress),
                decompress: ElapsedStats::from_samples(&decompress),
                mean_compressed_bytes,
                ratio,
            }
        })
        .collect()
}
