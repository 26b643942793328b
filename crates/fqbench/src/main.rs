//! fqbench entry point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fqbench::{
    bench::{BenchmarkRunner, HarnessError},
    cli::Cli,
    codec::{resolve_codec, resolve_codecs, SystemExecutor},
    results::{compute_stats, export_json, BenchPrinter},
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise derive the level from -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Interrupts set a flag the runner polls between tool invocations, so
    // Ctrl+C unwinds through the restore guards instead of leaving backups
    // and half-written artifacts behind.
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            if shutdown.swap(true, Ordering::Relaxed) {
                // Second Ctrl+C: the operator really means it.
                std::process::exit(130);
            }
            eprintln!("\nInterrupt received, finishing current invocation and restoring files...");
        })
        .context("Failed to install signal handler")?;
    }

    let config = cli.into_config().context("Invalid arguments")?;

    let codecs = resolve_codecs(&config.codec_names)?;
    let baseline = resolve_codec(&config.baseline)?;

    print_banner(&config);

    let runner = BenchmarkRunner::new(
        config.clone(),
        codecs,
        baseline,
        Arc::new(SystemExecutor),
    )
    .with_shutdown_flag(shutdown.clone());

    let summary = match runner.run() {
        Ok(summary) => summary,
        Err(HarnessError::Interrupted) => {
            eprintln!("\nBenchmark interrupted; originals restored.");
            std::process::exit(130); // 128 + SIGINT
        }
        Err(e) => return Err(e).context("Benchmark execution failed"),
    };

    let stats = compute_stats(&summary.results, &summary.files);
    BenchPrinter::new(config.color).print_summary(&stats);

    if let Some(path) = &config.json {
        export_json(&summary, &config, path).context("Failed to export JSON")?;
        println!("Results exported to: {}", path.display());
    }

    if summary.any_aborted() {
        std::process::exit(1);
    }
    Ok(())
}

/// Compact one-line banner with the run parameters.
fn print_banner(config: &fqbench::config::BenchConfig) {
    use owo_colors::OwoColorize;

    let codecs = config.codec_names.join(", ");
    if config.color {
        println!(
            "{}: {} file(s), codecs [{}], {} iteration(s){}",
            "fqbench".cyan().bold(),
            config.files.len(),
            codecs,
            config.iterations,
            if config.verify { ", verify" } else { "" }
        );
    } else {
        println!(
            "fqbench: {} file(s), codecs [{}], {} iteration(s){}",
            config.files.len(),
            codecs,
            config.iterations,
            if config.verify { ", verify" } else { "" }
        );
    }
}
