use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use parcount::{search, ChunkMode, CliOverrides, CountConfig, CountReport};
use std::{num::NonZeroUsize, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Count every (possibly overlapping) occurrence of a byte pattern in a text file
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Example call: parcount text.txt pattern.txt 8")]
struct Cli {
    /// File containing the text to search
    text: Option<PathBuf>,

    /// File containing the pattern to search for
    pattern: Option<PathBuf>,

    /// Number of threads to use (positive integer)
    #[arg(value_name = "THREADS")]
    threads_positional: Option<NonZeroUsize>,

    /// Number of threads to use (default: CPU cores)
    #[arg(short = 'j', long, conflicts_with = "threads_positional")]
    threads: Option<NonZeroUsize>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Copy each chunk into a buffer owned by its worker
    #[arg(long)]
    owned_chunks: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Show per-chunk counts, timing and metrics
    #[arg(short, long)]
    stats: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            text_path: self.text.clone(),
            pattern_path: self.pattern.clone(),
            thread_count: self.threads.or(self.threads_positional),
            chunk_mode: self.owned_chunks.then_some(ChunkMode::Owned),
            log_level: self.log_level.clone(),
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CountConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(cli.overrides());

    init_tracing(&config.log_level);
    debug!("Effective configuration: {:?}", config);

    let report = search(&config).with_context(|| {
        format!(
            "failed to count {} in {}",
            config.pattern_path.display(),
            config.text_path.display()
        )
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, cli.stats);
    }
    Ok(())
}

fn print_report(report: &CountReport, show_stats: bool) {
    if report.pattern_longer_than_text {
        println!("{}", "The pattern is longer than the provided text.".yellow());
    }

    println!(
        "{}",
        format!(
            "The pattern was found {} times in the text.",
            report.total_matches()
        )
        .green()
    );

    if !show_stats {
        return;
    }

    let outcome = &report.outcome;
    println!(
        "\n{} {} bytes, pattern {} bytes, {} threads, {:?} chunks",
        "Text:".blue(),
        report.text_len,
        report.pattern_len,
        report.thread_count,
        report.chunk_mode
    );
    println!(
        "{} chunk size {}, overlap {}, {} searched, {} skipped",
        "Partition:".blue(),
        outcome.chunk_size,
        outcome.overlap,
        outcome.chunks_searched(),
        outcome.skipped_chunks
    );
    for partial in &outcome.partials {
        let chunk = &partial.chunk;
        println!(
            "  chunk {}: [{}..{}) {} matches",
            chunk.index.to_string().green(),
            chunk.offset,
            chunk.offset + chunk.search_len,
            partial.matches
        );
    }

    let stats = &report.stats;
    println!(
        "{} {} bytes scanned, {} bytes copied (peak {})",
        "Work:".blue(),
        stats.bytes_scanned,
        stats.total_allocated,
        stats.peak_allocated
    );
    println!(
        "{} {}",
        "Elapsed:".blue(),
        humantime::format_duration(report.elapsed)
    );
}
