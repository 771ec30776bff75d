//! Kanji-Vocab main entry point
//!
//! This is the command-line interface for the Kanji-Vocab vocabulary harvester.

use anyhow::Context;
use clap::Parser;
use kanji_vocab::config::{load_config_with_hash, validate, Config};
use kanji_vocab::crawler::{parse_target, Coordinator, Strategy};
use kanji_vocab::output::{
    export_tsv, format_character_info, format_entry_list, format_page_report,
    generate_markdown_summary, parse_selection, print_statistics, select_entries,
    SessionStatistics,
};
use kanji_vocab::state::{PageReport, ScrapeSession};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Kanji-Vocab: vocabulary built from the kanji you know
///
/// Kanji-Vocab searches a dictionary site for words containing a target
/// kanji, keeps the ones made only of characters you already know, and
/// exports them for flashcard import.
#[derive(Parser, Debug)]
#[command(name = "kanji-vocab")]
#[command(version)]
#[command(about = "Harvest vocabulary for a kanji", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// The kanji to search for
    #[arg(value_name = "KANJI")]
    kanji: String,

    /// Maximum number of result pages to fetch
    #[arg(short, long)]
    pages: Option<u32>,

    /// Pagination strategy: s[equential] or c[oncurrent]
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Maximum in-flight page fetches for the concurrent strategy
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Entries to export, e.g. "1,3-5" or "all"
    #[arg(long, value_name = "LIST")]
    select: Option<String>,

    /// Write selected entries as TSV to this path
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Write a markdown summary to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without scraping
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid command-line override")?;

    let target = parse_target(&cli.kanji)?;

    if cli.dry_run {
        handle_dry_run(&config, target, &config_hash);
        return Ok(());
    }

    let session = handle_scrape(config.clone(), target, cli.quiet).await?;

    if !cli.quiet {
        print_session(&session);
    }

    handle_outputs(&config, &session, &config_hash, cli.select.as_deref())?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kanji_vocab=info,warn"),
            1 => EnvFilter::new("kanji_vocab=debug,info"),
            2 => EnvFilter::new("kanji_vocab=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line values win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(pages) = cli.pages {
        config.pagination.page_budget = pages;
    }
    if let Some(strategy) = cli.strategy {
        config.pagination.strategy = strategy;
    }
    if let Some(concurrency) = cli.concurrency {
        config.pagination.concurrency = concurrency;
    }
    if let Some(export) = &cli.export {
        config.output.export_path = Some(export.clone());
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.clone());
    }
}

/// Handles the --dry-run mode: shows what would be scraped
fn handle_dry_run(config: &Config, target: char, config_hash: &str) {
    println!("=== Kanji-Vocab Dry Run ===\n");

    println!("Target: {}", target);
    match config.scraper.search_url(target) {
        Ok(url) => println!("Search URL: {}", url),
        Err(e) => println!("Search URL: invalid ({})", e),
    }

    println!("\nPagination:");
    println!("  Page budget: {}", config.pagination.page_budget);
    println!("  Strategy: {}", config.pagination.strategy);
    println!("  Concurrency: {}", config.pagination.concurrency);
    println!(
        "  Retries: {} attempts, {}ms base delay",
        config.pagination.max_attempts, config.pagination.base_delay_ms
    );

    println!("\nVocabulary:");
    println!(
        "  Known characters: {}",
        config.vocabulary.known_characters.chars().filter(|c| !c.is_whitespace()).count()
    );
    println!("  Allow kana: {}", config.vocabulary.allow_kana);
    println!("  Annotate readings: {}", config.vocabulary.annotate_readings);

    println!("\nOutput:");
    if let Some(path) = &config.output.summary_path {
        println!("  Summary: {}", path.display());
    }
    if let Some(path) = &config.output.export_path {
        println!("  Export: {}", path.display());
    }

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
}

/// Handles the main scrape operation with live page progress
async fn handle_scrape(config: Config, target: char, quiet: bool) -> anyhow::Result<ScrapeSession> {
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_progress(rx, quiet));

    let coordinator = Coordinator::new(config)?.with_progress(tx);
    let result = coordinator.run(target).await;

    // Dropping the coordinator closes the progress channel
    drop(coordinator);
    if let Err(e) = printer.await {
        tracing::warn!("Progress printer stopped: {}", e);
    }

    match result {
        Ok(session) => Ok(session),
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}

async fn print_progress(mut rx: mpsc::UnboundedReceiver<PageReport>, quiet: bool) {
    while let Some(report) = rx.recv().await {
        if !quiet {
            eprintln!("{}", format_page_report(&report));
        }
    }
}

fn print_session(session: &ScrapeSession) {
    if let Some(info) = &session.character_info {
        println!("{}", format_character_info(session.target, info));
    }

    if session.merged_entries.is_empty() {
        println!("No vocabulary found for {}.", session.target);
    } else {
        print!("{}", format_entry_list(&session.merged_entries));
    }
    println!();

    print_statistics(&SessionStatistics::from_session(session));
}

/// Writes the summary and export files the run asked for
fn handle_outputs(
    config: &Config,
    session: &ScrapeSession,
    config_hash: &str,
    selection: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(session, config_hash, path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        println!("✓ Summary written to: {}", path.display());
    }

    if let Some(path) = &config.output.export_path {
        let entries = &session.merged_entries;
        let indices = parse_selection(selection.unwrap_or("all"), entries.len())?;
        let selected = select_entries(entries, &indices);

        let written = export_tsv(&selected, path)
            .with_context(|| format!("failed to export to {}", path.display()))?;
        println!("✓ Exported {} entries to: {}", written, path.display());
    } else if selection.is_some() {
        tracing::warn!("--select given without an export path; nothing exported");
    }

    Ok(())
}
