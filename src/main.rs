//! Chapter-Sieve main entry point
//!
//! This is the command-line interface for collecting and surveying chapter
//! lists from manga sources.

use anyhow::{bail, Context};
use chapter_sieve::collector::{collect_all, survey_catalog, CollectSettings};
use chapter_sieve::config::{load_config_with_hash, Config};
use chapter_sieve::crawler::CrawlOptions;
use chapter_sieve::output::{print_collection_summary, print_survey_summary, write_json_report};
use chapter_sieve::retry::{execute, RetryPolicy};
use chapter_sieve::source::HttpSource;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Chapter-Sieve: resilient chapter collection for manga sources
///
/// Chapter-Sieve queries content sources through a gateway API, retries
/// rate-limited and failing requests with exponential backoff, and resolves
/// free-text chapter titles into chapter numbers.
#[derive(Parser, Debug)]
#[command(name = "chapter-sieve")]
#[command(version)]
#[command(about = "Resilient chapter collection for manga sources", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Validate config and show what would run without sending any request
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search every source for each query and sample the first result's chapters
    Collect {
        /// Title to search for; repeat to search several (overrides the config)
        #[arg(long = "query", value_name = "TITLE")]
        queries: Vec<String>,

        /// Chapter numbers to look up, comma separated (overrides the config)
        #[arg(long, value_delimiter = ',', value_name = "NUMBERS")]
        chapters: Vec<f64>,
    },

    /// Crawl each source's catalog and check every entity's chapter list
    Survey {
        /// Maximum number of entities to survey per source
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List the sources the gateway of each configured source knows about
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli.command);

    if cli.dry_run {
        handle_dry_run(&config, &cli.command);
        return Ok(());
    }

    let policy = config.retry.to_policy()?;
    let sources = HttpSource::from_config(&config).context("Failed to set up sources")?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    match cli.command {
        Command::Collect { .. } => {
            handle_collect(&config, &config_hash, sources, policy, cancel).await
        }
        Command::Survey { .. } => {
            handle_survey(&config, &config_hash, &sources, &policy, &cancel).await
        }
        Command::Sources => handle_sources(&sources, &policy, &cancel).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("chapter_sieve=info,warn"),
            1 => EnvFilter::new("chapter_sieve=debug,info"),
            2 => EnvFilter::new("chapter_sieve=trace,debug"),
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

/// Cancels `cancel` on the first Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after in-flight requests");
            cancel.cancel();
        }
    });
}

/// Folds command-line overrides into the loaded configuration
fn apply_overrides(config: &mut Config, command: &Command) {
    match command {
        Command::Collect { queries, chapters } => {
            if !queries.is_empty() {
                config.collect.queries = queries.clone();
            }
            if !chapters.is_empty() {
                config.collect.requested_chapters = chapters.clone();
            }
        }
        Command::Survey { limit: Some(limit) } => config.crawler.target_count = *limit,
        Command::Survey { limit: None } | Command::Sources => {}
    }
}

/// Handles --dry-run: shows the effective configuration for `command`
fn handle_dry_run(config: &Config, command: &Command) {
    println!("=== Chapter-Sieve Dry Run ===\n");

    println!("Retry Policy:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!("  Initial delay: {}ms", config.retry.initial_delay_ms);
    println!("  Backoff multiplier: {}", config.retry.backoff_multiplier);
    println!("  Retry on: {:?}", config.retry.retry_on);

    println!("\nSources ({}):", config.sources.len());
    for source in &config.sources {
        println!(
            "  - {} at {} ({:?} chapter listing)",
            source.id, source.base_url, source.chapter_listing
        );
    }

    match command {
        Command::Collect { .. } => {
            println!("\nQueries ({}):", config.collect.queries.len());
            for query in &config.collect.queries {
                println!("  - {}", query);
            }
            println!(
                "\nRequested chapters: {:?}",
                config.collect.requested_chapters
            );
            println!(
                "Samples per entity: {}",
                config.collect.chapters_per_entity
            );
        }
        Command::Survey { .. } => {
            println!("\nCrawler:");
            println!("  Target count: {}", config.crawler.target_count);
            println!("  Page size: {}", config.crawler.page_size);
            println!("  Pacing delay: {}ms", config.crawler.pacing_delay_ms);
        }
        Command::Sources => {}
    }

    println!("\nReport: {}", config.output.report_path);
    println!("\n✓ Configuration is valid");
}

/// Handles `collect`: runs every query against every source
async fn handle_collect(
    config: &Config,
    config_hash: &str,
    sources: Vec<HttpSource>,
    policy: RetryPolicy,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    if config.collect.queries.is_empty() {
        bail!("No queries to collect: pass --query or set `queries` under [collect]");
    }

    tracing::info!(
        "Collecting {} queries from {} sources",
        config.collect.queries.len(),
        sources.len()
    );

    let report = collect_all(
        sources,
        config.collect.queries.clone(),
        CollectSettings::from(config),
        policy,
        cancel,
    )
    .await
    .with_config_hash(config_hash);

    print_collection_summary(&report);
    write_json_report(Path::new(&config.output.report_path), &report)
        .context("Failed to write collection report")?;

    println!("✓ Report written to: {}", config.output.report_path);
    Ok(())
}

/// Handles `survey`: surveys each source's catalog in turn
async fn handle_survey(
    config: &Config,
    config_hash: &str,
    sources: &[HttpSource],
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let options = CrawlOptions::from(&config.crawler);
    let settings = CollectSettings::from(config);
    let mut reports = Vec::with_capacity(sources.len());

    for source in sources {
        if cancel.is_cancelled() {
            break;
        }

        tracing::info!(
            "Surveying {} (up to {} entities)",
            source.id(),
            options.target_count
        );
        let report = survey_catalog(source, &options, &settings, policy, cancel)
            .await
            .with_config_hash(config_hash);
        print_survey_summary(&report);
        reports.push(report);
    }

    write_json_report(Path::new(&config.output.report_path), &reports)
        .context("Failed to write survey report")?;

    println!("✓ Report written to: {}", config.output.report_path);
    Ok(())
}

/// Handles `sources`: prints the source ids each gateway advertises
async fn handle_sources(
    sources: &[HttpSource],
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    for source in sources {
        match execute(policy, cancel, || source.list_sources()).await {
            Ok(ids) => {
                println!("{} ({} sources):", source.id(), ids.len());
                for id in ids {
                    println!("  - {}", id);
                }
            }
            Err(e) => {
                tracing::error!("Failed to list sources via {}: {}", source.id(), e);
                println!("{}: unavailable ({})", source.id(), e);
            }
        }
    }

    Ok(())
}
