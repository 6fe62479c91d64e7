//! Page-Trawler main entry point
//!
//! This is the command-line interface for the Page-Trawler site extractor.

use anyhow::{bail, Context};
use clap::Parser;
use page_trawler::browser::HttpBrowser;
use page_trawler::config::{load_config_with_hash, Config};
use page_trawler::crawler::{CrawlOptions, CrawlProgress, Coordinator};
use page_trawler::output::{self, OutputFormat};
use page_trawler::registry::{CssSelectors, PathFilters};
use page_trawler::storage::{self, RunLog, RunStatus, SharedStore, SqliteStore};
use page_trawler::TrawlerError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Page-Trawler: a same-origin site extractor
///
/// Page-Trawler starts from one page, follows every same-origin link that
/// passes the saved path filters, and extracts headings, links, metadata and
/// custom-selector content from each page it reaches.
#[derive(Parser, Debug)]
#[command(name = "page-trawler")]
#[command(version)]
#[command(about = "A same-origin site extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Page to start crawling from
    #[arg(long, value_name = "URL")]
    url: Option<Url>,

    /// Report format (summary, headings, meta, links, selectors, json)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Add a path filter
    #[arg(long, value_name = "FILTER")]
    add_filter: Vec<String>,

    /// Remove a path filter
    #[arg(long, value_name = "FILTER")]
    remove_filter: Vec<String>,

    /// Remove every path filter
    #[arg(long)]
    clear_filters: bool,

    /// Add a custom CSS selector
    #[arg(long, value_name = "SELECTOR")]
    add_selector: Vec<String>,

    /// Remove a custom CSS selector
    #[arg(long, value_name = "SELECTOR")]
    remove_selector: Vec<String>,

    /// Remove every custom CSS selector
    #[arg(long)]
    clear_selectors: bool,

    /// Show the saved path filters and CSS selectors and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export", "clear_data", "history"])]
    list: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["list", "export", "clear_data", "history"])]
    dry_run: bool,

    /// Render the last saved result without crawling
    #[arg(long, conflicts_with_all = ["list", "dry_run", "clear_data", "history"])]
    export: bool,

    /// Delete the last saved result and exit
    #[arg(long, conflicts_with_all = ["list", "dry_run", "export", "history"])]
    clear_data: bool,

    /// Show recent crawl runs and exit
    #[arg(long, conflicts_with_all = ["list", "dry_run", "export", "clear_data"])]
    history: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn edits_registries(&self) -> bool {
        !self.add_filter.is_empty()
            || !self.remove_filter.is_empty()
            || self.clear_filters
            || !self.add_selector.is_empty()
            || !self.remove_selector.is_empty()
            || self.clear_selectors
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::debug!("Configuration loaded (hash: {})", config_hash);

    let db = Arc::new(Mutex::new(
        SqliteStore::new(Path::new(&config.output.database_path))
            .with_context(|| format!("failed to open {}", config.output.database_path))?,
    ));
    let store: SharedStore = db.clone();

    let mut filters = PathFilters::load(store.clone())?;
    let mut selectors = CssSelectors::load(store.clone())?;
    apply_registry_edits(&cli, &mut filters, &mut selectors)?;

    if cli.list {
        print_registries(&filters, &selectors);
    } else if cli.dry_run {
        handle_dry_run(&config, cli.url.as_ref(), &filters, &selectors);
    } else if cli.history {
        handle_history(&db)?;
    } else if cli.clear_data {
        output::clear_saved_result(&mut *storage::lock(&store)?)?;
        println!("✓ Saved crawl data cleared");
    } else if cli.export {
        handle_export(&cli, &config, &store)?;
    } else if let Some(url) = cli.url.clone() {
        handle_crawl(&cli, &config, &config_hash, url, &db, &filters, &selectors).await?;
    } else if !cli.edits_registries() {
        bail!("nothing to do: pass --url to crawl, or one of --list, --export, --history");
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_trawler=info,warn"),
            1 => EnvFilter::new("page_trawler=debug,info"),
            2 => EnvFilter::new("page_trawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_registry_edits(
    cli: &Cli,
    filters: &mut PathFilters,
    selectors: &mut CssSelectors,
) -> anyhow::Result<()> {
    if cli.clear_filters {
        filters.set_mut().clear()?;
        tracing::info!("Cleared path filters");
    }
    for filter in &cli.add_filter {
        if filters.set_mut().add(filter)? {
            tracing::info!("Added path filter '{}'", filter);
        }
    }
    for filter in &cli.remove_filter {
        if !filters.set_mut().remove(filter)? {
            tracing::warn!("Path filter '{}' was not saved", filter);
        }
    }

    if cli.clear_selectors {
        selectors.set_mut().clear()?;
        tracing::info!("Cleared CSS selectors");
    }
    for selector in &cli.add_selector {
        if selectors.set_mut().add(selector)? {
            tracing::info!("Added CSS selector '{}'", selector);
        }
    }
    for selector in &cli.remove_selector {
        if !selectors.set_mut().remove(selector)? {
            tracing::warn!("CSS selector '{}' was not saved", selector);
        }
    }

    Ok(())
}

fn print_registries(filters: &PathFilters, selectors: &CssSelectors) {
    println!("Path filters ({}):", filters.set().len());
    for filter in filters.set().values() {
        println!("  - {}", filter);
    }

    println!("\nCSS selectors ({}):", selectors.set().len());
    for selector in selectors.set().values() {
        println!("  - {}", selector);
    }
}

/// Handles the --dry-run mode: shows what a crawl would use
fn handle_dry_run(config: &Config, url: Option<&Url>, filters: &PathFilters, selectors: &CssSelectors) {
    println!("=== Page-Trawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Navigation timeout: {}ms", config.crawler.navigation_timeout);
    println!("  Request delay: {}ms", config.crawler.request_delay);
    println!("  Max concurrent: {}", config.crawler.max_concurrent);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nExtraction:");
    println!("  Collect SEO: {}", config.extraction.collect_seo);
    println!("  Preserve whitespace: {}", config.extraction.preserve_whitespace);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(format) = &config.output.format {
        println!("  Format: {}", format);
    }

    println!();
    print_registries(filters, selectors);

    println!("\n✓ Configuration is valid");
    match url {
        Some(url) => println!("✓ Would start crawling from {}", url),
        None => println!("! No --url given; a crawl needs a starting page"),
    }
}

/// Handles the --history mode: lists recent crawl runs
fn handle_history(db: &Mutex<SqliteStore>) -> anyhow::Result<()> {
    let runs = lock_db(db)?.recent_runs(20)?;

    if runs.is_empty() {
        println!("No crawl runs recorded");
        return Ok(());
    }

    for run in runs {
        println!(
            "#{:<4} {:<10} {:>5} page(s) {:>4} failure(s)  {}  {}  (config {})",
            run.id,
            run.status.to_db_string(),
            run.pages,
            run.failures,
            run.started_at,
            run.start_url,
            &run.config_hash[..run.config_hash.len().min(12)]
        );
    }

    Ok(())
}

/// Handles the --export mode: renders the last saved result
fn handle_export(cli: &Cli, config: &Config, store: &SharedStore) -> anyhow::Result<()> {
    let (result, format) = {
        let guard = storage::lock(store)?;
        let result = output::load_result(&*guard)?;
        (result, resolve_format(cli, config, &*guard)?)
    };

    let Some(result) = result else {
        bail!("no saved crawl data; run a crawl first");
    };

    write_report(cli.output.as_deref(), &output::render(&result, format)?)?;
    output::save_format(&mut *storage::lock(store)?, format)?;
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    cli: &Cli,
    config: &Config,
    config_hash: &str,
    url: Url,
    db: &Arc<Mutex<SqliteStore>>,
    filters: &PathFilters,
    selectors: &CssSelectors,
) -> anyhow::Result<()> {
    let store: SharedStore = db.clone();
    let format = resolve_format(cli, config, &*storage::lock(&store)?)?;

    let browser = Arc::new(HttpBrowser::from_config(&config.user_agent, url.clone())?);
    let mut coordinator = Coordinator::new(browser, CrawlOptions::from_config(config))
        .with_filters(filters.snapshot())
        .with_selectors(selectors.snapshot());
    coordinator.on_progress(log_progress);

    let cancel = coordinator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight pages");
            cancel.cancel();
        }
    });

    let run_id = lock_db(db)?.create_run(config_hash, url.as_str())?;
    tracing::info!("Starting crawl run #{} from {}", run_id, url);

    let outcome = match coordinator.start().await {
        Ok(outcome) => outcome,
        Err(e) => {
            lock_db(db)?.finish_run(run_id, RunStatus::Failed, 0, 0)?;
            return Err(e).context("crawl failed");
        }
    };

    lock_db(db)?.finish_run(
        run_id,
        RunStatus::from(outcome.status),
        outcome.stats.succeeded as u64,
        outcome.stats.failed as u64,
    )?;

    {
        let mut guard = storage::lock(&store)?;
        output::save_result(&mut *guard, &outcome.result)?;
        output::save_format(&mut *guard, format)?;
    }

    write_report(cli.output.as_deref(), &output::render(&outcome.result, format)?)?;
    Ok(())
}

fn log_progress(progress: &CrawlProgress) {
    match &progress.error {
        Some(error) if progress.is_error() => tracing::info!(
            "[{}/{}] failed {}: {}",
            progress.processed,
            progress.total,
            progress.current_url,
            error
        ),
        _ => tracing::info!(
            "[{}/{}] {}",
            progress.processed,
            progress.total,
            progress.current_url
        ),
    }
}

/// Picks the report format: command line, then last used, then config
fn resolve_format(
    cli: &Cli,
    config: &Config,
    store: &dyn storage::KeyValueStore,
) -> anyhow::Result<OutputFormat> {
    if let Some(format) = cli.format {
        return Ok(format);
    }
    if let Some(format) = output::load_format(store)? {
        return Ok(format);
    }
    match &config.output.format {
        Some(format) => Ok(format.parse()?),
        None => Ok(OutputFormat::default()),
    }
}

fn write_report(path: Option<&Path>, report: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, report)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("✓ Report written to: {}", path.display());
        }
        None => println!("{}", report),
    }
    Ok(())
}

fn lock_db(db: &Mutex<SqliteStore>) -> Result<std::sync::MutexGuard<'_, SqliteStore>, TrawlerError> {
    db.lock()
        .map_err(|_| TrawlerError::Storage(storage::StorageError::Poisoned))
}
