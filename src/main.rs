//! docmirror main entry point
//!
//! This is the command-line interface for the docmirror documentation mirror.

use anyhow::Context;
use clap::Parser;
use docmirror::config::{load_config, validate, validate_start_url, Config};
use docmirror::crawler::{inspect_page, run_crawl};
use docmirror::output::print_statistics;
use docmirror::url::derive_output_dir;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// docmirror: mirror a documentation subtree as linked Markdown
///
/// Crawls every page under the start URL's directory, converts each to
/// Markdown with embedded diagrams re-rendered as Mermaid blocks, and
/// rewrites links between mirrored pages to point at the local files.
#[derive(Parser, Debug)]
#[command(name = "docmirror")]
#[command(version)]
#[command(about = "Mirror a documentation subtree as linked Markdown", long_about = None)]
struct Cli {
    /// URL to start crawling from; its directory is the crawl scope
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum crawl depth
    #[arg(short, long)]
    depth: Option<u32>,

    /// Output directory (default: `output`, or `wiki_info/<slug>` for DeepWiki)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Delay between fetches to the same host, in seconds
    #[arg(short, long, value_name = "SECS")]
    sleep: Option<f64>,

    /// Number of pages processed at the same time
    #[arg(short, long)]
    concurrency: Option<u32>,

    /// Follow every reachable in-scope page regardless of depth
    #[arg(long, conflicts_with = "depth")]
    no_depth_limit: bool,

    /// Run diagram extraction and conversion on the URL only; write nothing
    #[arg(long)]
    test: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    validate_start_url(&cli.url)?;
    let config = build_config(&cli)?;

    if cli.test {
        handle_test(&config, &cli.url).await
    } else {
        handle_crawl(&config, &cli).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docmirror=info,warn"),
            1 => EnvFilter::new("docmirror=debug,info"),
            2 => EnvFilter::new("docmirror=trace,debug"),
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

/// Loads the config file (if any), applies CLI overrides and validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
        config.crawler.unbounded_depth = false;
    }
    if cli.no_depth_limit {
        config.crawler.unbounded_depth = true;
    }
    if let Some(timeout) = cli.timeout {
        config.fetch.timeout_secs = timeout;
    }
    if let Some(sleep) = cli.sleep {
        config.crawler.delay_secs = sleep;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(output) = &cli.output {
        config.output.directory = Some(output.display().to_string());
    }

    validate(&config)?;
    Ok(config)
}

/// Explicit directory wins; otherwise derived from the start URL
fn resolve_output_dir(config: &Config, start_url: &str) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &config.output.directory {
        return Ok(PathBuf::from(dir));
    }
    let url = Url::parse(start_url).with_context(|| format!("Invalid start URL {}", start_url))?;
    Ok(derive_output_dir(&url))
}

/// Handles the --test mode: runs the diagram pipeline on one page
async fn handle_test(config: &Config, url: &str) -> anyhow::Result<()> {
    println!("=== docmirror Diagram Test ===\n");
    println!("URL: {}\n", url);

    let inspection = inspect_page(config, url)
        .await
        .with_context(|| format!("Failed to inspect {}", url))?;

    println!("Fragments found: {}", inspection.fragments.len());
    for (i, (fragment, fence)) in inspection
        .fragments
        .iter()
        .zip(&inspection.fences)
        .enumerate()
    {
        println!(
            "\n[{}] {} via {}",
            i + 1,
            fragment.dialect,
            fragment.source
        );
        println!("  Raw: {}", preview(&fragment.raw_content, 100));
        match fence {
            Some(fence) => println!("{}", fence),
            None => println!("  (empty after normalization, dropped)"),
        }
    }

    println!(
        "\n=== Converted Markdown ({} diagrams spliced) ===\n",
        inspection.diagrams_rendered
    );
    println!("{}", inspection.markdown);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, cli: &Cli) -> anyhow::Result<()> {
    let output_dir = resolve_output_dir(config, &cli.url)?;
    tracing::info!("Writing documents to {}", output_dir.display());

    let report = match run_crawl(config, &cli.url, output_dir).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !cli.quiet {
        print_statistics(&report.statistics);
        match &report.mapping_path {
            Some(path) => println!("\nMapping written to {}", path.display()),
            None => println!(
                "\nMapping could not be written to {}",
                report.output_dir.display()
            ),
        }
    }

    Ok(())
}

/// First `max` characters of `text`, on one line
fn preview(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if flat.chars().count() > max {
        format!("{}...", flat.chars().take(max).collect::<String>())
    } else {
        flat
    }
}
