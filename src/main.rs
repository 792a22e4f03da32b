//! # Media Bias Chart
//!
//! Collects outlet ratings from Media Bias/Fact Check, estimates a numeric
//! left-right bias for each outlet from the spectrum chart on its page, and
//! reports on the results.
//!
//! ## Usage
//!
//! ```sh
//! media_bias_chart --html-output sources.html -j ./reports
//! ```
//!
//! ## Architecture
//!
//! 1. **Indexing**: Discover outlet pages from the site's category pages
//! 2. **Scraping**: Parse each page and score its chart image (one page at a time)
//! 3. **Storage**: Write sources and broken pages to CSV
//! 4. **Reporting**: Category counts, percentages, Ad Fontes Media comparison,
//!    HTML table and JSON report
//!
//! Steps 1 to 3 run only when the sources file is missing or `--refresh` is
//! given; otherwise reporting runs on the stored sources.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod bias;
mod cli;
mod config;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod storage;
mod utils;

use bias::BiasExtractor;
use cli::Cli;
use config::AppConfig;
use fetch::{ImageFetcher, PageFetcher, RetryFetch, build_client};
use outputs::json::{ComparisonEntry, Report};
use outputs::{chart, html, json};
use scrapers::mbfc::MbfcScraper;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("media_bias_chart starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = AppConfig::load(args.config.as_deref())?;
    let extractor = BiasExtractor::new(config.palette);
    debug!(palette = ?extractor.palette(), "Marker palette");

    if let Some(ref image_path) = args.analyze {
        return analyze_file(&extractor, image_path);
    }

    // ---- Scrape when needed ----
    if args.refresh || !Path::new(&args.sources_file).is_file() {
        scrape(&config, extractor, &args).await?;
    } else {
        info!(path = %args.sources_file, "Using stored sources");
    }

    // ---- Reports ----
    let sources = storage::load_sources(&args.sources_file)?;
    let broken_count = match storage::load_broken_sources(&args.broken_file) {
        Ok(broken) => broken.len(),
        Err(e) => {
            debug!(error = %e, "No broken sources file");
            0
        }
    };

    let counts = analysis::simple_left_right_bias(&sources);
    let percentages = analysis::simple_left_right_bias_percent(&sources);
    for (category, row) in &counts {
        info!(category = category.label(), counts = ?row, "Bias category");
    }

    let comparisons = match args.adfontes_csv.as_deref() {
        Some(path) => {
            let adfontes = storage::load_adfontesmedia_sources(path)?;
            let rows = analysis::compare_to_adfontesmedia(&sources, &adfontes);
            info!(matched = rows.len(), "Compared with Ad Fontes Media");
            Some(rows)
        }
        None => None,
    };

    if let Some(ref path) = args.html_output {
        if let Err(e) = html::write_data_table(&sources, path).await {
            error!(%path, error = %e, "Failed writing HTML table");
        }
    }

    if let Some(ref dir) = args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }

        if let Some(ref rows) = comparisons {
            let path = format!("{}/comparison.js", dir.trim_end_matches('/'));
            if let Err(e) = chart::write_comparison(rows, &path).await {
                error!(%path, error = %e, "Failed writing comparison chart data");
            }
        }

        let report = Report {
            generated_at: Utc::now().to_rfc3339(),
            total_sources: sources.len(),
            broken_sources: broken_count,
            counts,
            percentages,
            comparisons: comparisons.map(|rows| rows.into_iter().map(ComparisonEntry::from).collect()),
        };
        if let Err(e) = json::write_report(&report, dir).await {
            error!(error = %e, "Failed to write JSON report");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        sources = sources.len(),
        "Execution complete"
    );

    Ok(())
}

/// Discover, scrape and store every outlet.
#[instrument(level = "info", skip_all)]
async fn scrape(config: &AppConfig, extractor: BiasExtractor, args: &Cli) -> Result<(), Box<dyn Error>> {
    let scraper_config = &config.scraper;
    let client = build_client(
        &scraper_config.user_agent,
        StdDuration::from_secs(scraper_config.timeout_secs),
    )?;
    let base_delay = StdDuration::from_millis(scraper_config.base_delay_ms);
    let max_jitter = StdDuration::from_millis(scraper_config.max_jitter_ms);
    let scraper = MbfcScraper::new(
        RetryFetch::new(
            PageFetcher {
                client: client.clone(),
            },
            scraper_config.max_retries,
            base_delay,
        )
        .with_max_jitter(max_jitter),
        RetryFetch::new(ImageFetcher { client }, scraper_config.max_retries, base_delay)
            .with_max_jitter(max_jitter),
        extractor,
    );

    let pages = scraper.index_pages(&scraper_config.category_pages).await?;
    let (sources, broken) = scraper.scrape_sources(pages).await;
    if !broken.is_empty() {
        warn!(count = broken.len(), path = %args.broken_file, "Some pages could not be scraped");
    }

    storage::store_sources(&sources, &args.sources_file)?;
    storage::store_broken_sources(&broken, &args.broken_file)?;
    Ok(())
}

/// Score one local chart image and print the result.
#[instrument(level = "info", skip(extractor))]
fn analyze_file(extractor: &BiasExtractor, image_path: &str) -> Result<(), Box<dyn Error>> {
    let image = image::open(image_path)?;
    let positions = extractor.locate(&image)?;
    let score = bias::interpolate(positions)?;
    info!(
        left = positions.left,
        center = positions.center,
        right = positions.right,
        %score,
        "Analyzed chart"
    );
    println!("{score}");
    Ok(())
}
