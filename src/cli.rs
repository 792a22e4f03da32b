//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Some options can also be provided via environment variables.

use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Scrape (if sources_file.csv is missing) and write the HTML table
/// media_bias_chart --html-output sources.html
///
/// # Re-scrape with a custom palette and write the JSON report
/// media_bias_chart --refresh -c config.yaml -j ./reports
///
/// # Compare against Ad Fontes Media
/// media_bias_chart -j ./reports --adfontes-csv "Media Bias Chart Version 4.0 - ad fontes media.csv"
///
/// # Score one local chart image
/// media_bias_chart --analyze extremeright021.png
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// CSV file holding scraped sources; scraped into when missing
    #[arg(short, long, default_value = "sources_file.csv")]
    pub sources_file: String,

    /// CSV file receiving pages that could not be scraped
    #[arg(short, long, default_value = "broken_sources.csv")]
    pub broken_file: String,

    /// Optional path to config.yaml file
    #[arg(short, long, env = "MEDIA_BIAS_CONFIG")]
    pub config: Option<String>,

    /// Scrape again even if the sources file exists
    #[arg(long)]
    pub refresh: bool,

    /// Write the HTML data table to this file
    #[arg(long)]
    pub html_output: Option<String>,

    /// Output directory for the JSON report
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Ad Fontes Media chart export (CSV) to compare against
    #[arg(long, env = "ADFONTES_CSV")]
    pub adfontes_csv: Option<String>,

    /// Score a single local chart image and exit
    #[arg(long, value_name = "IMAGE")]
    pub analyze: Option<String>,
}
