//! JSON report for downstream consumers.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── report.json
//! ```
//!
//! Category and rating keys use the same spellings as the sources CSV
//! (`leftcenter`, `HIGH`, ...).

use crate::analysis::{BiasTable, Comparison};
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Everything produced by one reporting run.
#[derive(Debug, Serialize)]
pub struct Report {
    /// RFC 3339 timestamp of the run.
    pub generated_at: String,
    pub total_sources: usize,
    pub broken_sources: usize,
    pub counts: BiasTable,
    pub percentages: BiasTable,
    /// Present only when an Ad Fontes Media export was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparisons: Option<Vec<ComparisonEntry>>,
}

/// A [`Comparison`] with its derived values spelled out.
#[derive(Debug, Serialize)]
pub struct ComparisonEntry {
    #[serde(flatten)]
    pub comparison: Comparison,
    pub difference: i32,
    pub color: &'static str,
}

impl From<Comparison> for ComparisonEntry {
    fn from(comparison: Comparison) -> Self {
        Self {
            difference: comparison.difference(),
            color: comparison.color(),
            comparison,
        }
    }
}

/// Write `report` to `{json_output_dir}/report.json`.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(report: &Report, json_output_dir: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = format!("{}/report.json", json_output_dir.trim_end_matches('/'));
    info!(path = %output_json_filename, "Writing JSON");
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, "Wrote JSON report");

    Ok(())
}
