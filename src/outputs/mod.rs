//! Report generation for scraped sources.
//!
//! # Submodules
//!
//! - [`html`]: Renders every source as an HTML data table
//! - [`json`]: Writes counts, percentages and comparisons to `report.json`
//! - [`chart`]: Renders the Ad Fontes Media comparison as chart data points
//!
//! # Output Structure
//!
//! ```text
//! sources.html             # --html-output
//! json_output_dir/
//! ├── report.json          # always, when --json-output-dir is given
//! └── comparison.js        # only with --adfontes-csv
//! ```

pub mod chart;
pub mod html;
pub mod json;
