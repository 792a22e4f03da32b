//! HTML data table of all sources.
//!
//! The table carries the `display` class and `table_id` id so it can be
//! dropped into a page using a DataTables-style script.

use crate::models::Source;
use crate::utils::escape_html;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Render one row per source: name, factual rating, the site's bias label,
/// the estimated bias value, the chart image and the rating page.
pub fn data_table(sources: &[Source]) -> String {
    let mut html = String::new();
    html.push_str("<table id=\"table_id\" class=\"display\">\n");
    html.push_str("    <thead>\n");
    html.push_str("    <tr>\n");
    for heading in [
        "Name",
        "Factual Reporting",
        "Bias",
        "Estimated Bias Value",
        "Left-Right Spectrum Image",
        "Page Link",
    ] {
        writeln!(html, "        <th>{heading}</th>").unwrap();
    }
    html.push_str("    </tr>\n");
    html.push_str("    </thead>\n");
    html.push_str("    <tbody>\n");

    for source in sources {
        let category = source.category().map_or("Unknown", |c| c.label());
        html.push_str("    <tr>\n");
        writeln!(html, "        <td>{}</td>", escape_html(&source.name)).unwrap();
        writeln!(html, "        <td>{}</td>", source.factual).unwrap();
        writeln!(html, "        <td>{category}</td>").unwrap();
        writeln!(html, "        <td>{}</td>", source.bias).unwrap();
        writeln!(
            html,
            "        <td><a href=\"{}\">{}</a></td>",
            escape_html(&source.img_url),
            escape_html(source.image_name())
        )
        .unwrap();
        writeln!(
            html,
            "        <td><a href=\"{}\">link</a></td>",
            escape_html(&source.page_url)
        )
        .unwrap();
        html.push_str("    </tr>\n");
    }

    html.push_str("    </tbody>\n");
    html.push_str("</table>\n");
    html
}

/// Write [`data_table`] to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn write_data_table(
    sources: &[Source],
    path: impl AsRef<Path>,
) -> Result<(), std::io::Error> {
    fs::write(path.as_ref(), data_table(sources)).await?;
    info!(rows = sources.len(), "Wrote HTML data table");
    Ok(())
}
