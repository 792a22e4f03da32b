//! Chart data for the Ad Fontes Media comparison.
//!
//! Produces one JavaScript object literal per outlet, suitable for pasting
//! into a paired bar chart, followed by the bar colors:
//!
//! ```text
//! { y: [-35, -20], label: "Example", difference: 15 },
//! ["rgb(255, 127, 14)"]
//! ```

use crate::analysis::Comparison;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Render the comparison rows and their color list.
pub fn comparison_points(rows: &[Comparison]) -> String {
    let mut out = String::new();
    for row in rows {
        writeln!(
            out,
            "{{ y: [{}, {}], label: {}, difference: {} }},",
            row.bias,
            row.horizontal_rank,
            serde_json::Value::from(row.name.as_str()),
            row.difference()
        )
        .unwrap();
    }
    let colors: Vec<&str> = rows.iter().map(Comparison::color).collect();
    writeln!(out, "{}", serde_json::Value::from(colors)).unwrap();
    out
}

/// Write [`comparison_points`] to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn write_comparison(
    rows: &[Comparison],
    path: impl AsRef<Path>,
) -> Result<(), std::io::Error> {
    fs::write(path.as_ref(), comparison_points(rows)).await?;
    info!(rows = rows.len(), "Wrote comparison chart data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_points() {
        let rows = vec![
            Comparison {
                name: "The \"Left\" Paper".into(),
                bias: -35,
                horizontal_rank: -20,
            },
            Comparison {
                name: "Right Daily".into(),
                bias: 50,
                horizontal_rank: 30,
            },
        ];
        let out = comparison_points(&rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            r#"{ y: [-35, -20], label: "The \"Left\" Paper", difference: 15 },"#
        );
        assert_eq!(
            lines[1],
            r#"{ y: [50, 30], label: "Right Daily", difference: -20 },"#
        );
        assert_eq!(
            lines[2],
            r#"["rgb(255, 127, 14)","rgb(31, 119, 180)"]"#
        );
    }

    #[test]
    fn test_comparison_points_empty() {
        assert_eq!(comparison_points(&[]), "[]\n");
    }
}
