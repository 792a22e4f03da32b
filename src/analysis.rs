//! Aggregate reports over scraped sources.
//!
//! - [`simple_left_right_bias`]: outlet counts per bias category and factual rating
//! - [`simple_left_right_bias_percent`]: the same counts as row percentages
//! - [`compare_to_adfontesmedia`]: estimated bias next to Ad Fontes Media's
//!   horizontal rank for outlets rated by both

use crate::models::{AdFontesMediaSource, BiasCategory, Factual, Source};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Counts (or percentages) per factual rating.
pub type FactualCounts = BTreeMap<Factual, u32>;

/// One [`FactualCounts`] row per bias category, left to right.
pub type BiasTable = BTreeMap<BiasCategory, FactualCounts>;

fn empty_table() -> BiasTable {
    BiasCategory::ALL
        .into_iter()
        .map(|category| {
            let row = Factual::ALL.into_iter().map(|f| (f, 0)).collect();
            (category, row)
        })
        .collect()
}

/// Count sources per bias category and factual rating.
///
/// Every category and rating is present, with zero counts where nothing was
/// found. Sources whose chart image name carries no known category are
/// skipped.
pub fn simple_left_right_bias(sources: &[Source]) -> BiasTable {
    let mut table = empty_table();
    for source in sources {
        let Some(category) = source.category() else {
            warn!(name = %source.name, img = %source.img_url, "No bias category in image name; skipping");
            continue;
        };
        if let Some(count) = table
            .get_mut(&category)
            .and_then(|row| row.get_mut(&source.factual))
        {
            *count += 1;
        }
    }
    debug!(?table, "Counted sources per category");
    table
}

/// [`simple_left_right_bias`] with each category row turned into whole
/// percentages of that row's total (ties rounded to even). Empty rows stay
/// at zero.
pub fn simple_left_right_bias_percent(sources: &[Source]) -> BiasTable {
    let mut table = simple_left_right_bias(sources);
    for row in table.values_mut() {
        let total: u32 = row.values().sum();
        if total == 0 {
            continue;
        }
        for value in row.values_mut() {
            *value = (*value as f64 / total as f64 * 100.0).round_ties_even() as u32;
        }
    }
    table
}

/// One outlet rated both here and by Ad Fontes Media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub name: String,
    /// Score estimated from the chart image.
    pub bias: i32,
    /// Ad Fontes Media's left-right rank.
    pub horizontal_rank: i32,
}

impl Comparison {
    /// Ad Fontes rank minus estimated bias.
    pub fn difference(&self) -> i32 {
        self.horizontal_rank - self.bias
    }

    /// Chart color: orange when Ad Fontes rates the outlet further right,
    /// blue otherwise.
    pub fn color(&self) -> &'static str {
        if self.horizontal_rank > self.bias {
            "rgb(255, 127, 14)"
        } else {
            "rgb(31, 119, 180)"
        }
    }

    fn sort_key(&self) -> f64 {
        (self.bias + self.horizontal_rank) as f64 / 2.0 + 100.0
    }
}

/// Join sources with Ad Fontes rows by exact name, ordered by the mean of
/// both ratings from left to right.
pub fn compare_to_adfontesmedia(
    sources: &[Source],
    adfontes: &[AdFontesMediaSource],
) -> Vec<Comparison> {
    let mut rows: Vec<Comparison> = sources
        .iter()
        .flat_map(|source| {
            adfontes
                .iter()
                .filter(move |datum| datum.name == source.name)
                .map(move |datum| Comparison {
                    name: source.name.clone(),
                    bias: source.bias.value(),
                    horizontal_rank: datum.horizontal_rank,
                })
        })
        .collect();
    rows.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));
    debug!(matched = rows.len(), "Joined Ad Fontes Media ratings");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bias::BiasScore;

    fn source(name: &str, image: &str, factual: Factual, bias: i64) -> Source {
        Source {
            name: name.into(),
            page_url: format!("https://mediabiasfactcheck.com/{name}/"),
            img_url: format!("https://mediabiasfactcheck.com/img/{image}"),
            factual,
            bias: BiasScore::clamped(bias),
        }
    }

    fn adfontes(name: &str, horizontal_rank: i32) -> AdFontesMediaSource {
        AdFontesMediaSource {
            name: name.into(),
            vertical_rank: 40,
            horizontal_rank,
        }
    }

    fn sample() -> Vec<Source> {
        vec![
            source("a", "left01.png", Factual::High, -30),
            source("b", "left02.png", Factual::High, -28),
            source("c", "left03.png", Factual::Mixed, -35),
            source("d", "extremeright021.png", Factual::Questionable, 50),
            source("e", "Chart.png", Factual::High, 0),
        ]
    }

    #[test]
    fn test_counts_every_category_and_rating() {
        let table = simple_left_right_bias(&sample());
        assert_eq!(table.len(), 7);
        assert_eq!(table[&BiasCategory::Left][&Factual::High], 2);
        assert_eq!(table[&BiasCategory::Left][&Factual::Mixed], 1);
        assert_eq!(table[&BiasCategory::ExtremeRight][&Factual::Questionable], 1);
        assert_eq!(table[&BiasCategory::LeastBiased][&Factual::High], 0);
        let total: u32 = table.values().flat_map(|row| row.values()).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_percentages_per_row() {
        let table = simple_left_right_bias_percent(&sample());
        assert_eq!(table[&BiasCategory::Left][&Factual::High], 67);
        assert_eq!(table[&BiasCategory::Left][&Factual::Mixed], 33);
        assert_eq!(table[&BiasCategory::Left][&Factual::Questionable], 0);
        assert_eq!(table[&BiasCategory::ExtremeRight][&Factual::Questionable], 100);
        assert!(table[&BiasCategory::Right].values().all(|&v| v == 0));
    }

    #[test]
    fn test_percentages_round_half_to_even() {
        // 1 of 8 is 12.5% -> 12; 3 of 8 is 37.5% -> 38.
        let mut sources = vec![source("h", "right01.png", Factual::High, 20)];
        sources.extend((0..3).map(|i| source(&format!("m{i}"), "right01.png", Factual::Mixed, 20)));
        sources.extend((0..4).map(|i| source(&format!("q{i}"), "right01.png", Factual::Questionable, 20)));
        let table = simple_left_right_bias_percent(&sources);
        assert_eq!(table[&BiasCategory::Right][&Factual::High], 12);
        assert_eq!(table[&BiasCategory::Right][&Factual::Mixed], 38);
        assert_eq!(table[&BiasCategory::Right][&Factual::Questionable], 50);
    }

    #[test]
    fn test_compare_joins_by_name_and_sorts() {
        let rows = compare_to_adfontesmedia(
            &sample(),
            &[adfontes("d", 30), adfontes("a", -10), adfontes("zzz", 0), adfontes("c", -20)],
        );
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "d"]);

        assert_eq!(rows[0].difference(), 15);
        assert_eq!(rows[0].color(), "rgb(255, 127, 14)");
        assert_eq!(rows[2].difference(), -20);
        assert_eq!(rows[2].color(), "rgb(31, 119, 180)");
    }

    #[test]
    fn test_compare_equal_ratings_are_blue() {
        let rows = compare_to_adfontesmedia(&sample()[..1], &[adfontes("a", -30)]);
        assert_eq!(rows[0].difference(), 0);
        assert_eq!(rows[0].color(), "rgb(31, 119, 180)");
    }
}
