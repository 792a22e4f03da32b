//! Data models for rated outlets and their reports.
//!
//! This module defines the records passed between the scraper, storage and
//! reporting layers:
//! - [`Source`]: A fully scraped outlet with its estimated bias score
//! - [`BrokenSource`]: An outlet page that could not be scraped or scored
//! - [`Factual`]: The site's factual-reporting rating
//! - [`BiasCategory`]: The site's own left-right label
//! - [`AdFontesMediaSource`]: A row of the Ad Fontes Media chart used for comparison

use crate::bias::BiasScore;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Factual-reporting rating of an outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Factual {
    High,
    Mixed,
    Questionable,
}

impl Factual {
    pub const ALL: [Factual; 3] = [Factual::High, Factual::Mixed, Factual::Questionable];

    /// Classify a page description or rating snippet.
    ///
    /// Checks run in order: `MIXED`, then `HIGH` or `Factual Reporting: High`,
    /// then `QUESTIONABLE SOURCE`.
    pub fn from_description(text: &str) -> Option<Self> {
        if text.contains("MIXED") {
            Some(Factual::Mixed)
        } else if text.contains("HIGH") || text.contains("Factual Reporting: High") {
            Some(Factual::High)
        } else if text.contains("QUESTIONABLE SOURCE") {
            Some(Factual::Questionable)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Factual::High => "HIGH",
            Factual::Mixed => "MIXED",
            Factual::Questionable => "QUESTIONABLE",
        }
    }
}

impl fmt::Display for Factual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Factual {
    type Err = String;

    /// Accepts `HIGH` as well as the older `Factual.HIGH` spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix("Factual.").unwrap_or(name);
        match name.to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Factual::High),
            "MIXED" => Ok(Factual::Mixed),
            "QUESTIONABLE" => Ok(Factual::Questionable),
            _ => Err(format!("unknown factual rating {s:?}")),
        }
    }
}

impl TryFrom<String> for Factual {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Factual> for String {
    fn from(factual: Factual) -> Self {
        factual.as_str().to_string()
    }
}

static CATEGORY_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z]*)").unwrap());

/// The site's own left-right label, encoded in the chart image file name
/// (e.g. `leftcenter03.png`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiasCategory {
    ExtremeLeft,
    Left,
    LeftCenter,
    LeastBiased,
    RightCenter,
    Right,
    ExtremeRight,
}

impl BiasCategory {
    /// All categories from left to right.
    pub const ALL: [BiasCategory; 7] = [
        BiasCategory::ExtremeLeft,
        BiasCategory::Left,
        BiasCategory::LeftCenter,
        BiasCategory::LeastBiased,
        BiasCategory::RightCenter,
        BiasCategory::Right,
        BiasCategory::ExtremeRight,
    ];

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    /// Category of a chart image, from the leading lowercase word of its
    /// file name.
    pub fn from_image_url(img_url: &str) -> Option<Self> {
        let file_name = img_url.rsplit('/').next().unwrap_or(img_url);
        let slug = CATEGORY_SLUG.captures(file_name)?.get(1)?.as_str();
        Self::from_slug(slug)
    }

    pub fn slug(self) -> &'static str {
        match self {
            BiasCategory::ExtremeLeft => "extremeleft",
            BiasCategory::Left => "left",
            BiasCategory::LeftCenter => "leftcenter",
            BiasCategory::LeastBiased => "leastbiased",
            BiasCategory::RightCenter => "rightcenter",
            BiasCategory::Right => "right",
            BiasCategory::ExtremeRight => "extremeright",
        }
    }

    /// Human-readable label for reports.
    pub fn label(self) -> &'static str {
        match self {
            BiasCategory::ExtremeLeft => "Extreme Left",
            BiasCategory::Left => "Left",
            BiasCategory::LeftCenter => "Left Centre",
            BiasCategory::LeastBiased => "Least Biased",
            BiasCategory::RightCenter => "Right Centre",
            BiasCategory::Right => "Right",
            BiasCategory::ExtremeRight => "Extreme Right",
        }
    }
}

impl fmt::Display for BiasCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A rated outlet.
///
/// Field order is the column order of the sources CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Outlet name as shown in the page title.
    pub name: String,
    /// The outlet's rating page.
    pub page_url: String,
    /// The left-right chart image, without query string.
    pub img_url: String,
    pub factual: Factual,
    /// Score estimated from the chart image.
    pub bias: BiasScore,
}

impl Source {
    pub fn category(&self) -> Option<BiasCategory> {
        BiasCategory::from_image_url(&self.img_url)
    }

    /// File name of the chart image.
    pub fn image_name(&self) -> &str {
        self.img_url.rsplit('/').next().unwrap_or(&self.img_url)
    }
}

/// An outlet page that could not be turned into a [`Source`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenSource {
    pub page_url: String,
    /// Human-readable cause.
    pub error_message: String,
}

/// A row of the Ad Fontes Media bias chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdFontesMediaSource {
    pub name: String,
    /// Reliability rank.
    pub vertical_rank: i32,
    /// Left-right rank, comparable with [`BiasScore`].
    pub horizontal_rank: i32,
}
