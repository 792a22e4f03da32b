//! Scrapers for bias-rating sites.
//!
//! Scraping follows a two-phase pattern:
//!
//! 1. **Indexing**: Discover outlet page URLs from the site's category pages
//! 2. **Scraping**: Parse each outlet page, download its chart image and
//!    score it with the [`BiasExtractor`](crate::bias::BiasExtractor)
//!
//! # Supported Sites
//!
//! | Site | Module | Notes |
//! |------|--------|-------|
//! | Media Bias/Fact Check | [`mbfc`] | Category pages link every rated outlet |
//!
//! Failures on a single outlet are logged and recorded as a
//! [`BrokenSource`](crate::models::BrokenSource); the batch carries on.

pub mod mbfc;

use crate::bias::BiasError;
use crate::fetch::FetchError;

/// Why one outlet page could not be turned into a source.
///
/// Every variant names the page so the failure can be recorded against it.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("The page \"{url}\" did not contain valid content: {source}")]
    PageUnavailable {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("The page \"{url}\" does not have a name")]
    MissingName { url: String },
    #[error("The source \"{name}\" with url \"{url}\" does not contain a left-right bias image")]
    MissingImage { name: String, url: String },
    #[error("Could not find factual information on \"{name}\" with url \"{url}\"")]
    MissingFactual { name: String, url: String },
    #[error("Could not download the bias image \"{img_url}\" of \"{name}\" with url \"{url}\": {source}")]
    ImageUnavailable {
        name: String,
        url: String,
        img_url: String,
        #[source]
        source: FetchError,
    },
    #[error("Could not decode the bias image \"{img_url}\" of \"{name}\" with url \"{url}\": {source}")]
    ImageDecode {
        name: String,
        url: String,
        img_url: String,
        #[source]
        source: image::ImageError,
    },
    #[error("The bias image \"{img_url}\" of \"{name}\" with url \"{url}\" is unreadable: {source}")]
    UnreadableChart {
        name: String,
        url: String,
        img_url: String,
        #[source]
        source: BiasError,
    },
}
