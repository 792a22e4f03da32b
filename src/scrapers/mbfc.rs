//! Media Bias/Fact Check scraper.
//!
//! This module scrapes outlet ratings from
//! [Media Bias/Fact Check](https://mediabiasfactcheck.com). Each category
//! page (left, left-center, center, ...) carries a centered paragraph linking
//! every outlet rated in that category. Each outlet page carries:
//!
//! - the outlet name in the `h1.page-title` heading
//! - a left-right spectrum chart image inside a heading
//! - a factual-reporting rating in the page description or body text
//!
//! Parsing is kept separate from fetching so it can run on fixed HTML.

use super::ScrapeError;
use crate::bias::BiasExtractor;
use crate::fetch::FetchAsync;
use crate::models::{BrokenSource, Factual, Source};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

static LINK_PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"p[style="text-align: center;"]"#).unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static PAGE_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.page-title").unwrap());
static HEADING_IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1 img[src]").unwrap());
static DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static RATING: Lazy<Selector> = Lazy::new(|| Selector::parse("span strong").unwrap());

/// Metadata read from an outlet page, before its chart is scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub name: String,
    /// Absolute chart image URL without query string.
    pub img_url: String,
    pub factual: Factual,
}

/// Extract outlet page links from a category page.
///
/// Links come from the first centered paragraph and are resolved against
/// `base_url`.
pub fn parse_category_page(base_url: &Url, html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Some(paragraph) = document.select(&LINK_PARAGRAPH).next() else {
        return Vec::new();
    };
    paragraph
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base_url.join(href).ok())
        .map(|u| u.to_string())
        .collect()
}

/// Drop the query string from an image `src` and resolve it against the page.
fn clean_image_url(page_url: &str, src: &str) -> String {
    let src = src.split_once('?').map_or(src, |(path, _)| path);
    Url::parse(page_url)
        .and_then(|base| base.join(src))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| src.to_string())
}

fn parse_factual(document: &Html) -> Option<Factual> {
    let description = document
        .select(&DESCRIPTION)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.replace('\u{a0}', " "));
    if let Some(factual) = description.as_deref().and_then(Factual::from_description) {
        return Some(factual);
    }

    for paragraph in document.select(&PARAGRAPH) {
        let text = paragraph
            .text()
            .collect::<String>()
            .replace('\u{a0}', " ")
            .to_lowercase();
        if text.contains("factual reporting:") {
            let rating = paragraph.select(&RATING).next()?.text().collect::<String>();
            return Factual::from_description(&rating.trim().to_uppercase());
        }
    }
    None
}

/// Read name, chart image and factual rating from an outlet page.
pub fn parse_source_page(url: &str, html: &str) -> Result<PageMetadata, ScrapeError> {
    let document = Html::parse_document(html);

    let name = document
        .select(&PAGE_TITLE)
        .next()
        .map(|h1| h1.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ScrapeError::MissingName {
            url: url.to_string(),
        })?;

    let img_url = document
        .select(&HEADING_IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| clean_image_url(url, src))
        .ok_or_else(|| ScrapeError::MissingImage {
            name: name.clone(),
            url: url.to_string(),
        })?;

    let factual = parse_factual(&document).ok_or_else(|| ScrapeError::MissingFactual {
        name: name.clone(),
        url: url.to_string(),
    })?;

    Ok(PageMetadata {
        name,
        img_url,
        factual,
    })
}

/// Scrapes Media Bias/Fact Check with a page fetcher, an image fetcher and
/// an extractor.
#[derive(Debug)]
pub struct MbfcScraper<P, I> {
    pages: P,
    images: I,
    extractor: BiasExtractor,
}

impl<P, I> MbfcScraper<P, I>
where
    P: FetchAsync<Response = String>,
    I: FetchAsync<Response = Vec<u8>>,
{
    pub fn new(pages: P, images: I, extractor: BiasExtractor) -> Self {
        Self {
            pages,
            images,
            extractor,
        }
    }

    /// Collect every outlet page linked from the category pages.
    ///
    /// Duplicates are dropped, keeping the first occurrence. A category page
    /// that cannot be fetched aborts indexing.
    #[instrument(level = "info", skip_all, fields(categories = category_pages.len()))]
    pub async fn index_pages(&self, category_pages: &[String]) -> Result<Vec<String>, ScrapeError> {
        let mut pages = Vec::new();
        for category in category_pages {
            let html = self
                .pages
                .fetch(category)
                .await
                .map_err(|source| ScrapeError::PageUnavailable {
                    url: category.clone(),
                    source,
                })?;
            let Ok(base) = Url::parse(category) else {
                warn!(%category, "Category page is not an absolute URL; skipping");
                continue;
            };
            let found = parse_category_page(&base, &html);
            info!(count = found.len(), %category, "Indexed category page");
            debug!(urls = ?found, "Category URLs");
            pages.extend(found);
        }
        let pages: Vec<String> = pages.into_iter().unique().collect();
        info!(count = pages.len(), "Indexed outlet pages");
        Ok(pages)
    }

    /// Scrape one outlet page and score its chart.
    #[instrument(level = "info", skip(self))]
    pub async fn scrape_source(&self, url: &str) -> Result<Source, ScrapeError> {
        let html = self
            .pages
            .fetch(url)
            .await
            .map_err(|source| ScrapeError::PageUnavailable {
                url: url.to_string(),
                source,
            })?;
        let meta = parse_source_page(url, &html).inspect_err(|_| {
            debug!(html = %truncate_for_log(&html, 300), "Unparseable outlet page");
        })?;

        let bytes = self.images.fetch(&meta.img_url).await.map_err(|source| {
            ScrapeError::ImageUnavailable {
                name: meta.name.clone(),
                url: url.to_string(),
                img_url: meta.img_url.clone(),
                source,
            }
        })?;
        let image = image::load_from_memory(&bytes).map_err(|source| ScrapeError::ImageDecode {
            name: meta.name.clone(),
            url: url.to_string(),
            img_url: meta.img_url.clone(),
            source,
        })?;
        let bias = self
            .extractor
            .extract(&image)
            .map_err(|source| ScrapeError::UnreadableChart {
                name: meta.name.clone(),
                url: url.to_string(),
                img_url: meta.img_url.clone(),
                source,
            })?;

        info!(name = %meta.name, img = %meta.img_url, %bias, "Scraped source");
        Ok(Source {
            name: meta.name,
            page_url: url.to_string(),
            img_url: meta.img_url,
            factual: meta.factual,
            bias,
        })
    }

    /// Scrape every page in order.
    ///
    /// Pages that fail are logged and returned as [`BrokenSource`]s.
    #[instrument(level = "info", skip_all, fields(count = urls.len()))]
    pub async fn scrape_sources(&self, urls: Vec<String>) -> (Vec<Source>, Vec<BrokenSource>) {
        let results: Vec<(String, Result<Source, ScrapeError>)> = stream::iter(urls)
            .then(move |url: String| async move {
                let result = self.scrape_source(&url).await;
                (url, result)
            })
            .collect()
            .await;

        let mut sources = Vec::new();
        let mut broken = Vec::new();
        for (url, result) in results {
            match result {
                Ok(source) => sources.push(source),
                Err(e) => {
                    warn!(%url, error = %e, "Skipping source");
                    broken.push(BrokenSource {
                        page_url: url,
                        error_message: e.to_string(),
                    });
                }
            }
        }
        info!(
            scraped = sources.len(),
            broken = broken.len(),
            "Finished scraping sources"
        );
        (sources, broken)
    }
}
