//! CSV persistence for scraped sources.
//!
//! # Files
//!
//! - **Sources** (`sources_file.csv`): headerless rows of
//!   `name,page_url,img_url,factual,bias`
//! - **Broken sources** (`broken_sources.csv`): headerless rows of
//!   `page_url,error_message`
//! - **Ad Fontes Media** chart export: one header row, then
//!   `name,vertical_rank,horizontal_rank`
//!
//! Fields are comma-delimited and quoted only when needed.

use crate::models::{AdFontesMediaSource, BrokenSource, Source};
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

impl StorageError {
    fn csv(path: &Path) -> impl FnOnce(csv::Error) -> Self + '_ {
        move |source| StorageError::Csv {
            path: path.display().to_string(),
            source,
        }
    }
}

fn write_rows<T: serde::Serialize>(rows: &[T], path: &Path) -> Result<(), StorageError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(StorageError::csv(path))?;
    for row in rows {
        writer.serialize(row).map_err(StorageError::csv(path))?;
    }
    writer
        .flush()
        .map_err(|e| StorageError::csv(path)(csv::Error::from(e)))?;
    Ok(())
}

fn read_rows<T: serde::de::DeserializeOwned>(
    path: &Path,
    has_headers: bool,
) -> Result<Vec<T>, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .from_path(path)
        .map_err(StorageError::csv(path))?;
    reader
        .records()
        .map(|record| {
            record
                .and_then(|r| r.deserialize::<T>(None))
                .map_err(StorageError::csv(path))
        })
        .collect()
}

/// Write all sources, replacing the file.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn store_sources(sources: &[Source], path: impl AsRef<Path>) -> Result<(), StorageError> {
    write_rows(sources, path.as_ref())?;
    info!(count = sources.len(), "Stored sources");
    Ok(())
}

/// Read every source row.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_sources(path: impl AsRef<Path>) -> Result<Vec<Source>, StorageError> {
    let sources: Vec<Source> = read_rows(path.as_ref(), false)?;
    info!(count = sources.len(), "Loaded sources");
    Ok(sources)
}

/// Write the pages that failed, replacing the file.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn store_broken_sources(
    broken: &[BrokenSource],
    path: impl AsRef<Path>,
) -> Result<(), StorageError> {
    write_rows(broken, path.as_ref())?;
    info!(count = broken.len(), "Stored broken sources");
    Ok(())
}

/// Read the pages recorded by [`store_broken_sources`].
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_broken_sources(path: impl AsRef<Path>) -> Result<Vec<BrokenSource>, StorageError> {
    read_rows(path.as_ref(), false)
}

/// Read an Ad Fontes Media chart export, skipping its header row.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_adfontesmedia_sources(
    path: impl AsRef<Path>,
) -> Result<Vec<AdFontesMediaSource>, StorageError> {
    let sources: Vec<AdFontesMediaSource> = read_rows(path.as_ref(), true)?;
    info!(count = sources.len(), "Loaded Ad Fontes Media sources");
    Ok(sources)
}
