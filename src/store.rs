use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::Value;
use tempfile::Builder;

use crate::domain::SummaryEntry;
use crate::error::CollectorError;

pub const DEFAULT_OUTPUT_DIR: &str = "./nft_metadata";

const IMAGES_DIR: &str = "images";
const JSON_DIR: &str = "json";
const JSON_ORIGINAL_DIR: &str = "json_original";
const SUMMARY_FILE: &str = "metadata.json";
const IMAGE_EXT: &str = "png";

/// On-disk layout of one collection run:
///
/// ```text
/// <root>/images/<name>.png
/// <root>/json/<name>.json
/// <root>/json_original/<name>.json
/// <root>/metadata.json
/// ```
///
/// Every write replaces an existing file of the same name.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: Utf8PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn metadata_path(&self, filename: &str) -> Utf8PathBuf {
        self.root.join(JSON_DIR).join(format!("{filename}.json"))
    }

    pub fn original_metadata_path(&self, filename: &str) -> Utf8PathBuf {
        self.root
            .join(JSON_ORIGINAL_DIR)
            .join(format!("{filename}.json"))
    }

    pub fn image_path(&self, filename: &str) -> Utf8PathBuf {
        self.root
            .join(IMAGES_DIR)
            .join(format!("{filename}.{IMAGE_EXT}"))
    }

    pub fn summary_path(&self) -> Utf8PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    pub fn ensure_layout(&self) -> Result<(), CollectorError> {
        for dir in [
            self.root.clone(),
            self.root.join(IMAGES_DIR),
            self.root.join(JSON_DIR),
            self.root.join(JSON_ORIGINAL_DIR),
        ] {
            fs::create_dir_all(dir.as_std_path())
                .map_err(|err| CollectorError::Filesystem(format!("create {dir}: {err}")))?;
        }
        Ok(())
    }

    pub fn write_metadata(
        &self,
        filename: &str,
        record: &Value,
    ) -> Result<Utf8PathBuf, CollectorError> {
        let path = self.metadata_path(filename);
        write_json_atomic(&path, record)?;
        Ok(path)
    }

    pub fn write_original_metadata(
        &self,
        filename: &str,
        document: &Value,
    ) -> Result<Utf8PathBuf, CollectorError> {
        let path = self.original_metadata_path(filename);
        write_json_atomic(&path, document)?;
        Ok(path)
    }

    /// Stored as `.png` whatever the actual content type is.
    pub fn write_image(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Utf8PathBuf, CollectorError> {
        let path = self.image_path(filename);
        write_bytes_atomic(&path, bytes)?;
        Ok(path)
    }

    pub fn write_summary_index(
        &self,
        entries: &[SummaryEntry],
    ) -> Result<Utf8PathBuf, CollectorError> {
        let path = self.summary_path();
        write_json_atomic(&path, entries)?;
        Ok(path)
    }
}

fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Utf8Path,
    value: &T,
) -> Result<(), CollectorError> {
    let content = serde_json::to_vec_pretty(value)
        .map_err(|err| CollectorError::Filesystem(format!("serialize {path}: {err}")))?;
    write_bytes_atomic(path, &content)
}

fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), CollectorError> {
    let parent = path
        .parent()
        .ok_or_else(|| CollectorError::Filesystem(format!("invalid destination path {path}")))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| CollectorError::Filesystem(format!("create {parent}: {err}")))?;
    let mut temp = Builder::new()
        .prefix(".nft-collector")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| CollectorError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| CollectorError::Filesystem(format!("write {path}: {err}")))?;
    temp.persist(path.as_std_path())
        .map_err(|err| CollectorError::Filesystem(format!("persist {path}: {err}")))?;
    Ok(())
}
