use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CollectorError;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("static regex"));

const COLLECTION_PLACEHOLDER: &str = "COLLECTION_ADDRESS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Flat NFT records behind a cursor-paginated REST listing.
    #[default]
    SimpleHash,
    /// Nested DAS assets behind a page-numbered JSON-RPC listing.
    Helius,
}

impl SourceKind {
    pub fn default_batch_size(&self) -> usize {
        match self {
            SourceKind::SimpleHash => 50,
            SourceKind::Helius => 1000,
        }
    }

    pub fn credential_placeholder(&self) -> &'static str {
        match self {
            SourceKind::SimpleHash => "YOUR_SIMPLEHASH_API_KEY",
            SourceKind::Helius => "YOUR_HELIUS_API_KEY",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::SimpleHash => write!(f, "simplehash"),
            SourceKind::Helius => write!(f, "helius"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionId {
    type Err = CollectorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let is_valid = !normalized.is_empty()
            && normalized != COLLECTION_PLACEHOLDER
            && !normalized.chars().any(|ch| ch.is_whitespace() || ch == '/');
        if !is_valid {
            return Err(CollectorError::InvalidCollection(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

/// One collection item after its source-specific shape has been normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    /// Never empty; synthesized as `NFT_<index>` when the source has no name.
    pub name: String,
    pub token_id: Option<String>,
    pub image_uri: Option<String>,
    pub metadata_uri: Option<String>,
    pub raw: Value,
}

impl CanonicalRecord {
    pub fn filename(&self) -> String {
        sanitize_filename(&self.name)
    }

    pub fn summary(&self) -> SummaryEntry {
        SummaryEntry {
            name: self.name.clone(),
            img: self.image_uri.clone(),
            json: self.metadata_uri.clone(),
            id: self.token_id.clone(),
        }
    }
}

/// Row of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub name: String,
    pub img: Option<String>,
    pub json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
///
/// Lossy: `"A/B"` and `"A-B"` both become `"A_B"`.
pub fn sanitize_filename(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "_").into_owned()
}

pub fn synthetic_name(index: usize) -> String {
    format!("NFT_{index}")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_collection_id_trims() {
        let id: CollectionId = "  0xabc123 ".parse().unwrap();
        assert_eq!(id.as_str(), "0xabc123");
    }

    #[test]
    fn parse_collection_id_rejects_placeholder() {
        let err = "COLLECTION_ADDRESS".parse::<CollectionId>().unwrap_err();
        assert_matches!(err, CollectorError::InvalidCollection(_));
        let err = "".parse::<CollectionId>().unwrap_err();
        assert_matches!(err, CollectorError::InvalidCollection(_));
    }

    #[test]
    fn sanitize_replaces_each_char() {
        assert_eq!(sanitize_filename("Cool Cat #12"), "Cool_Cat__12");
        assert_eq!(sanitize_filename("Ünïcode"), "_n_code");
    }

    #[test]
    fn summary_omits_missing_id() {
        let entry = SummaryEntry {
            name: "A".to_string(),
            img: None,
            json: None,
            id: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"name":"A","img":null,"json":null}"#);
    }
}
