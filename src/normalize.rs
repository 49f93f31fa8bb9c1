use serde_json::Value;
use tracing::debug;

use crate::domain::{CanonicalRecord, SourceKind, synthetic_name};

/// Maps a raw listing item onto the canonical record.
///
/// `index` is the 1-based position of the item in the run and only feeds the
/// synthetic name. Missing fields never fail: they become `None` and are logged.
pub fn normalize(raw: Value, kind: SourceKind, index: usize) -> CanonicalRecord {
    match kind {
        SourceKind::SimpleHash => normalize_flat(raw, index),
        SourceKind::Helius => normalize_asset(raw, index),
    }
}

/// Image field of an off-chain metadata document.
pub fn image_from_document(document: &Value) -> Option<String> {
    text_at(document, &["image"])
}

fn normalize_flat(raw: Value, index: usize) -> CanonicalRecord {
    let name = text_at(&raw, &["name"]);
    let token_id = text_at(&raw, &["nft_id"]).or_else(|| text_at(&raw, &["token_id"]));
    let image_uri = text_at(&raw, &["extra_metadata", "image_original_url"])
        .or_else(|| text_at(&raw, &["image_url"]));
    let metadata_uri = text_at(&raw, &["extra_metadata", "metadata_original_url"]);

    finish(raw, index, name, token_id, image_uri, metadata_uri)
}

fn normalize_asset(raw: Value, index: usize) -> CanonicalRecord {
    let name = text_at(&raw, &["content", "metadata", "name"])
        .or_else(|| text_at(&raw, &["name"]));
    let token_id = text_at(&raw, &["id"]);
    let image_uri = raw
        .get("content")
        .and_then(|v| v.get("files"))
        .and_then(|v| v.as_array())
        .and_then(|files| files.first())
        .and_then(|file| text_at(file, &["uri"]))
        .or_else(|| text_at(&raw, &["content", "metadata", "image"]));
    let metadata_uri = text_at(&raw, &["content", "json_uri"]);

    finish(raw, index, name, token_id, image_uri, metadata_uri)
}

fn finish(
    raw: Value,
    index: usize,
    name: Option<String>,
    token_id: Option<String>,
    image_uri: Option<String>,
    metadata_uri: Option<String>,
) -> CanonicalRecord {
    let name = name.unwrap_or_else(|| {
        let fallback = synthetic_name(index);
        debug!(index, name = %fallback, "record has no name, using synthetic name");
        fallback
    });
    if token_id.is_none() {
        debug!(%name, "record has no token identifier");
    }
    if image_uri.is_none() {
        debug!(%name, "record has no image uri");
    }
    if metadata_uri.is_none() {
        debug!(%name, "record has no original metadata uri");
    }
    CanonicalRecord {
        name,
        token_id,
        image_uri,
        metadata_uri,
        raw,
    }
}

/// String at `path`, treating blank strings like absent ones. Numeric
/// identifiers are rendered as text.
fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    match current {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flat_prefers_original_image() {
        let raw = json!({
            "nft_id": "ethereum.0xabc.1",
            "name": "Cat #1",
            "image_url": "https://cdn.test/1.png",
            "extra_metadata": {
                "image_original_url": "ipfs://QmImage/1.png",
                "metadata_original_url": "ipfs://QmMeta/1"
            }
        });
        let record = normalize(raw, SourceKind::SimpleHash, 1);
        assert_eq!(record.name, "Cat #1");
        assert_eq!(record.token_id.as_deref(), Some("ethereum.0xabc.1"));
        assert_eq!(record.image_uri.as_deref(), Some("ipfs://QmImage/1.png"));
        assert_eq!(record.metadata_uri.as_deref(), Some("ipfs://QmMeta/1"));
    }

    #[test]
    fn flat_without_extra_metadata() {
        let raw = json!({ "name": null, "image_url": "https://cdn.test/7.png", "token_id": 7 });
        let record = normalize(raw, SourceKind::SimpleHash, 7);
        assert_eq!(record.name, "NFT_7");
        assert_eq!(record.token_id.as_deref(), Some("7"));
        assert_eq!(record.image_uri.as_deref(), Some("https://cdn.test/7.png"));
        assert_eq!(record.metadata_uri, None);
    }

    #[test]
    fn asset_name_fallback_chain() {
        let nested = json!({
            "id": "a",
            "name": "Top",
            "content": { "metadata": { "name": "Inner" } }
        });
        assert_eq!(normalize(nested, SourceKind::Helius, 1).name, "Inner");

        let top = json!({ "id": "b", "name": "Top", "content": { "metadata": {} } });
        assert_eq!(normalize(top, SourceKind::Helius, 2).name, "Top");

        let none = json!({ "id": "c" });
        assert_eq!(normalize(none, SourceKind::Helius, 3).name, "NFT_3");
    }

    #[test]
    fn asset_image_prefers_first_file() {
        let raw = json!({
            "id": "mint1",
            "content": {
                "json_uri": "ar://meta",
                "files": [{ "uri": "ar://file0" }, { "uri": "ar://file1" }],
                "metadata": { "name": "Sol", "image": "https://img.test/embedded.png" }
            }
        });
        let record = normalize(raw, SourceKind::Helius, 1);
        assert_eq!(record.image_uri.as_deref(), Some("ar://file0"));
        assert_eq!(record.metadata_uri.as_deref(), Some("ar://meta"));
        assert_eq!(record.token_id.as_deref(), Some("mint1"));
    }

    #[test]
    fn asset_image_falls_back_to_embedded() {
        let raw = json!({
            "id": "mint2",
            "content": { "files": [], "metadata": { "image": "https://img.test/e.png" } }
        });
        let record = normalize(raw, SourceKind::Helius, 1);
        assert_eq!(record.image_uri.as_deref(), Some("https://img.test/e.png"));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let raw = json!({ "name": "   ", "image_url": "" });
        let record = normalize(raw, SourceKind::SimpleHash, 4);
        assert_eq!(record.name, "NFT_4");
        assert_eq!(record.image_uri, None);
    }

    #[test]
    fn document_image() {
        assert_eq!(
            image_from_document(&json!({ "image": "ipfs://x" })).as_deref(),
            Some("ipfs://x")
        );
        assert_eq!(image_from_document(&json!([1, 2])), None);
    }
}
