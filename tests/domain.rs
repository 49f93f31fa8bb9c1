use assert_matches::assert_matches;

use nft_collector::domain::{
    CollectionId, SourceKind, SummaryEntry, sanitize_filename, synthetic_name,
};
use nft_collector::error::CollectorError;

#[test]
fn parse_collection_id_valid() {
    let id: CollectionId = "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d".parse().unwrap();
    assert_eq!(id.as_str(), "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d");

    let solana: CollectionId = "J1S9H3QjnRtBbbuD4HjPV6RpRhwuk4zKbxsnCHuTgh9w".parse().unwrap();
    assert_eq!(solana.to_string(), "J1S9H3QjnRtBbbuD4HjPV6RpRhwuk4zKbxsnCHuTgh9w");
}

#[test]
fn parse_collection_id_invalid() {
    for value in ["", "   ", "COLLECTION_ADDRESS", "0xabc def", "a/b"] {
        let err = value.parse::<CollectionId>().unwrap_err();
        assert_matches!(err, CollectorError::InvalidCollection(_));
    }
}

#[test]
fn sanitize_keeps_alphanumerics() {
    assert_eq!(sanitize_filename("Bored0Ape1234"), "Bored0Ape1234");
}

#[test]
fn sanitize_is_idempotent() {
    for name in ["Cool Cat #12", "a.b/c\\d", "émoji 🐱", "NFT_9"] {
        let once = sanitize_filename(name);
        assert_eq!(sanitize_filename(&once), once);
        assert!(once.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_'));
    }
}

#[test]
fn sanitize_collides_on_punctuation() {
    assert_eq!(sanitize_filename("A/B"), "A_B");
    assert_eq!(sanitize_filename("A-B"), "A_B");
}

#[test]
fn synthetic_names_use_index() {
    assert_eq!(synthetic_name(1), "NFT_1");
    assert_eq!(synthetic_name(150), "NFT_150");
}

#[test]
fn source_kind_parses_lowercase() {
    let kind: SourceKind = serde_json::from_str("\"helius\"").unwrap();
    assert_eq!(kind, SourceKind::Helius);
    assert_eq!(kind.default_batch_size(), 1000);
    assert_eq!(SourceKind::default(), SourceKind::SimpleHash);
    assert!(serde_json::from_str::<SourceKind>("\"opensea\"").is_err());
}

#[test]
fn summary_entry_keeps_nulls() {
    let entry = SummaryEntry {
        name: "Cat #1".to_string(),
        img: Some("ipfs://QmImage".to_string()),
        json: None,
        id: Some("ethereum.0xabc.1".to_string()),
    };
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "name": "Cat #1",
            "img": "ipfs://QmImage",
            "json": null,
            "id": "ethereum.0xabc.1"
        })
    );
}
