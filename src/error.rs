use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CollectorError {
    #[error("missing config file nft-collector.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("please set your {0} API key first")]
    #[diagnostic(help("set `api_key` in nft-collector.json or export NFT_COLLECTOR_API_KEY"))]
    MissingCredential(String),

    #[error("invalid collection identifier: {0}")]
    InvalidCollection(String),

    #[error("invalid batch size: {0}")]
    InvalidBatchSize(usize),

    #[error("listing request failed: {0}")]
    ListingHttp(String),

    #[error("listing API returned status {status}: {message}")]
    ListingStatus { status: u16, message: String },

    #[error("listing RPC returned error {code}: {message}")]
    ListingRpc { code: i64, message: String },

    #[error("failed to decode listing response: {0}")]
    ListingDecode(String),

    #[error("content request failed: {0}")]
    ContentHttp(String),

    #[error("content request to {url} returned status {status}")]
    ContentStatus { status: u16, url: String },

    #[error("failed to decode content: {0}")]
    ContentDecode(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
