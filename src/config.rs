use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{CollectionId, SourceKind};
use crate::error::CollectorError;
use crate::pacing::DEFAULT_DELAY_MS;
use crate::store::DEFAULT_OUTPUT_DIR;
use crate::uri::{DEFAULT_ARWEAVE_GATEWAY, DEFAULT_IPFS_GATEWAY};

pub const DEFAULT_CONFIG_FILE: &str = "nft-collector.json";
pub const API_KEY_ENV: &str = "NFT_COLLECTOR_API_KEY";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub source: Option<SourceKind>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub ipfs_gateway: Option<String>,
    #[serde(default)]
    pub arweave_gateway: Option<String>,
    /// Replaces the listing base URL (SimpleHash) or RPC endpoint (Helius).
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub source: SourceKind,
    pub api_key: String,
    pub collection: CollectionId,
    pub output_dir: Utf8PathBuf,
    pub batch_size: usize,
    pub delay_ms: u64,
    pub ipfs_gateway: String,
    pub arweave_gateway: String,
    pub endpoint: Option<String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, CollectorError> {
        let config = Self::load(path)?;
        Self::resolve_config_with_env(config, std::env::var(API_KEY_ENV).ok())
    }

    /// Reads and parses the config file without applying defaults.
    pub fn load(path: Option<&str>) -> Result<Config, CollectorError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(CollectorError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| CollectorError::ConfigRead(config_path.clone()))?;
        serde_json::from_str(&content).map_err(|err| CollectorError::ConfigParse(err.to_string()))
    }

    /// Like [`ConfigLoader::resolve_config`], with `env_key` (the value of
    /// `NFT_COLLECTOR_API_KEY`) replacing `api_key` when it is non-blank.
    pub fn resolve_config_with_env(
        mut config: Config,
        env_key: Option<String>,
    ) -> Result<ResolvedConfig, CollectorError> {
        if let Some(key) = env_key.filter(|key| !key.trim().is_empty()) {
            config.api_key = Some(key);
        }
        Self::resolve_config(config)
    }

    /// Applies defaults and validates credentials, collection and batch size.
    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, CollectorError> {
        let schema_version = config.schema_version.unwrap_or(1);
        let source = config.source.unwrap_or_default();

        let api_key = config
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty() && !is_placeholder_key(key, source))
            .ok_or_else(|| CollectorError::MissingCredential(source.to_string()))?;

        let collection: CollectionId = config.collection.as_deref().unwrap_or("").parse()?;

        let batch_size = config
            .batch_size
            .unwrap_or_else(|| source.default_batch_size());
        if batch_size == 0 {
            return Err(CollectorError::InvalidBatchSize(batch_size));
        }

        Ok(ResolvedConfig {
            schema_version,
            source,
            api_key,
            collection,
            output_dir: Utf8PathBuf::from(
                config
                    .output_dir
                    .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            ),
            batch_size,
            delay_ms: config.delay_ms.unwrap_or(DEFAULT_DELAY_MS),
            ipfs_gateway: config
                .ipfs_gateway
                .unwrap_or_else(|| DEFAULT_IPFS_GATEWAY.to_string()),
            arweave_gateway: config
                .arweave_gateway
                .unwrap_or_else(|| DEFAULT_ARWEAVE_GATEWAY.to_string()),
            endpoint: config.endpoint.filter(|endpoint| !endpoint.trim().is_empty()),
        })
    }
}

fn is_placeholder_key(key: &str, source: SourceKind) -> bool {
    key == source.credential_placeholder()
        || (key.starts_with("YOUR_") && key.ends_with("_API_KEY"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn minimal() -> Config {
        Config {
            api_key: Some("sh_live_123".to_string()),
            collection: Some("0xabc".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_follow_source() {
        let resolved = ConfigLoader::resolve_config(minimal()).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.source, SourceKind::SimpleHash);
        assert_eq!(resolved.batch_size, 50);
        assert_eq!(resolved.delay_ms, 500);
        assert_eq!(resolved.output_dir, Utf8PathBuf::from("./nft_metadata"));

        let helius = Config {
            source: Some(SourceKind::Helius),
            ..minimal()
        };
        assert_eq!(ConfigLoader::resolve_config(helius).unwrap().batch_size, 1000);
    }

    #[test]
    fn placeholder_key_is_rejected() {
        let config = Config {
            api_key: Some("YOUR_SIMPLEHASH_API_KEY".to_string()),
            ..minimal()
        };
        assert_matches!(
            ConfigLoader::resolve_config(config),
            Err(CollectorError::MissingCredential(_))
        );
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = Config {
            batch_size: Some(0),
            ..minimal()
        };
        assert_matches!(
            ConfigLoader::resolve_config(config),
            Err(CollectorError::InvalidBatchSize(0))
        );
    }
}
