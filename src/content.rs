use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::error::CollectorError;

/// Plain GETs for off-chain metadata documents and image bytes. URLs are
/// expected to be already resolved to HTTP(S).
pub trait ContentClient {
    fn fetch_json(&self, url: &str) -> Result<Value, CollectorError>;
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CollectorError>;
}

impl<T: ContentClient + ?Sized> ContentClient for &T {
    fn fetch_json(&self, url: &str) -> Result<Value, CollectorError> {
        (**self).fetch_json(url)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CollectorError> {
        (**self).fetch_bytes(url)
    }
}

#[derive(Clone)]
pub struct HttpContentClient {
    client: Client,
}

impl HttpContentClient {
    pub fn new() -> Result<Self, CollectorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("nft-collector/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CollectorError::ContentHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| CollectorError::ContentHttp(err.to_string()))?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, CollectorError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| content_http(url, err))?;
        if !response.status().is_success() {
            return Err(CollectorError::ContentStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

impl ContentClient for HttpContentClient {
    fn fetch_json(&self, url: &str) -> Result<Value, CollectorError> {
        self.get(url)?
            .json()
            .map_err(|err| {
                CollectorError::ContentDecode(format!("{url}: {}", err.without_url()))
            })
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CollectorError> {
        let bytes = self
            .get(url)?
            .bytes()
            .map_err(|err| content_http(url, err))?;
        Ok(bytes.to_vec())
    }
}

fn content_http(url: &str, err: reqwest::Error) -> CollectorError {
    CollectorError::ContentHttp(format!("{url}: {}", err.without_url()))
}
