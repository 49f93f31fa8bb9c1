use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::domain::{CollectionId, SourceKind};
use crate::error::CollectorError;
use crate::listing::{ListingSource, Page, PageRequest, PaginationStyle};

pub const SIMPLEHASH_BASE: &str = "https://api.simplehash.com/api/v0/nfts/collection";

#[derive(Debug, Deserialize)]
struct CollectionPage {
    #[serde(default)]
    nfts: Option<Vec<Value>>,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// Cursor-paginated SimpleHash collection listing.
#[derive(Clone)]
pub struct SimpleHashClient {
    client: Client,
    base_url: String,
    collection: CollectionId,
    limit: usize,
}

impl SimpleHashClient {
    pub fn new(
        api_key: &str,
        collection: CollectionId,
        limit: usize,
        base_url: Option<&str>,
    ) -> Result<Self, CollectorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("nft-collector/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CollectorError::ListingHttp(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| CollectorError::MissingCredential(SourceKind::SimpleHash.to_string()))?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static("x-api-key"), key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| CollectorError::ListingHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url
                .unwrap_or(SIMPLEHASH_BASE)
                .trim_end_matches('/')
                .to_string(),
            collection,
            limit,
        })
    }

    /// Listing URL for one page. Query values are percent-encoded, so opaque
    /// base64 cursors survive intact.
    pub fn page_url(&self, cursor: Option<&str>) -> Result<Url, CollectorError> {
        let base = format!("{}/{}", self.base_url, self.collection.as_str());
        let limit = self.limit.to_string();
        let mut params = vec![("limit", limit.as_str())];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }
        Url::parse_with_params(&base, &params).map_err(|err| {
            CollectorError::ListingHttp(format!("invalid listing URL {base}: {err}"))
        })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, CollectorError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "SimpleHash request failed".to_string());
        Err(CollectorError::ListingStatus { status, message })
    }
}

impl ListingSource for SimpleHashClient {
    fn kind(&self) -> SourceKind {
        SourceKind::SimpleHash
    }

    fn style(&self) -> PaginationStyle {
        PaginationStyle::Cursor
    }

    fn fetch_page(&self, request: &PageRequest) -> Result<Page, CollectorError> {
        let cursor = match request {
            PageRequest::Cursor(cursor) => cursor.as_deref(),
            PageRequest::Number(_) => None,
        };
        let url = self.page_url(cursor)?;
        info!(%url, "fetching collection page");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| CollectorError::ListingHttp(err.without_url().to_string()))?;
        let response = Self::handle_status(response)?;
        let page: CollectionPage = response
            .json()
            .map_err(|err| CollectorError::ListingDecode(err.without_url().to_string()))?;
        Ok(Page {
            items: page.nfts.unwrap_or_default(),
            next_cursor: page.next_cursor,
        })
    }
}
