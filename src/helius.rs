use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::domain::{CollectionId, SourceKind};
use crate::error::CollectorError;
use crate::listing::{ListingSource, Page, PageRequest, PaginationStyle};

pub const HELIUS_RPC_BASE: &str = "https://mainnet.helius-rpc.com/";

const RPC_METHOD: &str = "getAssetsByGroup";
const RPC_REQUEST_ID: &str = "nft-collector";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'static str,
    params: GroupParams<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupParams<'a> {
    group_key: &'static str,
    group_value: &'a str,
    page: u32,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<AssetList>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct AssetList {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Page-numbered DAS `getAssetsByGroup` listing over JSON-RPC.
#[derive(Clone)]
pub struct HeliusClient {
    client: Client,
    endpoint: String,
    collection: CollectionId,
    limit: usize,
}

impl HeliusClient {
    pub fn new(
        api_key: &str,
        collection: CollectionId,
        limit: usize,
        endpoint: Option<&str>,
    ) -> Result<Self, CollectorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("nft-collector/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CollectorError::ListingHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| CollectorError::ListingHttp(err.to_string()))?;
        let endpoint = match endpoint {
            Some(endpoint) => endpoint.to_string(),
            None => format!("{HELIUS_RPC_BASE}?api-key={api_key}"),
        };
        Ok(Self {
            client,
            endpoint,
            collection,
            limit,
        })
    }

    fn request_body(&self, page: u32) -> RpcRequest<'_> {
        RpcRequest {
            jsonrpc: "2.0",
            id: RPC_REQUEST_ID,
            method: RPC_METHOD,
            params: GroupParams {
                group_key: "collection",
                group_value: self.collection.as_str(),
                page,
                limit: self.limit,
            },
        }
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
            .unwrap_or_else(|_| "Helius request failed".to_string());
        Err(CollectorError::ListingStatus { status, message })
    }
}

impl ListingSource for HeliusClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Helius
    }

    fn style(&self) -> PaginationStyle {
        PaginationStyle::Numbered {
            batch_size: self.limit,
        }
    }

    fn fetch_page(&self, request: &PageRequest) -> Result<Page, CollectorError> {
        let page = match request {
            PageRequest::Number(page) => *page,
            PageRequest::Cursor(_) => 1,
        };
        info!(page, limit = self.limit, "fetching asset page");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(page))
            .send()
            .map_err(|err| CollectorError::ListingHttp(err.without_url().to_string()))?;
        let response = Self::handle_status(response)?;
        let body: RpcResponse = response
            .json()
            .map_err(|err| CollectorError::ListingDecode(err.without_url().to_string()))?;
        into_page(body)
    }
}

fn into_page(body: RpcResponse) -> Result<Page, CollectorError> {
    if let Some(error) = body.error {
        return Err(CollectorError::ListingRpc {
            code: error.code,
            message: error.message,
        });
    }
    Ok(Page {
        items: body.result.map(|list| list.items).unwrap_or_default(),
        next_cursor: None,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn client() -> HeliusClient {
        HeliusClient::new(
            "key",
            "J1S9H3QjnRtBbbuD4HjPV6RpRhwuk4zKbxsnCHuTgh9w".parse().unwrap(),
            1000,
            None,
        )
        .unwrap()
    }

    #[test]
    fn default_endpoint_carries_key() {
        assert_eq!(
            client().endpoint,
            "https://mainnet.helius-rpc.com/?api-key=key"
        );
    }

    #[test]
    fn request_body_shape() {
        let client = client();
        let body = serde_json::to_value(client.request_body(3)).unwrap();
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "id": "nft-collector",
                "method": "getAssetsByGroup",
                "params": {
                    "groupKey": "collection",
                    "groupValue": "J1S9H3QjnRtBbbuD4HjPV6RpRhwuk4zKbxsnCHuTgh9w",
                    "page": 3,
                    "limit": 1000
                }
            })
        );
    }

    #[test]
    fn rpc_error_aborts() {
        let body: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "error": { "code": -32602, "message": "invalid params" }
        }))
        .unwrap();
        assert_matches!(
            into_page(body),
            Err(CollectorError::ListingRpc { code: -32602, .. })
        );
    }

    #[test]
    fn transport_error_hides_api_key() {
        let client = HeliusClient::new(
            "SECRET-KEY-123",
            "J1S9H3QjnRtBbbuD4HjPV6RpRhwuk4zKbxsnCHuTgh9w".parse().unwrap(),
            10,
            Some("http://127.0.0.1:1/?api-key=SECRET-KEY-123"),
        )
        .unwrap();
        let err = client.fetch_page(&PageRequest::Number(1)).unwrap_err();
        assert_matches!(&err, CollectorError::ListingHttp(_));
        assert!(!err.to_string().contains("SECRET-KEY-123"), "{err}");
    }

    #[test]
    fn missing_result_is_empty_page() {
        let body: RpcResponse = serde_json::from_value(json!({ "jsonrpc": "2.0" })).unwrap();
        assert!(into_page(body).unwrap().items.is_empty());
    }
}
