pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
pub const DEFAULT_ARWEAVE_GATEWAY: &str = "https://arweave.net/";

const IPFS_SCHEME: &str = "ipfs://";
const ARWEAVE_SCHEME: &str = "ar://";

/// Rewrites content-addressed URIs into URLs an HTTP client can fetch.
///
/// Anything that is not `ipfs://` or `ar://` passes through untouched, including
/// malformed input; bad URLs surface later as download errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriResolver {
    ipfs_gateway: String,
    arweave_gateway: String,
}

impl UriResolver {
    pub fn new(ipfs_gateway: impl Into<String>, arweave_gateway: impl Into<String>) -> Self {
        Self {
            ipfs_gateway: ipfs_gateway.into(),
            arweave_gateway: arweave_gateway.into(),
        }
    }

    pub fn resolve(&self, uri: &str) -> String {
        if let Some(rest) = uri.strip_prefix(IPFS_SCHEME) {
            return format!("{}{rest}", self.ipfs_gateway);
        }
        if let Some(rest) = uri.strip_prefix(ARWEAVE_SCHEME) {
            return format!("{}{rest}", self.arweave_gateway);
        }
        uri.to_string()
    }
}

impl Default for UriResolver {
    fn default() -> Self {
        Self::new(DEFAULT_IPFS_GATEWAY, DEFAULT_ARWEAVE_GATEWAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_known_schemes() {
        let resolver = UriResolver::new("https://gw.test/ipfs/", "https://ar.test/");
        assert_eq!(resolver.resolve("ipfs://abc"), "https://gw.test/ipfs/abc");
        assert_eq!(resolver.resolve("ar://xyz"), "https://ar.test/xyz");
        assert_eq!(resolver.resolve("https://x/y"), "https://x/y");
    }

    #[test]
    fn keeps_nested_paths() {
        let resolver = UriResolver::default();
        assert_eq!(
            resolver.resolve("ipfs://QmHash/1.json"),
            "https://ipfs.io/ipfs/QmHash/1.json"
        );
    }

    #[test]
    fn passes_through_unknown_input() {
        let resolver = UriResolver::default();
        assert_eq!(resolver.resolve(""), "");
        assert_eq!(resolver.resolve("IPFS://abc"), "IPFS://abc");
    }
}
