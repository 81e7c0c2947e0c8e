//! Hetzner Cloud API client.

use crate::types::{
    ActionResponse, AssignRequest, ErrorResponse, FloatingIpListResponse, ServerListResponse,
};
use async_trait::async_trait;
use common::{Error, Result};
use failover::{Action, CloudApi, FloatingIp, Server};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.hetzner.cloud/v1";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size used when listing
const PER_PAGE: u32 = 50;

/// API token, never printed
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, e.g. `https://api.hetzner.cloud/v1`
    pub endpoint: Url,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Settings for `endpoint` with the default timeout
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Hetzner Cloud client implementing the failover operations
#[derive(Debug, Clone)]
pub struct HcloudClient {
    http: reqwest::Client,
    base: String,
    token: Token,
}

impl HcloudClient {
    /// Create a client for the public API endpoint
    pub fn new(token: Token) -> Result<Self> {
        let endpoint = Url::parse(DEFAULT_ENDPOINT).map_err(Error::config)?;
        Self::with_config(token, ClientConfig::new(endpoint))
    }

    /// Create a client with custom settings
    pub fn with_config(token: Token, config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("keepalived-notify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::transport)?;

        Ok(Self {
            http,
            base: config.endpoint.as_str().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    /// Send a request and decode a successful JSON response
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(Error::transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(Error::transport)?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Map an error response to `Error::Api`, tolerating non-JSON bodies
fn api_error(status: u16, body: &[u8]) -> Error {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(response) => Error::api(status, response.error.code, response.error.message),
        Err(_) => Error::api(status, "unknown", String::from_utf8_lossy(body).trim()),
    }
}

#[async_trait]
impl CloudApi for HcloudClient {
    async fn server_by_name(&self, name: &str) -> Result<Server> {
        let request = self.http.get(self.url("servers")).query(&[("name", name)]);
        let response: ServerListResponse = self.send(request).await?;

        response
            .servers
            .into_iter()
            .next()
            .map(Server::from)
            .ok_or_else(|| Error::not_found(format!("server '{}'", name)))
    }

    async fn floating_ips(&self) -> Result<Vec<FloatingIp>> {
        let mut floating_ips = Vec::new();
        let mut page = 1u32;

        loop {
            let request = self
                .http
                .get(self.url("floating_ips"))
                .query(&[("page", page), ("per_page", PER_PAGE)]);
            let response: FloatingIpListResponse = self.send(request).await?;

            debug!(page, count = response.floating_ips.len(), "Fetched floating IP page");
            floating_ips.extend(response.floating_ips.into_iter().map(FloatingIp::from));

            match response.meta.pagination.and_then(|p| p.next_page) {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(floating_ips)
    }

    async fn assign_floating_ip(&self, floating_ip: &FloatingIp, server: &Server) -> Result<Action> {
        let request = self
            .http
            .post(self.url(&format!("floating_ips/{}/actions/assign", floating_ip.id)))
            .json(&AssignRequest { server: server.id });
        let response: ActionResponse = self.send(request).await?;

        Ok(response.action.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = Token::new("super-secret");
        assert_eq!(format!("{:?}", token), "Token(***)");
        assert_eq!(token.expose(), "super-secret");
    }

    #[test]
    fn test_default_endpoint() {
        let client = HcloudClient::new(Token::new("t")).unwrap();
        assert_eq!(client.url("floating_ips"), "https://api.hetzner.cloud/v1/floating_ips");
    }

    #[test]
    fn test_url_joining_strips_trailing_slash() {
        let config = ClientConfig {
            endpoint: Url::parse("http://127.0.0.1:8080/v1/").unwrap(),
            timeout: Duration::from_secs(1),
        };
        let client = HcloudClient::with_config(Token::new("t"), config).unwrap();
        assert_eq!(client.url("servers"), "http://127.0.0.1:8080/v1/servers");
    }

    #[test]
    fn test_api_error_mapping() {
        let err = api_error(423, br#"{"error": {"code": "locked", "message": "is locked"}}"#);
        assert!(matches!(err, Error::Api { status: 423, ref code, .. } if code == "locked"));

        let err = api_error(502, b"Bad Gateway\n");
        assert_eq!(err.to_string(), "API error (status 502, code unknown): Bad Gateway");
    }
}
