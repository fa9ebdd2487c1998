use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod http;

pub use http::ReqwestTransport;

/// A GET request as handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    /// Query pairs, sent in order.
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { url: url.into(), query: Vec::new() }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_owned(), value.into()));
        self
    }

    /// Value of the first query pair named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Options used when building the default transport.
///
/// Example TOML:
/// [transport]
/// timeout = 5000
/// user_agent = "amap-weather/0.1"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOptions {
    /// Total request timeout, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Connect timeout, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl TransportOptions {
    pub fn timeout(mut self, millis: u64) -> Self {
        self.timeout = Some(millis);
        self
    }

    pub fn connect_timeout(mut self, millis: u64) -> Self {
        self.connect_timeout = Some(millis);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Overlay every option set in `other` on top of `self`.
    pub fn merge(&mut self, other: TransportOptions) {
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.connect_timeout.is_some() {
            self.connect_timeout = other.connect_timeout;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
    }
}

/// Sends one HTTP request and hands back the raw response.
///
/// Implementations report network-level failures as errors and return every
/// received response, whatever its status, as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, request: &HttpRequest) -> anyhow::Result<HttpResponse>;

    /// Options this transport was built with.
    fn options(&self) -> TransportOptions {
        TransportOptions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_keeps_query_order() {
        let req = HttpRequest::get("http://example.test").query("key", "k").query("city", "深圳");

        assert_eq!(
            req.query,
            vec![("key".to_string(), "k".to_string()), ("city".to_string(), "深圳".to_string())]
        );
        assert_eq!(req.query_value("city"), Some("深圳"));
        assert_eq!(req.query_value("output"), None);
    }

    #[test]
    fn response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn merge_only_overrides_set_options() {
        let mut opts = TransportOptions::default().timeout(1000).user_agent("a");
        opts.merge(TransportOptions::default().timeout(5000));

        assert_eq!(opts.timeout, Some(5000));
        assert_eq!(opts.user_agent.as_deref(), Some("a"));
        assert_eq!(opts.connect_timeout, None);
    }

    #[test]
    fn options_from_toml() {
        let opts: TransportOptions = toml::from_str("timeout = 5000\nconnect_timeout = 250").unwrap();

        assert_eq!(opts, TransportOptions::default().timeout(5000).connect_timeout(250));
    }
}
