use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{HttpRequest, HttpResponse, Transport, TransportOptions};

/// Default [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    options: TransportOptions,
    http: Client,
}

impl ReqwestTransport {
    pub fn new(options: TransportOptions) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(ms) = options.timeout {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = options.connect_timeout {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ua) = &options.user_agent {
            builder = builder.user_agent(ua.as_str());
        }

        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { options, http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        // The URL carries the API key, so it is stripped from errors.
        let res = self
            .http
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(reqwest::Error::without_url)?;

        Ok(HttpResponse { status, body })
    }

    fn options(&self) -> TransportOptions {
        self.options.clone()
    }
}
