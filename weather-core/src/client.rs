use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::{
    error::{Result, WeatherError},
    model::{ResponseFormat, WeatherQuery, WeatherResult},
    transport::{HttpRequest, ReqwestTransport, Transport, TransportOptions},
};

/// AMap weather endpoint.
pub const DEFAULT_BASE_URL: &str = "https://restapi.amap.com/v3/weather/weatherInfo";

/// Client for the AMap city weather API.
///
/// The transport is either injected with [`with_transport`](Self::with_transport)
/// or built lazily from the stored [`TransportOptions`] on first use.
#[derive(Debug)]
pub struct WeatherClient {
    api_key: String,
    base_url: String,
    options: TransportOptions,
    injected: Option<Arc<dyn Transport>>,
    cached: Mutex<Option<Arc<dyn Transport>>>,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(WeatherError::InvalidArgument("API key must not be empty".into()));
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            options: TransportOptions::default(),
            injected: None,
            cached: Mutex::new(None),
        })
    }

    pub fn with_options(mut self, options: TransportOptions) -> Self {
        self.set_transport_options(options);
        self
    }

    /// Use `transport` for every request instead of the default one.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.set_transport(transport);
        self
    }

    /// Overrides the endpoint (for wiremock in tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.options
    }

    /// Replace the stored transport options.
    ///
    /// The lazily built transport is dropped and rebuilt on next use. An
    /// injected transport is left untouched.
    pub fn set_transport_options(&mut self, options: TransportOptions) {
        self.options = options;
        self.cached.get_mut().take();
    }

    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) {
        self.injected = Some(transport);
    }

    /// Transport used for the next request.
    pub async fn http_client(&self) -> Result<Arc<dyn Transport>> {
        if let Some(transport) = &self.injected {
            return Ok(Arc::clone(transport));
        }

        let mut cached = self.cached.lock().await;
        if let Some(transport) = cached.as_ref() {
            return Ok(Arc::clone(transport));
        }

        let transport: Arc<dyn Transport> = Arc::new(
            ReqwestTransport::new(self.options.clone())
                .map_err(|e| WeatherError::Http(format!("{e:#}")))?,
        );
        *cached = Some(Arc::clone(&transport));

        Ok(transport)
    }

    /// Look up weather for `city`.
    ///
    /// `kind` must be `base` or `all`, `format` must be `json` or `xml`. They
    /// are validated in that order before anything is sent.
    pub async fn fetch_weather(&self, city: &str, kind: &str, format: &str) -> Result<WeatherResult> {
        let query = WeatherQuery::parse(city, kind, format)?;
        self.fetch(&query).await
    }

    /// Current conditions as JSON.
    pub async fn get_live_weather(&self, city: &str) -> Result<WeatherResult> {
        self.fetch_weather(city, "base", "json").await
    }

    /// Current conditions plus forecast as JSON.
    pub async fn get_forecasts_weather(&self, city: &str) -> Result<WeatherResult> {
        self.fetch_weather(city, "all", "json").await
    }

    #[instrument(skip_all, fields(city = %query.city, kind = %query.kind, format = %query.format))]
    pub async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherResult> {
        let request = self.build_request(query);
        let transport = self.http_client().await?;

        tracing::debug!(url = %request.url, query = ?redacted(&request), "AMap weather request");

        let response = transport.send(&request).await.map_err(|e| {
            let message = format!("{e:#}").replace(self.api_key.as_str(), "***");
            tracing::warn!(error = %message, "AMap weather request failed");
            WeatherError::Http(message)
        })?;

        tracing::debug!(status = response.status, "AMap weather response");

        if !response.is_success() {
            tracing::warn!(status = response.status, "AMap weather request returned an error status");
            return Err(WeatherError::Http(format!(
                "HTTP status {}: {}",
                response.status,
                truncate_body(&response.body),
            )));
        }

        match query.format {
            ResponseFormat::Json => {
                let parsed: Map<String, Value> = serde_json::from_str(&response.body)?;
                Ok(WeatherResult::Json(parsed))
            }
            ResponseFormat::Xml => Ok(WeatherResult::Xml(response.body)),
        }
    }

    fn build_request(&self, query: &WeatherQuery) -> HttpRequest {
        HttpRequest::get(self.base_url.as_str())
            .query("key", self.api_key.as_str())
            .query("city", query.city.as_str())
            .query("output", query.format.as_str())
            .query("extensions", query.kind.as_str())
    }
}

fn redacted(request: &HttpRequest) -> Vec<(&str, &str)> {
    request
        .query
        .iter()
        .map(|(k, v)| if k == "key" { (k.as_str(), "***") } else { (k.as_str(), v.as_str()) })
        .collect()
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
