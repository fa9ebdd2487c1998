use serde_json::{Map, Value};
use std::convert::TryFrom;

use crate::error::WeatherError;

/// Level of detail requested from the API (`extensions` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeatherType {
    /// Current conditions only.
    #[default]
    Base,
    /// Current conditions plus forecast.
    All,
}

impl WeatherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherType::Base => "base",
            WeatherType::All => "all",
        }
    }
}

impl std::fmt::Display for WeatherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WeatherType {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "base" => Ok(WeatherType::Base),
            "all" => Ok(WeatherType::All),
            _ => Err(WeatherError::InvalidArgument(format!(
                "Invalid type value(base/all): {value}"
            ))),
        }
    }
}

/// Body encoding requested from the API (`output` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ResponseFormat {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            _ => Err(WeatherError::InvalidArgument(format!(
                "Invalid response format: {value}"
            ))),
        }
    }
}

/// Everything a single weather lookup sends upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
    pub kind: WeatherType,
    pub format: ResponseFormat,
}

impl WeatherQuery {
    /// Query with the default type (`base`) and format (`json`).
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            kind: WeatherType::default(),
            format: ResponseFormat::default(),
        }
    }

    /// Validate raw string arguments. The type is checked before the format.
    pub fn parse(city: &str, kind: &str, format: &str) -> Result<Self, WeatherError> {
        let kind = WeatherType::try_from(kind)?;
        let format = ResponseFormat::try_from(format)?;

        Ok(Self { city: city.to_owned(), kind, format })
    }

    pub fn kind(mut self, kind: WeatherType) -> Self {
        self.kind = kind;
        self
    }

    pub fn format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }
}

/// Decoded API response.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherResult {
    /// `json` output, decoded but not otherwise interpreted.
    Json(Map<String, Value>),
    /// `xml` output, returned as the raw body.
    Xml(String),
}

impl WeatherResult {
    pub fn as_json(&self) -> Option<&Map<String, Value>> {
        match self {
            WeatherResult::Json(map) => Some(map),
            WeatherResult::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&str> {
        match self {
            WeatherResult::Xml(body) => Some(body),
            WeatherResult::Json(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Map<String, Value>> {
        match self {
            WeatherResult::Json(map) => Some(map),
            WeatherResult::Xml(_) => None,
        }
    }
}
