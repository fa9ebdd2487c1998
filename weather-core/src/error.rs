use thiserror::Error;

/// Errors surfaced by [`WeatherClient`](crate::WeatherClient).
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Caller passed a value outside one of the accepted enumerations.
    /// Raised before any request is sent.
    #[error("{0}")]
    InvalidArgument(String),

    /// The transport failed, or the API answered with a non-2xx status.
    #[error("{0}")]
    Http(String),

    /// A `json` response body was not a JSON object.
    #[error("Failed to decode JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_and_http_display_message_verbatim() {
        let err = WeatherError::InvalidArgument("Invalid response format: array".into());
        assert_eq!(err.to_string(), "Invalid response format: array");

        let err = WeatherError::Http("request timeout".into());
        assert_eq!(err.to_string(), "request timeout");
    }

    #[test]
    fn decode_error_wraps_serde_error() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = WeatherError::from(source);

        assert!(matches!(err, WeatherError::Decode(_)));
        assert!(err.to_string().starts_with("Failed to decode JSON response"));
    }
}
