//! Core library for the `amap-weather` CLI.
//!
//! This crate defines:
//! - `WeatherClient`, a thin binding for the AMap city weather endpoint
//! - The `Transport` seam the client sends requests through
//! - Query/result models and the error type
//! - Configuration & credentials handling
//!
//! It is used by `amap-weather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod transport;

pub use client::{DEFAULT_BASE_URL, WeatherClient};
pub use config::Config;
pub use error::{Result, WeatherError};
pub use model::{ResponseFormat, WeatherQuery, WeatherResult, WeatherType};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportOptions};
