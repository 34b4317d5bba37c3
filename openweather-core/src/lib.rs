//! Core library for the `openweather` CLI.
//!
//! This crate defines:
//! - Request parameters, their validation and URL composition
//! - Mapping of API responses onto `Weather` / `WeatherForecast`
//! - The `WeatherApi` client holding the last fetched results
//! - Configuration defaults stored on disk
//!
//! It is used by `openweather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod params;
pub mod transport;

pub use client::WeatherApi;
pub use config::Config;
pub use error::{Error, Result};
pub use model::{Weather, WeatherForecast, map_forecast, map_weather};
pub use params::{EndpointKind, RequestParameters, build_url, validate};
pub use transport::{HttpTransport, Transport};
