//! Request parameters, their validation, and URL composition.

use std::fmt;

use serde::{Deserialize, Serialize};
use urlencoding::encode;

/// Parameters for a single GET request against an OpenWeather endpoint.
///
/// Empty strings mean "not set". A request needs the api key, the endpoint and
/// at least one location selector; see [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParameters {
    pub api_key: String,
    /// Full endpoint URL, e.g. `https://api.openweathermap.org/data/2.5/weather`.
    pub endpoint: String,
    pub city_id: String,
    pub city_name: String,
    pub lat: String,
    pub lon: String,
    pub zip_code: String,
    /// `json`, `xml` or `html`.
    pub mode: String,
    /// `standard`, `metric` or `imperial`.
    pub units: String,
    pub language: String,
}

/// Label used in error messages when no location selector is set.
pub const CITY_SELECTOR: &str = "city_id|city_name|lat+lon|zip_code";

impl RequestParameters {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), endpoint: endpoint.into(), ..Self::default() }
    }

    pub fn with_city_id(mut self, id: impl Into<String>) -> Self {
        self.city_id = id.into();
        self
    }

    pub fn with_city_name(mut self, name: impl Into<String>) -> Self {
        self.city_name = name.into();
        self
    }

    pub fn with_coordinates(mut self, lat: impl Into<String>, lon: impl Into<String>) -> Self {
        self.lat = lat.into();
        self.lon = lon.into();
        self
    }

    pub fn with_zip_code(mut self, zip: impl Into<String>) -> Self {
        self.zip_code = zip.into();
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn has_coordinates(&self) -> bool {
        !self.lat.is_empty() && !self.lon.is_empty()
    }

    fn has_location(&self) -> bool {
        !self.city_id.is_empty()
            || !self.city_name.is_empty()
            || self.has_coordinates()
            || !self.zip_code.is_empty()
    }

    /// Names of the mandatory fields that are not set. Empty when valid.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.is_empty() {
            missing.push("api_key");
        }
        if self.endpoint.is_empty() {
            missing.push("endpoint");
        }
        if !self.has_location() {
            missing.push(CITY_SELECTOR);
        }
        missing
    }

    /// Location part of the query string.
    ///
    /// Every set selector overwrites the previous one, in the order zip,
    /// coordinates, name, id. The effective priority is therefore
    /// id > name > lat/lon > zip.
    pub fn city_fragment(&self) -> String {
        let mut fragment = String::new();
        if !self.zip_code.is_empty() {
            fragment = format!("zip={}", encode(&self.zip_code));
        }
        if self.has_coordinates() {
            fragment = format!("lat={}&lon={}", encode(&self.lat), encode(&self.lon));
        }
        if !self.city_name.is_empty() {
            fragment = format!("q={}", encode(&self.city_name));
        }
        if !self.city_id.is_empty() {
            fragment = format!("id={}", encode(&self.city_id));
        }
        fragment
    }

    pub fn endpoint_kind(&self) -> EndpointKind {
        EndpointKind::from_endpoint(&self.endpoint)
    }
}

/// Returns true when `params` is present and carries every mandatory field.
pub fn validate(params: Option<&RequestParameters>) -> bool {
    params.is_some_and(|p| p.missing_fields().is_empty())
}

/// Compose the request URL.
///
/// `<endpoint>?APPID=<key>&<city>&mode=<mode>&units=<units>&lang=<lang>`,
/// always in this order and without a trailing `&`.
pub fn build_url(params: &RequestParameters) -> String {
    compose(params, &params.api_key)
}

/// Same as [`build_url`] with the api key masked, for logs.
pub(crate) fn redacted_url(params: &RequestParameters) -> String {
    compose(params, "***")
}

fn compose(params: &RequestParameters, api_key: &str) -> String {
    format!(
        "{endpoint}?APPID={key}&{city}&mode={mode}&units={units}&lang={lang}",
        endpoint = params.endpoint,
        key = encode(api_key),
        city = params.city_fragment(),
        mode = encode(&params.mode),
        units = encode(&params.units),
        lang = encode(&params.language),
    )
}

/// Which kind of payload an endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    CurrentWeather,
    Forecast,
    /// Any endpoint we don't map (e.g. `onecall`).
    Other,
}

impl EndpointKind {
    /// Classify by the last `/`-separated segment of the endpoint URL.
    pub fn from_endpoint(endpoint: &str) -> Self {
        match endpoint.rsplit('/').next().unwrap_or_default() {
            "weather" => EndpointKind::CurrentWeather,
            "forecast" => EndpointKind::Forecast,
            _ => EndpointKind::Other,
        }
    }

    /// Last path segment used for this kind, if it is one we map.
    pub fn as_path(&self) -> Option<&'static str> {
        match self {
            EndpointKind::CurrentWeather => Some("weather"),
            EndpointKind::Forecast => Some("forecast"),
            EndpointKind::Other => None,
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path().unwrap_or("other"))
    }
}
