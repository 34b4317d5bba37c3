use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by [`crate::WeatherApi::update`] and the mappers.
#[derive(Debug, Error)]
pub enum Error {
    /// Mandatory request parameters are missing. Raised before any I/O.
    #[error("Invalid request parameters, missing: {}", .missing.join(", "))]
    InvalidParameters { missing: Vec<&'static str> },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse OpenWeather JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameters_message_lists_fields() {
        let err = Error::InvalidParameters { missing: vec!["api_key", "endpoint"] };
        assert_eq!(err.to_string(), "Invalid request parameters, missing: api_key, endpoint");
    }
}
