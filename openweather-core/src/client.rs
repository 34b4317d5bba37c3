use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    model::{Weather, WeatherForecast, map_forecast, map_weather},
    params::{EndpointKind, RequestParameters, build_url, redacted_url},
    transport::{HttpTransport, Transport},
};

/// Entry point to the API.
///
/// Each successful [`WeatherApi::update`] replaces the held current weather
/// or forecast, depending on the endpoint that was requested. Nothing else
/// mutates them.
#[derive(Debug)]
pub struct WeatherApi {
    current_weather: Weather,
    forecast_weather: WeatherForecast,
    request_parameters: RequestParameters,
    transport: Box<dyn Transport>,
}

impl Default for WeatherApi {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherApi {
    pub fn new() -> Self {
        Self::with_transport(Box::new(HttpTransport::new()))
    }

    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            current_weather: Weather::default(),
            forecast_weather: WeatherForecast::default(),
            request_parameters: RequestParameters::default(),
            transport,
        }
    }

    pub fn current_weather(&self) -> &Weather {
        &self.current_weather
    }

    pub fn forecast_weather(&self) -> &WeatherForecast {
        &self.forecast_weather
    }

    /// Parameters of the last validated call.
    pub fn request_parameters(&self) -> &RequestParameters {
        &self.request_parameters
    }

    /// Fetch `params.endpoint` and store the mapped result.
    ///
    /// Fails with [`Error::InvalidParameters`] before any I/O when mandatory
    /// fields are missing. Transport and JSON errors are returned as is and
    /// leave the held results untouched. Endpoints other than `weather` and
    /// `forecast` are fetched but not mapped.
    pub async fn update(&mut self, params: RequestParameters) -> Result<EndpointKind> {
        let missing = params.missing_fields();
        if !missing.is_empty() {
            return Err(Error::InvalidParameters { missing });
        }

        let url = build_url(&params);
        let kind = params.endpoint_kind();
        debug!(url = %redacted_url(&params), %kind, "requesting OpenWeather endpoint");
        self.request_parameters = params;

        let tree = self.transport.get_json(&url).await?;

        match kind {
            EndpointKind::CurrentWeather => {
                let weather = map_weather(tree)?;
                info!(city = %weather.name, dt = weather.dt, "current weather updated");
                self.current_weather = weather;
            }
            EndpointKind::Forecast => {
                let forecast = map_forecast(tree)?;
                if !forecast.count_matches() {
                    debug!(cnt = forecast.cnt, entries = forecast.list.len(), "forecast cnt mismatch");
                }
                info!(entries = forecast.list.len(), "forecast updated");
                self.forecast_weather = forecast;
            }
            EndpointKind::Other => {
                warn!(endpoint = %self.request_parameters.endpoint, "unsupported endpoint, response ignored");
            }
        }

        Ok(kind)
    }
}
