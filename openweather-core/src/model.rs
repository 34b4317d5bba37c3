use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_json::{Map, Value};

use crate::error::Result;

/// A single observation, as returned by the `weather` endpoint or as one
/// entry of a forecast `list`.
///
/// Keys missing from the payload keep their sentinel defaults (empty
/// container, empty string or `-1`). Keys we don't model land in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub coord: Map<String, Value>,
    pub weather: Vec<Value>,
    pub base: String,
    pub main: Map<String, Value>,
    pub visibility: i64,
    pub wind: Map<String, Value>,
    pub clouds: Map<String, Value>,
    pub rain: Map<String, Value>,
    pub snow: Map<String, Value>,
    pub dt: i64,
    pub sys: Map<String, Value>,
    pub timezone: i64,
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub cod: i64,
    /// Only present on forecast entries.
    pub dt_txt: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            coord: Map::new(),
            weather: Vec::new(),
            base: String::new(),
            main: Map::new(),
            visibility: -1,
            wind: Map::new(),
            clouds: Map::new(),
            rain: Map::new(),
            snow: Map::new(),
            dt: -1,
            sys: Map::new(),
            timezone: -1,
            id: -1,
            name: String::new(),
            cod: -1,
            dt_txt: String::new(),
            extra: Map::new(),
        }
    }
}

impl Weather {
    /// Observation time, `None` while `dt` still holds the sentinel.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        if self.dt < 0 {
            return None;
        }
        DateTime::from_timestamp(self.dt, 0)
    }

    /// Description of the first reported condition, e.g. "light rain".
    pub fn description(&self) -> Option<&str> {
        self.weather.first()?.get("description")?.as_str()
    }

    /// Numeric value from the `main` block (`temp`, `feels_like`, `humidity`, ...).
    pub fn main_value(&self, key: &str) -> Option<f64> {
        self.main.get(key).and_then(Value::as_f64)
    }
}

/// Payload of the 5 day / 3 hour `forecast` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherForecast {
    pub list: Vec<Weather>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub cod: i64,
    /// Usually `0`; error payloads put a string here.
    pub message: Value,
    /// Number of entries the API claims to return (at most 40).
    pub cnt: i64,
    pub city: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for WeatherForecast {
    fn default() -> Self {
        Self {
            list: Vec::new(),
            cod: 0,
            message: Value::from(0),
            cnt: -1,
            city: Map::new(),
            extra: Map::new(),
        }
    }
}

impl WeatherForecast {
    /// Whether `cnt` agrees with the number of entries actually mapped.
    /// The API does not guarantee it, so nothing enforces it.
    pub fn count_matches(&self) -> bool {
        usize::try_from(self.cnt).is_ok_and(|cnt| cnt == self.list.len())
    }

    pub fn city_name(&self) -> Option<&str> {
        self.city.get("name").and_then(Value::as_str)
    }
}

/// Map a generic JSON tree onto a fresh [`Weather`].
pub fn map_weather(tree: Value) -> Result<Weather> {
    Ok(serde_json::from_value(tree)?)
}

/// Map a generic JSON tree onto a fresh [`WeatherForecast`]; every element of
/// `list` goes through the same mapping as [`map_weather`].
pub fn map_forecast(tree: Value) -> Result<WeatherForecast> {
    Ok(serde_json::from_value(tree)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    #[test]
    fn map_weather_assigns_known_keys_only() {
        let weather = map_weather(json!({"dt": 123, "name": "X"})).unwrap();

        assert_eq!(weather.dt, 123);
        assert_eq!(weather.name, "X");
        assert_eq!(weather.visibility, -1);
        assert_eq!(weather.timezone, -1);
        assert_eq!(weather.id, -1);
        assert_eq!(weather.cod, -1);
        assert!(weather.coord.is_empty());
        assert!(weather.weather.is_empty());
        assert!(weather.dt_txt.is_empty());
        assert!(weather.extra.is_empty());
    }

    #[test]
    fn map_weather_keeps_unknown_keys_in_extra() {
        let weather = map_weather(json!({"dt": 1, "pop": 0.2, "custom": {"a": 1}})).unwrap();

        assert_eq!(weather.extra.get("pop"), Some(&json!(0.2)));
        assert_eq!(weather.extra.get("custom"), Some(&json!({"a": 1})));
        assert!(!weather.extra.contains_key("dt"));
    }

    #[test]
    fn map_weather_full_current_payload() {
        let tree = json!({
            "coord": {"lon": -0.1257, "lat": 51.5085},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "base": "stations",
            "main": {"temp": 12.3, "feels_like": 11.8, "pressure": 1012, "humidity": 81},
            "visibility": 10000,
            "wind": {"speed": 4.1, "deg": 230},
            "rain": {"1h": 0.25},
            "clouds": {"all": 75},
            "dt": 1700000000,
            "sys": {"country": "GB", "sunrise": 1699989000, "sunset": 1700021000},
            "timezone": 0,
            "id": 2643743,
            "name": "London",
            "cod": 200
        });

        let weather = map_weather(tree).unwrap();

        assert_eq!(weather.name, "London");
        assert_eq!(weather.id, 2643743);
        assert_eq!(weather.cod, 200);
        assert_eq!(weather.base, "stations");
        assert_eq!(weather.visibility, 10000);
        assert_eq!(weather.timezone, 0);
        assert_eq!(weather.description(), Some("light rain"));
        assert_eq!(weather.main_value("temp"), Some(12.3));
        assert_eq!(weather.main_value("humidity"), Some(81.0));
        assert_eq!(weather.rain.get("1h"), Some(&json!(0.25)));
        assert!(weather.snow.is_empty());
        assert_eq!(weather.observed_at().unwrap().timestamp(), 1700000000);
    }

    #[test]
    fn map_weather_accepts_string_cod() {
        let weather = map_weather(json!({"cod": "404", "message": "city not found"})).unwrap();
        assert_eq!(weather.cod, 404);
        assert_eq!(weather.extra.get("message"), Some(&json!("city not found")));
    }

    #[test]
    fn map_weather_rejects_non_object() {
        let err = map_weather(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn map_weather_rejects_mistyped_known_key() {
        assert!(map_weather(json!({"name": 5})).is_err());
    }

    #[test]
    fn observed_at_is_none_for_sentinel() {
        assert_eq!(Weather::default().observed_at(), None);
    }

    #[test]
    fn default_containers_are_not_shared() {
        let mut a = Weather::default();
        let b = Weather::default();
        a.main.insert("temp".into(), json!(1.0));
        assert!(b.main.is_empty());
    }

    #[test]
    fn map_forecast_maps_list_entries() {
        let forecast = map_forecast(json!({"cnt": 2, "list": [{"dt": 1}, {"dt": 2}]})).unwrap();

        assert_eq!(forecast.cnt, 2);
        assert_eq!(forecast.list.len(), 2);
        assert_eq!(forecast.list[0].dt, 1);
        assert_eq!(forecast.list[1].dt, 2);
        assert_eq!(forecast.list[0].name, "");
        assert!(forecast.count_matches());
    }

    #[test]
    fn map_forecast_full_payload() {
        let tree = json!({
            "cod": "200",
            "message": 0,
            "cnt": 3,
            "list": [
                {
                    "dt": 1700006400,
                    "main": {"temp": 9.5},
                    "weather": [{"description": "clear sky"}],
                    "pop": 0,
                    "sys": {"pod": "n"},
                    "dt_txt": "2023-11-15 00:00:00"
                }
            ],
            "city": {"id": 2643743, "name": "London", "country": "GB"}
        });

        let forecast = map_forecast(tree).unwrap();

        assert_eq!(forecast.cod, 200);
        assert_eq!(forecast.message, json!(0));
        assert_eq!(forecast.city_name(), Some("London"));
        assert!(!forecast.count_matches());

        let entry = &forecast.list[0];
        assert_eq!(entry.dt_txt, "2023-11-15 00:00:00");
        assert_eq!(entry.description(), Some("clear sky"));
        assert_eq!(entry.extra.get("pop"), Some(&json!(0)));
    }

    #[test]
    fn forecast_defaults() {
        let forecast = map_forecast(json!({})).unwrap();
        assert_eq!(forecast, WeatherForecast::default());
        assert_eq!(forecast.cnt, -1);
        assert_eq!(forecast.cod, 0);
        assert!(!forecast.count_matches());
    }

    #[test]
    fn map_forecast_rejects_non_array_list() {
        assert!(map_forecast(json!({"list": {"dt": 1}})).is_err());
    }
}
