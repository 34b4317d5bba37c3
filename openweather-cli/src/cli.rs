use anyhow::Context;
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inquire::{Password, Select, Text};
use openweather_core::{Config, EndpointKind, RequestParameters, Weather, WeatherApi, build_url};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "openweather", version, about = "OpenWeather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and request defaults.
    Configure,

    /// Show the current weather for a location.
    Current(Show),

    /// Show the 5 day / 3 hour forecast for a location.
    Forecast(Show),

    /// Print the request URL without sending it.
    Url {
        #[arg(value_enum)]
        kind: Kind,

        #[command(flatten)]
        request: Request,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Kind {
    Current,
    Forecast,
}

impl From<Kind> for EndpointKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Current => EndpointKind::CurrentWeather,
            Kind::Forecast => EndpointKind::Forecast,
        }
    }
}

/// Location selectors and per-request overrides.
#[derive(Debug, Clone, Args)]
pub struct Request {
    /// OpenWeather city id.
    #[arg(long)]
    id: Option<String>,

    /// City name, optionally with country code, e.g. "London,uk".
    #[arg(long)]
    name: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<String>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<String>,

    /// Zip code, optionally with country code, e.g. "10001,us".
    #[arg(long)]
    zip: Option<String>,

    /// standard, metric or imperial.
    #[arg(long)]
    units: Option<String>,

    #[arg(long)]
    lang: Option<String>,

    /// Overrides the configured key.
    #[arg(long, env = "OPENWEATHER_API_KEY")]
    api_key: Option<String>,
}

/// A request whose response gets printed.
#[derive(Debug, Clone, Args)]
pub struct Show {
    #[command(flatten)]
    request: Request,

    /// Dump the mapped record as JSON.
    #[arg(long)]
    json: bool,
}

impl Request {
    fn parameters(&self, config: &Config, kind: EndpointKind) -> anyhow::Result<RequestParameters> {
        let mut params = config.request_parameters(kind)?;

        if let Some(key) = &self.api_key {
            debug!("api key taken from command line");
            params.api_key = key.clone();
        } else {
            params.api_key = config.api_key()?.to_string();
        }
        if let Some(units) = &self.units {
            debug!(configured = %params.units, %units, "units overridden");
            params.units = units.clone();
        }
        if let Some(lang) = &self.lang {
            debug!(configured = %params.language, %lang, "language overridden");
            params.language = lang.clone();
        }

        params.city_id = self.id.clone().unwrap_or_default();
        params.city_name = self.name.clone().unwrap_or_default();
        params.lat = self.lat.clone().unwrap_or_default();
        params.lon = self.lon.clone().unwrap_or_default();
        params.zip_code = self.zip.clone().unwrap_or_default();

        Ok(params)
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Current(Show { request, json }) => {
                let config = Config::load()?;
                let params = request.parameters(&config, EndpointKind::CurrentWeather)?;
                let units = params.units.clone();

                let mut api = WeatherApi::new();
                api.update(params).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(api.current_weather())?);
                } else {
                    print_current(api.current_weather(), &units);
                }
                Ok(())
            }
            Command::Forecast(Show { request, json }) => {
                let config = Config::load()?;
                let params = request.parameters(&config, EndpointKind::Forecast)?;
                let units = params.units.clone();

                let mut api = WeatherApi::new();
                api.update(params).await?;

                let forecast = api.forecast_weather();
                if json {
                    println!("{}", serde_json::to_string_pretty(forecast)?);
                } else {
                    println!("{}", forecast.city_name().unwrap_or("Unknown location"));
                    for entry in &forecast.list {
                        println!("  {}", summary_line(entry, &units));
                    }
                }
                Ok(())
            }
            Command::Url { kind, request } => {
                let config = Config::load()?;
                let params = request.parameters(&config, kind.into())?;
                println!("{}", build_url(&params));
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let units = Select::new("Units:", vec!["metric", "imperial", "standard"])
        .prompt()
        .context("Failed to read units")?;

    let lang = Text::new("Language code:")
        .with_default(&config.lang)
        .prompt()
        .context("Failed to read language")?;

    config.api_key = Some(api_key);
    config.units = units.to_string();
    config.lang = lang;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_current(weather: &Weather, units: &str) {
    println!("{}", if weather.name.is_empty() { "Unknown location" } else { weather.name.as_str() });
    println!("  {}", summary_line(weather, units));

    if let Some(local) = local_time(weather) {
        println!("  local time: {local}");
    }
}

/// Observation time shifted by the city's UTC offset. `None` while either
/// `dt` or `timezone` still holds the sentinel.
fn local_time(weather: &Weather) -> Option<String> {
    if weather.timezone == -1 {
        return None;
    }
    let offset = FixedOffset::east_opt(i32::try_from(weather.timezone).ok()?)?;
    let time = weather.observed_at()?;
    Some(time.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string())
}

fn summary_line(weather: &Weather, units: &str) -> String {
    let when = if weather.dt_txt.is_empty() {
        weather.observed_at().map(format_utc).unwrap_or_else(|| "-".to_string())
    } else {
        weather.dt_txt.clone()
    };

    let temp = weather
        .main_value("temp")
        .map(|t| format!("{t:.1}{}", temperature_unit(units)))
        .unwrap_or_else(|| "n/a".to_string());

    format!("{when}  {temp}  {}", weather.description().unwrap_or("unknown"))
}

fn format_utc(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn temperature_unit(units: &str) -> &'static str {
    match units {
        "metric" => "°C",
        "imperial" => "°F",
        _ => "K",
    }
}
