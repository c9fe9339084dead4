use clap::Parser;
use flight_delay_core::{
    find_config_file, find_data_file, load_config, ConfigSource, DEFAULT_MODEL_FILE,
    DEFAULT_ROUTES_FILE, DEFAULT_USER_AGENT, DEFAULT_WEATHER_URL,
};
use reqwest::{header::ACCEPT, Client};
use serde::de::DeserializeOwned;
use slog::{debug, o, Drain, Level, Logger};
use std::{env, path::PathBuf, time::Duration};
use time::Date;

use crate::{
    travel_date_window, ContextSettings, DepartureSlot, ForecastError, RouteTable, AIRLINES,
};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Flight delay predictor - scores one flight against the current NOAA forecast"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $FLIGHT_DELAY_PREDICTOR_CONFIG, ./predictor.toml,
    /// $XDG_CONFIG_HOME/flight-delay/predictor.toml, /etc/flight-delay/predictor.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "FLIGHT_DELAY_LEVEL")]
    pub level: Option<String>,

    /// CSV reference table of routes with coordinates and distance
    #[arg(long, env = "FLIGHT_DELAY_ROUTES_FILE")]
    pub routes_file: Option<String>,

    /// Classifier artifact in XGBoost JSON format
    #[arg(long, env = "FLIGHT_DELAY_MODEL_FILE")]
    pub model_file: Option<String>,

    /// Base URL of the weather service
    #[arg(long, env = "FLIGHT_DELAY_WEATHER_URL")]
    pub weather_url: Option<String>,

    /// HTTP User-Agent header for weather service requests
    #[arg(long, env = "FLIGHT_DELAY_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds, unset waits on the transport
    #[arg(long, env = "FLIGHT_DELAY_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Airline name or carrier code, e.g. "Delta Air Lines" or DL
    #[arg(short, long)]
    #[serde(skip)]
    pub airline: Option<String>,

    /// Origin airport code
    #[arg(short, long)]
    #[serde(skip)]
    pub origin: Option<String>,

    /// Destination airport code
    #[arg(short, long)]
    #[serde(skip)]
    pub destination: Option<String>,

    /// Travel date, YYYY-MM-DD, within the next 7 days
    #[arg(long)]
    #[serde(skip)]
    pub date: Option<String>,

    /// Departure slot, HH:00
    #[arg(long)]
    #[serde(skip)]
    pub departure: Option<String>,

    /// Print the airlines, airports and departure slots that can be chosen
    #[arg(long)]
    #[serde(skip)]
    pub list_options: bool,
}

impl Cli {
    pub fn context_settings(&self) -> ContextSettings {
        ContextSettings::with_defaults(
            self.routes_file.clone(),
            self.model_file.clone(),
            self.weather_url.clone(),
            self.user_agent.clone(),
            self.request_timeout,
        )
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> (Cli, ConfigSource) {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("FLIGHT_DELAY_PREDICTOR_CONFIG", "predictor.toml")
    };

    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    let cli = Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        routes_file: cli_args.routes_file.or(file_config.routes_file),
        model_file: cli_args.model_file.or(file_config.model_file),
        weather_url: cli_args.weather_url.or(file_config.weather_url),
        user_agent: cli_args.user_agent.or(file_config.user_agent),
        request_timeout: cli_args.request_timeout.or(file_config.request_timeout),
        airline: cli_args.airline,
        origin: cli_args.origin,
        destination: cli_args.destination,
        date: cli_args.date,
        departure: cli_args.departure,
        list_options: cli_args.list_options,
    };
    (cli, source)
}

impl ContextSettings {
    /// Fill unset options; data files fall back to ./ then the XDG data dir
    pub fn with_defaults(
        routes_file: Option<String>,
        model_file: Option<String>,
        weather_url: Option<String>,
        user_agent: Option<String>,
        request_timeout: Option<u64>,
    ) -> Self {
        ContextSettings {
            routes_file: routes_file
                .map(PathBuf::from)
                .unwrap_or_else(|| find_data_file(DEFAULT_ROUTES_FILE)),
            model_file: model_file
                .map(PathBuf::from)
                .unwrap_or_else(|| find_data_file(DEFAULT_MODEL_FILE)),
            weather_url: weather_url.unwrap_or_else(|| DEFAULT_WEATHER_URL.to_string()),
            user_agent: user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            request_timeout: request_timeout.map(Duration::from_secs),
        }
    }
}

/// Human-readable list of every choice a prediction accepts
pub fn option_listing(routes: &RouteTable, today: Date) -> Vec<String> {
    let (first, last) = travel_date_window(today);
    let slots: Vec<String> = DepartureSlot::all().map(|slot| slot.to_string()).collect();

    let mut lines = vec![String::from("Airlines:")];
    lines.extend(
        AIRLINES
            .iter()
            .map(|airline| format!("  {} ({})", airline.name, airline.code)),
    );
    lines.push(format!("Origins: {}", routes.origin_codes().join(", ")));
    lines.push(format!(
        "Destinations: {}",
        routes.destination_codes().join(", ")
    ));
    lines.push(format!("Dates: {} to {}", first, last));
    lines.push(format!("Departures: {}", slots.join(", ")));
    lines
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(level: Option<&str>) -> Logger {
    let log_level = match level {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// GET-and-decode for the weather service's GeoJSON endpoints
pub struct JsonFetcher {
    logger: Logger,
    client: Client,
}

impl JsonFetcher {
    pub fn new(
        logger: Logger,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> Result<JsonFetcher, reqwest::Error> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            logger,
            client: builder.build()?,
        })
    }

    /// Transport problems and non-2xx statuses are `Transport`; a body that
    /// does not decode into `T` is `Schema`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ForecastError> {
        let transport = |reason: String| ForecastError::Transport {
            url: url.to_string(),
            reason,
        };

        debug!(self.logger, "requesting: {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/geo+json")
            .send()
            .await
            .map_err(|e| transport(format!("error sending request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport(format!("status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport(format!("error reading body: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| ForecastError::Schema(format!("{} returned {}", url, e)))
    }
}
