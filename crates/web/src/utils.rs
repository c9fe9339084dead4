use clap::Parser;
use flight_delay_core::{find_config_file, load_config, ConfigSource, DEFAULT_WEB_PORT};
use predictor::ContextSettings;

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Flight delay web form - pick a flight, get a delay probability"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $FLIGHT_DELAY_WEB_CONFIG, ./web.toml,
    /// $XDG_CONFIG_HOME/flight-delay/web.toml, /etc/flight-delay/web.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "FLIGHT_DELAY_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(long, env = "FLIGHT_DELAY_WEB_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FLIGHT_DELAY_WEB_PORT")]
    pub port: Option<u16>,

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
}

impl Cli {
    pub fn host(&self) -> String {
        self.host.clone().unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_WEB_PORT)
    }

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
        find_config_file("FLIGHT_DELAY_WEB_CONFIG", "web.toml")
    };

    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    let cli = Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        host: cli_args.host.or(file_config.host),
        port: cli_args.port.or(file_config.port),
        routes_file: cli_args.routes_file.or(file_config.routes_file),
        model_file: cli_args.model_file.or(file_config.model_file),
        weather_url: cli_args.weather_url.or(file_config.weather_url),
        user_agent: cli_args.user_agent.or(file_config.user_agent),
        request_timeout: cli_args.request_timeout.or(file_config.request_timeout),
    };
    (cli, source)
}
