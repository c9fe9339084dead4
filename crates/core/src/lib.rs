//! Flight Delay Core Library
//!
//! Shared utilities for the predictor CLI and the web form:
//! - Configuration loading (XDG-compliant)
//! - Data artifact lookup
//! - Common defaults

mod config;

pub use config::{find_config_file, find_data_file, get_xdg_data_dir, load_config, ConfigSource};

/// Application name used for XDG paths
pub const APP_NAME: &str = "flight-delay";

/// Default web form port
pub const DEFAULT_WEB_PORT: u16 = 9900;

/// Public forecast service queried for airport weather
pub const DEFAULT_WEATHER_URL: &str = "https://api.weather.gov";

/// api.weather.gov rejects requests without a User-Agent
pub const DEFAULT_USER_AGENT: &str = "flight-delay-predictor/0.1";

/// Route reference table file name
pub const DEFAULT_ROUTES_FILE: &str = "merged_airport_data.csv";

/// Classifier artifact file name (XGBoost JSON model)
pub const DEFAULT_MODEL_FILE: &str = "xgb_classifier.json";
