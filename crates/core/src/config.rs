//! Configuration loading utilities
//!
//! Settings are resolved from several sources in priority order:
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Config file (searched in standard locations)
//! 4. Built-in defaults (lowest priority)
//!
//! Data artifacts (the route reference table and the classifier model) are
//! looked up next to the working directory first, then in the XDG data dir.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::APP_NAME;

/// Describes where a configuration was loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Explicit path provided via CLI or env var
    Explicit(PathBuf),
    /// Found in current working directory
    CurrentDir(PathBuf),
    /// Found in XDG config home (~/.config/flight-delay/)
    XdgConfig(PathBuf),
    /// Found in system config (/etc/flight-delay/)
    System(PathBuf),
    /// No config file found, using defaults
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Find a configuration file in standard locations
///
/// Search order:
/// 1. Environment variable (e.g., FLIGHT_DELAY_WEB_CONFIG)
/// 2. Current directory (predictor.toml or web.toml)
/// 3. XDG config home ($XDG_CONFIG_HOME/flight-delay/ or ~/.config/flight-delay/)
/// 4. System config (/etc/flight-delay/)
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    if let Ok(path) = env::var(env_var) {
        let p = PathBuf::from(&path);
        if p.exists() {
            return ConfigSource::Explicit(p);
        }
    }

    let local = PathBuf::from(filename);
    if local.exists() {
        return ConfigSource::CurrentDir(local);
    }

    let xdg_path = get_xdg_config_dir().join(filename);
    if xdg_path.exists() {
        return ConfigSource::XdgConfig(xdg_path);
    }

    let system = PathBuf::from(format!("/etc/{}/{}", APP_NAME, filename));
    if system.exists() {
        return ConfigSource::System(system);
    }

    ConfigSource::Defaults
}

/// Locate a data artifact by file name.
///
/// Returns the first existing candidate among `./<filename>` and
/// `<xdg data dir>/<filename>`. When neither exists the working directory
/// path is returned so the caller reports a useful "not found" path.
pub fn find_data_file(filename: &str) -> PathBuf {
    let local = PathBuf::from(filename);
    if local.exists() {
        return local;
    }

    let xdg = get_xdg_data_dir().join(filename);
    if xdg.exists() {
        return xdg;
    }

    local
}

fn get_xdg_config_dir() -> PathBuf {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join(APP_NAME)
    } else if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".config").join(APP_NAME)
    } else {
        PathBuf::from(format!(".config/{}", APP_NAME))
    }
}

/// Get the XDG data directory for the application
pub fn get_xdg_data_dir() -> PathBuf {
    if let Ok(xdg_data) = env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join(APP_NAME)
    } else if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".local/share").join(APP_NAME)
    } else {
        PathBuf::from(format!(".local/share/{}", APP_NAME))
    }
}

/// Load and parse a TOML configuration file
///
/// Returns `T::default()` when the source is [`ConfigSource::Defaults`].
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> anyhow::Result<T> {
    match source.path() {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let config: T = toml::from_str(&content)?;
            Ok(config)
        }
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Sample {
        level: Option<String>,
        port: Option<u16>,
    }

    #[test]
    fn test_config_source_display() {
        let source = ConfigSource::CurrentDir(PathBuf::from("web.toml"));
        assert_eq!(format!("{}", source), "web.toml");

        let source = ConfigSource::Defaults;
        assert_eq!(format!("{}", source), "(defaults)");
    }

    #[test]
    fn test_load_config_defaults() {
        let config: Sample = load_config(&ConfigSource::Defaults).unwrap();
        assert_eq!(config, Sample::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let path = env::temp_dir().join(format!("flight-delay-config-{}.toml", std::process::id()));
        fs::write(&path, "level = \"debug\"\nport = 9901\n").unwrap();

        let config: Sample = load_config(&ConfigSource::Explicit(path.clone())).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.level.as_deref(), Some("debug"));
        assert_eq!(config.port, Some(9901));
    }

    #[test]
    fn test_find_data_file_falls_back_to_local_path() {
        let path = find_data_file("definitely-missing-artifact.bin");
        assert_eq!(path, PathBuf::from("definitely-missing-artifact.bin"));
    }
}
