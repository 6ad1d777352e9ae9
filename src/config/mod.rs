//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroU32, path::PathBuf};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "recensio";
const ENV_PREFIX: &str = "RECENSIO";
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid listen address `{value}`")]
    InvalidListenAddr { value: String },
}

/// Command-line arguments for the Recensio binary.
#[derive(Debug, Parser)]
#[command(name = "recensio", version, about = "Recensio review service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "RECENSIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Override the listen address.
    #[arg(long = "listen-addr", value_name = "ADDR")]
    pub listen_addr: Option<String>,

    /// Override the database connection URL.
    #[arg(long = "database-url", env = "RECENSIO_DATABASE_URL", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Toggle JSON logging.
    #[arg(long = "log-json", value_name = "BOOL")]
    pub log_json: Option<bool>,

    /// Disable the read-through cache.
    #[arg(long = "no-cache", action = clap::ArgAction::SetTrue)]
    pub no_cache: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl From<LogLevel> for Directive {
    fn from(level: LogLevel) -> Self {
        LevelFilter::from(level).into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub listen_addr: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .expect("default listen address is valid"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: NonZeroU32::new(DEFAULT_DB_MAX_CONNECTIONS)
                .expect("default pool size is non-zero"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub capacity: usize,
    pub product_ttl_secs: u64,
    pub product_list_ttl_secs: u64,
    pub product_search_ttl_secs: u64,
    pub review_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 4096,
            product_ttl_secs: 60 * 60,
            product_list_ttl_secs: 10 * 60,
            product_search_ttl_secs: 15 * 60,
            review_ttl_secs: 30 * 60,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub cache: CacheSettings,
}

/// Parse CLI arguments and load layered settings.
pub fn load_with_cli() -> Result<(CliArgs, Settings), ConfigError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

fn load(cli: &CliArgs) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()));
    }

    let raw = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let mut settings: Settings = raw.try_deserialize()?;
    apply_overrides(&mut settings, cli)?;
    Ok(settings)
}

fn apply_overrides(settings: &mut Settings, cli: &CliArgs) -> Result<(), ConfigError> {
    if let Some(addr) = cli.listen_addr.as_ref() {
        settings.server.listen_addr =
            addr.parse()
                .map_err(|_| ConfigError::InvalidListenAddr {
                    value: addr.clone(),
                })?;
    }
    if let Some(url) = cli.database_url.as_ref() {
        settings.database.url = Some(url.clone());
    }
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    if let Some(json) = cli.log_json {
        settings.logging.format = if json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        };
    }
    if cli.no_cache {
        settings.cache.enabled = false;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_cli() -> CliArgs {
        CliArgs {
            config_file: None,
            listen_addr: None,
            database_url: None,
            log_level: None,
            log_json: None,
            no_cache: false,
        }
    }

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.server.listen_addr.port(), 3000);
        assert_eq!(settings.database.max_connections.get(), 8);
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.product_ttl_secs, 3600);
        assert_eq!(settings.logging.level, LogLevel::Info);
    }

    #[test]
    fn cli_overrides_take_precedence() {
        let mut settings = Settings::default();
        let cli = CliArgs {
            listen_addr: Some("0.0.0.0:8080".to_string()),
            database_url: Some("postgres://localhost/recensio".to_string()),
            log_level: Some(LogLevel::Debug),
            log_json: Some(true),
            no_cache: true,
            ..bare_cli()
        };

        apply_overrides(&mut settings, &cli).expect("overrides apply");

        assert_eq!(settings.server.listen_addr.port(), 8080);
        assert_eq!(
            settings.database.url.as_deref(),
            Some("postgres://localhost/recensio")
        );
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert!(!settings.cache.enabled);
    }

    #[test]
    fn invalid_listen_addr_is_rejected() {
        let mut settings = Settings::default();
        let cli = CliArgs {
            listen_addr: Some("not-an-addr".to_string()),
            ..bare_cli()
        };
        assert!(matches!(
            apply_overrides(&mut settings, &cli),
            Err(ConfigError::InvalidListenAddr { .. })
        ));
    }
}
