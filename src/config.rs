//! Configuration module for the vector sum server.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Lowest allowed listening port; everything below is privileged.
const MIN_PORT: u16 = 1024;

/// Command-line arguments for the server
#[derive(Parser, Debug)]
#[command(name = "vecsumd")]
#[command(version = "0.1.0")]
#[command(about = "A TCP service computing saturating sums of integer vectors", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the credential file (login:secret per line)
    #[arg(short = 'c', long)]
    pub credentials: Option<PathBuf>,

    /// Path to the log file (defaults to stdout)
    #[arg(short = 'l', long)]
    pub log_file: Option<PathBuf>,

    /// Port to listen on (1024-65535)
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-connection receive timeout in seconds
    #[serde(default = "default_recv_timeout")]
    pub recv_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            recv_timeout_secs: default_recv_timeout(),
        }
    }
}

/// File path configuration
#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    /// Credential file path
    #[serde(default = "default_credentials")]
    pub credentials: PathBuf,
    /// Log file path; absent means stdout
    pub log_file: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            credentials: default_credentials(),
            log_file: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    33333
}

fn default_recv_timeout() -> u64 {
    5
}

fn default_credentials() -> PathBuf {
    PathBuf::from("/etc/vecsumd/clients.conf")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: PathBuf,
    pub log_file: Option<PathBuf>,
    pub port: u16,
    pub recv_timeout_secs: u64,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        let cli = CliArgs::parse();

        // Load TOML config if specified
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Self::resolve(cli, toml_config)
    }

    /// Merge CLI args with TOML config (CLI takes precedence) and validate.
    fn resolve(cli: CliArgs, toml_config: TomlConfig) -> Result<Self, ConfigError> {
        let port = cli.port.unwrap_or(toml_config.server.port);
        if port < MIN_PORT {
            return Err(ConfigError::InvalidPort(port));
        }

        Ok(Config {
            credentials: cli.credentials.unwrap_or(toml_config.paths.credentials),
            log_file: cli.log_file.or(toml_config.paths.log_file),
            port,
            recv_timeout_secs: toml_config.server.recv_timeout_secs,
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    InvalidPort(u16),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidPort(port) => {
                write!(f, "Invalid port {}: must be in 1024-65535", port)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_defaults() -> CliArgs {
        CliArgs {
            config: None,
            credentials: None,
            log_file: None,
            port: None,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.server.port, 33333);
        assert_eq!(config.server.recv_timeout_secs, 5);
        assert_eq!(
            config.paths.credentials,
            PathBuf::from("/etc/vecsumd/clients.conf")
        );
        assert!(config.paths.log_file.is_none());
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            port = 44444
            recv_timeout_secs = 10

            [paths]
            credentials = "/tmp/clients.conf"
            log_file = "/tmp/vecsumd.log"

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 44444);
        assert_eq!(config.server.recv_timeout_secs, 10);
        assert_eq!(config.paths.credentials, PathBuf::from("/tmp/clients.conf"));
        assert_eq!(
            config.paths.log_file,
            Some(PathBuf::from("/tmp/vecsumd.log"))
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_takes_precedence() {
        let mut cli = cli_defaults();
        cli.port = Some(44444);
        cli.credentials = Some(PathBuf::from("/tmp/other.conf"));

        let toml_config: TomlConfig = toml::from_str(
            r#"
            [server]
            port = 55555
            [paths]
            credentials = "/tmp/clients.conf"
        "#,
        )
        .unwrap();

        let config = Config::resolve(cli, toml_config).unwrap();
        assert_eq!(config.port, 44444);
        assert_eq!(config.credentials, PathBuf::from("/tmp/other.conf"));
    }

    #[test]
    fn test_privileged_port_rejected() {
        let mut cli = cli_defaults();
        cli.port = Some(80);

        match Config::resolve(cli, TomlConfig::default()) {
            Err(ConfigError::InvalidPort(80)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_port_range_bounds() {
        let mut cli = cli_defaults();
        cli.port = Some(1024);
        assert!(Config::resolve(cli, TomlConfig::default()).is_ok());

        let mut cli = cli_defaults();
        cli.port = Some(65535);
        assert!(Config::resolve(cli, TomlConfig::default()).is_ok());

        let mut cli = cli_defaults();
        cli.port = Some(1023);
        assert!(Config::resolve(cli, TomlConfig::default()).is_err());
    }
}
