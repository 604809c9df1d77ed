//! Configuration for the adapter binary.
//!
//! Supports both command-line arguments and a TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use crate::exchange::DiagnosticsSink;

/// Command-line arguments for the adapter binary
#[derive(Parser, Debug)]
#[command(name = "scgi-oneshot")]
#[command(version = "0.1.0")]
#[command(about = "Serve one SCGI request over stdin/stdout", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bundled application to serve (hello, inspect)
    #[arg(short, long)]
    pub app: Option<String>,

    /// Append diagnostics to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Discard all diagnostic output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub handler: HandlerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Handler-related configuration
#[derive(Debug, Deserialize)]
pub struct HandlerConfig {
    /// Bundled application name
    #[serde(default = "default_app")]
    pub app: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self { app: default_app() }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Append diagnostics to this file instead of stderr
    pub file: Option<PathBuf>,
    /// Discard all diagnostic output
    #[serde(default)]
    pub quiet: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            quiet: false,
        }
    }
}

fn default_app() -> String {
    "hello".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Applications bundled with the binary, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinApp {
    Hello,
    Inspect,
}

impl BuiltinApp {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hello" => Some(BuiltinApp::Hello),
            "inspect" => Some(BuiltinApp::Inspect),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinApp::Hello => "hello",
            BuiltinApp::Inspect => "inspect",
        }
    }
}

impl std::fmt::Display for BuiltinApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: BuiltinApp,
    pub log_level: String,
    pub diagnostics: DiagnosticsSink,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(CliArgs::parse())
    }

    fn resolve(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        let app_name = cli.app.unwrap_or(toml_config.handler.app);
        let app = BuiltinApp::from_name(&app_name).ok_or(ConfigError::UnknownApp(app_name))?;

        let diagnostics = if cli.quiet || toml_config.logging.quiet {
            DiagnosticsSink::Discard
        } else if let Some(path) = cli.log_file.or(toml_config.logging.file) {
            DiagnosticsSink::File(path)
        } else {
            DiagnosticsSink::Stderr
        };

        Ok(Config {
            app,
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
            diagnostics,
        })
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    UnknownApp(String),
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
            ConfigError::UnknownApp(name) => {
                write!(f, "Unknown application '{}' (expected hello or inspect)", name)
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
            app: None,
            log_file: None,
            quiet: false,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.handler.app, "hello");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
        assert!(!config.logging.quiet);
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [handler]
            app = "inspect"

            [logging]
            level = "debug"
            file = "/var/log/scgi-oneshot.log"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.handler.app, "inspect");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.file,
            Some(PathBuf::from("/var/log/scgi-oneshot.log"))
        );
    }

    #[test]
    fn test_resolve_defaults() {
        let config = Config::resolve(cli_defaults()).unwrap();
        assert_eq!(config.app, BuiltinApp::Hello);
        assert_eq!(config.log_level, "info");
        assert!(matches!(config.diagnostics, DiagnosticsSink::Stderr));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = CliArgs {
            app: Some("inspect".to_string()),
            log_level: "trace".to_string(),
            ..cli_defaults()
        };
        let config = Config::resolve(cli).unwrap();
        assert_eq!(config.app, BuiltinApp::Inspect);
        assert_eq!(config.log_level, "trace");
    }

    #[test]
    fn test_quiet_beats_log_file() {
        let cli = CliArgs {
            quiet: true,
            log_file: Some(PathBuf::from("/tmp/x.log")),
            ..cli_defaults()
        };
        let config = Config::resolve(cli).unwrap();
        assert!(matches!(config.diagnostics, DiagnosticsSink::Discard));
    }

    #[test]
    fn test_unknown_app_rejected() {
        let cli = CliArgs {
            app: Some("bogus".to_string()),
            ..cli_defaults()
        };
        match Config::resolve(cli) {
            Err(ConfigError::UnknownApp(name)) => assert_eq!(name, "bogus"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
