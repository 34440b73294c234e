use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "airflow-correlator",
    about = "Emit Airflow task events as OpenLineage events to Correlator",
    version,
    arg_required_else_help = true,
    after_help = "Configuration:\n  openlineage.yml:\n    transport:\n      type: correlator\n      url: http://localhost:8080\n\n  or AIRFLOW__OPENLINEAGE__TRANSPORT='{\"type\": \"correlator\", \"url\": \"http://localhost:8080\"}'\n\nDocumentation: https://github.com/correlator-io/correlator-airflow"
)]
pub struct Cli {
    /// Log level (RUST_LOG takes precedence)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect the discovered transport configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the resolved transport configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a single configuration value
    Get {
        /// One of: type, url, api_key, timeout, verify_ssl, endpoint
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["airflow-correlator", "config", "show", "-o", "yaml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Show {
                    format: Some(OutputFormat::Yaml)
                }
            }
        ));
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_log_level_flag() {
        let cli = Cli::try_parse_from(["airflow-correlator", "--log-level", "debug", "config", "get", "url"]).unwrap();
        assert_eq!(cli.log_level.as_filter(), log::LevelFilter::Debug);
    }
}
