use colored::*;
use eyre::{Context, Result};
use serde::Serialize;

use airflow_correlator::config::{self, TransportSection};
use airflow_correlator::{TransportConfig, lineage_endpoint, registry};

use crate::cli::{ConfigAction, OutputFormat};

/// Resolved transport, as displayed
#[derive(Debug, Serialize)]
struct ResolvedTransport {
    #[serde(rename = "type")]
    kind: String,
    origin: String,
    #[serde(flatten)]
    config: TransportConfig,
    endpoint: Option<String>,
}

pub fn run(action: ConfigAction) -> Result<()> {
    let resolved = match config::discover_transport() {
        Some(section) => Some(resolve(section)?),
        None => None,
    };

    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), resolved.as_ref()),
        ConfigAction::Get { key } => get(&key, resolved.as_ref()),
    }
}

fn resolve(section: TransportSection) -> Result<ResolvedTransport> {
    if registry::lookup(&section.kind).is_none() {
        log::warn!("Transport type '{}' is not provided by this plugin", section.kind);
    }
    let config = TransportConfig::from_mapping(&section.params)
        .context(format!("Invalid transport configuration in {}", section.origin))?
        .masked();
    let endpoint = config.is_enabled().then(|| lineage_endpoint(&config.url));

    Ok(ResolvedTransport {
        kind: section.kind,
        origin: section.origin,
        config,
        endpoint,
    })
}

fn show(format: OutputFormat, resolved: Option<&ResolvedTransport>) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&resolved)?);
        }
        OutputFormat::Text => {
            let Some(resolved) = resolved else {
                println!("{} No OpenLineage transport configured", "✗".red());
                println!("  Set 'transport' in openlineage.yml or AIRFLOW__OPENLINEAGE__TRANSPORT");
                return Ok(());
            };

            println!("{}", "Correlator Transport".bold());
            println!();
            println!("{}: {}", "type".cyan(), resolved.kind);
            println!("{}: {}", "source".cyan(), resolved.origin.dimmed());
            println!("{}: {}", "url".cyan(), display_or_unset(&resolved.config.url));
            println!(
                "{}: {}",
                "api_key".cyan(),
                resolved.config.api_key.as_deref().unwrap_or("(none)")
            );
            println!("{}: {}s", "timeout".cyan(), resolved.config.timeout);
            println!("{}: {}", "verify_ssl".cyan(), resolved.config.verify_ssl);
            match &resolved.endpoint {
                Some(endpoint) => println!("{}: {}", "endpoint".cyan(), endpoint),
                None => println!("{} URL is empty, events will not be emitted", "⚠".yellow()),
            }
        }
    }

    Ok(())
}

fn get(key: &str, resolved: Option<&ResolvedTransport>) -> Result<()> {
    let Some(resolved) = resolved else {
        eyre::bail!("No OpenLineage transport configured");
    };

    let value = match key {
        "type" => Some(resolved.kind.clone()),
        "url" => Some(resolved.config.url.clone()),
        "api_key" | "api-key" => Some(resolved.config.api_key.clone().unwrap_or_default()),
        "timeout" => Some(resolved.config.timeout.to_string()),
        "verify_ssl" | "verify-ssl" => Some(resolved.config.verify_ssl.to_string()),
        "endpoint" => Some(resolved.endpoint.clone().unwrap_or_default()),
        _ => None,
    };

    match value {
        Some(v) => println!("{}", v),
        None => eyre::bail!("Unknown config key: {}", key),
    }

    Ok(())
}

fn display_or_unset(value: &str) -> String {
    if value.is_empty() {
        "(unset)".dimmed().to_string()
    } else {
        value.to_string()
    }
}
