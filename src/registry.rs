//! Transport registry
//!
//! Maps the `type` value of a host transport configuration to a constructor.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::config::{self, DiscoverySources};
use crate::error::ConfigError;
use crate::transport::{ConfiguredTransport, CorrelatorTransport, Transport};

/// Builds a transport from its configuration mapping
pub type TransportFactory = fn(&Map<String, Value>) -> Result<Box<dyn Transport>, ConfigError>;

static REGISTRY: Lazy<BTreeMap<&'static str, TransportFactory>> = Lazy::new(|| {
    let mut registry: BTreeMap<&'static str, TransportFactory> = BTreeMap::new();
    registry.insert(CorrelatorTransport::KIND, factory::<CorrelatorTransport>);
    registry
});

fn factory<T: ConfiguredTransport + 'static>(params: &Map<String, Value>) -> Result<Box<dyn Transport>, ConfigError> {
    let config = T::config_from_mapping(params)?;
    Ok(Box::new(T::from_config(config)))
}

pub fn lookup(kind: &str) -> Option<TransportFactory> {
    REGISTRY.get(kind).copied()
}

/// Registered transport kinds, sorted
pub fn kinds() -> Vec<&'static str> {
    REGISTRY.keys().copied().collect()
}

/// Instantiate the transport registered under `kind`
pub fn create(kind: &str, params: &Map<String, Value>) -> Result<Box<dyn Transport>, ConfigError> {
    let factory = lookup(kind).ok_or_else(|| ConfigError::UnknownTransport {
        kind: kind.to_string(),
        known: kinds().join(", "),
    })?;
    factory(params)
}

/// Discover the configured transport and build it.
///
/// Returns `Ok(None)` when nothing is configured.
pub fn from_environment() -> Result<Option<Box<dyn Transport>>, ConfigError> {
    from_sources(&DiscoverySources::from_process())
}

pub fn from_sources(sources: &DiscoverySources) -> Result<Option<Box<dyn Transport>>, ConfigError> {
    match config::discover_transport_with(sources) {
        Some(section) => {
            log::info!("Using '{}' transport from {}", section.kind, section.origin);
            create(&section.kind, &section.params).map(Some)
        }
        None => Ok(None),
    }
}
