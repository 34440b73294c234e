//! Correlator transport
//!
//! The host hands every lineage event to [`Transport::emit`]. Emission is
//! fire-and-forget: any failure, including a panic below this boundary, is
//! logged and dropped so the host task is never affected.

use serde_json::{Map, Value};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use ureq::Agent;

use crate::config::TransportConfig;
use crate::emitter::{self, build_agent, lineage_endpoint};
use crate::error::{ConfigError, EmitError};
use crate::event::LineageEvent;
use crate::response::ResponseOutcome;

/// A lineage transport the host can emit events through
pub trait Transport: Send + Sync {
    /// Discovery tag matching the `type` key of the host configuration
    fn kind(&self) -> &'static str;

    /// Deliver one event. Never panics and never reports failure to the caller.
    fn emit(&self, event: &LineageEvent);
}

/// A transport constructible from the host's configuration mapping
pub trait ConfiguredTransport: Transport + Sized {
    const KIND: &'static str;
    type Config;

    fn config_from_mapping(params: &Map<String, Value>) -> Result<Self::Config, ConfigError>;
    fn from_config(config: Self::Config) -> Self;
}

/// Sends each event to Correlator as a one-element array
pub struct CorrelatorTransport {
    config: TransportConfig,
    agent: Agent,
}

impl CorrelatorTransport {
    pub fn new(config: TransportConfig) -> Self {
        if !config.is_enabled() {
            log::warn!(
                "Correlator URL not configured. Events will not be emitted. \
                 Set 'url' in openlineage.yml or AIRFLOW__OPENLINEAGE__TRANSPORT."
            );
        }
        let agent = build_agent(config.verify_ssl);
        Self { config, agent }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Full request target for the configured base URL
    pub fn endpoint(&self) -> String {
        lineage_endpoint(&self.config.url)
    }

    /// Send one event and return the outcome without suppressing errors.
    ///
    /// [`Transport::emit`] is the fire-and-forget entry point; this exists for
    /// callers that want to act on the result.
    pub fn send(&self, event: &LineageEvent) -> Result<ResponseOutcome, EmitError> {
        emitter::emit_events(
            &self.agent,
            std::slice::from_ref(event),
            &self.endpoint(),
            self.config.api_key.as_deref(),
            self.config.timeout_duration(),
        )
    }
}

impl Transport for CorrelatorTransport {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn emit(&self, event: &LineageEvent) {
        if !self.config.is_enabled() {
            return;
        }

        if let Some(job) = event.job() {
            log::debug!(
                "Emitting {} event for {}/{}",
                event.event_type().map(|t| t.as_str()).unwrap_or("job"),
                job.namespace,
                job.name
            );
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.send(event))) {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                log::error!("Failed to emit lineage event to Correlator: {:?}", eyre::Report::new(e));
            }
            Err(payload) => {
                log::error!(
                    "Failed to emit lineage event to Correlator: panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

impl ConfiguredTransport for CorrelatorTransport {
    const KIND: &'static str = "correlator";
    type Config = TransportConfig;

    fn config_from_mapping(params: &Map<String, Value>) -> Result<TransportConfig, ConfigError> {
        TransportConfig::from_mapping(params)
    }

    fn from_config(config: TransportConfig) -> Self {
        Self::new(config)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
