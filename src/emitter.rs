//! HTTP emission of lineage event batches to Correlator
//!
//! Correlator expects a JSON array of events on every request, even for a
//! single event. One call to [`emit_events`] issues exactly one POST.

use std::io::ErrorKind;
use std::time::Duration;

use ureq::Agent;
use ureq::tls::TlsConfig;

use crate::error::EmitError;
use crate::event::LineageEvent;
use crate::response::{self, ResponseOutcome};
use crate::wire;

/// Lineage ingestion path appended to the configured base URL
pub const LINEAGE_PATH: &str = "/api/v1/lineage/events";

/// Build the HTTP agent shared by all emissions of one transport.
///
/// Non-2xx statuses are returned as responses so the interpreter sees them.
pub fn build_agent(verify_ssl: bool) -> Agent {
    let config = Agent::config_builder()
        .http_status_as_error(false)
        .tls_config(TlsConfig::builder().disable_verification(!verify_ssl).build())
        .build();
    Agent::new_with_config(config)
}

/// Join a base URL and the lineage path, ignoring trailing slashes on the base
pub fn lineage_endpoint(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), LINEAGE_PATH)
}

/// POST a batch of events to `endpoint` and interpret the response.
///
/// Returns the accepted outcome (success or partial success). Timeouts,
/// unreachable endpoints, rate limiting and 4xx/5xx responses are errors.
/// No retries are attempted.
pub fn emit_events(
    agent: &Agent,
    events: &[LineageEvent],
    endpoint: &str,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<ResponseOutcome, EmitError> {
    let batch = wire::to_wire_batch(events)?;
    let body = serde_json::to_string(&batch)?;

    log::debug!("POST {} ({} events, {} bytes)", endpoint, events.len(), body.len());

    let mut request = agent.post(endpoint).header("Content-Type", "application/json");
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        request = request.header("X-API-Key", key);
    }

    let mut response = request
        .config()
        .timeout_global(Some(timeout))
        .build()
        .send(body.as_bytes())
        .map_err(|e| classify(endpoint, e))?;

    let status = response.status().as_u16();
    // Error bodies are not always UTF-8; decode lossily so excerpts survive
    let bytes = match response.body_mut().read_to_vec() {
        Ok(bytes) => bytes,
        Err(e) => match classify(endpoint, e) {
            timeout @ EmitError::Timeout { .. } => return Err(timeout),
            other => {
                log::debug!("Could not read Correlator response body: {}", other);
                Vec::new()
            }
        },
    };
    let text = String::from_utf8_lossy(&bytes);

    response::interpret(status, &text, events.len()).into_result()
}

fn classify(endpoint: &str, err: ureq::Error) -> EmitError {
    let endpoint = endpoint.to_string();
    let timed_out = match &err {
        ureq::Error::Timeout(_) => true,
        ureq::Error::Io(io) => io.kind() == ErrorKind::TimedOut,
        _ => false,
    };
    if timed_out {
        return EmitError::Timeout { endpoint, source: err };
    }

    if matches!(
        err,
        ureq::Error::Io(_) | ureq::Error::ConnectionFailed | ureq::Error::HostNotFound
    ) {
        EmitError::Connection { endpoint, source: err }
    } else {
        EmitError::Http { endpoint, source: err }
    }
}
