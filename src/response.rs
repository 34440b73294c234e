//! Correlator response interpretation
//!
//! Classification is pure ([`interpret`]); logging and the success/error split
//! happen in [`ResponseOutcome::into_result`]. Body parsing is best-effort and
//! never fails the call.

use serde_json::{Map, Value};
use std::fmt;

use crate::error::EmitError;

/// Maximum number of characters of a response body embedded in errors
pub const BODY_EXCERPT_CHARS: usize = 500;

/// Counts reported by Correlator for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub received: Option<u64>,
    pub successful: u64,
    pub failed: u64,
}

impl Summary {
    /// Read counts field by field; a missing or mistyped count takes its default
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            received: map.get("received").and_then(as_count),
            successful: map.get("successful").and_then(as_count).unwrap_or(0),
            failed: map.get("failed").and_then(as_count).unwrap_or(0),
        })
    }
}

/// One rejected event from a 207 response, keyed by its index in the batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailedEvent {
    pub index: Option<u64>,
    pub reason: Option<String>,
}

impl FailedEvent {
    fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        let reason = match map.get("reason") {
            Some(Value::String(reason)) => Some(reason.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        Self {
            index: map.get("index").and_then(as_count),
            reason,
        }
    }
}

/// Non-negative integer, also accepted when sent as a numeric string
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_u64(),
    }
}

impl fmt::Display for FailedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "Event {} failed: ", index)?,
            None => write!(f, "Event ? failed: ")?,
        }
        f.write_str(self.reason.as_deref().unwrap_or("Unknown error"))
    }
}

/// Parsed body of a 207 response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialReport {
    pub successful: u64,
    pub received: u64,
    pub failed_events: Vec<FailedEvent>,
}

/// Interpreted result of one HTTP call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// 200 or 204; `summary` is present when a 200 body carried one
    Success { event_count: usize, summary: Option<Summary> },
    /// 207; `report` is `None` when the body could not be parsed
    PartialSuccess {
        event_count: usize,
        report: Option<PartialReport>,
    },
    RateLimited,
    ClientError { status: u16, body_excerpt: String },
    ServerError { status: u16, body_excerpt: String },
}

/// Classify a Correlator response
pub fn interpret(status: u16, body: &str, event_count: usize) -> ResponseOutcome {
    match status {
        200 | 204 => {
            let summary = if status == 200 && !body.trim().is_empty() {
                parse_body(body).and_then(|b| b.get("summary").and_then(Summary::from_value))
            } else {
                None
            };
            ResponseOutcome::Success { event_count, summary }
        }
        207 => {
            let report = parse_body(body).map(|b| {
                let summary = b.get("summary").and_then(Summary::from_value).unwrap_or_default();
                let failed_events = match b.get("failed_events") {
                    Some(Value::Array(items)) => items.iter().map(FailedEvent::from_value).collect(),
                    _ => Vec::new(),
                };
                PartialReport {
                    successful: summary.successful,
                    received: summary.received.unwrap_or(event_count as u64),
                    failed_events,
                }
            });
            ResponseOutcome::PartialSuccess { event_count, report }
        }
        429 => ResponseOutcome::RateLimited,
        400..=499 => ResponseOutcome::ClientError {
            status,
            body_excerpt: excerpt(body),
        },
        _ => ResponseOutcome::ServerError {
            status,
            body_excerpt: excerpt(body),
        },
    }
}

/// Parse a body as a JSON object; anything else is unusable
fn parse_body(body: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            log::debug!("Correlator response body is not an object: {}", excerpt(&other.to_string()));
            None
        }
        Err(e) => {
            log::debug!("Could not parse Correlator response body: {}", e);
            None
        }
    }
}

/// First [`BODY_EXCERPT_CHARS`] characters of a response body
pub fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

impl ResponseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseOutcome::Success { .. } | ResponseOutcome::PartialSuccess { .. })
    }

    /// Log accepted outcomes and turn rejected ones into errors
    pub fn into_result(self) -> Result<ResponseOutcome, EmitError> {
        match self {
            ResponseOutcome::Success { event_count, ref summary } => {
                log::info!("Successfully emitted {} events", event_count);
                if let Some(summary) = summary {
                    log::info!("Response: {} successful, {} failed", summary.successful, summary.failed);
                }
                Ok(self)
            }
            ResponseOutcome::PartialSuccess { ref report, .. } => {
                match report {
                    Some(report) => {
                        log::warn!(
                            "Partial success: {}/{} events succeeded. Failed events: {:?}",
                            report.successful,
                            report.received,
                            report.failed_events
                        );
                        for failed in &report.failed_events {
                            log::error!("{}", failed);
                        }
                    }
                    None => log::warn!("Partial success (207) but could not parse response"),
                }
                Ok(self)
            }
            ResponseOutcome::RateLimited => Err(EmitError::RateLimited),
            ResponseOutcome::ClientError { status, body_excerpt } => Err(EmitError::ClientRejection {
                status,
                body: body_excerpt,
            }),
            ResponseOutcome::ServerError { status, body_excerpt } => Err(EmitError::Server {
                status,
                body: body_excerpt,
            }),
        }
    }
}
