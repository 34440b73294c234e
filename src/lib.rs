//! Correlator lineage transport
//!
//! Forwards OpenLineage events produced by the Airflow OpenLineage provider to
//! Correlator's `/api/v1/lineage/events` endpoint. Correlator accepts a JSON
//! array of events, so every emission wraps its event in an array.
//!
//! ```text
//! Airflow task -> OpenLineage listener -> CorrelatorTransport::emit -> emit_events -> Correlator
//! ```
//!
//! Emission is fire-and-forget: [`Transport::emit`] logs failures and never
//! lets them reach the task being run.

pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod registry;
pub mod response;
pub mod transport;
pub mod wire;

pub use config::TransportConfig;
pub use emitter::{emit_events, lineage_endpoint};
pub use error::{ConfigError, EmitError};
pub use event::{EventType, LineageEvent, RunEvent};
pub use response::ResponseOutcome;
pub use transport::{ConfiguredTransport, CorrelatorTransport, Transport};
