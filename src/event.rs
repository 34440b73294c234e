//! Lineage event model
//!
//! Mirrors the shape of OpenLineage run, job and dataset events as the host
//! orchestrator produces them. The transport only reads these values.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Producer URL stamped on events built by this crate
pub const PRODUCER: &str = concat!(
    "https://github.com/correlator-io/correlator-airflow/",
    env!("CARGO_PKG_VERSION")
);

/// Free-form facet payloads keyed by facet name
pub type Facets = Map<String, Value>;

/// Run state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Start,
    Running,
    Complete,
    Abort,
    Fail,
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Start => "START",
            EventType::Running => "RUNNING",
            EventType::Complete => "COMPLETE",
            EventType::Abort => "ABORT",
            EventType::Fail => "FAIL",
            EventType::Other => "OTHER",
        }
    }

    pub fn all() -> [EventType; 6] {
        [
            EventType::Start,
            EventType::Running,
            EventType::Complete,
            EventType::Abort,
            EventType::Fail,
            EventType::Other,
        ]
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub run_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Facets>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Job {
    pub namespace: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Facets>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub namespace: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Facets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_facets: Option<Facets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_facets: Option<Facets>,
}

impl Dataset {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            facets: None,
            input_facets: None,
            output_facets: None,
        }
    }
}

/// A run state transition for one job execution
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEvent {
    pub event_type: EventType,
    /// ISO 8601, passed through verbatim
    pub event_time: String,
    pub run: Run,
    pub job: Job,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(rename = "schemaURL", default, skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Dataset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Dataset>>,
}

impl RunEvent {
    /// Build a run event stamped with the current UTC time and this crate's producer URL
    pub fn new(
        event_type: EventType,
        run_id: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            event_time: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            run: Run {
                run_id: run_id.into(),
                facets: None,
            },
            job: Job {
                namespace: namespace.into(),
                name: name.into(),
                facets: None,
            },
            producer: Some(PRODUCER.to_string()),
            schema_url: None,
            inputs: None,
            outputs: None,
        }
    }
}

/// Static job metadata, not tied to a run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEvent {
    pub event_time: String,
    pub job: Job,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(rename = "schemaURL", default, skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Dataset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Dataset>>,
}

/// Static dataset metadata
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetEvent {
    pub event_time: String,
    pub dataset: Dataset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(rename = "schemaURL", default, skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<String>,
}

/// Any event the host can hand to a transport
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LineageEvent {
    Run(RunEvent),
    Job(JobEvent),
    Dataset(DatasetEvent),
}

impl LineageEvent {
    pub fn event_time(&self) -> &str {
        match self {
            LineageEvent::Run(e) => &e.event_time,
            LineageEvent::Job(e) => &e.event_time,
            LineageEvent::Dataset(e) => &e.event_time,
        }
    }

    /// Job the event refers to; dataset events have none
    pub fn job(&self) -> Option<&Job> {
        match self {
            LineageEvent::Run(e) => Some(&e.job),
            LineageEvent::Job(e) => Some(&e.job),
            LineageEvent::Dataset(_) => None,
        }
    }

    pub fn event_type(&self) -> Option<EventType> {
        match self {
            LineageEvent::Run(e) => Some(e.event_type),
            _ => None,
        }
    }
}

impl From<RunEvent> for LineageEvent {
    fn from(event: RunEvent) -> Self {
        LineageEvent::Run(event)
    }
}

impl From<JobEvent> for LineageEvent {
    fn from(event: JobEvent) -> Self {
        LineageEvent::Job(event)
    }
}

impl From<DatasetEvent> for LineageEvent {
    fn from(event: DatasetEvent) -> Self {
        LineageEvent::Dataset(event)
    }
}
