//! The event log — lightweight, append-only projections of incidents.
//!
//! RULE: Events are never mutated or removed once appended (retention
//! eviction aside). They exist for display of "what happened when";
//! the incident collection is what reflects current lifecycle state.

use crate::incident::Incident;
use crate::types::{IncidentStatus, IncidentType, Severity, ServiceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why the event was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Started,
    Escalated,
    Resolved,
    Heartbeat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Derived from the incident id plus a kind suffix, so consumers
    /// can de-duplicate without parsing timestamps.
    pub id: String,
    pub kind: EventKind,
    pub region: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    pub severity: Severity,
    pub service: ServiceKind,
    pub status: IncidentStatus,
    pub time: DateTime<Utc>,
}

impl Event {
    /// Project an incident's current fields into an event.
    pub fn project(incident: &Incident, kind: EventKind, time: DateTime<Utc>) -> Self {
        let id = match kind {
            EventKind::Started => format!("{}-start", incident.id),
            EventKind::Escalated => format!("{}-esc-{}", incident.id, time.timestamp_millis()),
            EventKind::Resolved => format!("{}-resolved", incident.id),
            EventKind::Heartbeat => format!("{}-hb-{}", incident.id, time.timestamp_millis()),
        };
        Self {
            id,
            kind,
            region: incident.region.clone(),
            lat: incident.lat,
            lng: incident.lng,
            incident_type: incident.incident_type,
            severity: incident.severity,
            service: incident.service,
            status: incident.status,
            time,
        }
    }
}
