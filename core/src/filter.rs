//! Query/filter layer — region/severity/type predicates shared by all
//! downstream views.
//!
//! An unset field matches everything; a set field requires exact
//! equality. The predicates cover disjoint fields, so filters compose
//! in any order with the same result.

use crate::error::{SimError, SimResult};
use crate::event::Event;
use crate::incident::Incident;
use crate::types::{IncidentType, Severity};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentFilter {
    pub region: Option<String>,
    pub severity: Option<Severity>,
    pub incident_type: Option<IncidentType>,
}

impl IncidentFilter {
    /// Build from the label strings a filter bar supplies. An empty
    /// string means "no constraint" for that key; an unrecognized
    /// label is a caller bug and rejected outright.
    pub fn from_labels(region: &str, severity: &str, incident_type: &str) -> SimResult<Self> {
        let severity = match severity {
            "" => None,
            label => Some(Severity::parse(label).ok_or_else(|| SimError::InvalidConfig {
                reason: format!("unrecognized severity filter '{label}'"),
            })?),
        };
        let incident_type = match incident_type {
            "" => None,
            label => Some(IncidentType::parse(label).ok_or_else(|| {
                SimError::InvalidConfig {
                    reason: format!("unrecognized incident type filter '{label}'"),
                }
            })?),
        };
        let region = match region {
            "" => None,
            name => Some(name.to_string()),
        };
        Ok(Self {
            region,
            severity,
            incident_type,
        })
    }

    pub fn matches_incident(&self, incident: &Incident) -> bool {
        self.region.as_deref().is_none_or(|r| incident.region == r)
            && self.severity.is_none_or(|s| incident.severity == s)
            && self
                .incident_type
                .is_none_or(|t| incident.incident_type == t)
    }

    pub fn matches_event(&self, event: &Event) -> bool {
        self.region.as_deref().is_none_or(|r| event.region == r)
            && self.severity.is_none_or(|s| event.severity == s)
            && self.incident_type.is_none_or(|t| event.incident_type == t)
    }
}

pub fn filter_incidents(incidents: &[Incident], filter: &IncidentFilter) -> Vec<Incident> {
    incidents
        .iter()
        .filter(|i| filter.matches_incident(i))
        .cloned()
        .collect()
}

pub fn filter_events(events: &[Event], filter: &IncidentFilter) -> Vec<Event> {
    events
        .iter()
        .filter(|e| filter.matches_event(e))
        .cloned()
        .collect()
}
