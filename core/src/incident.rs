//! The incident — the central mutable lifecycle entity.
//!
//! INVARIANTS (enforced by the scheduler, asserted in tests):
//!   - resolved_at is Some iff status == Resolved.
//!   - escalations is append-only and non-decreasing in severity rank;
//!     each entry's `from` equals the severity immediately prior.
//!   - Each escalation moves severity by exactly one rank.
//!   - started_at and ends_at are set at creation and never change.

use crate::types::{IncidentId, IncidentStatus, IncidentType, Severity, ServiceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One severity raise, recorded at the moment it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    pub at: DateTime<Utc>,
    pub from: Severity,
    pub to: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: IncidentId,
    /// Region name; the catalog owns the region itself.
    pub region: String,
    pub lat: f64,
    pub lng: f64,
    pub service: ServiceKind,
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub started_at: DateTime<Utc>,
    /// Planned resolution time. A trigger for the scheduler, not a
    /// hard contract; the actual time lands in resolved_at.
    pub ends_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub escalations: Vec<Escalation>,
    /// Estimated impacted users, recomputed whenever severity changes.
    pub impact_estimate: u64,
}

impl Incident {
    pub fn is_active(&self) -> bool {
        self.status == IncidentStatus::Active
    }

    /// Actual duration for resolved incidents, planned duration for
    /// active ones. What the alert list renders.
    pub fn duration_minutes(&self) -> i64 {
        let end = self.resolved_at.unwrap_or(self.ends_at);
        (end - self.started_at).num_minutes().max(1)
    }
}
