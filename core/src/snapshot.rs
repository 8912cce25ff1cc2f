//! Snapshot — immutable copy-on-read view of the engine state.
//!
//! A snapshot is what every external consumer (metrics, filters, map,
//! alert list) operates on. Callers never observe a torn tick: the
//! scheduler builds the copy while holding its state lock.

use crate::error::SimResult;
use crate::event::Event;
use crate::incident::Incident;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimSnapshot {
    pub taken_at: DateTime<Utc>,
    pub incidents: Vec<Incident>,
    pub events: Vec<Event>,
}

impl SimSnapshot {
    /// JSON form for hosting layers that replicate or transport state.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
