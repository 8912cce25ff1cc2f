//! Engine configuration with fail-fast validation.

use crate::error::{SimError, SimResult};
use std::time::Duration;

/// All tunable knobs of the simulator. Reference values mirror the
/// production dashboard feed: a creation attempt every 7 seconds with
/// a 60% hit rate, lifecycle advancement every 5 seconds.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Probability that a creation tick starts a new incident.
    pub p_start: f64,
    /// Per-advancement-tick probability that an active, non-high
    /// incident escalates one severity rank.
    pub p_escalate: f64,
    /// Per-advancement-tick probability that a still-active incident
    /// emits a heartbeat event.
    pub p_heartbeat: f64,
    /// Cadence of the creation timer.
    pub creation_interval: Duration,
    /// Cadence of the advancement timer.
    pub advance_interval: Duration,
    /// Planned incident duration bounds, inclusive, in minutes.
    pub min_duration_minutes: u64,
    pub max_duration_minutes: u64,
    /// When set, incidents resolved longer than this ago and events
    /// older than this are evicted on each advancement tick. None
    /// keeps everything for the process lifetime.
    pub retention: Option<chrono::Duration>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            p_start: 0.6,
            p_escalate: 0.15,
            p_heartbeat: 0.5,
            creation_interval: Duration::from_secs(7),
            advance_interval: Duration::from_secs(5),
            min_duration_minutes: 10,
            max_duration_minutes: 30,
            retention: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> SimResult<()> {
        for (name, p) in [
            ("p_start", self.p_start),
            ("p_escalate", self.p_escalate),
            ("p_heartbeat", self.p_heartbeat),
        ] {
            if !(0.0..=1.0).contains(&p) || p.is_nan() {
                return Err(SimError::InvalidConfig {
                    reason: format!("{name} must be within [0, 1], got {p}"),
                });
            }
        }
        if self.creation_interval.is_zero() {
            return Err(SimError::InvalidConfig {
                reason: "creation_interval must be positive".into(),
            });
        }
        if self.advance_interval.is_zero() {
            return Err(SimError::InvalidConfig {
                reason: "advance_interval must be positive".into(),
            });
        }
        if self.min_duration_minutes == 0 || self.min_duration_minutes > self.max_duration_minutes {
            return Err(SimError::InvalidConfig {
                reason: format!(
                    "duration bounds must satisfy 0 < min <= max, got [{}, {}]",
                    self.min_duration_minutes, self.max_duration_minutes
                ),
            });
        }
        if let Some(retention) = self.retention {
            if retention <= chrono::Duration::zero() {
                return Err(SimError::InvalidConfig {
                    reason: "retention window must be positive".into(),
                });
            }
        }
        Ok(())
    }

    /// Config with pinned probabilities for use in unit tests: every
    /// creation tick produces an incident, nothing escalates, no
    /// heartbeats. Tests override individual knobs from here.
    pub fn default_test() -> Self {
        Self {
            p_start: 1.0,
            p_escalate: 0.0,
            p_heartbeat: 0.0,
            ..Self::default()
        }
    }
}
