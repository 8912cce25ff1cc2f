//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable, unique identifier for an incident.
pub type IncidentId = uuid::Uuid;

/// The affected network service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    #[serde(rename = "Mobile Data")]
    MobileData,
    #[serde(rename = "Voice Calls")]
    VoiceCalls,
    #[serde(rename = "SMS")]
    Sms,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [
        ServiceKind::MobileData,
        ServiceKind::VoiceCalls,
        ServiceKind::Sms,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::MobileData => "Mobile Data",
            Self::VoiceCalls => "Voice Calls",
            Self::Sms => "SMS",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What kind of network problem an incident represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentType {
    Outage,
    Congestion,
}

impl IncidentType {
    pub const ALL: [IncidentType; 2] = [IncidentType::Outage, IncidentType::Congestion];

    pub fn label(self) -> &'static str {
        match self {
            Self::Outage => "outage",
            Self::Congestion => "congestion",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "outage" => Some(Self::Outage),
            "congestion" => Some(Self::Congestion),
            _ => None,
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity rank. The derived ordering is load-bearing: escalation may
/// only move upward (low < medium < high), never down.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    /// Fraction of a region's population impacted at this severity.
    pub fn impact_factor(self) -> f64 {
        match self {
            Self::Low => 0.02,
            Self::Medium => 0.06,
            Self::High => 0.12,
        }
    }

    /// The next rank up, or None at the ceiling.
    pub fn escalated(self) -> Option<Severity> {
        match self {
            Self::Low => Some(Self::Medium),
            Self::Medium => Some(Self::High),
            Self::High => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status. Monotonic: once resolved, permanently resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Active,
    Resolved,
}
