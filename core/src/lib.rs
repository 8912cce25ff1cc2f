//! netpulse-core — incident lifecycle simulator & metrics engine.
//!
//! The engine manufactures a stream of network incidents (outages and
//! congestion) across a fixed region catalog, tracks each through an
//! open -> optionally escalate -> resolve lifecycle on two timer
//! cadences, emits a parallel append-only event stream for live views,
//! and computes rolling reliability metrics (MTTR, uptime estimate,
//! day buckets, per-region counts) over read-only snapshots.
//!
//! RULES:
//!   - The scheduler exclusively owns the incident collection and the
//!     event log; everything downstream reads snapshots.
//!   - All randomness flows through seeded RNG streams; runs replay.
//!   - Metrics and filters are pure and reentrant.

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod generator;
pub mod incident;
pub mod metrics;
pub mod region;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use event::{Event, EventKind};
pub use filter::{filter_events, filter_incidents, IncidentFilter};
pub use incident::{Escalation, Incident};
pub use region::{Region, RegionCatalog};
pub use scheduler::SimScheduler;
pub use snapshot::SimSnapshot;
pub use types::{IncidentId, IncidentStatus, IncidentType, Severity, ServiceKind};
