//! Metrics engine — pure, stateless aggregation over a snapshot.
//!
//! RULES:
//!   - No function here mutates anything or reads a clock; callers
//!     pass `now` explicitly so stale snapshots stay computable.
//!   - Duration math is in milliseconds internally; conversion to
//!     minutes happens only at the API boundary.
//!   - MTTR rounds half away from zero (f64::round), matching the
//!     dashboard's display rounding.

use crate::incident::Incident;
use crate::region::RegionCatalog;
use crate::types::{IncidentStatus, Severity};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The trailing window uptime_percent is quoted over by default.
pub fn default_uptime_window() -> Duration {
    Duration::hours(24)
}

/// Per-calendar-day aggregation of incident counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    /// UTC calendar date of started_at, `YYYY-MM-DD`.
    pub date: String,
    pub started: u64,
    pub resolved: u64,
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

/// One row per catalog region, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCount {
    pub region: String,
    pub incidents: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

fn in_region(incident: &Incident, region: Option<&str>) -> bool {
    region.is_none_or(|r| incident.region == r)
}

/// Average resolution time in whole minutes over resolved incidents,
/// optionally narrowed to one region. Zero matches return 0, not NaN.
pub fn mean_time_to_resolve_minutes(incidents: &[Incident], region: Option<&str>) -> i64 {
    let durations_ms: Vec<i64> = incidents
        .iter()
        .filter(|i| i.status == IncidentStatus::Resolved && in_region(i, region))
        .filter_map(|i| i.resolved_at.map(|t| (t - i.started_at).num_milliseconds()))
        .collect();

    if durations_ms.is_empty() {
        return 0;
    }
    let avg_ms = durations_ms.iter().sum::<i64>() as f64 / durations_ms.len() as f64;
    (avg_ms / 60_000.0).round() as i64
}

/// Reliability proxy: fraction of the trailing window not overlapped
/// by incident intervals, as a percentage clamped to [0, 100] and
/// rounded to one decimal. Active incidents count up to their planned
/// end. Zero incidents in the window yields exactly 100.0.
pub fn uptime_percent(
    incidents: &[Incident],
    region: Option<&str>,
    now: DateTime<Utc>,
    window: Duration,
) -> f64 {
    let window_start = now - window;
    let total_ms = window.num_milliseconds();

    let mut impacted_ms: i64 = 0;
    for incident in incidents.iter().filter(|i| in_region(i, region)) {
        let start = incident.started_at.max(window_start);
        let end = incident.resolved_at.unwrap_or(incident.ends_at).min(now);
        if end > start {
            impacted_ms += (end - start).num_milliseconds();
        }
    }

    let uptime = 100.0 - (impacted_ms as f64 / total_ms as f64) * 100.0;
    (uptime.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

/// Group incidents by the UTC calendar date they started, ascending by
/// date string. Severity counters reflect current severity at snapshot
/// time, not the severity at creation.
pub fn day_buckets(incidents: &[Incident], region: Option<&str>) -> Vec<DayBucket> {
    let mut by_day: BTreeMap<String, DayBucket> = BTreeMap::new();

    for incident in incidents.iter().filter(|i| in_region(i, region)) {
        let date = incident.started_at.format("%Y-%m-%d").to_string();
        let bucket = by_day.entry(date.clone()).or_insert_with(|| DayBucket {
            date,
            started: 0,
            resolved: 0,
            low: 0,
            medium: 0,
            high: 0,
        });
        bucket.started += 1;
        if incident.status == IncidentStatus::Resolved {
            bucket.resolved += 1;
        }
        match incident.severity {
            Severity::Low => bucket.low += 1,
            Severity::Medium => bucket.medium += 1,
            Severity::High => bucket.high += 1,
        }
    }

    by_day.into_values().collect()
}

/// Incident counts per catalog region, preserving catalog order and
/// including zero-incident regions.
pub fn region_counts(incidents: &[Incident], catalog: &RegionCatalog) -> Vec<RegionCount> {
    catalog
        .list()
        .iter()
        .map(|region| {
            let mut row = RegionCount {
                region: region.name.clone(),
                incidents: 0,
                high: 0,
                medium: 0,
                low: 0,
            };
            for incident in incidents.iter().filter(|i| i.region == region.name) {
                row.incidents += 1;
                match incident.severity {
                    Severity::Low => row.low += 1,
                    Severity::Medium => row.medium += 1,
                    Severity::High => row.high += 1,
                }
            }
            row
        })
        .collect()
}
