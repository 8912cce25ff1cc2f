//! Incident generator — pure decision functions.
//!
//! The generator never touches the incident collection; it only
//! manufactures a candidate incident from the catalog and an RNG
//! stream. The scheduler decides what to do with it.

use crate::config::SimConfig;
use crate::incident::Incident;
use crate::region::RegionCatalog;
use crate::rng::SimRng;
use crate::types::{IncidentStatus, IncidentType, Severity, ServiceKind};
use chrono::{DateTime, Duration, Utc};

/// Estimated impacted users: population x severity factor x noise,
/// noise uniform in [0.9, 1.1), floored at 1.
pub fn estimate_impact(population: u64, severity: Severity, rng: &mut SimRng) -> u64 {
    let noise = rng.range_f64(0.9, 1.1);
    let estimate = (population as f64 * severity.impact_factor() * noise).round() as u64;
    estimate.max(1)
}

/// One creation-tick draw: with probability p_start, produce a fresh
/// incident. Independent of how many incidents are already active —
/// the simulator applies no backpressure by design.
pub fn maybe_start_incident(
    catalog: &RegionCatalog,
    config: &SimConfig,
    rng: &mut SimRng,
    now: DateTime<Utc>,
) -> Option<Incident> {
    if !rng.chance(config.p_start) {
        return None;
    }
    Some(start_incident(catalog, config, rng, now))
}

/// Unconditionally manufacture a new incident.
pub fn start_incident(
    catalog: &RegionCatalog,
    config: &SimConfig,
    rng: &mut SimRng,
    now: DateTime<Utc>,
) -> Incident {
    let region = catalog.pick(rng).clone();
    let service = *rng.pick(&ServiceKind::ALL);
    let incident_type = *rng.pick(&IncidentType::ALL);
    let severity = *rng.pick(&Severity::ALL);
    let minutes =
        rng.range_u64_inclusive(config.min_duration_minutes, config.max_duration_minutes);
    let impact_estimate = estimate_impact(region.population, severity, rng);

    Incident {
        id: uuid::Builder::from_random_bytes(rng.id_bytes()).into_uuid(),
        region: region.name,
        lat: region.lat,
        lng: region.lng,
        service,
        incident_type,
        severity,
        status: IncidentStatus::Active,
        started_at: now,
        ends_at: now + Duration::minutes(minutes as i64),
        resolved_at: None,
        escalations: Vec::new(),
        impact_estimate,
    }
}
