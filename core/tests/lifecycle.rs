//! Lifecycle scheduler tests.
//!
//! Tests cover: creation and advancement ticks, the fixed
//! escalate-then-resolve order within a pass, heartbeats, retention
//! eviction, snapshot idempotence, subscriber notification, and the
//! start/stop contract. Probabilities are pinned (0.0 or 1.0) so every
//! scenario is deterministic.

use chrono::{DateTime, Duration, TimeZone, Utc};
use netpulse_core::{
    EventKind, Incident, IncidentId, IncidentStatus, IncidentType, ManualClock, RegionCatalog,
    Severity, ServiceKind, SimConfig, SimError, SimScheduler, SystemClock,
};
use std::sync::{Arc, Mutex};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn build(config: SimConfig, seed: u64, clock: Arc<ManualClock>) -> SimScheduler {
    let _ = env_logger::builder().is_test(true).try_init();
    SimScheduler::new(RegionCatalog::builtin(), config, seed, clock).expect("valid test config")
}

fn test_incident(
    id: u128,
    region: &str,
    severity: Severity,
    started_at: DateTime<Utc>,
    minutes: i64,
) -> Incident {
    Incident {
        id: IncidentId::from_u128(id),
        region: region.to_string(),
        lat: 26.2285,
        lng: 50.5860,
        service: ServiceKind::MobileData,
        incident_type: IncidentType::Outage,
        severity,
        status: IncidentStatus::Active,
        started_at,
        ends_at: started_at + Duration::minutes(minutes),
        resolved_at: None,
        escalations: Vec::new(),
        impact_estimate: 4_000,
    }
}

/// Scenario: a single low incident with a 15-minute planned duration
/// and no escalation draws resolves on time with exactly two events.
#[test]
fn incident_resolves_at_planned_end() {
    let clock = Arc::new(ManualClock::new(t0()));
    let scheduler = build(SimConfig::default_test(), 1, clock.clone());

    let injected = test_incident(1, "Manama", Severity::Low, t0(), 15);
    let ends_at = injected.ends_at;
    scheduler.inject(injected);

    // Advance in 5-second ticks until just past the planned end.
    for _ in 0..((15 * 60 + 5) / 5) {
        clock.advance(Duration::seconds(5));
        scheduler.advancement_tick();
    }

    let snap = scheduler.snapshot();
    assert_eq!(snap.incidents.len(), 1);
    let incident = &snap.incidents[0];
    assert_eq!(incident.status, IncidentStatus::Resolved);
    let resolved_at = incident.resolved_at.expect("resolved incidents carry resolved_at");
    assert!(
        resolved_at >= ends_at && resolved_at <= ends_at + Duration::seconds(5),
        "resolved_at {resolved_at} more than one tick after planned end {ends_at}"
    );
    assert_eq!(incident.severity, Severity::Low, "No escalation draws fired");
    assert!(incident.escalations.is_empty());

    let kinds: Vec<EventKind> = snap.events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::Started, EventKind::Resolved]);
}

/// Scenario: one forced escalation draw before resolution. Severity
/// becomes medium, one escalation record, impact recomputed upward,
/// three events in total.
#[test]
fn escalation_before_resolution() {
    let clock = Arc::new(ManualClock::new(t0()));
    let config = SimConfig {
        p_escalate: 1.0,
        ..SimConfig::default_test()
    };
    let scheduler = build(config, 2, clock.clone());

    let injected = test_incident(2, "Manama", Severity::Low, t0(), 15);
    let impact_before = injected.impact_estimate;
    scheduler.inject(injected);

    // One mid-life tick: escalation fires, resolution does not.
    clock.advance(Duration::minutes(1));
    scheduler.advancement_tick();

    let snap = scheduler.snapshot();
    let incident = &snap.incidents[0];
    assert_eq!(incident.status, IncidentStatus::Active);
    assert_eq!(incident.severity, Severity::Medium);
    assert_eq!(incident.escalations.len(), 1);
    assert_eq!(incident.escalations[0].from, Severity::Low);
    assert_eq!(incident.escalations[0].to, Severity::Medium);
    // Medium impact is at least 0.9 * 0.06 * pop, always above the
    // low-severity ceiling of 1.1 * 0.02 * pop.
    assert!(
        incident.impact_estimate > impact_before,
        "Impact should rise with severity: {} -> {}",
        impact_before,
        incident.impact_estimate
    );

    let kinds: Vec<EventKind> = snap.events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::Started, EventKind::Escalated]);
}

/// The documented tie-break: when the escalation draw and the time
/// condition both hold in one pass, the incident escalates first and
/// still resolves in the same tick.
#[test]
fn escalate_and_resolve_in_same_tick() {
    let clock = Arc::new(ManualClock::new(t0()));
    let config = SimConfig {
        p_escalate: 1.0,
        ..SimConfig::default_test()
    };
    let scheduler = build(config, 3, clock.clone());
    scheduler.inject(test_incident(3, "Manama", Severity::Low, t0(), 15));

    // Jump straight past the planned end; a single tick sees both
    // conditions true.
    clock.advance(Duration::minutes(16));
    scheduler.advancement_tick();

    let snap = scheduler.snapshot();
    let incident = &snap.incidents[0];
    assert_eq!(incident.status, IncidentStatus::Resolved);
    assert_eq!(incident.severity, Severity::Medium);
    assert_eq!(incident.escalations.len(), 1);

    let kinds: Vec<EventKind> = snap.events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Started, EventKind::Escalated, EventKind::Resolved]
    );
}

/// Heartbeats keep live views fresh without changing state.
#[test]
fn heartbeat_emitted_while_active() {
    let clock = Arc::new(ManualClock::new(t0()));
    let config = SimConfig {
        p_heartbeat: 1.0,
        ..SimConfig::default_test()
    };
    let scheduler = build(config, 4, clock.clone());
    scheduler.inject(test_incident(4, "Sitra", Severity::Medium, t0(), 20));

    clock.advance(Duration::seconds(5));
    scheduler.advancement_tick();
    clock.advance(Duration::seconds(5));
    scheduler.advancement_tick();

    let snap = scheduler.snapshot();
    let incident = &snap.incidents[0];
    assert_eq!(incident.status, IncidentStatus::Active);
    assert_eq!(incident.severity, Severity::Medium, "Heartbeat never mutates");

    let kinds: Vec<EventKind> = snap.events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Started, EventKind::Heartbeat, EventKind::Heartbeat]
    );
    // Heartbeats carry the incident's current fields.
    assert_eq!(snap.events[1].severity, Severity::Medium);
    assert_eq!(snap.events[1].status, IncidentStatus::Active);
}

/// With a retention window configured, incidents resolved longer ago
/// than the window and events older than the window are evicted.
/// Active incidents are never evicted.
#[test]
fn retention_evicts_old_resolved_incidents() {
    let clock = Arc::new(ManualClock::new(t0()));
    let config = SimConfig {
        retention: Some(Duration::minutes(30)),
        ..SimConfig::default_test()
    };
    let scheduler = build(config, 5, clock.clone());

    scheduler.inject(test_incident(50, "Manama", Severity::Low, t0(), 15));
    clock.set(t0() + Duration::minutes(20));
    scheduler.advancement_tick(); // resolves the first incident

    let long_lived = test_incident(51, "Riffa", Severity::High, t0() + Duration::minutes(35), 300);
    clock.set(t0() + Duration::minutes(35));
    scheduler.inject(long_lived);

    // 55 minutes in, the cutoff is t0+25m: the first incident
    // (resolved at t0+20m) and all its events fall out.
    clock.set(t0() + Duration::minutes(55));
    scheduler.advancement_tick();

    let snap = scheduler.snapshot();
    assert_eq!(snap.incidents.len(), 1);
    assert_eq!(snap.incidents[0].region, "Riffa");
    assert_eq!(snap.incidents[0].status, IncidentStatus::Active);
    assert_eq!(snap.events.len(), 1, "Only the survivor's start event remains");
    assert_eq!(snap.events[0].kind, EventKind::Started);
}

/// Fixed assumption, not a defect: creation applies no backpressure,
/// so active incidents accumulate without bound.
#[test]
fn creation_has_no_backpressure() {
    let clock = Arc::new(ManualClock::new(t0()));
    let scheduler = build(SimConfig::default_test(), 6, clock.clone());

    for _ in 0..20 {
        clock.advance(Duration::seconds(7));
        scheduler.creation_tick();
    }

    let snap = scheduler.snapshot();
    assert_eq!(snap.incidents.len(), 20, "p_start=1.0 starts one per tick");
    assert!(snap.incidents.iter().all(|i| i.is_active()));
    assert_eq!(snap.events.len(), 20);
    assert!(snap.events.iter().all(|e| e.kind == EventKind::Started));
}

/// Lifecycle invariants hold across a long randomized run.
#[test]
fn invariants_hold_over_random_run() {
    let clock = Arc::new(ManualClock::new(t0()));
    let scheduler = build(SimConfig::default(), 0xFACE_FEED, clock.clone());

    for step in 1..=2_000u64 {
        clock.advance(Duration::seconds(1));
        if step % 7 == 0 {
            scheduler.creation_tick();
        }
        if step % 5 == 0 {
            scheduler.advancement_tick();
        }
    }

    let snap = scheduler.snapshot();
    assert!(!snap.incidents.is_empty(), "p_start=0.6 over 285 draws");

    for incident in &snap.incidents {
        assert_eq!(
            incident.resolved_at.is_some(),
            incident.status == IncidentStatus::Resolved,
            "resolved_at must be set iff resolved: {}",
            incident.id
        );
        // Severity never decreases; each escalation raises one rank
        // from the then-current severity.
        let mut severity = incident
            .escalations
            .first()
            .map(|e| e.from)
            .unwrap_or(incident.severity);
        for esc in &incident.escalations {
            assert_eq!(esc.from, severity, "Escalation from-severity mismatch");
            assert_eq!(esc.from.escalated(), Some(esc.to), "Rank skipped");
            severity = esc.to;
        }
        assert_eq!(severity, incident.severity);
    }

    let started = snap
        .events
        .iter()
        .filter(|e| e.kind == EventKind::Started)
        .count();
    assert_eq!(started, snap.incidents.len(), "One start event per incident");
}

/// Two snapshots with no tick in between compare deep-equal.
#[test]
fn snapshot_is_idempotent_between_ticks() {
    let clock = Arc::new(ManualClock::new(t0()));
    let scheduler = build(SimConfig::default_test(), 7, clock.clone());
    clock.advance(Duration::seconds(7));
    scheduler.creation_tick();

    let first = scheduler.snapshot();
    let second = scheduler.snapshot();
    assert_eq!(first, second);
}

/// Subscribers observe one fresh snapshot per tick.
#[test]
fn subscribers_notified_after_each_tick() {
    let clock = Arc::new(ManualClock::new(t0()));
    let scheduler = build(SimConfig::default_test(), 8, clock.clone());

    let observed: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = observed.clone();
    scheduler.subscribe(move |snapshot| {
        sink.lock().unwrap().push(snapshot.incidents.len());
    });

    clock.advance(Duration::seconds(7));
    scheduler.creation_tick();
    clock.advance(Duration::seconds(5));
    scheduler.advancement_tick();

    let counts = observed.lock().unwrap().clone();
    assert_eq!(counts, vec![1, 1], "One callback per tick, post-mutation");
}

/// start() twice is rejected; stop() joins the timer thread and no
/// mutation happens afterwards.
#[test]
fn start_stop_contract() {
    let mut scheduler = SimScheduler::new(
        RegionCatalog::builtin(),
        SimConfig::default(),
        9,
        Arc::new(SystemClock),
    )
    .expect("valid config");

    scheduler.start().expect("first start succeeds");
    assert!(scheduler.is_running());
    assert!(matches!(scheduler.start(), Err(SimError::AlreadyRunning)));

    scheduler.stop();
    assert!(!scheduler.is_running());

    // Intervals are 5s/7s, so nothing ticked during this test; state
    // must be untouched after stop.
    let before = scheduler.snapshot();
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert_eq!(before, scheduler.snapshot());

    // A stopped scheduler can be started again.
    scheduler.start().expect("restart succeeds");
    scheduler.stop();
}

/// Construction rejects bad config outright.
#[test]
fn construction_fails_fast_on_bad_config() {
    let config = SimConfig {
        p_start: 2.0,
        ..SimConfig::default()
    };
    let result = SimScheduler::new(
        RegionCatalog::builtin(),
        config,
        10,
        Arc::new(ManualClock::new(t0())),
    );
    assert!(matches!(result, Err(SimError::InvalidConfig { .. })));
}
