//! The lifecycle scheduler — the only owner of mutable engine state.
//!
//! RULES:
//!   - All mutation happens inside creation_tick / advancement_tick.
//!   - Within an advancement pass the order is fixed and documented:
//!     escalation draw first, then the resolution time check, then the
//!     heartbeat draw. Escalate-then-resolve in one tick is possible.
//!   - The state mutex is held only for a tick's mutation or a
//!     snapshot copy, never across subscriber callbacks.
//!   - Tick bodies are infallible: no I/O, bounded enumerations,
//!     previously-validated timestamps. Any panic here is a bug.

use crate::clock::Clock;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::event::{Event, EventKind};
use crate::generator;
use crate::incident::{Escalation, Incident};
use crate::region::RegionCatalog;
use crate::rng::{RngBank, SimRng, StreamSlot};
use crate::snapshot::SimSnapshot;
use crate::types::IncidentStatus;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Instant;

type Subscriber = Box<dyn Fn(&SimSnapshot) + Send>;

struct SchedulerState {
    incidents: Vec<Incident>,
    events: Vec<Event>,
    /// Time of the last mutation; stamped onto snapshots so repeated
    /// reads between ticks compare deep-equal.
    updated_at: chrono::DateTime<chrono::Utc>,
    gen_rng: SimRng,
    life_rng: SimRng,
}

/// Everything the timer thread shares with the public handle.
struct Shared {
    catalog: RegionCatalog,
    config: SimConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<SchedulerState>,
    subscribers: Mutex<Vec<Subscriber>>,
}

struct Worker {
    shutdown: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

pub struct SimScheduler {
    shared: Arc<Shared>,
    worker: Option<Worker>,
}

impl SimScheduler {
    /// Validates the config up front — bad probabilities or intervals
    /// fail here, never at tick time.
    pub fn new(
        catalog: RegionCatalog,
        config: SimConfig,
        seed: u64,
        clock: Arc<dyn Clock>,
    ) -> SimResult<Self> {
        config.validate()?;
        let bank = RngBank::new(seed);
        let created_at = clock.now();
        Ok(Self {
            shared: Arc::new(Shared {
                catalog,
                config,
                clock,
                state: Mutex::new(SchedulerState {
                    incidents: Vec::new(),
                    events: Vec::new(),
                    updated_at: created_at,
                    gen_rng: bank.for_slot(StreamSlot::Generator),
                    life_rng: bank.for_slot(StreamSlot::Lifecycle),
                }),
                subscribers: Mutex::new(Vec::new()),
            }),
            worker: None,
        })
    }

    /// One creation-tick: maybe start a new incident.
    pub fn creation_tick(&self) {
        self.shared.creation_tick();
    }

    /// One advancement-tick: escalate / resolve / heartbeat every
    /// active incident, then apply retention eviction.
    pub fn advancement_tick(&self) {
        self.shared.advancement_tick();
    }

    /// Seed a hand-built incident (test harness, replay tooling).
    /// Appends the incident's Started event at its started_at time.
    pub fn inject(&self, incident: Incident) {
        self.shared.inject(incident);
    }

    /// Immutable copy of the current incidents and events. Never torn:
    /// the copy is taken under the same lock ticks mutate under.
    pub fn snapshot(&self) -> SimSnapshot {
        self.shared.snapshot()
    }

    /// Register a callback invoked with a fresh snapshot after every
    /// tick (creation and advancement alike).
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&SimSnapshot) + Send + 'static,
    {
        self.shared
            .subscribers
            .lock()
            .expect("subscriber list poisoned")
            .push(Box::new(callback));
    }

    /// Begin both timers on one background thread. The creation and
    /// advancement cadences fire off wall-clock deadlines; all
    /// mutation stays serialized on that thread.
    pub fn start(&mut self) -> SimResult<()> {
        if self.worker.is_some() {
            return Err(SimError::AlreadyRunning);
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("netpulse-scheduler".into())
            .spawn(move || run_timer_loop(shared, shutdown_rx))
            .map_err(|e| anyhow::anyhow!("failed to spawn scheduler thread: {e}"))?;

        self.worker = Some(Worker {
            shutdown: shutdown_tx,
            handle,
        });
        log::info!("scheduler started");
        Ok(())
    }

    /// Cancel both timers. On return no tick is in flight or scheduled;
    /// the timer thread has been joined.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown.send(());
            let _ = worker.handle.join();
            log::info!("scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.shared.catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.shared.config
    }
}

impl Drop for SimScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_timer_loop(shared: Arc<Shared>, shutdown: mpsc::Receiver<()>) {
    let create_every = shared.config.creation_interval;
    let advance_every = shared.config.advance_interval;
    let mut next_create = Instant::now() + create_every;
    let mut next_advance = Instant::now() + advance_every;

    loop {
        let next_deadline = next_create.min(next_advance);
        let wait = next_deadline.saturating_duration_since(Instant::now());
        match shutdown.recv_timeout(wait) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        if now >= next_create {
            shared.creation_tick();
            next_create += create_every;
        }
        if now >= next_advance {
            shared.advancement_tick();
            next_advance += advance_every;
        }
    }
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        // Poisoning means a tick panicked, which is a programming
        // error; there is no state to salvage.
        self.state.lock().expect("scheduler state poisoned")
    }

    fn creation_tick(&self) {
        let now = self.clock.now();
        let snapshot = {
            let mut st = self.state();
            if let Some(incident) =
                generator::maybe_start_incident(&self.catalog, &self.config, &mut st.gen_rng, now)
            {
                log::info!(
                    "incident started: {} {} in {} ({}), severity={}, ~{} users",
                    incident.incident_type,
                    incident.service,
                    incident.region,
                    incident.id,
                    incident.severity,
                    incident.impact_estimate
                );
                st.events.push(Event::project(&incident, EventKind::Started, now));
                st.incidents.push(incident);
            }
            st.updated_at = now;
            snapshot_of(&st)
        };
        self.notify(&snapshot);
    }

    fn advancement_tick(&self) {
        let now = self.clock.now();
        let snapshot = {
            let mut st = self.state();
            let SchedulerState {
                incidents,
                events,
                life_rng,
                ..
            } = &mut *st;

            for incident in incidents.iter_mut() {
                if incident.status == IncidentStatus::Resolved {
                    continue;
                }

                // Escalation draw comes before the time check, so an
                // incident can escalate and resolve in the same pass.
                if let Some(to) = incident.severity.escalated() {
                    if life_rng.chance(self.config.p_escalate) {
                        let from = incident.severity;
                        incident.severity = to;
                        incident.escalations.push(Escalation { at: now, from, to });
                        incident.impact_estimate = generator::estimate_impact(
                            self.catalog.population_of(&incident.region),
                            to,
                            life_rng,
                        );
                        events.push(Event::project(incident, EventKind::Escalated, now));
                        log::info!(
                            "incident escalated: {} in {} {} -> {}",
                            incident.id,
                            incident.region,
                            from,
                            to
                        );
                    }
                }

                if now >= incident.ends_at {
                    incident.status = IncidentStatus::Resolved;
                    incident.resolved_at = Some(now);
                    events.push(Event::project(incident, EventKind::Resolved, now));
                    log::info!(
                        "incident resolved: {} in {} after {}m",
                        incident.id,
                        incident.region,
                        incident.duration_minutes()
                    );
                } else if life_rng.chance(self.config.p_heartbeat) {
                    events.push(Event::project(incident, EventKind::Heartbeat, now));
                    log::debug!("heartbeat: {} in {}", incident.id, incident.region);
                }
            }

            if let Some(window) = self.config.retention {
                let cutoff = now - window;
                incidents.retain(|i| match i.resolved_at {
                    Some(resolved_at) => resolved_at >= cutoff,
                    None => true,
                });
                events.retain(|e| e.time >= cutoff);
            }

            st.updated_at = now;
            snapshot_of(&st)
        };
        self.notify(&snapshot);
    }

    fn inject(&self, incident: Incident) {
        let snapshot = {
            let mut st = self.state();
            st.events.push(Event::project(
                &incident,
                EventKind::Started,
                incident.started_at,
            ));
            st.incidents.push(incident);
            st.updated_at = self.clock.now();
            snapshot_of(&st)
        };
        self.notify(&snapshot);
    }

    fn snapshot(&self) -> SimSnapshot {
        let st = self.state();
        snapshot_of(&st)
    }

    fn notify(&self, snapshot: &SimSnapshot) {
        let subscribers = self
            .subscribers
            .lock()
            .expect("subscriber list poisoned");
        for callback in subscribers.iter() {
            callback(snapshot);
        }
    }
}

fn snapshot_of(state: &SchedulerState) -> SimSnapshot {
    SimSnapshot {
        taken_at: state.updated_at,
        incidents: state.incidents.clone(),
        events: state.events.clone(),
    }
}
