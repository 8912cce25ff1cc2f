//! sim-runner: headless host for the netpulse incident engine.
//!
//! Usage:
//!   sim-runner --seed 12345 --duration 60
//!   sim-runner --seed 12345 --fast-secs 86400
//!   sim-runner --seed 12345 --duration 60 --retention-mins 120

use anyhow::Result;
use chrono::{Duration, Utc};
use netpulse_core::{
    filter::filter_incidents,
    metrics, IncidentFilter, IncidentStatus, ManualClock, RegionCatalog, Severity, SimConfig,
    SimScheduler, SystemClock,
};
use std::collections::HashSet;
use std::env;
use std::sync::{Arc, Mutex};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let duration_secs = parse_arg(&args, "--duration", 60u64);
    let fast_secs = parse_arg(&args, "--fast-secs", 0u64);
    let retention_mins = parse_arg(&args, "--retention-mins", 0i64);
    let region_filter = args
        .windows(2)
        .find(|w| w[0] == "--region")
        .map(|w| w[1].clone())
        .unwrap_or_default();

    let config = SimConfig {
        retention: (retention_mins > 0).then(|| Duration::minutes(retention_mins)),
        ..SimConfig::default()
    };
    let catalog = RegionCatalog::builtin();

    println!("netpulse — sim-runner");
    println!("  seed:      {seed}");
    if fast_secs > 0 {
        println!("  mode:      fast-forward ({fast_secs} simulated seconds)");
    } else {
        println!("  mode:      real-time ({duration_secs}s)");
    }
    println!();

    let snapshot = if fast_secs > 0 {
        run_fast(catalog.clone(), config, seed, fast_secs)?
    } else {
        run_realtime(catalog.clone(), config, seed, duration_secs)?
    };

    print_summary(&snapshot, &catalog, &region_filter)?;
    Ok(())
}

/// Real-time mode: both timers run on their wall-clock cadences.
fn run_realtime(
    catalog: RegionCatalog,
    config: SimConfig,
    seed: u64,
    duration_secs: u64,
) -> Result<netpulse_core::SimSnapshot> {
    let mut scheduler =
        SimScheduler::new(catalog, config, seed, Arc::new(SystemClock))?;

    // Announce each high-severity active incident once, the way the
    // dashboard's alert toaster does.
    let announced: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
    scheduler.subscribe(move |snapshot| {
        let mut seen = announced.lock().expect("announced set poisoned");
        for incident in &snapshot.incidents {
            if incident.severity == Severity::High
                && incident.status == IncidentStatus::Active
                && seen.insert(incident.id.to_string())
            {
                log::warn!(
                    "HIGH {} in {} — {} (~{} users)",
                    incident.incident_type,
                    incident.region,
                    incident.service,
                    incident.impact_estimate
                );
            }
        }
    });

    scheduler.start()?;
    std::thread::sleep(std::time::Duration::from_secs(duration_secs));
    scheduler.stop();
    Ok(scheduler.snapshot())
}

/// Fast-forward mode: drive both cadences against a manual clock, one
/// simulated second at a time, without sleeping.
fn run_fast(
    catalog: RegionCatalog,
    config: SimConfig,
    seed: u64,
    fast_secs: u64,
) -> Result<netpulse_core::SimSnapshot> {
    let create_every = config.creation_interval.as_secs();
    let advance_every = config.advance_interval.as_secs();

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let scheduler = SimScheduler::new(catalog, config, seed, clock.clone())?;

    for second in 1..=fast_secs {
        clock.advance(Duration::seconds(1));
        if second % create_every == 0 {
            scheduler.creation_tick();
        }
        if second % advance_every == 0 {
            scheduler.advancement_tick();
        }
    }
    Ok(scheduler.snapshot())
}

fn print_summary(
    snapshot: &netpulse_core::SimSnapshot,
    catalog: &RegionCatalog,
    region_filter: &str,
) -> Result<()> {
    let filter = IncidentFilter::from_labels(region_filter, "", "")?;
    let incidents = filter_incidents(&snapshot.incidents, &filter);

    let resolved = incidents
        .iter()
        .filter(|i| i.status == IncidentStatus::Resolved)
        .count();

    println!("=== RUN SUMMARY ===");
    println!("  incidents:  {}", incidents.len());
    println!("  resolved:   {resolved}");
    println!("  active:     {}", incidents.len() - resolved);
    println!("  events:     {}", snapshot.events.len());

    println!();
    println!("=== REGION HEALTH ===");
    let now = snapshot.taken_at;
    let window = metrics::default_uptime_window();
    for row in metrics::region_counts(&incidents, catalog) {
        let mttr = metrics::mean_time_to_resolve_minutes(&incidents, Some(&row.region));
        let uptime = metrics::uptime_percent(&incidents, Some(&row.region), now, window);
        println!(
            "  {:<12} | incidents: {:>3} (H {:>2} / M {:>2} / L {:>2}) | MTTR: {:>3}m | uptime: {:>5.1}%",
            row.region, row.incidents, row.high, row.medium, row.low, mttr, uptime
        );
    }

    println!();
    println!("=== DAILY BUCKETS ===");
    let buckets = metrics::day_buckets(&incidents, None);
    if buckets.is_empty() {
        println!("  (no incidents)");
    }
    for b in buckets {
        println!(
            "  {} | started: {:>3} | resolved: {:>3} | H {:>2} / M {:>2} / L {:>2}",
            b.date, b.started, b.resolved, b.high, b.medium, b.low
        );
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
