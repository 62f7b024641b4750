//! grid — traffic assignment on a synthetic grid town.
//!
//! Usage:
//!
//! ```text
//! grid [CONFIG.json] [OUTPUT_DIR]
//! ```
//!
//! `CONFIG.json` holds any subset of `TrafficConfig` fields; missing keys
//! keep their defaults.  Loads and network snapshots go to `OUTPUT_DIR`
//! (default `output/grid`).  Set `RUST_LOG=debug` for per-origin progress.

mod network;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use st_core::{NodeId, SimRng, TrafficConfig};
use st_network::StreetGraph;
use st_output::{CsvWriter, OutputWriter, SimOutputObserver};
use st_sim::{ConstructionReport, LogObserver, SimObserver, Simulator, StepSummary, TrafficLoad};
use st_trips::generate_trips;

use network::build_town;

// ── Constants ─────────────────────────────────────────────────────────────────

const GRID_SIZE:          i64  = 12;
const DEFAULT_OUTPUT_DIR: &str = "output/grid";
const BUSIEST_SHOWN:      usize = 10;

// ── Observer fan-out ──────────────────────────────────────────────────────────

/// Log progress and persist output from the same run.
struct RunObserver<W: OutputWriter> {
    log:    LogObserver,
    output: SimOutputObserver<W>,
}

impl<W: OutputWriter> SimObserver for RunObserver<W> {
    fn on_sim_start(&mut self, step: u64, graph: &StreetGraph) {
        self.log.on_sim_start(step, graph);
        self.output.on_sim_start(step, graph);
    }

    fn on_step_start(&mut self, step: u64) {
        self.log.on_step_start(step);
    }

    fn on_origin_processed(&mut self, step: u64, origin: NodeId, assigned: usize) {
        self.log.on_origin_processed(step, origin, assigned);
    }

    fn on_trip_skipped(&mut self, step: u64, origin: NodeId, goal: NodeId) {
        self.log.on_trip_skipped(step, origin, goal);
    }

    fn on_step_end(&mut self, summary: &StepSummary, load: &TrafficLoad) {
        self.log.on_step_end(summary, load);
        self.output.on_step_end(summary, load);
    }

    fn on_construction(&mut self, step: u64, report: &ConstructionReport, graph: &StreetGraph) {
        self.log.on_construction(step, report, graph);
        self.output.on_construction(step, report, graph);
    }

    fn on_sim_end(&mut self, final_step: u64) {
        self.log.on_sim_end(final_step);
        self.output.on_sim_end(final_step);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&str>) -> Result<TrafficConfig> {
    let Some(path) = path else {
        return Ok(TrafficConfig::default());
    };
    let file = File::open(path).with_context(|| format!("opening config {path}"))?;
    let config: TrafficConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing config {path}"))?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str))?;
    config.validate()?;
    let output_dir = PathBuf::from(args.get(2).map(String::as_str).unwrap_or(DEFAULT_OUTPUT_DIR));

    // 1. Build the town.
    let town = build_town(GRID_SIZE)?;
    let (origins, goals) = town.trip_endpoints(config.use_attributed_nodes);
    info!(
        "town: {} nodes, {} streets, {} trip origins, {} trip goals",
        town.graph.node_count(),
        town.graph.street_count(),
        origins.len(),
        goals.len()
    );

    // 2. Generate trips.
    let mut rng = SimRng::new(config.seed);
    let trips = generate_trips(config.number_of_residents, &origins, &goals, &mut rng)?;
    info!("{} trips from {} origins", trips.len(), trips.origin_count());

    // 3. Build the simulator.
    let mut sim = Simulator::new(town.graph, trips, config.clone())?;
    info!("jam tolerance {:.3}", sim.jam_tolerance());

    // 4. Run with logging and CSV output.
    let writer = CsvWriter::new(&output_dir)
        .with_context(|| format!("creating output in {}", output_dir.display()))?;
    let mut obs = RunObserver {
        log:    LogObserver::new(),
        output: SimOutputObserver::new(writer, &config),
    };

    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.output.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!();
    println!("Simulation complete in {:.3} s, output in {}", elapsed.as_secs_f64(), output_dir.display());
    println!();
    println!("{:<8} {:<8} {:<8} {:>6} {:>10} {:>10}", "Street", "From", "To", "Load", "Max km/h", "Time");
    println!("{}", "-".repeat(56));

    let mut busiest: Vec<_> = sim.load().iter_nonzero().collect();
    busiest.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    for (id, load) in busiest.into_iter().take(BUSIEST_SHOWN) {
        let Some(street) = sim.graph().street_by_index(id) else {
            continue;
        };
        println!(
            "{:<8} {:<8} {:<8} {:>6} {:>10.0} {:>10.3}",
            id.0, street.origin.0, street.destination.0, load, street.max_speed_kmh, street.driving_time,
        );
    }

    Ok(())
}
