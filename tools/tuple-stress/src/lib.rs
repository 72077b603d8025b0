//! Stress driver for the tuple intern registry.
//!
//! Hammers one registry from several threads with a mix of throwaway
//! object-keyed tuples (which must be reclaimed) and a small set of
//! value-keyed tuples (which are retained), then checks that:
//!
//! - every thread saw the same canonical instance of a shared sequence
//! - after a final sweep the trie holds only the retained value paths

use std::fmt;
use std::sync::Once;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tuple_intern::{
    Item, Obj, Registry, RegistryCensus, RegistryConfig, RegistryStats, Tuple,
    DEFAULT_SWEEP_INTERVAL,
};

/// Distinct values in the retained value-keyed tuples, per thread.
const VALUE_SPREAD: usize = 64;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing if `RUST_LOG` is set.
///
/// `RUST_LOG=tuple_intern=debug` shows every sweep; `trace` adds one event
/// per newly created tuple.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StressError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for {option}")]
    InvalidNumber { option: &'static str, value: String },

    #[error("{option} must be at least 1")]
    Zero { option: &'static str },

    #[error("threads disagreed on the canonical instance of a shared tuple")]
    NotCanonical,

    #[error("trie holds {nodes} nodes after the final sweep, expected at most {limit}")]
    Unbounded { nodes: usize, limit: usize },

    #[error("a worker thread panicked")]
    WorkerPanicked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StressConfig {
    /// Iterations per thread.
    pub iterations: usize,
    pub threads: usize,
    /// Items per throwaway tuple, the leading object included.
    pub width: usize,
    pub sweep_interval: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        StressConfig {
            iterations: 100_000,
            threads: 4,
            width: 3,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl StressConfig {
    /// Upper bound on trie nodes once every throwaway tuple is gone and
    /// swept: the root, each thread's retained value paths and the shared
    /// sequence.
    pub fn node_limit(&self) -> usize {
        1 + self.threads * (1 + VALUE_SPREAD) + self.width
    }
}

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run(StressConfig),
    Help,
}

/// Parse `--name=value` style options. `args` excludes the program name.
pub fn parse_args(args: &[String]) -> Result<Command, StressError> {
    let mut config = StressConfig::default();

    for arg in args {
        if arg == "-h" || arg == "--help" {
            return Ok(Command::Help);
        } else if let Some(value) = arg.strip_prefix("--iterations=") {
            config.iterations = parse_count("--iterations", value)?;
        } else if let Some(value) = arg.strip_prefix("--threads=") {
            config.threads = parse_count("--threads", value)?;
        } else if let Some(value) = arg.strip_prefix("--width=") {
            config.width = parse_count("--width", value)?;
        } else if let Some(value) = arg.strip_prefix("--sweep-interval=") {
            // Zero is meaningful here: sweep only at the end.
            config.sweep_interval = value.parse().map_err(|_| StressError::InvalidNumber {
                option: "--sweep-interval",
                value: value.to_string(),
            })?;
        } else {
            return Err(StressError::UnknownOption(arg.clone()));
        }
    }

    Ok(Command::Run(config))
}

fn parse_count(option: &'static str, value: &str) -> Result<usize, StressError> {
    let count: usize = value.parse().map_err(|_| StressError::InvalidNumber {
        option,
        value: value.to_string(),
    })?;
    if count == 0 {
        return Err(StressError::Zero { option });
    }
    Ok(count)
}

pub fn print_usage() {
    println!("Usage: tuple-stress [options]");
    println!();
    println!("Options:");
    println!("  --iterations=<n>       Iterations per thread (default: 100000)");
    println!("  --threads=<n>          Worker threads (default: 4)");
    println!("  --width=<n>            Items per throwaway tuple (default: 3)");
    println!(
        "  --sweep-interval=<n>   New nodes between sweeps, 0 for manual (default: {DEFAULT_SWEEP_INTERVAL})"
    );
    println!("  -h, --help             Show this help");
    println!();
    println!("Set RUST_LOG=tuple_intern=debug to log sweeps.");
}

#[derive(Clone, Debug)]
pub struct StressReport {
    pub config: StressConfig,
    pub stats: RegistryStats,
    /// Census after the final sweep.
    pub census: RegistryCensus,
    pub elapsed: Duration,
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let StressConfig {
            iterations,
            threads,
            width,
            sweep_interval,
        } = self.config;
        writeln!(
            f,
            "{threads} threads x {iterations} iterations, width {width}, sweep interval {sweep_interval}"
        )?;
        writeln!(f, "  elapsed:        {:?}", self.elapsed)?;
        writeln!(f, "  tuples created: {}", self.stats.tuples_created)?;
        writeln!(f, "  nodes created:  {}", self.stats.nodes_created)?;
        writeln!(
            f,
            "  sweeps:         {} ({} edges pruned, {} nodes visited)",
            self.stats.sweeps, self.stats.edges_pruned, self.stats.sweep_nodes_visited
        )?;
        write!(
            f,
            "  final trie:     {} nodes, {} weak edges, {} strong edges, {} live tuples",
            self.census.nodes,
            self.census.weak_edges,
            self.census.strong_edges,
            self.census.live_tuples
        )
    }
}

/// One worker's loop. Returns its handle to the shared tuple.
fn work(
    registry: &Registry,
    config: &StressConfig,
    thread_id: usize,
) -> Result<Tuple, StressError> {
    let shared: Vec<Item> = (0..config.width)
        .map(|i| Item::string(format!("shared{i}")))
        .collect();
    let shared_tuple = registry.intern(shared.clone());
    let owner = Item::string(format!("t{thread_id}"));

    for i in 0..config.iterations {
        // Throwaway: a fresh object first, so the whole path dies with it.
        let mut items = Vec::with_capacity(config.width);
        items.push(Item::from(Obj::opaque(i)));
        items.extend((1..config.width).map(|offset| Item::string((i % offset).to_string())));
        let _throwaway = registry.intern(items);

        let _retained = registry.tuple([
            owner.clone(),
            Item::string(format!("v{}", i % VALUE_SPREAD)),
        ]);

        if i % 1024 == 0 && !registry.intern(shared.clone()).ptr_eq(&shared_tuple) {
            return Err(StressError::NotCanonical);
        }
    }
    Ok(shared_tuple)
}

/// Run the stress loop described by `config`.
pub fn run(config: &StressConfig) -> Result<StressReport, StressError> {
    if config.threads == 0 {
        return Err(StressError::Zero { option: "--threads" });
    }
    if config.width == 0 {
        return Err(StressError::Zero { option: "--width" });
    }

    let registry =
        Registry::isolated(RegistryConfig::default().with_sweep_interval(config.sweep_interval));
    tracing::info!(
        threads = config.threads,
        iterations = config.iterations,
        width = config.width,
        sweep_interval = config.sweep_interval,
        "starting stress run"
    );

    let started = Instant::now();
    let canonical = thread::scope(|scope| {
        let handles: Vec<_> = (0..config.threads)
            .map(|thread_id| {
                let registry = &registry;
                scope.spawn(move || work(registry, config, thread_id))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| StressError::WorkerPanicked)?)
            .collect::<Result<Vec<_>, _>>()
    })?;
    let elapsed = started.elapsed();

    if !canonical.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])) {
        return Err(StressError::NotCanonical);
    }
    drop(canonical);

    registry.sweep();
    let census = registry.census();
    let limit = config.node_limit();
    if census.nodes > limit {
        return Err(StressError::Unbounded {
            nodes: census.nodes,
            limit,
        });
    }

    let report = StressReport {
        config: *config,
        stats: registry.stats(),
        census,
        elapsed,
    };
    tracing::info!(
        tuples_created = report.stats.tuples_created,
        sweeps = report.stats.sweeps,
        final_nodes = census.nodes,
        "stress run finished"
    );
    Ok(report)
}
