//! fdtab - open file descriptor tables for the current user.
//!
//! Scans `/proc` for processes owned by the invoking user and prints their
//! open descriptors in one or more table shapes.
//!
//! Usage:
//!   fdtab                      # composite table for all owned processes
//!   fdtab 1234                 # tables for one target process
//!   fdtab --per-process --Vnodes
//!   fdtab --threshold=20       # flag processes with more than 20 fds
//!   fdtab --output_TXT --output_binary

use clap::Parser;
use std::io;
use std::path::Path;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use fdtab::collector::FileSystem;
#[cfg(not(target_os = "linux"))]
use fdtab::collector::MockFs;
#[cfg(target_os = "linux")]
use fdtab::collector::RealFs;
use fdtab::engine::{Engine, RunConfig, RunError};
use fdtab::output::{
    BINARY_SNAPSHOT_PATH, BinarySink, DescriptorSink, TEXT_SNAPSHOT_PATH, TextSink,
};
use fdtab::view::ViewSet;

/// Open file descriptor tables for the current user.
#[derive(Parser)]
#[command(name = "fdtab", about = "Open file descriptor tables", version)]
struct Args {
    /// Target process id. Scans all processes owned by the current user
    /// when omitted.
    #[arg(value_name = "PID", allow_negative_numbers = true)]
    pid: Option<i64>,

    /// Show the per-process table (PID, FD).
    #[arg(long = "per-process")]
    per_process: bool,

    /// Show the system-wide table (PID, FD, filename).
    #[arg(long = "systemWide")]
    system_wide: bool,

    /// Show the vnode table (FD, inode).
    #[arg(long = "Vnodes")]
    vnodes: bool,

    /// Show the composite table (PID, FD, filename, inode).
    #[arg(long = "composite")]
    composite: bool,

    /// Report processes with more than N open descriptors.
    /// May be repeated, but repeated values must agree.
    #[arg(long = "threshold", value_name = "N", allow_negative_numbers = true)]
    threshold: Vec<i64>,

    /// Save the composite table to compositeTable.txt.
    #[arg(long = "output_TXT")]
    output_txt: bool,

    /// Save the composite table to compositeTable.bin.
    #[arg(long = "output_binary")]
    output_binary: bool,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
///
/// Logs go to stderr so they never interleave with tables on stdout.
/// Default level is WARN (transient scan failures stay visible).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("fdtab={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Validates raw arguments into a run configuration.
///
/// Diagnostics keep the wording users of the original tool know, but
/// failures exit non-zero (see DESIGN.md).
fn build_config(args: &Args) -> Result<RunConfig, String> {
    let mut threshold = None;
    for &value in &args.threshold {
        if value < 0 {
            return Err("The value given to --threshold=X should be a positive int!".to_string());
        }
        let value = value as u64;
        if let Some(previous) = threshold
            && previous != value
        {
            return Err("The value given to --threshold=X should be consistent!".to_string());
        }
        threshold = Some(value);
    }

    let target_process = match args.pid {
        Some(pid) if pid < 0 => {
            return Err("Can only take a positive integer indicating a PID!".to_string());
        }
        Some(pid) => Some(pid as u32),
        None => None,
    };

    Ok(RunConfig {
        target_process,
        threshold,
        views: ViewSet {
            composite: args.composite,
            per_process: args.per_process,
            system_wide: args.system_wide,
            vnode: args.vnodes,
        },
        persist_text: args.output_txt,
        persist_binary: args.output_binary,
    })
}

/// Opens the snapshot sinks requested by the configuration.
///
/// A sink that fails to open is reported and skipped; the run proceeds
/// with the remaining outputs.
fn open_sinks(config: &RunConfig) -> Vec<Box<dyn DescriptorSink>> {
    let mut sinks: Vec<Box<dyn DescriptorSink>> = Vec::new();
    if config.persist_text {
        match TextSink::create(Path::new(TEXT_SNAPSHOT_PATH)) {
            Ok(sink) => sinks.push(Box::new(sink)),
            Err(e) => eprintln!("cannot open {}: {}", TEXT_SNAPSHOT_PATH, e),
        }
    }
    if config.persist_binary {
        match BinarySink::create(Path::new(BINARY_SNAPSHOT_PATH)) {
            Ok(sink) => sinks.push(Box::new(sink)),
            Err(e) => eprintln!("cannot open {}: {}", BINARY_SNAPSHOT_PATH, e),
        }
    }
    sinks
}

fn run_engine<F: FileSystem + Clone>(
    engine: Engine<F>,
    config: &RunConfig,
    sinks: &mut [Box<dyn DescriptorSink>],
) {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match engine.run(config, &mut out, sinks) {
        Ok(summary) => info!(
            "scanned {} processes, {} descriptors, {} over threshold",
            summary.processes, summary.descriptors, summary.offenders
        ),
        Err(e @ RunError::TargetNotFound(_)) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error scanning descriptor tables: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
    };

    let mut sinks = open_sinks(&config);

    #[cfg(target_os = "linux")]
    run_engine(
        Engine::new(RealFs::new(), &args.proc_path),
        &config,
        &mut sinks,
    );
    #[cfg(not(target_os = "linux"))]
    run_engine(
        Engine::new(MockFs::user_session(), &args.proc_path),
        &config,
        &mut sinks,
    );
}
