//! The scan-and-format engine.
//!
//! One traversal per run: enumerate the candidate processes, scan each
//! one's descriptors, and fan every entry out to the display renderer and
//! the registered snapshot sinks while the threshold detector accumulates
//! per-process counts. Nothing is buffered beyond the current process's
//! scan and no process is visited twice.

use crate::collector::{FdScanner, FileSystem, ProcessEnumerator};
use crate::output::DescriptorSink;
use crate::view::{SEPARATOR, ViewSet};
use std::io::{self, Write};
use std::path::Path;
use tracing::warn;

/// Validated, read-only configuration for one run.
///
/// Built once by the driver from command-line input; the engine never
/// mutates it.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Explicit process to scan; `None` scans all processes owned by the
    /// invoking user.
    pub target_process: Option<u32>,
    /// Descriptor-count limit; processes strictly above it are reported.
    pub threshold: Option<u64>,
    /// Requested table shapes. An empty set implies the composite view.
    pub views: ViewSet,
    /// Whether a text snapshot sink is registered for this run.
    pub persist_text: bool,
    /// Whether a binary snapshot sink is registered for this run.
    pub persist_binary: bool,
}

impl RunConfig {
    /// Whether displayed entries get a leading sequence label.
    ///
    /// Numbering applies only to plain whole-system display runs: an
    /// explicit target, an active threshold, or any persistence sink
    /// disables it.
    fn numbering_active(&self) -> bool {
        self.target_process.is_none()
            && self.threshold.is_none()
            && !self.persist_text
            && !self.persist_binary
    }
}

/// Error type for run failures.
#[derive(Debug)]
pub enum RunError {
    /// The explicit, user-supplied target process does not exist.
    TargetNotFound(u32),
    /// I/O error on the process registry or the display stream.
    Io(io::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::TargetNotFound(pid) => write!(f, "PID '{}' does not exist!", pid),
            RunError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for RunError {}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        RunError::Io(e)
    }
}

/// Totals from one completed run, for driver logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Processes scanned.
    pub processes: usize,
    /// Descriptor entries emitted.
    pub descriptors: u64,
    /// Processes exceeding the threshold (0 when no threshold is set).
    pub offenders: usize,
}

/// A process whose descriptor count exceeded the configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdReport {
    pub pid: u32,
    pub descriptor_count: u64,
}

/// Flags processes holding more descriptors than a configured limit.
///
/// Stateless across processes: it sees each process once, with its final
/// count, after that process has been fully scanned.
pub struct ThresholdDetector {
    limit: u64,
}

impl ThresholdDetector {
    /// Creates a detector for the given limit.
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    /// Reports a process iff its count strictly exceeds the limit.
    pub fn check(&self, pid: u32, descriptor_count: u64) -> Option<ThresholdReport> {
        (descriptor_count > self.limit).then_some(ThresholdReport {
            pid,
            descriptor_count,
        })
    }
}

/// Drives one scan pass over the process registry.
pub struct Engine<F: FileSystem + Clone> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem + Clone> Engine<F> {
    /// Creates a new engine.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Runs one traversal: renders the active views to `out`, feeds every
    /// entry to the registered sinks, and reports threshold offenders.
    ///
    /// Transient per-process and per-descriptor failures are logged and
    /// skipped; the only fatal conditions are a missing explicit target
    /// and I/O errors on the display stream or the registry root.
    pub fn run<W: Write>(
        &self,
        config: &RunConfig,
        out: &mut W,
        sinks: &mut [Box<dyn DescriptorSink>],
    ) -> Result<RunSummary, RunError> {
        let views = config.views.normalized();
        let enumerator = ProcessEnumerator::new(self.fs.clone(), self.proc_path.clone());
        let scanner = FdScanner::new(self.fs.clone(), self.proc_path.clone());

        let pids = match config.target_process {
            Some(pid) => {
                let proc_dir = format!("{}/{}", self.proc_path, pid);
                if !self.fs.exists(Path::new(&proc_dir)) {
                    return Err(RunError::TargetNotFound(pid));
                }
                writeln!(out, ">>> target PID: {}", pid)?;
                vec![pid]
            }
            None => {
                let uid = enumerator.current_uid()?;
                enumerator.owned_processes(uid)?
            }
        };

        for view in views.iter() {
            writeln!(out, "{}", view.header())?;
            writeln!(out, "{}", SEPARATOR)?;
        }

        let detector = config.threshold.map(ThresholdDetector::new);
        let mut sequence = config.numbering_active().then_some(0u64);
        let mut offenders = Vec::new();
        let mut descriptors = 0u64;

        for &pid in &pids {
            let entries = scanner.scan(pid);
            for entry in &entries {
                // The label, when active, precedes the entry's first
                // rendered line and advances once per entry.
                if let Some(n) = sequence.as_mut() {
                    write!(out, "{}", n)?;
                    *n += 1;
                }
                for view in views.iter() {
                    writeln!(out, "{}", view.render(entry))?;
                }
                for sink in sinks.iter_mut() {
                    if let Err(e) = sink.write_row(entry) {
                        warn!(
                            "snapshot write failed for pid {} fd {}: {}",
                            entry.pid, entry.fd, e
                        );
                    }
                }
                descriptors += 1;
            }
            if let Some(detector) = &detector
                && let Some(report) = detector.check(pid, entries.len() as u64)
            {
                offenders.push(report);
            }
        }

        for _ in views.iter() {
            writeln!(out, "{}", SEPARATOR)?;
        }

        if detector.is_some() {
            writeln!(out, "## Offending processes:")?;
            for report in &offenders {
                write!(out, "{} ({}), ", report.pid, report.descriptor_count)?;
            }
            writeln!(out)?;
        }

        for sink in sinks.iter_mut() {
            if let Err(e) = sink.close() {
                warn!("failed to close snapshot sink: {}", e);
            }
        }

        Ok(RunSummary {
            processes: pids.len(),
            descriptors,
            offenders: offenders.len(),
        })
    }
}
