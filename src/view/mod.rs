//! Table rendering for descriptor entries.
//!
//! Each view mode formats the same `DescriptorEntry` into a different row
//! shape. The byte layout (tab-separated columns, `====` separators)
//! matches the reference tables so output and snapshots stay comparable.

use crate::collector::DescriptorEntry;

/// Separator line framing every table.
pub const SEPARATOR: &str = "\t========================================";

/// One of the four table shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Process id, descriptor number, resolved target, inode.
    Composite,
    /// Process id, descriptor number.
    PerProcess,
    /// Process id, descriptor number, resolved target.
    SystemWide,
    /// Descriptor number, inode.
    Vnode,
}

impl ViewMode {
    /// All modes, in the fixed order rows are emitted for one entry.
    pub const PRIORITY: [ViewMode; 4] = [
        ViewMode::Composite,
        ViewMode::PerProcess,
        ViewMode::SystemWide,
        ViewMode::Vnode,
    ];

    /// Title line for this mode's table.
    pub fn header(&self) -> &'static str {
        match self {
            ViewMode::Composite => "\tPID\tFD\tFilename\t\tInode",
            ViewMode::PerProcess => "\tPID\tFD",
            ViewMode::SystemWide => "\tPID\tFD\tFilename",
            ViewMode::Vnode => "\tFD\tInode",
        }
    }

    /// Formats one table row for a descriptor entry (no trailing newline).
    pub fn render(&self, entry: &DescriptorEntry) -> String {
        match self {
            ViewMode::Composite => format!(
                "\t{}\t{}\t{}\t{}",
                entry.pid, entry.fd, entry.target, entry.inode
            ),
            ViewMode::PerProcess => format!("\t{}\t{}", entry.pid, entry.fd),
            ViewMode::SystemWide => {
                format!("\t{}\t{}\t{}", entry.pid, entry.fd, entry.target)
            }
            ViewMode::Vnode => format!("\t{}\t{}", entry.fd, entry.inode),
        }
    }
}

/// The set of table shapes active for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewSet {
    pub composite: bool,
    pub per_process: bool,
    pub system_wide: bool,
    pub vnode: bool,
}

impl ViewSet {
    /// Returns `true` if no view has been requested.
    pub fn is_empty(&self) -> bool {
        !(self.composite || self.per_process || self.system_wide || self.vnode)
    }

    /// Applies the default-view rule: when nothing is requested, the
    /// composite table is implied. Performed once at configuration time.
    pub fn normalized(self) -> Self {
        if self.is_empty() {
            Self {
                composite: true,
                ..self
            }
        } else {
            self
        }
    }

    /// Whether a mode is active.
    pub fn contains(&self, mode: ViewMode) -> bool {
        match mode {
            ViewMode::Composite => self.composite,
            ViewMode::PerProcess => self.per_process,
            ViewMode::SystemWide => self.system_wide,
            ViewMode::Vnode => self.vnode,
        }
    }

    /// Active modes in row-emission order.
    pub fn iter(&self) -> impl Iterator<Item = ViewMode> + '_ {
        ViewMode::PRIORITY
            .into_iter()
            .filter(move |mode| self.contains(*mode))
    }
}
