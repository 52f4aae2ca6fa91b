//! Process enumeration from `/proc`, filtered to the invoking user.

use crate::collector::traits::FileSystem;
use std::io;
use std::path::Path;
use tracing::warn;

/// Enumerates process ids visible under `/proc` and filters them to the
/// ones owned by a given uid.
pub struct ProcessEnumerator<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> ProcessEnumerator<F> {
    /// Creates a new process enumerator.
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

    /// Returns the real uid of the calling process.
    ///
    /// Read from `{proc}/self/status` rather than a syscall so it works
    /// against a mock filesystem.
    pub fn current_uid(&self) -> io::Result<u32> {
        let path = format!("{}/self/status", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        parse_status_uid(&content).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "no Uid line in status record")
        })
    }

    /// Lists process ids owned by `uid`, in directory-enumeration order.
    ///
    /// A process whose status record cannot be read (it may have exited
    /// between enumeration and the read) is reported on stderr and
    /// skipped; the traversal continues.
    pub fn owned_processes(&self, uid: u32) -> io::Result<Vec<u32>> {
        let entries = self.fs.read_dir(Path::new(&self.proc_path))?;

        let mut pids = Vec::new();
        for entry in entries {
            if let Some(name) = entry.file_name().and_then(|n| n.to_str())
                && let Ok(pid) = name.parse::<u32>()
                && self.process_uid(pid) == Some(uid)
            {
                pids.push(pid);
            }
        }
        Ok(pids)
    }

    /// Returns the real uid owning a process, or `None` if its status
    /// record is unreadable or malformed.
    fn process_uid(&self, pid: u32) -> Option<u32> {
        let path = format!("{}/{}/status", self.proc_path, pid);
        match self.fs.read_to_string(Path::new(&path)) {
            Ok(content) => parse_status_uid(&content),
            Err(e) => {
                warn!("cannot read status for pid {}: {}; skipping", pid, e);
                None
            }
        }
    }
}

/// Extracts the real uid from the `Uid:` line of a `/proc/[pid]/status`
/// record (format: `Uid:\t1000\t1000\t1000\t1000`).
fn parse_status_uid(content: &str) -> Option<u32> {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("Uid:") {
            return rest.split_whitespace().next()?.parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_parse_status_uid() {
        let content = "Name:\tbash\nPid:\t1234\nUid:\t1000\t1000\t1000\t1000\nGid:\t1000\t1000\t1000\t1000\n";
        assert_eq!(parse_status_uid(content), Some(1000));
    }

    #[test]
    fn test_parse_status_uid_missing() {
        assert_eq!(parse_status_uid("Name:\tbash\n"), None);
        assert_eq!(parse_status_uid(""), None);
        assert_eq!(parse_status_uid("Uid:\n"), None);
    }

    #[test]
    fn test_current_uid() {
        let fs = MockFs::user_session();
        let enumerator = ProcessEnumerator::new(fs, "/proc");
        assert_eq!(enumerator.current_uid().unwrap(), 1000);
    }

    #[test]
    fn test_owned_processes_filters_by_uid() {
        let fs = MockFs::user_session();
        let enumerator = ProcessEnumerator::new(fs, "/proc");

        let pids = enumerator.owned_processes(1000).unwrap();
        // PID 1 is root-owned and must not appear.
        assert_eq!(pids, vec![1000, 1001]);
    }

    #[test]
    fn test_owned_processes_skips_non_numeric_entries() {
        let mut fs = MockFs::user_session();
        fs.add_file("/proc/uptime", "12345.67 98765.43\n");
        fs.add_dir("/proc/sys");

        let enumerator = ProcessEnumerator::new(fs, "/proc");
        let pids = enumerator.owned_processes(1000).unwrap();
        assert_eq!(pids, vec![1000, 1001]);
    }

    #[test]
    fn test_owned_processes_skips_unreadable_status() {
        let mut fs = MockFs::user_session();
        // A pid directory without a status record: the process exited
        // between enumeration and the status read.
        fs.add_dir("/proc/500");

        let enumerator = ProcessEnumerator::new(fs, "/proc");
        let pids = enumerator.owned_processes(1000).unwrap();
        assert_eq!(pids, vec![1000, 1001]);
    }

    #[test]
    fn test_owned_processes_missing_proc() {
        let fs = MockFs::new();
        let enumerator = ProcessEnumerator::new(fs, "/proc");
        assert!(enumerator.owned_processes(1000).is_err());
    }
}
