//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` descriptor-table states for
//! exercising the enumerator, the scanner and the engine.

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a typical user session as seen by uid 1000.
    ///
    /// Includes: init (PID 1, root, not visible to the user), a bash shell
    /// with the three standard descriptors, and a small daemon holding a
    /// socket and a regular file.
    pub fn user_session() -> Self {
        let mut fs = Self::new();
        fs.set_current_uid(1000);

        // Root-owned init, must be filtered out.
        fs.add_process(1, 0);
        fs.add_fd(1, 0, "/dev/null", 4);

        // Interactive shell.
        fs.add_process(1000, 1000);
        fs.add_fd(1000, 0, "/dev/pts/0", 11);
        fs.add_fd(1000, 1, "/dev/pts/0", 11);
        fs.add_fd(1000, 2, "/dev/pts/0", 11);

        // Daemon with a socket and an open file.
        fs.add_process(1001, 1000);
        fs.add_fd(1001, 3, "socket:[123]", 55);
        fs.add_fd(1001, 4, "/tmp/a.txt", 9);

        fs
    }

    /// Creates a single user-owned process with no open descriptors.
    pub fn idle_process() -> Self {
        let mut fs = Self::new();
        fs.set_current_uid(1000);
        fs.add_process(77, 1000);
        fs
    }

    /// Creates the two-descriptor target process used by the rendering
    /// tests: fd 3 -> `socket:[123]` (inode 55), fd 4 -> `/tmp/a.txt`
    /// (inode 9).
    pub fn scan_target(pid: u32) -> Self {
        let mut fs = Self::new();
        fs.set_current_uid(1000);
        fs.add_process(pid, 1000);
        fs.add_fd(pid, 3, "socket:[123]", 55);
        fs.add_fd(pid, 4, "/tmp/a.txt", 9);
        fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::FileSystem;
    use std::path::Path;

    #[test]
    fn test_user_session_layout() {
        let fs = MockFs::user_session();

        assert!(fs.exists(Path::new("/proc/1/status")));
        assert!(fs.exists(Path::new("/proc/1000/fd/0")));
        assert!(fs.exists(Path::new("/proc/1001/fd/4")));

        let entries = fs.read_dir(Path::new("/proc/1001/fd")).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_idle_process_has_empty_fd_dir() {
        let fs = MockFs::idle_process();
        let entries = fs.read_dir(Path::new("/proc/77/fd")).unwrap();
        assert!(entries.is_empty());
    }
}
