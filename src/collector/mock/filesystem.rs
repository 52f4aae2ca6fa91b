//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! including symbolic links and inode numbers, so descriptor scans can run
//! in CI without Linux access.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files, directories, symlinks and inode numbers in memory,
/// allowing tests to simulate various `/proc` filesystem states.
///
/// Unlike a real directory, `read_dir` returns entries in sorted order so
/// tests can assert on exact output.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Map from path to symlink target.
    links: HashMap<PathBuf, PathBuf>,
    /// Map from path to inode number of the resource it refers to.
    inodes: HashMap<PathBuf, u64>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a symbolic link with the given target and resource inode.
    pub fn add_link(&mut self, path: impl AsRef<Path>, target: impl AsRef<Path>, inode: u64) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.links.insert(path.clone(), target.as_ref().to_path_buf());
        self.inodes.insert(path, inode);
    }

    /// Adds a process owned by `uid` with a `status` record and an empty
    /// `fd` directory under `/proc/[pid]/`.
    pub fn add_process(&mut self, pid: u32, uid: u32) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_file(
            base.join("status"),
            format!(
                "Name:\tmock\nPid:\t{pid}\nPPid:\t1\nUid:\t{uid}\t{uid}\t{uid}\t{uid}\nGid:\t{uid}\t{uid}\t{uid}\t{uid}\n"
            ),
        );
        self.add_dir(base.join("fd"));
    }

    /// Adds an open descriptor to a previously added process.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `fd` - Descriptor number
    /// * `target` - Symlink target (e.g. `/tmp/a.txt` or `socket:[123]`)
    /// * `inode` - Inode number of the underlying resource
    pub fn add_fd(&mut self, pid: u32, fd: u32, target: &str, inode: u64) {
        let path = PathBuf::from(format!("/proc/{}/fd/{}", pid, fd));
        self.add_link(path, target, inode);
    }

    /// Sets the uid reported by `/proc/self/status`.
    pub fn set_current_uid(&mut self, uid: u32) {
        self.add_file(
            "/proc/self/status",
            format!("Name:\tfdtab\nUid:\t{uid}\t{uid}\t{uid}\t{uid}\n"),
        );
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.directories.contains(path)
            || self.links.contains_key(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for link_path in self.links.keys() {
            if link_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(link_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        // Deterministic order for tests; fd entries sort numerically when
        // the names have equal length, which is all the tests rely on.
        let mut entries: Vec<PathBuf> = entries.into_iter().collect();
        entries.sort();
        Ok(entries)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.links.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a symlink: {:?}", path),
            )
        })
    }

    fn inode(&self, path: &Path) -> io::Result<u64> {
        self.inodes.get(path).copied().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no inode recorded for: {:?}", path),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/1234/status", "Uid:\t1000\t1000\t1000\t1000\n");

        assert!(fs.exists(Path::new("/proc/1234/status")));
        assert!(fs.exists(Path::new("/proc/1234")));
        assert!(fs.exists(Path::new("/proc")));

        let content = fs.read_to_string(Path::new("/proc/1234/status")).unwrap();
        assert!(content.contains("Uid:"));
    }

    #[test]
    fn test_mock_fs_read_dir_includes_links() {
        let mut fs = MockFs::new();
        fs.add_process(10, 1000);
        fs.add_fd(10, 0, "/dev/pts/0", 5);
        fs.add_fd(10, 1, "/dev/pts/0", 5);

        let entries = fs.read_dir(Path::new("/proc/10/fd")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], PathBuf::from("/proc/10/fd/0"));
        assert_eq!(entries[1], PathBuf::from("/proc/10/fd/1"));
    }

    #[test]
    fn test_mock_fs_read_link_and_inode() {
        let mut fs = MockFs::new();
        fs.add_fd(10, 3, "socket:[123]", 55);

        let path = Path::new("/proc/10/fd/3");
        assert_eq!(fs.read_link(path).unwrap(), PathBuf::from("socket:[123]"));
        assert_eq!(fs.inode(path).unwrap(), 55);
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let result = fs.read_to_string(Path::new("/nonexistent"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);

        assert!(fs.read_link(Path::new("/nonexistent")).is_err());
        assert!(fs.inode(Path::new("/nonexistent")).is_err());
    }
}
