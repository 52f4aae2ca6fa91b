//! Text snapshot sink: the composite table, mirrored to a file.

use crate::collector::DescriptorEntry;
use crate::view::{SEPARATOR, ViewMode};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes composite-view rows as tab-separated text, framed by the same
/// title and separator lines as the on-screen table.
///
/// The title and opening separator are written when the sink is opened;
/// the closing separator when it is closed. If the sink is dropped
/// without an explicit `close`, the closing frame and flush still happen
/// on a best-effort basis.
pub struct TextSink<W: Write> {
    writer: BufWriter<W>,
    closed: bool,
}

impl TextSink<File> {
    /// Creates (or truncates) the snapshot file and writes the opening
    /// frame.
    pub fn create(path: &Path) -> io::Result<Self> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> TextSink<W> {
    /// Wraps a writer and emits the opening frame.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut writer = BufWriter::new(writer);
        writeln!(writer, "{}", ViewMode::Composite.header())?;
        writeln!(writer, "{}", SEPARATOR)?;
        Ok(Self {
            writer,
            closed: false,
        })
    }
}

impl<W: Write> super::DescriptorSink for TextSink<W> {
    fn write_row(&mut self, entry: &DescriptorEntry) -> io::Result<()> {
        writeln!(self.writer, "{}", ViewMode::Composite.render(entry))
    }

    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        writeln!(self.writer, "{}", SEPARATOR)?;
        self.writer.flush()
    }
}

impl<W: Write> Drop for TextSink<W> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = writeln!(self.writer, "{}", SEPARATOR);
            let _ = self.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::LinkTarget;
    use crate::output::DescriptorSink;

    fn entry(pid: u32, fd: u32, target: &str, inode: u64) -> DescriptorEntry {
        DescriptorEntry {
            pid,
            fd,
            target: LinkTarget::new(target),
            inode,
        }
    }

    fn snapshot_bytes(entries: &[DescriptorEntry]) -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compositeTable.txt");
        let mut sink = TextSink::create(&path).unwrap();
        for e in entries {
            sink.write_row(e).unwrap();
        }
        sink.close().unwrap();
        std::fs::read(&path).unwrap()
    }

    #[test]
    fn test_text_sink_framing_and_rows() {
        let content = snapshot_bytes(&[
            entry(1234, 3, "socket:[123]", 55),
            entry(1234, 4, "/tmp/a.txt", 9),
        ]);
        let expected = "\tPID\tFD\tFilename\t\tInode\n\
                        \t========================================\n\
                        \t1234\t3\tsocket:[123]\t55\n\
                        \t1234\t4\t/tmp/a.txt\t9\n\
                        \t========================================\n";
        assert_eq!(String::from_utf8(content).unwrap(), expected);
    }

    #[test]
    fn test_text_sink_idempotent_structure() {
        let entries = [entry(10, 0, "/dev/pts/0", 11)];
        assert_eq!(snapshot_bytes(&entries), snapshot_bytes(&entries));
    }

    #[test]
    fn test_text_sink_empty_scan_keeps_framing() {
        let content = snapshot_bytes(&[]);
        let expected = "\tPID\tFD\tFilename\t\tInode\n\
                        \t========================================\n\
                        \t========================================\n";
        assert_eq!(String::from_utf8(content).unwrap(), expected);
    }

    #[test]
    fn test_text_sink_drop_writes_closing_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compositeTable.txt");
        {
            let mut sink = TextSink::create(&path).unwrap();
            sink.write_row(&entry(1, 2, "/tmp/x", 7)).unwrap();
            // No close: the drop path must still finish the table.
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("\t========================================\n"));
        assert!(content.contains("\t1\t2\t/tmp/x\t7\n"));
    }

    #[test]
    fn test_text_sink_close_twice_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compositeTable.txt");
        let mut sink = TextSink::create(&path).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().filter(|line| *line == SEPARATOR).count(), 2);
    }
}
