//! Binary snapshot sink: fixed-size composite-row records.

use crate::collector::DescriptorEntry;
use crate::view::{SEPARATOR, ViewMode};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Size of every record in the binary snapshot.
///
/// The reference format reserves a constant-size row buffer and writes
/// that many bytes per row regardless of content length, so readers can
/// seek by record index. Records are never length-prefixed or delimited.
pub const RECORD_LEN: usize = 256;

/// Writes composite-view rows as zero-padded fixed-size records.
///
/// The title and separator framing are written through the same
/// fixed-size convention: one record each at open, one separator record
/// at close.
pub struct BinarySink<W: Write> {
    writer: BufWriter<W>,
    closed: bool,
}

impl BinarySink<File> {
    /// Creates (or truncates) the snapshot file and writes the opening
    /// frame records.
    pub fn create(path: &Path) -> io::Result<Self> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> BinarySink<W> {
    /// Wraps a writer and emits the opening frame records.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut writer = BufWriter::new(writer);
        writer.write_all(&record(ViewMode::Composite.header()))?;
        writer.write_all(&record(SEPARATOR))?;
        Ok(Self {
            writer,
            closed: false,
        })
    }
}

/// Packs one line into a zero-padded `RECORD_LEN`-byte record.
///
/// Content longer than the record is truncated; with a 50-byte bounded
/// link target a composite row can never reach that length.
fn record(line: &str) -> [u8; RECORD_LEN] {
    let mut buf = [0u8; RECORD_LEN];
    let bytes = line.as_bytes();
    let text_len = bytes.len().min(RECORD_LEN - 1);
    buf[..text_len].copy_from_slice(&bytes[..text_len]);
    buf[text_len] = b'\n';
    buf
}

impl<W: Write> super::DescriptorSink for BinarySink<W> {
    fn write_row(&mut self, entry: &DescriptorEntry) -> io::Result<()> {
        self.writer
            .write_all(&record(&ViewMode::Composite.render(entry)))
    }

    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.writer.write_all(&record(SEPARATOR))?;
        self.writer.flush()
    }
}

impl<W: Write> Drop for BinarySink<W> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.writer.write_all(&record(SEPARATOR));
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
        let path = dir.path().join("compositeTable.bin");
        let mut sink = BinarySink::create(&path).unwrap();
        for e in entries {
            sink.write_row(e).unwrap();
        }
        sink.close().unwrap();
        std::fs::read(&path).unwrap()
    }

    #[test]
    fn test_binary_sink_fixed_record_count() {
        let content = snapshot_bytes(&[
            entry(1234, 3, "socket:[123]", 55),
            entry(1234, 4, "/tmp/a.txt", 9),
        ]);
        // Title + opening separator + 2 rows + closing separator.
        assert_eq!(content.len(), 5 * RECORD_LEN);
    }

    #[test]
    fn test_binary_record_layout() {
        let content = snapshot_bytes(&[entry(1234, 3, "socket:[123]", 55)]);

        let row = &content[2 * RECORD_LEN..3 * RECORD_LEN];
        let text = "\t1234\t3\tsocket:[123]\t55\n";
        assert_eq!(&row[..text.len()], text.as_bytes());
        // Zero padding fills the remainder of the record.
        assert!(row[text.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_binary_frame_records() {
        let content = snapshot_bytes(&[]);
        assert_eq!(content.len(), 3 * RECORD_LEN);

        let title = "\tPID\tFD\tFilename\t\tInode\n";
        assert_eq!(&content[..title.len()], title.as_bytes());

        let sep = &content[RECORD_LEN..2 * RECORD_LEN];
        assert_eq!(&sep[..SEPARATOR.len()], SEPARATOR.as_bytes());
        assert_eq!(sep, &content[2 * RECORD_LEN..3 * RECORD_LEN]);
    }

    #[test]
    fn test_record_truncates_overlong_line() {
        let long = "x".repeat(RECORD_LEN * 2);
        let buf = record(&long);
        assert_eq!(buf.len(), RECORD_LEN);
        assert_eq!(buf[RECORD_LEN - 1], b'\n');
    }
}
