//! Snapshot persistence for composite-view rows.
//!
//! A run may register any number of sinks; each one receives every scanned
//! descriptor entry in composite row shape, independent of which display
//! views are active. Two implementations exist: a text sink mirroring the
//! on-screen composite table, and a binary sink of fixed-size records.

mod binary;
mod text;

use crate::collector::DescriptorEntry;
use std::io;

pub use binary::{BinarySink, RECORD_LEN};
pub use text::TextSink;

/// Default file name for the text snapshot.
pub const TEXT_SNAPSHOT_PATH: &str = "compositeTable.txt";

/// Default file name for the binary snapshot.
pub const BINARY_SNAPSHOT_PATH: &str = "compositeTable.bin";

/// A destination for composite-view rows produced by one scan pass.
///
/// Sinks are registered with the engine before the traversal starts and
/// receive entries as soon as they are scanned; nothing is buffered beyond
/// the sink's own writer. `close` must flush; implementations also flush
/// from `Drop` so an abandoned sink cannot silently lose rows.
pub trait DescriptorSink {
    /// Persists one descriptor entry.
    fn write_row(&mut self, entry: &DescriptorEntry) -> io::Result<()>;

    /// Writes any closing framing and flushes the sink.
    fn close(&mut self) -> io::Result<()>;
}
