//! Readers for the `/proc` pseudo-filesystem.

mod enumerate;
mod fd;

pub use enumerate::ProcessEnumerator;
pub use fd::{DescriptorEntry, FdScanner, LinkTarget};
