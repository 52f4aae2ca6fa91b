//! Descriptor-table collection from the Linux `/proc` filesystem.
//!
//! This module provides the infrastructure for enumerating processes owned
//! by the invoking user and resolving their open descriptors, with support
//! for mocking so the scan logic can be tested without Linux access.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         Engine                             │
//! │  ┌─────────────────────┐   ┌────────────────────────────┐  │
//! │  │  ProcessEnumerator  │   │        FdScanner           │  │
//! │  │  - /proc/[pid]      │   │  - /proc/[pid]/fd/[fd]     │  │
//! │  │  - status Uid match │   │  - readlink + inode        │  │
//! │  └──────────┬──────────┘   └──────────────┬─────────────┘  │
//! │             └──────────────┬──────────────┘                │
//! │                     ┌──────▼──────┐                        │
//! │                     │  FileSystem │ (trait)                │
//! │                     └──────┬──────┘                        │
//! └────────────────────────────┼───────────────────────────────┘
//!              ┌───────────────┼───────────────┐
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::{DescriptorEntry, FdScanner, LinkTarget, ProcessEnumerator};
pub use traits::{FileSystem, RealFs};
