//! fdtab - open file descriptor tables for the current user.
//!
//! This library provides the scan-and-format engine behind the `fdtab`
//! binary: enumerating processes owned by the invoking user from `/proc`,
//! resolving each open descriptor to its link target and inode, and
//! rendering the result as composite / per-process / system-wide / vnode
//! tables from a single scan pass, with optional threshold reporting and
//! snapshot persistence.

pub mod collector;
pub mod engine;
pub mod output;
pub mod view;
