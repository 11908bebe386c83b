//! makeinclude - flat include directory synchronization
//!
//! Collects header files spread over several source directories into a single
//! include directory made of symbolic links, so a build system only needs one
//! include path. Links are relative, so the tree can be moved as a whole.

pub mod config;
pub mod discover;
pub mod error;
pub mod init;
pub mod linker;
pub mod pattern;
pub mod status;

pub use config::{ConflictPolicy, SyncConfig};
pub use error::SyncError;
pub use linker::{CleanupReport, Linker, RemovalOutcome, SyncOptions, SyncReport};
