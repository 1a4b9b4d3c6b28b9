//! # reclaim
//!
//! Safety-governed disk space reclamation.
//!
//! reclaim finds reclaimable files (temp files, caches, crash reports,
//! trash contents) and removes the ones you select. It features:
//!
//! - **Allow-list scanning**: discoverers may only emit candidates under roots they registered
//! - **Protected paths**: system and user-document locations are never touched
//! - **Age guards**: retention windows, a recent-file guard and an installer guard for temp files
//! - **Re-validation**: every item is checked against the live filesystem right before removal
//! - **Bounded concurrency**: batch removal where supported, otherwise 2 to 6 workers
//! - **Cooperative cancellation**: partial results survive Ctrl-C

pub mod cleaner;
pub mod cli;
pub mod common;
pub mod model;
pub mod safety;
pub mod scanner;
