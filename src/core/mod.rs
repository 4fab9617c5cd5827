//! Core building blocks shared by every command
//!
//! - **config**: property sources, `ModuleConfig`, `Platform`, override flags
//! - **context**: per-invocation module context (config + paths), built once
//! - **error**: error families with help messages and exit codes
//! - **vcs**: source-control queries (system git)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
