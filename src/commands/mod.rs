//! CLI commands for modrelease
//!
//! - **assemble**: merge intermediate jars into the release jar
//! - **check**: run the release gate and report each check
//! - **manifest**: compose the release manifest for HEAD
//! - **release**: gate, assemble, compose and publish, in that order
//!
//! All commands accept `&ModuleContext` so configuration is loaded once.

pub mod assemble;
pub mod check;
pub mod manifest;
pub mod release;

pub use assemble::run_assemble;
pub use check::run_check;
pub use manifest::run_manifest;
pub use release::run_release;
