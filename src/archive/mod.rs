//! Release jar assembly
//!
//! - **normalize**: canonical JSON re-serialization
//! - **assemble**: duplicate-free, reproducible merge of intermediate jars

pub mod assemble;
pub mod normalize;

pub use assemble::{ArchiveAssembler, AssemblyReport, AssemblyRules};
