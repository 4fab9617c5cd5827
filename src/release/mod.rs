//! Release metadata and publishing
//!
//! - **manifest**: version number, channel, changelog and target versions
//! - **publish**: `Publisher` trait and the Modrinth upload client

pub mod manifest;
pub mod publish;

pub use manifest::{ReleaseManifest, compose_manifest, read_changelog};
pub use publish::{ModrinthPublisher, PublishRequest, Publisher};
