//! Domain logic - release data and version rules independent of git or cargo

pub mod context;
pub mod gate;
pub mod publish;
pub mod tag;
pub mod version;

pub use context::ReleaseContext;
pub use gate::{default_gates, Gate, GateResult};
pub use publish::{PublishAttempt, PublishPhase};
pub use tag::{tag_name, TagRecovery, TagStage};
pub use version::{BumpType, RequestedBump, VersionBump};
