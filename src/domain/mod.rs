//! Domain logic - pure release rules independent of git operations

pub mod plan;
pub mod version;

pub use plan::{ReleasePlan, RevisionRange};
pub use version::{MinorLine, ReleaseVersion};
