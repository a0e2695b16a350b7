//! Domain logic - pure release rules independent of git and process execution

pub mod branch;
pub mod commit;
pub mod impact;
pub mod tag;
pub mod version;

pub use branch::BranchContext;
pub use commit::{ClassifiedCommit, CommitRecord};
pub use impact::ReleaseImpact;
pub use tag::{ReleaseTag, TagPattern, TagScan};
pub use version::{
    is_stable, parse_version, requires_migration, resolve_last_version, LastRelease, Version,
};
