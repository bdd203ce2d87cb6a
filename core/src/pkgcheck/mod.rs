//! The `PKGCHECK` gate's triggers.

pub mod not_present;
pub mod verify;

pub use not_present::PkgNotPresentTrigger;
pub use verify::{diff_manifest_entry, VerificationState, VerifyTrigger};
