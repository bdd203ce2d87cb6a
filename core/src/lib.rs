//! Evaluation engine for image policy gates.
//!
//! A [`gate::Gate`] groups trigger kinds; each trigger validates its raw
//! parameters once and then evaluates read-only against an
//! [`image::ImageView`], firing [`trigger::Violation`]s.

pub mod eval;
pub mod gate;
pub mod image;
pub mod params;
pub mod pkgcheck;
pub mod report;
pub mod trigger;
pub mod version;

pub mod error;
