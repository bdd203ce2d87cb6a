//! Distro-aware package version ordering.

pub mod apk;
pub mod deb;
pub mod rpm;

use crate::error::{CoreError, CoreResult};
use std::cmp::Ordering;

pub trait VersionComparator: Send + Sync {
    /// Orders `version_a` of `name_a` against `version_b` of `name_b` using the
    /// rules of `flavor`.
    fn compare(
        &self,
        flavor: &str,
        name_a: &str,
        version_a: &str,
        name_b: &str,
        version_b: &str,
    ) -> CoreResult<Ordering>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistroFlavor {
    RPM,
    DEB,
    APK,
}

impl DistroFlavor {
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rpm" | "rhel" | "centos" | "fedora" | "amzn" => Ok(DistroFlavor::RPM),
            "deb" | "dpkg" | "debian" | "ubuntu" => Ok(DistroFlavor::DEB),
            "apk" | "alpine" => Ok(DistroFlavor::APK),
            other => Err(CoreError::Comparator(format!(
                "unsupported distro flavor {:?}",
                other
            ))),
        }
    }
}

/// Default comparator covering rpm, dpkg and apk version schemes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistroVersionComparator;

impl VersionComparator for DistroVersionComparator {
    fn compare(
        &self,
        flavor: &str,
        name_a: &str,
        version_a: &str,
        name_b: &str,
        version_b: &str,
    ) -> CoreResult<Ordering> {
        if name_a != name_b {
            return Err(CoreError::Comparator(format!(
                "cannot order versions of different packages {} and {}",
                name_a, name_b
            )));
        }
        match DistroFlavor::parse(flavor)? {
            DistroFlavor::RPM => rpm::compare_evr(version_a, version_b),
            DistroFlavor::DEB => deb::compare_versions(version_a, version_b),
            DistroFlavor::APK => apk::compare_versions(version_a, version_b),
        }
    }
}
