#![allow(dead_code)]

use image_policy_core::error::CoreResult;
use image_policy_core::image::model::{
    DigestAlgorithm, EntryType, FileSystemRecord, ManifestEntry, Package,
};
use image_policy_core::image::snapshot::ImageSnapshot;
use image_policy_core::image::ImageView;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

pub const BASH_SHA256: &str = "0b4f2a6e2f2d6d1c9e6b0e1b9e5a63e8f1a3c7d2b4e6f8a0c2e4a6b8d0f2a4c6";
pub const OTHER_SHA256: &str = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

pub fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn manifest_file(path: &str, sha256: &str, mode: u32, size: u64) -> ManifestEntry {
    ManifestEntry {
        file_path: path.to_string(),
        digest_algorithm: Some(DigestAlgorithm::Sha256),
        digest: Some(sha256.to_string()),
        mode: Some(mode),
        size: Some(size),
        is_config_file: false,
    }
}

pub fn fs_file(path: &str, sha256: &str, mode: u32, size: u64) -> FileSystemRecord {
    FileSystemRecord {
        name: path.to_string(),
        entry_type: EntryType::File,
        sha256_checksum: Some(sha256.to_string()),
        md5_checksum: None,
        sha1_checksum: None,
        mode: Some(mode),
        size: Some(size),
    }
}

pub fn package(name: &str, version: &str, release: &str, flavor: &str) -> Package {
    Package {
        name: name.to_string(),
        version: version.to_string(),
        fullversion: if release.is_empty() {
            version.to_string()
        } else {
            format!("{}-{}", version, release)
        },
        distro_flavor: flavor.to_string(),
        manifest: Vec::new(),
    }
}

pub fn image(packages: Vec<Package>, files: Vec<FileSystemRecord>) -> ImageSnapshot {
    ImageSnapshot {
        image_id: "sha256:feedface".to_string(),
        packages,
        files: files.into_iter().map(|f| (f.name.clone(), f)).collect(),
    }
}

/// Wraps a snapshot and counts package queries.
pub struct CountingImage {
    pub inner: ImageSnapshot,
    pub package_queries: Cell<usize>,
}

impl CountingImage {
    pub fn new(inner: ImageSnapshot) -> Self {
        Self {
            inner,
            package_queries: Cell::new(0),
        }
    }
}

impl ImageView for CountingImage {
    fn image_id(&self) -> &str {
        self.inner.image_id()
    }

    fn packages(&self, names: Option<&BTreeSet<String>>) -> CoreResult<Vec<&Package>> {
        self.package_queries.set(self.package_queries.get() + 1);
        self.inner.packages(names)
    }

    fn file_record(&self, path: &str) -> Option<&FileSystemRecord> {
        self.inner.file_record(path)
    }
}
