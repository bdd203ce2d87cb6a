use crate::error::CoreResult;
use crate::image::model::{EntryType, FileSystemRecord, ManifestEntry};
use crate::params::{ParamSpec, TriggerParams, Validator};
use crate::trigger::{EvalContext, Firings, Trigger};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum VerificationState {
    Changed,
    Missing,
}

impl VerificationState {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationState::Changed => "changed",
            VerificationState::Missing => "missing",
        }
    }
}

/// Verifies installed package files against the package database manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyTrigger {
    pub packages: BTreeSet<String>,
    pub dirs: Vec<String>,
    pub check_only: BTreeSet<String>,
}

impl Trigger for VerifyTrigger {
    const NAME: &'static str = "VERIFY";
    const DESCRIPTION: &'static str = "Checks package integrity against the package database in the image. \
         Fires for changed or missing content in all directories, or only under DIRS when given; \
         CHECK_ONLY limits which verification states are reported.";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec {
            name: "PKGS",
            validator: Validator::DelimitedList,
            description: "Package names to verify; all installed packages when empty",
        },
        ParamSpec {
            name: "DIRS",
            validator: Validator::DelimitedList,
            description: "Path prefixes to verify; all manifest entries when empty",
        },
        ParamSpec {
            name: "CHECK_ONLY",
            validator: Validator::DelimitedList,
            description: "Verification states to report (changed, missing); all when empty",
        },
    ];

    fn from_params(params: &TriggerParams) -> Self {
        Self {
            packages: params.name_set("PKGS"),
            dirs: params.list("DIRS"),
            check_only: params
                .list("CHECK_ONLY")
                .into_iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
        }
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, out: &mut Firings) -> CoreResult<()> {
        let names = (!self.packages.is_empty()).then_some(&self.packages);
        for pkg in ctx.image.packages(names)? {
            for entry in ctx.image.manifest_entries(pkg, &self.dirs)? {
                let record = ctx.image.file_record(&entry.file_path);
                let Some(state) = diff_manifest_entry(entry, record) else {
                    continue;
                };
                if self.check_only.is_empty() || self.check_only.contains(state.as_str()) {
                    out.fire(format!(
                        "package '{}' failed verification against its package db on entry '{}' with status: '{}'",
                        pkg.name,
                        entry.file_path,
                        state.as_str()
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Classifies one manifest entry against the observed filesystem record.
/// `None` means unchanged, or not enough data to tell.
pub fn diff_manifest_entry(
    entry: &ManifestEntry,
    record: Option<&FileSystemRecord>,
) -> Option<VerificationState> {
    let Some(record) = record else {
        return Some(VerificationState::Missing);
    };

    if record.name != entry.file_path {
        tracing::debug!(
            manifest_path = %entry.file_path,
            record_name = %record.name,
            "filesystem record name does not match manifest path; skipping"
        );
        return None;
    }

    if entry.is_config_file {
        return None;
    }

    if let (Some(algorithm), Some(expected)) = (entry.digest_algorithm, entry.digest.as_deref()) {
        if let Some(observed) = record.checksum(algorithm) {
            if !expected.is_empty() && !observed.is_empty() && !observed.eq_ignore_ascii_case(expected)
            {
                return Some(VerificationState::Changed);
            }
        }
    }

    if matches!(record.entry_type, EntryType::File | EntryType::Dir) {
        if let (Some(expected), Some(observed)) = (nonzero(entry.mode), nonzero(record.mode)) {
            if !octal_modes_match(expected, observed) {
                return Some(VerificationState::Changed);
            }
        }
    }

    if record.entry_type == EntryType::File {
        if let (Some(expected), Some(observed)) = (nonzero(entry.size), nonzero(record.size)) {
            if expected != observed {
                return Some(VerificationState::Changed);
            }
        }
    }

    None
}

fn nonzero<T: Default + PartialEq>(v: Option<T>) -> Option<T> {
    v.filter(|x| *x != T::default())
}

/// Compares the trailing octal digits of two modes, using the width of the
/// shorter one. Package databases and filesystem scans disagree on whether
/// file-type bits are included (`755` vs `100755`).
pub fn octal_modes_match(expected: u32, observed: u32) -> bool {
    let e = format!("{:o}", expected);
    let o = format!("{:o}", observed);
    let n = e.len().min(o.len());
    e[e.len() - n..] == o[o.len() - n..]
}
