mod common;

use common::*;
use image_policy_core::error::{CoreError, CoreResult};
use image_policy_core::image::ImageView;
use image_policy_core::trigger::{evaluate_trigger, EvalContext, TriggerOutcome};
use image_policy_core::version::{DistroVersionComparator, VersionComparator};
use std::cmp::Ordering;

fn not_present(
    img: &dyn ImageView,
    comparator: &dyn VersionComparator,
    pairs: &[(&str, &str)],
) -> CoreResult<TriggerOutcome> {
    let ctx = EvalContext {
        image: img,
        comparator,
    };
    evaluate_trigger("PKGCHECK", "PKGNOTPRESENT", &params(pairs), &ctx)
}

fn rpm_image() -> image_policy_core::image::snapshot::ImageSnapshot {
    image(
        vec![
            package("curl", "7.29.0", "35.el7", "rpm"),
            package("zlib", "1.2.7", "17.el7", "rpm"),
            package("bash", "4.2.46", "34.el7", "rpm"),
        ],
        vec![],
    )
}

/// Reports every comparison as a failure.
struct BrokenComparator;

impl VersionComparator for BrokenComparator {
    fn compare(&self, flavor: &str, _: &str, _: &str, _: &str, _: &str) -> CoreResult<Ordering> {
        Err(CoreError::Comparator(format!("no rules for {}", flavor)))
    }
}

#[test]
fn exact_match_at_required_version_passes() {
    let img = rpm_image();
    let out = not_present(
        &img,
        &DistroVersionComparator,
        &[("PKGFULLMATCH", "curl|7.29.0-35.el7")],
    )
    .unwrap();
    assert!(out.violations.is_empty());
}

#[test]
fn exact_match_at_other_version_names_both_versions() {
    let img = rpm_image();
    let out = not_present(
        &img,
        &DistroVersionComparator,
        &[("PKGFULLMATCH", "curl|7.29.0-59.el7")],
    )
    .unwrap();
    assert_eq!(out.violations.len(), 1);
    let msg = &out.violations[0].message;
    assert!(msg.contains("curl"));
    assert!(msg.contains("7.29.0-35.el7"));
    assert!(msg.contains("7.29.0-59.el7"));
    assert_eq!(out.violations[0].trigger, "PKGNOTPRESENT");
}

#[test]
fn exact_match_for_absent_package_fires_not_present() {
    let img = image(vec![package("bash", "4.2.46", "34.el7", "rpm")], vec![]);
    let out = not_present(
        &img,
        &DistroVersionComparator,
        &[("PKGFULLMATCH", "curl|7.29.0-35.el7")],
    )
    .unwrap();
    assert_eq!(out.violations.len(), 1);
    assert_eq!(
        out.violations[0].message,
        "required package curl (7.29.0-35.el7) is not present in the image"
    );
}

#[test]
fn minimum_version_below_requirement_fires() {
    let img = image(vec![package("zlib", "1.2.3", "", "rpm")], vec![]);
    let out = not_present(
        &img,
        &DistroVersionComparator,
        &[("PKGVERSMATCH", "zlib|1.2.8")],
    )
    .unwrap();
    assert_eq!(out.violations.len(), 1);
    let msg = &out.violations[0].message;
    assert!(msg.contains("1.2.3"));
    assert!(msg.contains("1.2.8"));
    assert!(msg.contains("below"));
}

#[test]
fn minimum_version_met_or_exceeded_passes() {
    let comparator = DistroVersionComparator;
    let newer = image(vec![package("zlib", "1.2.9", "", "rpm")], vec![]);
    assert!(not_present(&newer, &comparator, &[("PKGVERSMATCH", "zlib|1.2.8")])
        .unwrap()
        .violations
        .is_empty());

    let equal = image(vec![package("zlib", "1.2.8", "", "rpm")], vec![]);
    assert!(not_present(&equal, &comparator, &[("PKGVERSMATCH", "zlib|1.2.8")])
        .unwrap()
        .violations
        .is_empty());
}

#[test]
fn minimum_version_uses_package_flavor() {
    let img = image(vec![package("zlib", "1.2.11", "r3", "alpine")], vec![]);
    let out = not_present(
        &img,
        &DistroVersionComparator,
        &[("PKGVERSMATCH", "zlib|1.2.12-r0")],
    )
    .unwrap();
    assert_eq!(out.violations.len(), 1);
}

fn below_minimum(pkg: image_policy_core::image::model::Package, minimum: &str) -> bool {
    let name = pkg.name.clone();
    let img = image(vec![pkg], vec![]);
    let out = not_present(
        &img,
        &DistroVersionComparator,
        &[("PKGVERSMATCH", format!("{}|{}", name, minimum).as_str())],
    )
    .unwrap();
    assert!(out.notes.is_empty(), "unexpected notes {:?}", out.notes);
    !out.violations.is_empty()
}

#[test]
fn minimum_version_compares_apk_revisions() {
    assert!(!below_minimum(package("zlib", "1.2.11", "r5", "alpine"), "1.2.11-r3"));
    assert!(!below_minimum(package("zlib", "1.2.11", "r3", "alpine"), "1.2.11-r3"));
    assert!(below_minimum(package("zlib", "1.2.11", "r2", "alpine"), "1.2.11-r3"));
}

#[test]
fn minimum_version_compares_deb_revisions() {
    assert!(!below_minimum(
        package("zlib1g", "1.2.11.dfsg", "2ubuntu10", "ubuntu"),
        "1.2.11.dfsg-2ubuntu9"
    ));
    assert!(below_minimum(
        package("zlib1g", "1.2.11.dfsg", "2ubuntu8", "ubuntu"),
        "1.2.11.dfsg-2ubuntu9"
    ));
}

#[test]
fn minimum_version_compares_rpm_releases() {
    assert!(below_minimum(package("zlib", "1.2.7", "17.el7", "rpm"), "1.2.7-18.el7"));
    assert!(!below_minimum(package("zlib", "1.2.7", "19.el7", "rpm"), "1.2.7-18.el7"));
    // A minimum without a release accepts any release of that version.
    assert!(!below_minimum(package("zlib", "1.2.7", "17.el7", "rpm"), "1.2.7"));
}

#[test]
fn minimum_version_accepts_apk_vcs_snapshots() {
    assert!(below_minimum(
        package("musl-utils", "0.0_git20200101", "r0", "alpine"),
        "0.0_git20230101-r0"
    ));
    assert!(!below_minimum(
        package("musl-utils", "0.0_git20230101", "r1", "alpine"),
        "0.0_git20230101-r0"
    ));
}

#[test]
fn comparator_error_skips_only_that_comparison() {
    let img = rpm_image();
    let out = not_present(
        &img,
        &BrokenComparator,
        &[
            ("PKGVERSMATCH", "zlib|1.2.8"),
            ("PKGNAMEMATCH", "openssl"),
        ],
    )
    .unwrap();
    assert_eq!(out.violations.len(), 1);
    assert_eq!(
        out.violations[0].message,
        "required package openssl is not present in the image"
    );
    assert_eq!(out.notes.len(), 1);
    assert!(out.notes[0].contains("no rules for rpm"));
}

#[test]
fn name_match_is_satisfied_by_any_version() {
    let img = rpm_image();
    let out = not_present(
        &img,
        &DistroVersionComparator,
        &[("PKGNAMEMATCH", "bash, curl ,nginx")],
    )
    .unwrap();
    assert_eq!(out.violations.len(), 1);
    assert!(out.violations[0].message.contains("nginx"));
}

#[test]
fn remaining_requirements_fire_in_kind_then_name_order() {
    let img = image(vec![], vec![]);
    let out = not_present(
        &img,
        &DistroVersionComparator,
        &[
            ("PKGNAMEMATCH", "wget"),
            ("PKGVERSMATCH", "zlib|1.2.8"),
            ("PKGFULLMATCH", "openssl|1.0.2k-19.el7,curl|7.29.0-35.el7"),
        ],
    )
    .unwrap();
    let messages: Vec<&str> = out.violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "required package curl (7.29.0-35.el7) is not present in the image",
            "required package openssl (1.0.2k-19.el7) is not present in the image",
            "required package zlib (1.2.8) is not present in the image",
            "required package wget is not present in the image",
        ]
    );
}

#[test]
fn only_first_installed_version_of_a_name_is_checked() {
    let img = image(
        vec![
            package("kernel", "3.10.0", "1160.el7", "rpm"),
            package("kernel", "3.10.0", "957.el7", "rpm"),
        ],
        vec![],
    );
    let out = not_present(
        &img,
        &DistroVersionComparator,
        &[("PKGFULLMATCH", "kernel|3.10.0-1160.el7")],
    )
    .unwrap();
    assert!(out.violations.is_empty());
}

#[test]
fn no_requirements_means_no_query() {
    let img = CountingImage::new(rpm_image());
    let out = not_present(&img, &DistroVersionComparator, &[("IGNORED", "x")]).unwrap();
    assert!(out.violations.is_empty());
    assert_eq!(img.package_queries.get(), 0);
}

#[test]
fn malformed_parameter_fails_the_evaluation() {
    let img = CountingImage::new(rpm_image());
    let err = not_present(
        &img,
        &DistroVersionComparator,
        &[("PKGFULLMATCH", "curl-7.29.0")],
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::ParameterFormat { ref param, .. } if param == "PKGFULLMATCH"));
    assert_eq!(img.package_queries.get(), 0);
}

#[test]
fn repeated_evaluation_is_identical() {
    let img = rpm_image();
    let pairs = [
        ("PKGFULLMATCH", "curl|1.0,openssl|1.0.2k"),
        ("PKGVERSMATCH", "zlib|1.2.8"),
        ("PKGNAMEMATCH", "wget,bash"),
    ];
    let first = not_present(&img, &DistroVersionComparator, &pairs).unwrap();
    let second = not_present(&img, &DistroVersionComparator, &pairs).unwrap();
    assert_eq!(first.violations.len(), 4);
    assert_eq!(first, second);
}
