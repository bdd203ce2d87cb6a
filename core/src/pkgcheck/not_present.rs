use crate::error::CoreResult;
use crate::image::model::Package;
use crate::params::{ParamSpec, TriggerParams, Validator};
use crate::trigger::{EvalContext, Firings, Trigger};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Requires packages to be installed, optionally at an exact or minimum version.
///
/// Known limitation: only one installed version per package name is modelled.
/// The first installed package with a required name settles every constraint
/// on that name, so further installed versions of it are neither checked nor
/// reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PkgNotPresentTrigger {
    pub full_match: BTreeMap<String, String>,
    pub name_match: BTreeSet<String>,
    pub min_version_match: BTreeMap<String, String>,
}

impl Trigger for PkgNotPresentTrigger {
    const NAME: &'static str = "PKGNOTPRESENT";
    const DESCRIPTION: &'static str = "Fires if the packages named in the parameters are not installed in the image. \
         PKGFULLMATCH requires an exact version (curl|7.29.0-35.el7.centos), PKGNAMEMATCH only \
         the name (curl), PKGVERSMATCH a minimum version (zlib|0.2.8-r2).";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec {
            name: "PKGFULLMATCH",
            validator: Validator::NameVersionList,
            description: "name|fullversion pairs that must be installed at exactly that version",
        },
        ParamSpec {
            name: "PKGNAMEMATCH",
            validator: Validator::DelimitedList,
            description: "Package names that must be installed at any version",
        },
        ParamSpec {
            name: "PKGVERSMATCH",
            validator: Validator::NameVersionList,
            description: "name|version pairs that must be installed at that version or newer",
        },
    ];

    fn from_params(params: &TriggerParams) -> Self {
        Self {
            full_match: params.name_versions("PKGFULLMATCH"),
            name_match: params.name_set("PKGNAMEMATCH"),
            min_version_match: params.name_versions("PKGVERSMATCH"),
        }
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, out: &mut Firings) -> CoreResult<()> {
        let names: BTreeSet<String> = self
            .full_match
            .keys()
            .chain(self.name_match.iter())
            .chain(self.min_version_match.keys())
            .cloned()
            .collect();
        if names.is_empty() {
            return Ok(());
        }

        // Working copies; a name is removed once an installed package settles it.
        let mut full_match = self.full_match.clone();
        let mut name_match = self.name_match.clone();
        let mut min_version_match = self.min_version_match.clone();

        for pkg in ctx.image.packages(Some(&names))? {
            if let Some(required) = full_match.remove(&pkg.name) {
                if pkg.fullversion != required {
                    out.fire(format!(
                        "required package {} is installed at version {}, but policy requires exactly {}",
                        pkg.name, pkg.fullversion, required
                    ));
                }
            }

            name_match.remove(&pkg.name);

            if let Some(minimum) = min_version_match.remove(&pkg.name) {
                if pkg.fullversion != minimum {
                    check_minimum(ctx, pkg, &minimum, out);
                }
            }
        }

        for (name, version) in &full_match {
            out.fire(format!(
                "required package {} ({}) is not present in the image",
                name, version
            ));
        }
        for (name, version) in &min_version_match {
            out.fire(format!(
                "required package {} ({}) is not present in the image",
                name, version
            ));
        }
        for name in &name_match {
            out.fire(format!(
                "required package {} is not present in the image",
                name
            ));
        }
        Ok(())
    }
}

// Full versions on both sides, release/revision included.
fn check_minimum(ctx: &EvalContext<'_>, pkg: &Package, minimum: &str, out: &mut Firings) {
    match ctx.comparator.compare(
        &pkg.distro_flavor,
        &pkg.name,
        &pkg.fullversion,
        &pkg.name,
        minimum,
    ) {
        Ok(Ordering::Less) => out.fire(format!(
            "required package {} is installed at version {}, below the policy minimum {}",
            pkg.name, pkg.fullversion, minimum
        )),
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(
                package = %pkg.name,
                installed = %pkg.fullversion,
                minimum,
                flavor = %pkg.distro_flavor,
                error = %e,
                "minimum version comparison skipped"
            );
            out.note(format!(
                "could not compare {} {} against minimum {}: {}",
                pkg.name, pkg.fullversion, minimum, e
            ));
        }
    }
}
