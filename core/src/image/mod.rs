pub mod model;
pub mod snapshot;

use crate::error::CoreResult;
use model::{FileSystemRecord, ManifestEntry, Package};
use std::collections::BTreeSet;

/// Read-only query contract over one analyzed image.
///
/// Implementations push the name and path-prefix filters down to their
/// storage and must return records in a stable order, so that repeated
/// evaluations against the same data fire identical violation sequences.
pub trait ImageView {
    fn image_id(&self) -> &str;

    /// Installed packages whose name is in `names`, or all of them for `None`.
    fn packages(&self, names: Option<&BTreeSet<String>>) -> CoreResult<Vec<&Package>>;

    /// Observed filesystem record for `path`. `None` when the path was not
    /// seen or the image has no filesystem scan.
    fn file_record(&self, path: &str) -> Option<&FileSystemRecord>;

    /// Manifest entries of `package` under any of `prefixes` (all entries when
    /// `prefixes` is empty). An entry under several prefixes is returned once.
    fn manifest_entries<'a>(
        &'a self,
        package: &'a Package,
        prefixes: &[String],
    ) -> CoreResult<Vec<&'a ManifestEntry>> {
        Ok(package
            .manifest
            .iter()
            .filter(|e| prefixes.is_empty() || prefixes.iter().any(|p| e.file_path.starts_with(p)))
            .collect())
    }
}
