use crate::error::{CoreError, CoreResult};
use crate::image::model::{FileSystemRecord, Package};
use crate::image::ImageView;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// In-memory image analysis result: packages in analysis order plus the
/// filesystem scan keyed by path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSnapshot {
    pub image_id: String,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub files: BTreeMap<String, FileSystemRecord>,
}

impl ImageSnapshot {
    pub fn from_json_str(s: &str) -> CoreResult<Self> {
        let snap: ImageSnapshot = serde_json::from_str(s)?;
        snap.validate()?;
        Ok(snap)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let body = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&body)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.image_id.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "image snapshot missing image_id".to_string(),
            ));
        }
        for pkg in &self.packages {
            let mut seen = BTreeSet::new();
            for entry in &pkg.manifest {
                if !seen.insert(entry.file_path.as_str()) {
                    return Err(CoreError::InvalidInput(format!(
                        "package {} lists manifest path {} more than once",
                        pkg.name, entry.file_path
                    )));
                }
            }
        }
        Ok(())
    }
}

impl ImageView for ImageSnapshot {
    fn image_id(&self) -> &str {
        &self.image_id
    }

    fn packages(&self, names: Option<&BTreeSet<String>>) -> CoreResult<Vec<&Package>> {
        Ok(self
            .packages
            .iter()
            .filter(|p| names.map_or(true, |n| n.contains(&p.name)))
            .collect())
    }

    fn file_record(&self, path: &str) -> Option<&FileSystemRecord> {
        self.files.get(path)
    }
}
