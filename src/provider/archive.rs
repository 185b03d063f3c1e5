use super::{ApiCredential, StructureProvider};
use crate::core::structure::Crystal;
use crate::error::WulffError;
use crate::io::parser;
use glob::glob;
use std::path::{Path, PathBuf};
use std::process::Command;

/// External helper that speaks the Materials Project REST protocol. The
/// archive shells out to it on a cache miss; the wire format never enters
/// this crate.
const FETCH_HELPER: &str = "mp-fetch";

/// Local CIF mirror of a remote structure database.
///
/// Entries live as `<id>.cif` under the archive root. A missing entry is
/// fetched by the external helper using the stored credential, then parsed
/// like any other archived file. Every collaborator failure — helper not
/// installed, non-zero exit, unparsable payload — surfaces as a
/// `WulffError::Retrieval`.
pub struct CifArchive {
    root: PathBuf,
    credential: ApiCredential,
}

impl CifArchive {
    pub fn open(root: impl Into<PathBuf>, credential: ApiCredential) -> Self {
        Self {
            root: root.into(),
            credential,
        }
    }

    /// First archived file matching `<id>*.cif`, if any.
    fn locate(&self, material_id: &str) -> Option<PathBuf> {
        let pattern = self.root.join(format!("{}*.cif", material_id));
        glob(pattern.to_str()?).ok()?.flatten().next()
    }

    fn retrieval_error(&self, material_id: &str, detail: String) -> WulffError {
        WulffError::Retrieval {
            id: material_id.to_string(),
            detail,
        }
    }

    fn fetch_remote(&self, material_id: &str) -> Result<PathBuf, WulffError> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| self.retrieval_error(material_id, format!("cannot create archive root: {}", e)))?;

        let dest = self.root.join(format!("{}.cif", material_id));
        let status = Command::new(FETCH_HELPER)
            .arg("--api-key")
            .arg(self.credential.as_str())
            .arg("--id")
            .arg(material_id)
            .arg("--out")
            .arg(&dest)
            .status()
            .map_err(|e| self.retrieval_error(material_id, format!("cannot run {}: {}", FETCH_HELPER, e)))?;

        if !status.success() {
            return Err(self.retrieval_error(material_id, format!("{} exited with {}", FETCH_HELPER, status)));
        }
        Ok(dest)
    }

    fn parse_entry(&self, material_id: &str, path: &Path) -> Result<Crystal, WulffError> {
        parser::from_cif(path).map_err(|e| self.retrieval_error(material_id, format!("{:#}", e)))
    }
}

impl StructureProvider for CifArchive {
    fn fetch(&self, material_id: &str) -> Result<Crystal, WulffError> {
        let path = match self.locate(material_id) {
            Some(hit) => hit,
            None => self.fetch_remote(material_id)?,
        };
        self.parse_entry(material_id, &path)
    }
}
