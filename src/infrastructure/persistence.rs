use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{EditMap, ReportArtifact};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid annotations file {path}: {source}")]
    InvalidAnnotations {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// User annotations supplied as a JSON file to the headless report command.
///
/// ```json
/// { "rationales": { "1": "..." }, "affected": { "1": "Shield" } }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Annotations {
    pub rationales: EditMap,
    pub affected: EditMap,
}

pub struct FileRepository;

impl FileRepository {
    /// Writes the artifact into `dir` under its own file name.
    pub fn save_report(artifact: &ReportArtifact, dir: &Path) -> Result<PathBuf, StorageError> {
        Self::save_report_as(artifact, &dir.join(artifact.file_name))
    }

    pub fn save_report_as(artifact: &ReportArtifact, path: &Path) -> Result<PathBuf, StorageError> {
        let write_err = |source| StorageError::Write { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, &artifact.bytes).map_err(write_err)?;
        tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "Report written");
        Ok(path.to_path_buf())
    }

    pub fn load_annotations(path: &Path) -> Result<Annotations, StorageError> {
        let content = fs::read_to_string(path).map_err(|source| StorageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StorageError::InvalidAnnotations {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_report_uses_artifact_file_name() {
        let dir = TempDir::new().unwrap();
        let artifact = ReportArtifact::pdf(b"%PDF-1.4\n".to_vec());
        let path = FileRepository::save_report(&artifact, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("guardant_regulatory_report.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4\n");
    }

    #[test]
    fn test_save_report_as_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out").join("nested").join("report.pdf");
        let artifact = ReportArtifact::pdf(vec![1, 2, 3]);
        FileRepository::save_report_as(&artifact, &target).unwrap();
        assert_eq!(fs::read(&target).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_load_annotations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, r#"{ "affected": { "1": "Shield" } }"#).unwrap();
        let annotations = FileRepository::load_annotations(&path).unwrap();
        assert_eq!(annotations.affected.get(&1).map(String::as_str), Some("Shield"));
        assert!(annotations.rationales.is_empty());
    }

    #[test]
    fn test_load_annotations_errors() {
        let dir = TempDir::new().unwrap();
        let missing = FileRepository::load_annotations(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(StorageError::Read { .. })));

        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "notes": {} }"#).unwrap();
        let invalid = FileRepository::load_annotations(&path);
        assert!(matches!(invalid, Err(StorageError::InvalidAnnotations { .. })));
    }
}
