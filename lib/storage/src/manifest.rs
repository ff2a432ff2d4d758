// Optional SHA-256 manifest shipped alongside the artifacts
use crate::artifact::{self, Artifact};
use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;

pub const MANIFEST_FILE: &str = "manifest.json";

/// `{ "files": { "<file name>": "<sha256 hex>" } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: BTreeMap<String, String>,
}

/// Hex SHA-256 of a file's raw bytes
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

impl Manifest {
    /// Load `manifest.json` from `dir`, if there is one
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        artifact::read_json(&path).map(Some)
    }

    /// Checksum every artifact currently present in `dir`
    pub fn generate(dir: &Path) -> Result<Self> {
        let mut files = BTreeMap::new();
        for kind in Artifact::ALL {
            if let Some(path) = kind.locate(dir) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.insert(name.to_string(), sha256_file(&path)?);
                }
            }
        }
        Ok(Self { files })
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        let data = serde_json::to_vec_pretty(self).map_err(|source| StorageError::Parse {
            path: dir.join(MANIFEST_FILE),
            source,
        })?;
        std::fs::write(dir.join(MANIFEST_FILE), data)?;
        Ok(())
    }

    /// Verify every listed file. Files not listed are not checked.
    pub fn verify(&self, dir: &Path) -> Result<()> {
        for (name, expected) in &self.files {
            let path = dir.join(name);
            if !path.is_file() {
                return Err(StorageError::NotFound(path));
            }
            let actual = sha256_file(&path)?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(StorageError::ChecksumMismatch {
                    file: name.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }
}
