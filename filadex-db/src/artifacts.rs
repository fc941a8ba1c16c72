//! Per-vendor artifact files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::DbError;

/// The fixed vendor set feeding the merged document. The merge expects an
/// artifact for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    TigerTag,
    Bambu,
    Creality,
    Anycubic,
}

impl Vendor {
    /// All vendors, in merged-document key order.
    pub const ALL: [Vendor; 4] = [
        Vendor::TigerTag,
        Vendor::Bambu,
        Vendor::Creality,
        Vendor::Anycubic,
    ];

    /// Stable short name used as the vendor's key in the merged document.
    pub fn key(&self) -> &'static str {
        match self {
            Self::TigerTag => "tigertag",
            Self::Bambu => "bambu",
            Self::Creality => "creality",
            Self::Anycubic => "anycubic",
        }
    }

    pub fn artifact_file(&self) -> String {
        format!("{}.json", self.key())
    }

    pub fn artifact_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(self.artifact_file())
    }

    /// Anycubic has no fetcher; its artifact is maintained by hand and only
    /// read at merge time.
    pub fn is_fetched(&self) -> bool {
        !matches!(self, Self::Anycubic)
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Write one vendor's list to its artifact file, creating the output
/// directory as needed.
pub fn write_vendor_list<T: Serialize>(
    vendor: Vendor,
    out_dir: &Path,
    list: &T,
) -> Result<PathBuf, DbError> {
    let path = vendor.artifact_path(out_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(list)?;
    fs::write(&path, contents)?;
    Ok(path)
}

/// Read one vendor's artifact as raw JSON. A missing file is an error the
/// merge treats as fatal.
pub fn read_vendor_list(vendor: Vendor, out_dir: &Path) -> Result<Value, DbError> {
    let path = vendor.artifact_path(out_dir);
    if !path.exists() {
        return Err(DbError::MissingArtifact {
            vendor: vendor.key(),
            path,
        });
    }
    let contents = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_keys_are_stable() {
        let keys: Vec<_> = Vendor::ALL.iter().map(Vendor::key).collect();
        assert_eq!(keys, vec!["tigertag", "bambu", "creality", "anycubic"]);
    }

    #[test]
    fn test_anycubic_is_not_fetched() {
        assert!(!Vendor::Anycubic.is_fetched());
        assert!(Vendor::Bambu.is_fetched());
    }

    #[test]
    fn test_artifact_path_layout() {
        let path = Vendor::Creality.artifact_path(Path::new("db"));
        assert_eq!(path, Path::new("db").join("creality.json"));
    }
}
