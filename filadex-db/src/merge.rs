//! The sort & merge stage: combine per-vendor artifacts into one keyed,
//! optionally versioned document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::artifacts::{self, Vendor};
use crate::error::DbError;

/// The combined document consumed downstream.
pub const MERGED_FILE: &str = "materials.json";

/// Small sidecar holding only the current version integer.
pub const VERSION_FILE: &str = "version.json";

#[derive(Debug, Serialize, Deserialize)]
struct VersionFile {
    version: u64,
}

/// Options for a merge run.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Directory holding the per-vendor artifacts and receiving the output.
    pub out_dir: PathBuf,
    /// Embed an incremented version integer and a date stamp.
    pub versioned: bool,
}

/// What a successful merge produced.
#[derive(Debug)]
pub struct MergeOutcome {
    pub path: PathBuf,
    pub version: Option<u64>,
    pub vendor_count: usize,
}

/// Merge every vendor artifact into the combined document.
///
/// All artifacts are read before anything is written, so a missing vendor
/// aborts the merge with no partial output. The merged document is written
/// via temp-file + rename; the version-file rewrite that follows is a
/// separate, non-atomic step, so a crash in between can skip a bump but
/// never tears the document itself.
pub fn merge(options: &MergeOptions) -> Result<MergeOutcome, DbError> {
    let mut lists = Vec::new();
    for vendor in Vendor::ALL {
        lists.push((vendor.key(), artifacts::read_vendor_list(vendor, &options.out_dir)?));
    }

    let mut document = Map::new();
    for (key, list) in lists {
        document.insert(key.to_string(), list);
    }

    let version = if options.versioned {
        let next = read_version(&options.out_dir)? + 1;
        document.insert("version".to_string(), json!(next));
        document.insert(
            "date".to_string(),
            json!(chrono::Local::now().format("%Y-%m-%d").to_string()),
        );
        Some(next)
    } else {
        None
    };

    let path = options.out_dir.join(MERGED_FILE);
    write_document(&path, &Value::Object(document))?;
    log::debug!("Wrote merged document to {}", path.display());

    if let Some(next) = version {
        write_version(&options.out_dir, next)?;
    }

    Ok(MergeOutcome {
        path,
        version,
        vendor_count: Vendor::ALL.len(),
    })
}

/// Read the current version integer. An absent version file counts as 0.
pub fn read_version(out_dir: &Path) -> Result<u64, DbError> {
    let path = out_dir.join(VERSION_FILE);
    if !path.exists() {
        return Ok(0);
    }
    let contents = fs::read_to_string(&path)?;
    let file: VersionFile = serde_json::from_str(&contents)?;
    Ok(file.version)
}

fn write_version(out_dir: &Path, version: u64) -> Result<(), DbError> {
    let path = out_dir.join(VERSION_FILE);
    let contents = serde_json::to_string_pretty(&VersionFile { version })?;
    fs::write(&path, contents)?;
    Ok(())
}

/// Write the merged document to a temp file in the same directory, then
/// rename it into place.
fn write_document(path: &Path, document: &Value) -> Result<(), DbError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(document)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
