//! Creality firmware material database.
//!
//! The K2 Plus firmware ships its RFID material database as a JSON file;
//! a community mirror hosts the extracted copy at a pinned commit. The raw
//! payload is saved next to the output artifacts so a later run can fall
//! back to it when the mirror is unreachable.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use filadex_core::{Material, pad_numeric_id, sort_materials};

use crate::error::ScrapeError;

const FIRMWARE_DB_URL: &str = "https://raw.githubusercontent.com/Guilouz/Creality-K2Plus-Extracted-Firmwares/e4635623cb4e9c8302d645e1d8adc61ab0c55f97/Firmware/etc/sysConfig/material_database.json";

/// RFID tag ids are fixed-width in the firmware.
const ID_WIDTH: usize = 6;

#[derive(Debug, Deserialize)]
struct FirmwareDatabase {
    result: FirmwareResult,
}

#[derive(Debug, Deserialize)]
struct FirmwareResult {
    #[serde(default)]
    list: Vec<FirmwareEntry>,
}

#[derive(Debug, Deserialize)]
struct FirmwareEntry {
    base: FirmwareBase,
}

/// Identity block of one firmware material record. `meterialType` is the
/// firmware's own spelling.
#[derive(Debug, Deserialize)]
struct FirmwareBase {
    id: Value,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "meterialType", default)]
    material_type: String,
}

/// HTTP client for the firmware database mirror.
pub struct CrealityClient {
    http: reqwest::Client,
    url: String,
}

impl CrealityClient {
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_url(FIRMWARE_DB_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Fetch the firmware database and normalize it, saving the raw payload
    /// to `local_copy` for offline fallback. When the download fails, the
    /// previous local copy is used instead; only the absence of both is
    /// fatal.
    pub async fn fetch_materials(&self, local_copy: &Path) -> Result<Vec<Material>, ScrapeError> {
        let payload = match self.download_database().await {
            Ok(text) => {
                if let Some(parent) = local_copy.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(local_copy, &text)?;
                log::debug!("Saved firmware database copy to {}", local_copy.display());
                text
            }
            Err(e) => {
                log::warn!("Failed to download firmware database: {e}");
                if !local_copy.exists() {
                    return Err(ScrapeError::Config(format!(
                        "Firmware database unreachable and no local copy at {}",
                        local_copy.display()
                    )));
                }
                log::info!("Falling back to local copy {}", local_copy.display());
                std::fs::read_to_string(local_copy)?
            }
        };

        let database: FirmwareDatabase = serde_json::from_str(&payload)?;
        Ok(normalize_database(database))
    }

    async fn download_database(&self) -> Result<String, ScrapeError> {
        let resp = self.http.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Api(format!(
                "firmware database returned HTTP {status}"
            )));
        }
        Ok(resp.text().await?)
    }
}

fn normalize_database(database: FirmwareDatabase) -> Vec<Material> {
    let mut materials: Vec<Material> = database
        .result
        .list
        .into_iter()
        .filter_map(|entry| match normalize_entry(entry.base) {
            Some(material) => Some(material),
            None => {
                log::warn!("Skipping firmware record with no id or brand");
                None
            }
        })
        .collect();
    sort_materials(&mut materials);
    materials
}

/// Normalize one firmware record. The feed carries identity fields only;
/// physical properties stay at their zero defaults.
fn normalize_entry(base: FirmwareBase) -> Option<Material> {
    let raw_id = match &base.id {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let material = Material::identity_only(
        pad_numeric_id(raw_id.trim(), ID_WIDTH),
        base.brand.trim(),
        base.name.trim(),
        base.material_type.trim(),
    );
    material.validate().ok()?;
    Some(material)
}
