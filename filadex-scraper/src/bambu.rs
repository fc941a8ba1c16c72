//! Bambu Lab marketplace client.
//!
//! The slicer-settings API lists public filament profiles for a pinned
//! slicer version; each profile's physical properties live behind a per-id
//! detail endpoint. Detail fetches fan out concurrently and each yields a
//! `(filament id, Option<Material>)` pair; a single-threaded fold then
//! builds the final list, so no concurrent writes touch shared state.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use filadex_core::{Material, NormalizeError, RecordDiagnostics, RecordReader, clean_name, fixed, sort_materials};

use crate::error::ScrapeError;

const BASE_URL: &str = "https://api.bambulab.com";

/// Slicer version pinned for the settings list. Bump deliberately: new
/// versions can rename profile fields.
pub const DEFAULT_SETTINGS_VERSION: &str = "01.10.02.64";

/// Profile names carry an internal suffix after this marker
/// (e.g. "PLA Basic @BBL X1C").
const NAME_DELIMITER: char = '@';

/// Vendor-optional numeric fields and the value used when the feed omits
/// them or the value fails to parse. One visible table rather than an
/// implied per-callsite policy.
const OPTIONAL_NUMERIC_DEFAULTS: &[(&str, i64)] = &[
    ("filament_density", 0),
    ("filament_flow_ratio", 0),
    ("filament_diameter", 0),
    ("temperature_vitrification", 0),
    ("pressure_advance", 0),
    ("filament_max_volumetric_speed", 0),
    ("nozzle_temperature", 0),
    ("nozzle_temperature_range_low", 0),
    ("nozzle_temperature_range_high", 0),
    ("chamber_temperatures", 0),
    ("filament_cost", 0),
];

fn default_for(field: &str) -> i64 {
    OPTIONAL_NUMERIC_DEFAULTS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, value)| *value)
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct SettingListResponse {
    filament: FilamentSettings,
}

#[derive(Debug, Deserialize)]
struct FilamentSettings {
    #[serde(rename = "public", default)]
    public: Vec<SettingSummary>,
}

/// One entry in the public filament settings list.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingSummary {
    pub filament_id: String,
    pub setting_id: String,
}

/// Detail payload for one setting id. The physical properties are kept as
/// raw JSON because the marketplace emits scalar-or-list values freely.
#[derive(Debug, Deserialize)]
pub struct SettingDetail {
    pub name: String,
    #[serde(default)]
    pub setting: Map<String, Value>,
}

/// HTTP client for the Bambu Lab slicer-settings API.
pub struct BambuClient {
    http: reqwest::Client,
    base_url: String,
}

impl BambuClient {
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// List public filament settings for a slicer version, deduplicated by
    /// filament id (later entries win, matching marketplace precedence).
    pub async fn get_setting_list(&self, version: &str) -> Result<Vec<SettingSummary>, ScrapeError> {
        let resp = self
            .http
            .get(format!("{}/v1/iot-service/api/slicer/setting", self.base_url))
            .query(&[("version", version)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Api(format!(
                "setting list for version {version} returned HTTP {status}"
            )));
        }

        let list: SettingListResponse = resp.json().await?;

        let mut by_filament: HashMap<String, SettingSummary> = HashMap::new();
        for summary in list.filament.public {
            by_filament.insert(summary.filament_id.clone(), summary);
        }
        let mut summaries: Vec<_> = by_filament.into_values().collect();
        summaries.sort_by(|a, b| a.filament_id.cmp(&b.filament_id));
        Ok(summaries)
    }

    /// Fetch the detail payload for one setting id.
    pub async fn get_setting(&self, setting_id: &str) -> Result<SettingDetail, ScrapeError> {
        let resp = self
            .http
            .get(format!(
                "{}/v1/iot-service/api/slicer/setting/{setting_id}",
                self.base_url
            ))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Api(format!(
                "setting {setting_id} returned HTTP {status}"
            )));
        }

        Ok(resp.json().await?)
    }

    /// Fetch and normalize one material. Any failure is logged and yields
    /// `None`; it never aborts sibling fetches.
    pub async fn fetch_material(&self, summary: &SettingSummary) -> (String, Option<Material>) {
        let id = summary.filament_id.clone();
        let detail = match self.get_setting(&summary.setting_id).await {
            Ok(detail) => detail,
            Err(e) => {
                log::warn!("Failed to fetch setting {}: {e}", summary.setting_id);
                return (id, None);
            }
        };

        match normalize_setting(&detail) {
            Ok((material, diag)) => {
                if !diag.is_clean() {
                    log::debug!("Normalized {} with fallbacks: {diag}", summary.filament_id);
                }
                (id, Some(material))
            }
            Err(e) => {
                log::warn!("Skipping malformed setting {}: {e}", summary.setting_id);
                (id, None)
            }
        }
    }

}

/// Reduce concurrent fetch results into an ordered material list. Failed
/// fetches (`None`) are simply absent; duplicate filament ids collapse to
/// one entry.
pub fn fold_materials(results: Vec<(String, Option<Material>)>) -> Vec<Material> {
    let mut by_id: BTreeMap<String, Material> = BTreeMap::new();
    for (id, material) in results {
        if let Some(material) = material {
            by_id.insert(id, material);
        }
    }
    let mut materials: Vec<_> = by_id.into_values().collect();
    sort_materials(&mut materials);
    materials
}

/// Normalize one setting detail into the common schema.
pub fn normalize_setting(
    detail: &SettingDetail,
) -> Result<(Material, RecordDiagnostics), NormalizeError> {
    let mut reader = RecordReader::new(&detail.setting);

    let material = Material {
        id: reader.text("filament_id"),
        manufacturer: reader.text("filament_vendor"),
        name: clean_name(&detail.name, NAME_DELIMITER),
        material_type: reader.text("filament_type"),
        density: reader.scaled(
            "filament_density",
            fixed::SCALE_CENTI,
            default_for("filament_density"),
        ),
        flow_ratio: reader.scaled(
            "filament_flow_ratio",
            fixed::SCALE_CENTI,
            default_for("filament_flow_ratio"),
        ),
        diameter: reader.scaled(
            "filament_diameter",
            fixed::SCALE_CENTI,
            default_for("filament_diameter"),
        ),
        vitrification_temperature: reader.integer(
            "temperature_vitrification",
            default_for("temperature_vitrification"),
        ),
        pressure_advance: reader.scaled(
            "pressure_advance",
            fixed::SCALE_MILLI,
            default_for("pressure_advance"),
        ),
        max_volumetric_speed: reader.scaled(
            "filament_max_volumetric_speed",
            fixed::SCALE_DECI,
            default_for("filament_max_volumetric_speed"),
        ),
        nozzle_temperature: reader.integer("nozzle_temperature", default_for("nozzle_temperature")),
        nozzle_temp_min: reader.integer(
            "nozzle_temperature_range_low",
            default_for("nozzle_temperature_range_low"),
        ),
        nozzle_temp_max: reader.integer(
            "nozzle_temperature_range_high",
            default_for("nozzle_temperature_range_high"),
        ),
        chamber_temperature: reader.integer(
            "chamber_temperatures",
            default_for("chamber_temperatures"),
        ),
        is_support: reader.flag("filament_is_support"),
        is_soluble: reader.flag("filament_is_soluble"),
        cost: reader.scaled("filament_cost", fixed::SCALE_CENTI, default_for("filament_cost")),
    };

    material.validate()?;
    Ok((material, reader.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail(name: &str, setting: Value) -> SettingDetail {
        SettingDetail {
            name: name.to_string(),
            setting: setting.as_object().unwrap().clone(),
        }
    }

    fn full_setting(listy: bool) -> Value {
        let wrap = |v: Value| if listy { json!([v]) } else { v };
        json!({
            "filament_id": wrap(json!("GFA00")),
            "filament_vendor": wrap(json!("Bambu Lab")),
            "filament_type": wrap(json!("PLA")),
            "filament_density": wrap(json!("1.24")),
            "filament_flow_ratio": wrap(json!("0.98")),
            "filament_diameter": wrap(json!("1.75")),
            "temperature_vitrification": wrap(json!("56")),
            "pressure_advance": wrap(json!("0.02")),
            "filament_max_volumetric_speed": wrap(json!("21.5")),
            "nozzle_temperature": wrap(json!("220")),
            "nozzle_temperature_range_low": wrap(json!("190")),
            "nozzle_temperature_range_high": wrap(json!("230")),
            "chamber_temperatures": wrap(json!("0")),
            "filament_is_support": wrap(json!("0")),
            "filament_is_soluble": wrap(json!("0")),
            "filament_cost": wrap(json!("24.99")),
        })
    }

    #[test]
    fn test_normalize_full_setting() {
        let d = detail("Bambu PLA Basic @BBL X1C", full_setting(false));
        let (material, diag) = normalize_setting(&d).unwrap();

        assert_eq!(material.id, "GFA00");
        assert_eq!(material.manufacturer, "Bambu Lab");
        assert_eq!(material.name, "Bambu PLA Basic");
        assert_eq!(material.material_type, "PLA");
        assert_eq!(material.density, 124);
        assert_eq!(material.flow_ratio, 98);
        assert_eq!(material.diameter, 175);
        assert_eq!(material.vitrification_temperature, 56);
        assert_eq!(material.pressure_advance, 20);
        assert_eq!(material.max_volumetric_speed, 215);
        assert_eq!(material.nozzle_temperature, 220);
        assert_eq!(material.nozzle_temp_min, 190);
        assert_eq!(material.nozzle_temp_max, 230);
        assert_eq!(material.chamber_temperature, 0);
        assert!(!material.is_support);
        assert!(!material.is_soluble);
        assert_eq!(material.cost, 2499);
        assert!(diag.is_clean());
    }

    #[test]
    fn test_normalize_list_wrapped_setting_is_identical() {
        let scalar = normalize_setting(&detail("PLA @X", full_setting(false))).unwrap().0;
        let listed = normalize_setting(&detail("PLA @X", full_setting(true))).unwrap().0;
        assert_eq!(scalar, listed);
    }

    #[test]
    fn test_normalize_defaults_absent_pressure_advance() {
        let mut setting = full_setting(false);
        setting.as_object_mut().unwrap().remove("pressure_advance");
        let (material, diag) = normalize_setting(&detail("PLA", setting)).unwrap();
        assert_eq!(material.pressure_advance, 0);
        assert!(!diag.is_clean());
    }

    #[test]
    fn test_normalize_rejects_missing_vendor() {
        let mut setting = full_setting(false);
        setting.as_object_mut().unwrap().remove("filament_vendor");
        assert!(normalize_setting(&detail("PLA", setting)).is_err());
    }

    #[test]
    fn test_support_material_flags() {
        let mut setting = full_setting(false);
        let obj = setting.as_object_mut().unwrap();
        obj.insert("filament_is_support".into(), json!(["1"]));
        obj.insert("filament_is_soluble".into(), json!("1"));
        let (material, _) = normalize_setting(&detail("Support W", setting)).unwrap();
        assert!(material.is_support);
        assert!(material.is_soluble);
    }

    #[test]
    fn test_fold_materials_drops_failures_and_sorts() {
        let a = Material::identity_only("GFA00", "Bambu Lab", "PLA Basic", "PLA");
        let b = Material::identity_only("GFB00", "Acme", "ABS", "ABS");
        let results = vec![
            ("GFA00".to_string(), Some(a)),
            ("GFX99".to_string(), None),
            ("GFB00".to_string(), Some(b)),
        ];
        let folded = fold_materials(results);
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].manufacturer, "Acme");
        assert_eq!(folded[1].manufacturer, "Bambu Lab");
    }

    #[test]
    fn test_fold_materials_collapses_duplicate_ids() {
        let first = Material::identity_only("GFA00", "Bambu Lab", "PLA Basic", "PLA");
        let second = Material::identity_only("GFA00", "Bambu Lab", "PLA Basic v2", "PLA");
        let folded = fold_materials(vec![
            ("GFA00".to_string(), Some(first)),
            ("GFA00".to_string(), Some(second)),
        ]);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].name, "PLA Basic v2");
    }
}
