use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

/// One printable material in the common normalized schema.
///
/// All physical properties are fixed-point integers (see [`crate::fixed`]
/// for the scale factors). Vendor-optional numerics default to zero so the
/// output shape is uniform across vendors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub manufacturer: String,
    pub name: String,
    pub material_type: String,
    /// g/cm³, ×100.
    #[serde(default)]
    pub density: i64,
    /// Dimensionless, ×100.
    #[serde(default)]
    pub flow_ratio: i64,
    /// mm, ×100.
    #[serde(default)]
    pub diameter: i64,
    /// °C.
    #[serde(default)]
    pub vitrification_temperature: i64,
    /// ×1000.
    #[serde(default)]
    pub pressure_advance: i64,
    /// mm³/s, ×10.
    #[serde(default)]
    pub max_volumetric_speed: i64,
    /// °C.
    #[serde(default)]
    pub nozzle_temperature: i64,
    #[serde(default)]
    pub nozzle_temp_min: i64,
    #[serde(default)]
    pub nozzle_temp_max: i64,
    #[serde(default)]
    pub chamber_temperature: i64,
    #[serde(default)]
    pub is_support: bool,
    #[serde(default)]
    pub is_soluble: bool,
    /// Currency units per kg, ×100.
    #[serde(default)]
    pub cost: i64,
}

impl Material {
    /// Build a material carrying only identity fields. Used by vendors whose
    /// feed has no physical properties; numerics stay at their zero defaults.
    pub fn identity_only(
        id: impl Into<String>,
        manufacturer: impl Into<String>,
        name: impl Into<String>,
        material_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            manufacturer: manufacturer.into(),
            name: name.into(),
            material_type: material_type.into(),
            ..Self::default()
        }
    }

    /// Check the normalized-output invariant: `id` and `manufacturer` must
    /// be non-empty.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.id.is_empty() {
            return Err(NormalizeError::EmptyField("id"));
        }
        if self.manufacturer.is_empty() {
            return Err(NormalizeError::EmptyField("manufacturer"));
        }
        Ok(())
    }
}

/// Order a vendor list by manufacturer, then name. Case-sensitive
/// lexicographic and stable, so output is reproducible across runs.
pub fn sort_materials(materials: &mut [Material]) {
    materials.sort_by(|a, b| {
        a.manufacturer
            .cmp(&b.manufacturer)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat(manufacturer: &str, name: &str) -> Material {
        Material::identity_only("000001", manufacturer, name, "PLA")
    }

    #[test]
    fn test_validate_requires_id() {
        let mut m = mat("Polymaker", "PolyLite PLA");
        m.id = String::new();
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_validate_requires_manufacturer() {
        let m = mat("", "PolyLite PLA");
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_sort_by_manufacturer_then_name() {
        let mut list = vec![
            mat("Polymaker", "PolyTerra"),
            mat("Bambu Lab", "PLA Basic"),
            mat("Polymaker", "PolyLite"),
        ];
        sort_materials(&mut list);
        let names: Vec<_> = list.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["PLA Basic", "PolyLite", "PolyTerra"]);
    }

    #[test]
    fn test_serde_shape_is_camel_case() {
        let m = mat("Bambu Lab", "PLA Basic");
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("materialType").is_some());
        assert!(json.get("maxVolumetricSpeed").is_some());
        assert_eq!(json.get("isSupport"), Some(&serde_json::json!(false)));
    }
}
