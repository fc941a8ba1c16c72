//! Generated Rust source for compile-time embedding.
//!
//! Downstream firmware-facing tools want the material table available
//! without parsing JSON at runtime; this emits a module declaring the
//! normalized materials as a `const` slice of struct literals.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use filadex_core::Material;

use crate::error::DbError;

/// Write a Rust module declaring `MATERIALS: &[EmbeddedMaterial]`.
pub fn write_materials_module(path: &Path, materials: &[Material]) -> Result<(), DbError> {
    let source = render_module(materials);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, source)?;
    Ok(())
}

fn render_module(materials: &[Material]) -> String {
    let mut out = String::new();
    out.push_str("// Generated by filadex. Do not edit by hand.\n\n");
    out.push_str("#[derive(Debug, Clone, Copy)]\n");
    out.push_str("pub struct EmbeddedMaterial {\n");
    out.push_str("    pub id: &'static str,\n");
    out.push_str("    pub manufacturer: &'static str,\n");
    out.push_str("    pub name: &'static str,\n");
    out.push_str("    pub material_type: &'static str,\n");
    out.push_str("    pub density: i64,\n");
    out.push_str("    pub flow_ratio: i64,\n");
    out.push_str("    pub diameter: i64,\n");
    out.push_str("    pub vitrification_temperature: i64,\n");
    out.push_str("    pub pressure_advance: i64,\n");
    out.push_str("    pub max_volumetric_speed: i64,\n");
    out.push_str("    pub nozzle_temperature: i64,\n");
    out.push_str("    pub nozzle_temp_min: i64,\n");
    out.push_str("    pub nozzle_temp_max: i64,\n");
    out.push_str("    pub chamber_temperature: i64,\n");
    out.push_str("    pub is_support: bool,\n");
    out.push_str("    pub is_soluble: bool,\n");
    out.push_str("    pub cost: i64,\n");
    out.push_str("}\n\n");
    out.push_str("pub const MATERIALS: &[EmbeddedMaterial] = &[\n");
    for material in materials {
        render_material(&mut out, material);
    }
    out.push_str("];\n");
    out
}

fn render_material(out: &mut String, m: &Material) {
    out.push_str("    EmbeddedMaterial {\n");
    let _ = writeln!(out, "        id: \"{}\",", escape(&m.id));
    let _ = writeln!(out, "        manufacturer: \"{}\",", escape(&m.manufacturer));
    let _ = writeln!(out, "        name: \"{}\",", escape(&m.name));
    let _ = writeln!(out, "        material_type: \"{}\",", escape(&m.material_type));
    let _ = writeln!(out, "        density: {},", m.density);
    let _ = writeln!(out, "        flow_ratio: {},", m.flow_ratio);
    let _ = writeln!(out, "        diameter: {},", m.diameter);
    let _ = writeln!(
        out,
        "        vitrification_temperature: {},",
        m.vitrification_temperature
    );
    let _ = writeln!(out, "        pressure_advance: {},", m.pressure_advance);
    let _ = writeln!(out, "        max_volumetric_speed: {},", m.max_volumetric_speed);
    let _ = writeln!(out, "        nozzle_temperature: {},", m.nozzle_temperature);
    let _ = writeln!(out, "        nozzle_temp_min: {},", m.nozzle_temp_min);
    let _ = writeln!(out, "        nozzle_temp_max: {},", m.nozzle_temp_max);
    let _ = writeln!(out, "        chamber_temperature: {},", m.chamber_temperature);
    let _ = writeln!(out, "        is_support: {},", m.is_support);
    let _ = writeln!(out, "        is_soluble: {},", m.is_soluble);
    let _ = writeln!(out, "        cost: {},", m.cost);
    out.push_str("    },\n");
}

fn escape(s: &str) -> String {
    s.escape_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_struct_and_entries() {
        let materials = vec![Material::identity_only("000042", "Creality", "Hyper PLA", "PLA")];
        let source = render_module(&materials);
        assert!(source.contains("pub struct EmbeddedMaterial"));
        assert!(source.contains("pub const MATERIALS"));
        assert!(source.contains("id: \"000042\""));
        assert!(source.contains("manufacturer: \"Creality\""));
    }

    #[test]
    fn test_render_escapes_quotes() {
        let materials = vec![Material::identity_only("1", "Acme", "PLA \"Pro\"", "PLA")];
        let source = render_module(&materials);
        assert!(source.contains(r#"name: "PLA \"Pro\"","#));
    }

    #[test]
    fn test_render_empty_list() {
        let source = render_module(&[]);
        assert!(source.contains("pub const MATERIALS: &[EmbeddedMaterial] = &[\n];"));
    }
}
