use tempfile::tempdir;

use filadex_core::Material;
use filadex_db::write_materials_module;

#[test]
fn writes_module_file_with_all_materials() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("src").join("materials_gen.rs");

    let mut pla = Material::identity_only("GFA00", "Bambu Lab", "PLA Basic", "PLA");
    pla.density = 124;
    pla.cost = 2499;
    let petg = Material::identity_only("000042", "Creality", "CR-PETG", "PETG");

    write_materials_module(&path, &[pla, petg]).unwrap();

    let source = std::fs::read_to_string(&path).unwrap();
    assert!(source.contains("density: 124,"));
    assert!(source.contains("cost: 2499,"));
    assert!(source.contains("id: \"000042\""));
    assert_eq!(source.matches("EmbeddedMaterial {").count(), 3);
}
