//! Durable artifacts for the material database.
//!
//! Each vendor's normalized list is written once to a per-vendor JSON file;
//! the merge stage combines those artifacts into one versioned document
//! that downstream consumers read. Optionally a Rust source file with the
//! material table is generated for compile-time embedding.

pub mod artifacts;
pub mod codegen;
pub mod error;
pub mod merge;

pub use artifacts::{Vendor, read_vendor_list, write_vendor_list};
pub use codegen::write_materials_module;
pub use error::DbError;
pub use merge::{MERGED_FILE, MergeOptions, MergeOutcome, VERSION_FILE, merge, read_version};
