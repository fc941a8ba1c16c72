//! Common data model and normalization primitives for filament catalogs.
//!
//! Every vendor feed gets reshaped into the [`Material`] schema here before
//! anything is written to disk. This crate is pure data massaging: no I/O,
//! no HTTP.

pub mod error;
pub mod fixed;
pub mod material;
pub mod normalize;

pub use error::NormalizeError;
pub use material::{Material, sort_materials};
pub use normalize::{FieldOutcome, RecordDiagnostics, RecordReader, clean_name, pad_numeric_id, sentinel_flag};
