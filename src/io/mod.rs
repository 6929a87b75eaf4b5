// src/io/mod.rs
pub mod reader;
pub mod writer;

pub use reader::{read_archive, read_region, ArchiveManifest};
pub use writer::write_json;
