//! Repository layer: the in-memory catalog and its file store

pub mod catalog;
pub mod catalog_file;

pub use catalog::{Catalog, ReportLine, MAX_BOOKS};
