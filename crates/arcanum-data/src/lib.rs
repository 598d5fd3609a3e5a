//! Arcanum Data -- loads data packs from RON, JSON, or TOML files.
//!
//! A data pack is a directory of list files (`themes`, `assignments`,
//! `enchantments`). [`load_data_pack`] turns it into a
//! [`arcanum_power::store::ThemeSnapshot`] ready for
//! [`arcanum_power::store::ThemeStore::replace`] plus the per-enchantment
//! formula table.

pub mod loader;
pub mod pack;
pub mod schema;

pub use loader::DataLoadError;
pub use pack::{DataPack, LoadIssue, LoadReport, load_data_pack};
