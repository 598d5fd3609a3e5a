//! Data-pack pipeline: files on disk to a theme snapshot and formula table.
//!
//! A pack directory holds:
//!
//! | Base name      | Required | TOML key       | Record              |
//! |----------------|----------|----------------|---------------------|
//! | `themes`       | yes      | `themes`       | [`ThemeData`]       |
//! | `assignments`  | no       | `assignments`  | [`AssignmentData`]  |
//! | `enchantments` | no       | `enchantments` | [`EnchantmentData`] |
//!
//! File-level problems (missing `themes`, unparsable file, conflicting
//! formats) fail the load. Entry-level problems are collected in a
//! [`LoadReport`], logged, and the entry is skipped.

use std::path::{Path, PathBuf};

use arcanum_core::config::{BindError, ConfigStore};
use arcanum_core::formula::FormulaError;
use arcanum_core::id::{EnchantmentId, ThemeId};
use arcanum_core::quantities::EnchantmentFormulas;
use arcanum_core::registry::{DecodeContext, FormulaRegistry};
use arcanum_power::store::{ThemeError, ThemeSnapshot, ThemeSnapshotBuilder};
use arcanum_power::theme::Theme;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::loader::{DataLoadError, find_data_file, read_entries, require_data_file};
use crate::schema::{AssignmentData, EnchantmentData, ThemeData};

// ===========================================================================
// Report
// ===========================================================================

/// One skipped entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadIssue {
    /// The record did not match its schema.
    #[error("{file} entry {index}: {detail}")]
    Malformed {
        file: PathBuf,
        index: usize,
        detail: String,
    },

    #[error("{file}: {source}")]
    Theme {
        file: PathBuf,
        #[source]
        source: ThemeError,
    },

    #[error("{file}: quantity '{quantity}' of '{enchantment}': {source}")]
    Formula {
        file: PathBuf,
        enchantment: EnchantmentId,
        quantity: String,
        #[source]
        source: FormulaError,
    },

    /// Not a skip: the quantity loaded but its switch uses the fallback.
    #[error("{file}: quantity '{quantity}' of '{enchantment}': {source}")]
    Binding {
        file: PathBuf,
        enchantment: EnchantmentId,
        quantity: String,
        #[source]
        source: BindError,
    },
}

/// Everything the loader reported while building a pack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, issue: LoadIssue) {
        warn!(%issue, "data pack issue");
        self.issues.push(issue);
    }
}

/// A fully loaded pack.
#[derive(Debug)]
pub struct DataPack {
    pub themes: ThemeSnapshot,
    pub formulas: EnchantmentFormulas,
}

// ===========================================================================
// Pipeline
// ===========================================================================

/// Load every data file in `dir`.
///
/// Formula documents decode through `registry`, so kinds registered by other
/// crates are available to data. `config` backs `config_switch` bindings.
pub fn load_data_pack(
    dir: &Path,
    registry: &FormulaRegistry,
    config: &dyn ConfigStore,
) -> Result<(DataPack, LoadReport), DataLoadError> {
    let mut report = LoadReport::default();

    let themes_path = require_data_file(dir, "themes")?;
    let mut builder = ThemeSnapshotBuilder::new();
    for theme in decode_entries::<ThemeData>(&themes_path, "themes", &mut report)? {
        let theme = Theme::from(theme);
        if let Err(source) = builder.add_theme(theme) {
            report.push(LoadIssue::Theme {
                file: themes_path.clone(),
                source,
            });
        }
    }

    if let Some(path) = find_data_file(dir, "assignments")? {
        for entry in decode_entries::<AssignmentData>(&path, "assignments", &mut report)? {
            let enchantment = EnchantmentId::new(&entry.enchantment);
            let theme = ThemeId::new(&entry.theme);
            if let Err(source) = builder.assign_theme(enchantment, theme) {
                report.push(LoadIssue::Theme {
                    file: path.clone(),
                    source,
                });
            }
        }
    }
    let themes = builder.build();

    let mut formulas = EnchantmentFormulas::new();
    if let Some(path) = find_data_file(dir, "enchantments")? {
        for entry in decode_entries::<EnchantmentData>(&path, "enchantments", &mut report)? {
            load_quantities(&path, entry, registry, config, &mut formulas, &mut report);
        }
    }

    info!(
        dir = %dir.display(),
        themes = themes.len(),
        assignments = themes.assignment_count(),
        enchantments = formulas.len(),
        skipped = report.len(),
        "data pack loaded"
    );

    Ok((DataPack { themes, formulas }, report))
}

/// Reads `path` as a list and decodes each entry on its own.
fn decode_entries<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
    report: &mut LoadReport,
) -> Result<Vec<T>, DataLoadError> {
    let raw = read_entries(path, toml_key)?;
    let mut entries = Vec::with_capacity(raw.len());
    for (index, entry) in raw.into_iter().enumerate() {
        match entry.decode() {
            Ok(entry) => entries.push(entry),
            Err(detail) => report.push(LoadIssue::Malformed {
                file: path.to_path_buf(),
                index,
                detail,
            }),
        }
    }
    Ok(entries)
}

fn load_quantities(
    path: &Path,
    entry: EnchantmentData,
    registry: &FormulaRegistry,
    config: &dyn ConfigStore,
    formulas: &mut EnchantmentFormulas,
    report: &mut LoadReport,
) {
    let enchantment = EnchantmentId::new(&entry.id);
    for (quantity, document) in &entry.quantities {
        let mut ctx = DecodeContext::new(registry, config);
        match ctx.decode(document) {
            Ok(formula) => {
                formulas.insert(enchantment.clone(), quantity, formula);
            }
            Err(source) => {
                report.push(LoadIssue::Formula {
                    file: path.to_path_buf(),
                    enchantment: enchantment.clone(),
                    quantity: quantity.clone(),
                    source,
                });
            }
        }
        for source in ctx.take_bind_errors() {
            report.push(LoadIssue::Binding {
                file: path.to_path_buf(),
                enchantment: enchantment.clone(),
                quantity: quantity.clone(),
                source,
            });
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
