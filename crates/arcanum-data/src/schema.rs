//! Serde record shapes for data-pack files.
//!
//! These structs define the on-disk format for themes, theme assignments,
//! and enchantment quantities. Every file is a list of records; each record
//! is decoded on its own so one malformed entry does not sink the file.

use std::collections::BTreeMap;

use arcanum_core::id::BlockId;
use arcanum_power::bonus::PowerBonus;
use arcanum_power::theme::{Color, EffectSpec, PowerProvider, Theme};
use serde::Deserialize;

// ===========================================================================
// Themes
// ===========================================================================

/// A theme definition in `themes.*`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeData {
    pub id: String,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub providers: Vec<ProviderData>,
    #[serde(default)]
    pub effects: Option<EffectSpec>,
    #[serde(default)]
    pub default: bool,
}

/// Either one block id or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BlocksData {
    /// Short form: `"bookshelf"`.
    One(String),
    Many(Vec<String>),
}

impl BlocksData {
    fn into_ids(self) -> Vec<BlockId> {
        match self {
            Self::One(id) => vec![BlockId::new(&id)],
            Self::Many(ids) => ids.iter().map(|id| BlockId::new(id)).collect(),
        }
    }
}

/// A power provider inside a theme.
///
/// `base_power` is accepted for `power`, so serialized `PowerProvider`s
/// load unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderData {
    pub blocks: BlocksData,
    #[serde(default = "default_power", alias = "base_power")]
    pub power: i32,
    #[serde(default)]
    pub bonuses: Vec<PowerBonus>,
}

fn default_power() -> i32 {
    1
}

impl From<ThemeData> for Theme {
    fn from(data: ThemeData) -> Self {
        let mut theme = Theme::new(data.id);
        theme.color = data.color;
        theme.effects = data.effects;
        theme.default = data.default;
        theme.providers = data
            .providers
            .into_iter()
            .map(|provider| PowerProvider {
                blocks: provider.blocks.into_ids().into_iter().collect(),
                base_power: provider.power,
                bonuses: provider.bonuses,
            })
            .collect();
        theme
    }
}

// ===========================================================================
// Assignments
// ===========================================================================

/// `enchantment -> theme` in `assignments.*`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignmentData {
    pub enchantment: String,
    pub theme: String,
}

// ===========================================================================
// Enchantments
// ===========================================================================

/// Named level-scaled quantities for one enchantment in `enchantments.*`.
///
/// Quantity values stay as raw documents here; the formula registry decodes
/// them, so third-party formula kinds need no schema changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnchantmentData {
    pub id: String,
    #[serde(default)]
    pub quantities: BTreeMap<String, serde_json::Value>,
}
