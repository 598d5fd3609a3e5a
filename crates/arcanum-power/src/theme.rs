use std::collections::BTreeSet;
use std::fmt;

use arcanum_core::id::{BlockId, ThemeId};
use arcanum_core::rng::RandomSource;
use serde::{Deserialize, Serialize};

use crate::block::{Block, Inventory};
use crate::bonus::PowerBonus;

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// "These blocks contribute this much power."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerProvider {
    pub blocks: BTreeSet<BlockId>,
    pub base_power: i32,
    #[serde(default)]
    pub bonuses: Vec<PowerBonus>,
}

impl PowerProvider {
    pub fn new(blocks: impl IntoIterator<Item = BlockId>, base_power: i32) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
            base_power,
            bonuses: Vec::new(),
        }
    }

    pub fn with_bonus(mut self, bonus: PowerBonus) -> Self {
        self.bonuses.push(bonus);
        self
    }

    pub fn matches(&self, block: &BlockId) -> bool {
        self.blocks.contains(block)
    }

    /// Base power plus every bonus, saturating.
    pub fn contribution(&self, block: &Block, inventory: Option<&dyn Inventory>) -> i32 {
        self.bonuses.iter().fold(self.base_power, |total, bonus| {
            total.saturating_add(bonus.apply(self.base_power, block, inventory))
        })
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// A packed `0xRRGGBB` display color.
///
/// Deserializes from either an integer or a `"#RRGGBB"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "u32")]
pub struct Color(pub u32);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Parses `#RRGGBB`, `0xRRGGBB`, or bare `RRGGBB`.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text
            .strip_prefix('#')
            .or_else(|| text.strip_prefix("0x"))
            .unwrap_or(text);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self)
    }

    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0 & 0x00FF_FFFF)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Packed(u32),
    Hex(String),
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Packed(value) if value <= 0x00FF_FFFF => Ok(Self(value)),
            ColorRepr::Packed(value) => Err(format!("color {value:#X} exceeds 0xFFFFFF")),
            ColorRepr::Hex(text) => {
                Self::parse_hex(&text).ok_or_else(|| format!("invalid hex color '{text}'"))
            }
        }
    }
}

/// Particle emitted toward the anchor from each contributing block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSpec {
    pub particle: String,
    #[serde(default)]
    pub velocity: [f32; 3],
    #[serde(default)]
    pub velocity_variance: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSpec {
    pub sound: String,
    #[serde(default = "default_unit")]
    pub volume: f32,
    #[serde(default)]
    pub volume_variance: f32,
    #[serde(default = "default_unit")]
    pub pitch: f32,
    #[serde(default)]
    pub pitch_variance: f32,
}

fn default_unit() -> f32 {
    1.0
}

fn default_iterations() -> i32 {
    1
}

fn default_chance_denominator() -> i32 {
    16
}

/// Rejected effect parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("iterations must be non-negative, got {0}")]
    NegativeIterations(i32),
    #[error("chance denominator must be at least 1, got {0}")]
    ChanceDenominator(i32),
}

/// How often and how a dominant theme shows itself.
///
/// Each evaluation makes `iterations` attempts, each succeeding with
/// probability `1 / chance_denominator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    #[serde(default = "default_iterations")]
    pub iterations: i32,
    #[serde(default = "default_chance_denominator")]
    pub chance_denominator: i32,
    #[serde(default)]
    pub particle: Option<ParticleSpec>,
    #[serde(default)]
    pub sound: Option<SoundSpec>,
}

impl EffectSpec {
    pub fn validate(&self) -> Result<(), EffectError> {
        if self.iterations < 0 {
            return Err(EffectError::NegativeIterations(self.iterations));
        }
        if self.chance_denominator < 1 {
            return Err(EffectError::ChanceDenominator(self.chance_denominator));
        }
        Ok(())
    }

    /// Number of successful attempts this evaluation. One draw per attempt.
    pub fn roll(&self, rng: &mut dyn RandomSource) -> u32 {
        if self.chance_denominator < 1 {
            return 0;
        }
        let chance = 1.0 / self.chance_denominator as f32;
        let mut successes = 0;
        for _ in 0..self.iterations.max(0) {
            if rng.next_uniform() < chance {
                successes += 1;
            }
        }
        successes
    }
}

// ---------------------------------------------------------------------------
// Themes
// ---------------------------------------------------------------------------

/// A named bundle of providers plus the effects shown when it dominates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub providers: Vec<PowerProvider>,
    #[serde(default)]
    pub effects: Option<EffectSpec>,
    /// Fallback for enchantments without an explicit assignment.
    #[serde(default)]
    pub default: bool,
}

impl Theme {
    pub fn new(id: impl Into<ThemeId>) -> Self {
        Self {
            id: id.into(),
            color: None,
            providers: Vec::new(),
            effects: None,
            default: false,
        }
    }

    pub fn with_provider(mut self, provider: PowerProvider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_effects(mut self, effects: EffectSpec) -> Self {
        self.effects = Some(effects);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    /// Themes without effects still accumulate power but never dominate.
    pub fn has_effects(&self) -> bool {
        self.effects.is_some()
    }

    /// The first provider that claims `block`.
    pub fn provider_for(&self, block: &BlockId) -> Option<&PowerProvider> {
        self.providers.iter().find(|provider| provider.matches(block))
    }
}
