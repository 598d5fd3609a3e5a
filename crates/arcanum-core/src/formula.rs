//! Level-scaled quantities.
//!
//! A [`ValueExpr`] is an immutable tree describing a number that depends on
//! an integer enchantment level. The built-in variants form a closed enum;
//! third-party kinds travel through [`ValueExpr::Extension`] and are produced
//! by decoders registered in the [`FormulaRegistry`](crate::registry::FormulaRegistry).
//!
//! Evaluation is pure given `(level, rng, config snapshot)`. The only side
//! effect is consuming draws from the caller's [`RandomSource`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::config::ConfigLink;
use crate::rng::RandomSource;

/// Decrements within this distance of zero are treated as "no decay".
pub const DECAY_EPSILON: f32 = 1.0e-6;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors raised by formula decoding, registration, and checked evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("formula type '{name}' is already registered")]
    DuplicateFormula { name: String },

    #[error("unknown formula type '{name}'")]
    UnknownFormula { name: String },

    #[error("formula document has no 'type' tag")]
    MissingType,

    #[error("malformed '{kind}' formula: {detail}")]
    Malformed { kind: String, detail: String },

    #[error("formula evaluated at negative level {0}")]
    NegativeLevel(i32),
}

// ===========================================================================
// Extension point
// ===========================================================================

/// A formula kind defined outside this crate.
pub trait LevelFormula: fmt::Debug + Send + Sync {
    /// Registry name this formula decodes from.
    fn kind(&self) -> &str;

    fn evaluate(&self, level: i32, rng: &mut dyn RandomSource) -> f32;

    /// Encode the formula's fields (the `type` tag is added by the caller).
    fn encode(&self) -> Value;
}

// ===========================================================================
// ValueExpr
// ===========================================================================

/// A quantity that depends on an integer level.
#[derive(Debug, Clone)]
pub enum ValueExpr {
    /// Diminishing-returns series: each level adds `base - i * decrement`,
    /// never less than `floor`.
    Constant { base: f32, decrement: f32, floor: f32 },
    /// `offset + scale * (level + level_offset) ^ power`.
    Polynomial {
        scale: f32,
        power: f32,
        offset: f32,
        level_offset: f32,
    },
    Negate(Box<ValueExpr>),
    /// `0.0` when a draw lands under the inner chance, `1.0` otherwise.
    ///
    /// Not referentially transparent: every evaluation consumes one draw.
    Probabilistic(Box<ValueExpr>),
    ConfigSwitch(ConfigSwitch),
    Extension(Arc<dyn LevelFormula>),
}

impl ValueExpr {
    pub fn constant(base: f32, decrement: f32, floor: f32) -> Self {
        Self::Constant {
            base,
            decrement,
            floor,
        }
    }

    /// A flat per-level amount.
    pub fn per_level(amount: f32) -> Self {
        Self::constant(amount, 0.0, amount)
    }

    pub fn polynomial(scale: f32, power: f32, offset: f32, level_offset: f32) -> Self {
        Self::Polynomial {
            scale,
            power,
            offset,
            level_offset,
        }
    }

    pub fn negate(inner: ValueExpr) -> Self {
        Self::Negate(Box::new(inner))
    }

    pub fn probabilistic(chance: ValueExpr) -> Self {
        Self::Probabilistic(Box::new(chance))
    }

    pub fn extension(formula: impl LevelFormula + 'static) -> Self {
        Self::Extension(Arc::new(formula))
    }

    /// Registry name of this node.
    pub fn kind(&self) -> &str {
        match self {
            Self::Constant { .. } => "constant",
            Self::Polynomial { .. } => "polynomial",
            Self::Negate(_) => "negate",
            Self::Probabilistic(_) => "probabilistic",
            Self::ConfigSwitch(_) => "config_switch",
            Self::Extension(formula) => formula.kind(),
        }
    }

    /// Evaluate at `level`.
    ///
    /// Total over all levels: out-of-domain levels are clamped by each
    /// variant rather than rejected (the series yields `0.0` for
    /// `level <= 0`). Use [`checked_evaluate`](Self::checked_evaluate) to
    /// reject negative levels instead.
    pub fn evaluate(&self, level: i32, rng: &mut dyn RandomSource) -> f32 {
        match self {
            Self::Constant {
                base,
                decrement,
                floor,
            } => diminishing_sum(*base, *decrement, *floor, level),
            Self::Polynomial {
                scale,
                power,
                offset,
                level_offset,
            } => offset + scale * (level as f32 + level_offset).powf(*power),
            Self::Negate(inner) => -inner.evaluate(level, rng),
            Self::Probabilistic(chance) => {
                let chance = chance.evaluate(level, rng);
                if rng.next_uniform() < chance { 0.0 } else { 1.0 }
            }
            Self::ConfigSwitch(switch) => switch.select().evaluate(level, rng),
            Self::Extension(formula) => formula.evaluate(level, rng),
        }
    }

    /// Like [`evaluate`](Self::evaluate), but a negative level is an error.
    pub fn checked_evaluate(
        &self,
        level: i32,
        rng: &mut dyn RandomSource,
    ) -> Result<f32, FormulaError> {
        if level < 0 {
            return Err(FormulaError::NegativeLevel(level));
        }
        Ok(self.evaluate(level, rng))
    }

    /// Encode back into the tagged document form the registry decodes.
    pub fn encode(&self) -> Value {
        match self {
            Self::Constant {
                base,
                decrement,
                floor,
            } => json!({
                "type": "constant",
                "base": base,
                "decrement": decrement,
                "floor": floor,
            }),
            Self::Polynomial {
                scale,
                power,
                offset,
                level_offset,
            } => json!({
                "type": "polynomial",
                "scale": scale,
                "power": power,
                "offset": offset,
                "level_offset": level_offset,
            }),
            Self::Negate(inner) => json!({ "type": "negate", "value": inner.encode() }),
            Self::Probabilistic(chance) => {
                json!({ "type": "probabilistic", "chance": chance.encode() })
            }
            Self::ConfigSwitch(switch) => {
                let cases: Map<String, Value> = switch
                    .cases
                    .iter()
                    .map(|(value, expr)| (value.clone(), expr.encode()))
                    .collect();
                json!({
                    "type": "config_switch",
                    "property": switch.link.key(),
                    "cases": cases,
                    "fallback": switch.fallback.encode(),
                })
            }
            Self::Extension(formula) => match formula.encode() {
                Value::Object(mut fields) => {
                    fields.insert("type".to_string(), Value::from(formula.kind()));
                    Value::Object(fields)
                }
                other => json!({ "type": formula.kind(), "value": other }),
            },
        }
    }
}

// ===========================================================================
// ConfigSwitch
// ===========================================================================

/// Picks a sub-formula by the current value of a configuration property.
///
/// The property is bound when the switch is built. An unbound switch always
/// evaluates its fallback.
#[derive(Debug, Clone)]
pub struct ConfigSwitch {
    link: ConfigLink,
    cases: BTreeMap<String, ValueExpr>,
    fallback: Box<ValueExpr>,
}

impl ConfigSwitch {
    pub fn new(link: ConfigLink, cases: BTreeMap<String, ValueExpr>, fallback: ValueExpr) -> Self {
        Self {
            link,
            cases,
            fallback: Box::new(fallback),
        }
    }

    pub fn link(&self) -> &ConfigLink {
        &self.link
    }

    pub fn cases(&self) -> &BTreeMap<String, ValueExpr> {
        &self.cases
    }

    pub fn fallback(&self) -> &ValueExpr {
        &self.fallback
    }

    /// The branch selected by the property's current value.
    pub fn select(&self) -> &ValueExpr {
        self.link
            .current()
            .and_then(|value| self.cases.get(&value))
            .unwrap_or(&self.fallback)
    }
}

impl From<ConfigSwitch> for ValueExpr {
    fn from(switch: ConfigSwitch) -> Self {
        Self::ConfigSwitch(switch)
    }
}

// ===========================================================================
// Diminishing-returns series
// ===========================================================================

/// Sum of the diminishing-returns series over `level` terms, in O(1).
///
/// Term `i` is `base - i * decrement` until that would pass `floor`; every
/// later term is `floor`. The first term is always `base`, even when it is
/// already below `floor`.
///
/// - `level <= 0` yields `0.0`.
/// - A decrement within [`DECAY_EPSILON`] of zero yields `level * max(base, floor)`.
/// - A negative decrement (a growing sequence) is summed term by term.
pub fn diminishing_sum(base: f32, decrement: f32, floor: f32, level: i32) -> f32 {
    if level <= 0 {
        return 0.0;
    }
    let levels = level as f32;

    if decrement.abs() <= DECAY_EPSILON {
        return levels * base.max(floor);
    }
    if decrement < 0.0 {
        return diminishing_sum_iterative(base, decrement, floor, level);
    }

    // Levels before the sequence reaches the floor; never less than one.
    let term_count = (((base - floor) / decrement).floor() + 1.0).max(1.0);
    let count = levels.min(term_count);

    let mut sum = count * (2.0 * base - (count - 1.0) * decrement) / 2.0;
    if levels > count {
        sum += (levels - count) * floor;
    }
    sum
}

/// Term-by-term reference for [`diminishing_sum`]. O(level).
pub fn diminishing_sum_iterative(base: f32, decrement: f32, floor: f32, level: i32) -> f32 {
    let mut sum = 0.0;
    for i in 0..level.max(0) {
        let term = base - i as f32 * decrement;
        sum += if i == 0 { term } else { term.max(floor) };
    }
    sum
}
