//! Per-enchantment tables of named level-scaled quantities.

use std::collections::{BTreeMap, HashMap};

use crate::formula::ValueExpr;
use crate::id::EnchantmentId;
use crate::rng::RandomSource;

/// Enchantment id → quantity name → formula.
///
/// Quantity names are free-form (`"cost"`, `"magnitude"`, ...) and are
/// agreed on between the data pack and the effect code that reads them.
#[derive(Debug, Clone, Default)]
pub struct EnchantmentFormulas {
    entries: HashMap<EnchantmentId, BTreeMap<String, ValueExpr>>,
}

impl EnchantmentFormulas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a quantity, returning the formula it replaced.
    pub fn insert(
        &mut self,
        enchantment: EnchantmentId,
        quantity: &str,
        formula: ValueExpr,
    ) -> Option<ValueExpr> {
        self.entries
            .entry(enchantment)
            .or_default()
            .insert(quantity.to_string(), formula)
    }

    pub fn get(&self, enchantment: &EnchantmentId, quantity: &str) -> Option<&ValueExpr> {
        self.entries.get(enchantment)?.get(quantity)
    }

    /// All quantities of one enchantment, ordered by name.
    pub fn quantities(&self, enchantment: &EnchantmentId) -> Option<&BTreeMap<String, ValueExpr>> {
        self.entries.get(enchantment)
    }

    /// Evaluate a quantity, or `None` if it is not defined.
    pub fn evaluate(
        &self,
        enchantment: &EnchantmentId,
        quantity: &str,
        level: i32,
        rng: &mut dyn RandomSource,
    ) -> Option<f32> {
        self.get(enchantment, quantity)
            .map(|formula| formula.evaluate(level, rng))
    }

    /// Number of enchantments with at least one quantity.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
