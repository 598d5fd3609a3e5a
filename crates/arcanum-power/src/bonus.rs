use std::collections::BTreeSet;

use arcanum_core::id::ItemId;
use serde::{Deserialize, Serialize};

use crate::block::{Block, Inventory};

/// A conditional modifier on top of a provider's base power.
///
/// Every bonus reads one block and at most one attached inventory. A bonus
/// whose property or inventory is missing contributes `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PowerBonus {
    /// `bonus` when the property's string form equals `value`.
    AddIfState {
        property: String,
        value: String,
        bonus: i32,
    },
    /// `base_power * property`, for integer properties.
    MultiplyByState { property: String },
    /// `bonus_per_item` for every matching item in the attached container.
    CountItemsInContainer {
        items: BTreeSet<ItemId>,
        bonus_per_item: i32,
    },
}

impl PowerBonus {
    /// The amount this bonus adds to `base_power` for `block`.
    pub fn apply(&self, base_power: i32, block: &Block, inventory: Option<&dyn Inventory>) -> i32 {
        match self {
            Self::AddIfState {
                property,
                value,
                bonus,
            } => match block.property(property) {
                Some(state) if state.to_string() == *value => *bonus,
                _ => 0,
            },
            Self::MultiplyByState { property } => block
                .property(property)
                .and_then(|state| state.as_int())
                .map_or(0, |factor| base_power.saturating_mul(factor)),
            Self::CountItemsInContainer {
                items,
                bonus_per_item,
            } => {
                let Some(inventory) = inventory else {
                    return 0;
                };
                let matching: u32 = (0..inventory.slot_count())
                    .filter_map(|slot| inventory.slot(slot))
                    .filter(|stack| items.contains(&stack.item))
                    .fold(0u32, |total, stack| total.saturating_add(stack.count));
                let matching = i32::try_from(matching).unwrap_or(i32::MAX);
                bonus_per_item.saturating_mul(matching)
            }
        }
    }
}
