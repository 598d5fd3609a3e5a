//! Shared fixtures for resolver tests and benchmarks.
//!
//! Available with `#[cfg(test)]` or the `test-utils` feature.

use std::collections::HashMap;
use std::sync::Arc;

use arcanum_core::id::BlockId;

use crate::block::{Block, BlockPos, BlockQuery, Inventory, ItemStack};
use crate::resolver::PowerResolver;
use crate::store::{ThemeSnapshot, ThemeSnapshotBuilder};
use crate::theme::{EffectSpec, ParticleSpec, PowerProvider, Theme};

// ===========================================================================
// World
// ===========================================================================

/// An in-memory sparse world. Unset positions are air, and air is the only
/// thing that transmits power.
#[derive(Debug, Clone, Default)]
pub struct GridWorld {
    blocks: HashMap<BlockPos, Block>,
    inventories: HashMap<BlockPos, Vec<ItemStack>>,
}

impl GridWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a stateless block.
    pub fn place(&mut self, pos: BlockPos, id: impl Into<BlockId>) {
        self.blocks.insert(pos, Block::new(id));
    }

    pub fn place_block(&mut self, pos: BlockPos, block: Block) {
        self.blocks.insert(pos, block);
    }

    pub fn set_inventory(&mut self, pos: BlockPos, slots: Vec<ItemStack>) {
        self.inventories.insert(pos, slots);
    }

    pub fn clear(&mut self, pos: BlockPos) {
        self.blocks.remove(&pos);
        self.inventories.remove(&pos);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockQuery for GridWorld {
    fn block_at(&self, pos: BlockPos) -> Option<&Block> {
        self.blocks.get(&pos)
    }

    fn transmits_power(&self, pos: BlockPos) -> bool {
        !self.blocks.contains_key(&pos)
    }

    fn inventory_at(&self, pos: BlockPos) -> Option<&dyn Inventory> {
        self.inventories.get(&pos).map(|slots| slots as &dyn Inventory)
    }
}

// ===========================================================================
// Themes
// ===========================================================================

/// One particle attempt per evaluation at 1-in-16 odds.
pub fn plain_effects() -> EffectSpec {
    EffectSpec {
        iterations: 1,
        chance_denominator: 16,
        particle: Some(ParticleSpec {
            particle: "minecraft:enchant".to_string(),
            velocity: [0.0; 3],
            velocity_variance: [0.0; 3],
        }),
        sound: None,
    }
}

/// A theme without effects where `block` is worth `power`.
pub fn single_block_theme(id: &str, block: &str, power: i32) -> Theme {
    Theme::new(id).with_provider(PowerProvider::new([BlockId::new(block)], power))
}

/// Bookshelves worth 1 each, with effects.
pub fn bookshelf_theme(id: &str) -> Theme {
    single_block_theme(id, "bookshelf", 1).with_effects(plain_effects())
}

/// Builds a snapshot, panicking if any theme is rejected.
pub fn snapshot_of(themes: Vec<Theme>) -> ThemeSnapshot {
    let mut builder = ThemeSnapshotBuilder::new();
    let errors = builder.load_themes(themes);
    assert!(errors.is_empty(), "fixture themes rejected: {errors:?}");
    builder.build()
}

pub fn resolver_for(themes: Vec<Theme>) -> PowerResolver {
    PowerResolver::new(Arc::new(snapshot_of(themes)))
}

/// Fills every offset's block cell in `neighborhood` around `anchor`.
pub fn surround(
    world: &mut GridWorld,
    anchor: BlockPos,
    neighborhood: &crate::neighborhood::Neighborhood,
    id: &str,
) {
    for &offset in neighborhood.offsets() {
        world.place(anchor + offset, id);
    }
}
