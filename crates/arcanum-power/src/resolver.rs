//! Power accumulation and dominant-theme selection.
//!
//! The resolver walks a [`Neighborhood`] around an anchor. For each offset
//! whose transmitter cell is clear it looks up the block there and asks every
//! theme, in registration order, for its first matching provider. The
//! provider's contribution (base power plus bonuses) is credited to that
//! theme.
//!
//! Dominance is decided only among themes that define effects:
//!
//! - the theme with the strictly highest total wins;
//! - on equal totals the theme registered first wins;
//! - a total of zero or less never wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use arcanum_core::id::ThemeId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::{BlockPos, BlockQuery};
use crate::neighborhood::Neighborhood;
use crate::store::ThemeSnapshot;

/// One block's contribution to one theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSource {
    /// Offset from the anchor to the contributing block.
    pub offset: BlockPos,
    pub theme: ThemeId,
    pub power: i32,
}

/// Outcome of [`PowerResolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominanceResult {
    /// The dominant theme, if any theme with effects has positive power.
    pub theme: Option<ThemeId>,
    /// Accumulated power for every theme that matched at least one block,
    /// including themes without effects.
    pub total_power_by_theme: BTreeMap<ThemeId, i32>,
}

impl DominanceResult {
    /// "No dominant theme" with nothing accumulated.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn power_of(&self, theme: &ThemeId) -> i32 {
        self.total_power_by_theme.get(theme).copied().unwrap_or(0)
    }

    /// Sum over all themes, saturating.
    pub fn total_power(&self) -> i32 {
        self.total_power_by_theme
            .values()
            .fold(0i32, |sum, power| sum.saturating_add(*power))
    }
}

/// Resolves power against one pinned theme snapshot.
#[derive(Debug, Clone)]
pub struct PowerResolver {
    snapshot: Arc<ThemeSnapshot>,
}

impl PowerResolver {
    pub fn new(snapshot: Arc<ThemeSnapshot>) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &Arc<ThemeSnapshot> {
        &self.snapshot
    }

    /// Every contribution around `anchor`, in neighborhood order and then
    /// theme registration order. No dominance selection; themes without
    /// effects are included.
    pub fn sources<W>(&self, world: &W, anchor: BlockPos, neighborhood: &Neighborhood) -> Vec<PowerSource>
    where
        W: BlockQuery + ?Sized,
    {
        let mut sources = Vec::new();
        for &offset in neighborhood.offsets() {
            if !world.transmits_power(Neighborhood::transmitter(anchor, offset)) {
                continue;
            }
            let pos = anchor + offset;
            let Some(block) = world.block_at(pos) else {
                continue;
            };
            let inventory = world.inventory_at(pos);
            for theme in self.snapshot.themes() {
                if let Some(provider) = theme.provider_for(&block.id) {
                    sources.push(PowerSource {
                        offset,
                        theme: theme.id.clone(),
                        power: provider.contribution(block, inventory),
                    });
                }
            }
        }
        sources
    }

    /// Accumulates power per theme and picks the dominant one.
    pub fn resolve<W>(&self, world: &W, anchor: BlockPos, neighborhood: &Neighborhood) -> DominanceResult
    where
        W: BlockQuery + ?Sized,
    {
        let mut totals: BTreeMap<ThemeId, i32> = BTreeMap::new();
        for source in self.sources(world, anchor, neighborhood) {
            let total = totals.entry(source.theme).or_insert(0);
            *total = total.saturating_add(source.power);
        }

        let mut winner: Option<(&ThemeId, i32)> = None;
        for theme in self.snapshot.themes().iter().filter(|theme| theme.has_effects()) {
            let power = totals.get(&theme.id).copied().unwrap_or(0);
            if power <= 0 {
                continue;
            }
            if winner.is_none_or(|(_, best)| power > best) {
                winner = Some((&theme.id, power));
            }
        }
        let theme = winner.map(|(id, _)| id.clone());

        debug!(
            %anchor,
            themes = totals.len(),
            dominant = theme.as_ref().map(ThemeId::as_str),
            "resolved power"
        );

        DominanceResult {
            theme,
            total_power_by_theme: totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        GridWorld, bookshelf_theme, plain_effects, resolver_for as resolver, single_block_theme,
    };

    fn ring() -> Neighborhood {
        Neighborhood::enchanting_table()
    }

    #[test]
    fn empty_world_has_no_dominant_theme() {
        let resolver = resolver(vec![bookshelf_theme("library")]);
        let result = resolver.resolve(&GridWorld::new(), BlockPos::ORIGIN, &ring());
        assert_eq!(result, DominanceResult::none());
    }

    #[test]
    fn bookshelves_accumulate_into_their_theme() {
        let mut world = GridWorld::new();
        world.place(BlockPos::new(2, 0, 0), "bookshelf");
        world.place(BlockPos::new(-2, 1, 1), "bookshelf");
        world.place(BlockPos::new(0, 0, 2), "stone");

        let resolver = resolver(vec![bookshelf_theme("library")]);
        let result = resolver.resolve(&world, BlockPos::ORIGIN, &ring());
        let library = ThemeId::new("library");
        assert_eq!(result.theme, Some(library.clone()));
        assert_eq!(result.power_of(&library), 2);
        assert_eq!(result.total_power(), 2);
    }

    #[test]
    fn blocked_transmitter_skips_offset() {
        let mut world = GridWorld::new();
        world.place(BlockPos::new(2, 0, 0), "bookshelf");
        world.place(BlockPos::new(1, 0, 0), "stone");

        let resolver = resolver(vec![bookshelf_theme("library")]);
        let result = resolver.resolve(&world, BlockPos::ORIGIN, &ring());
        assert_eq!(result.theme, None);
        assert!(result.total_power_by_theme.is_empty());
    }

    #[test]
    fn tie_goes_to_first_registered_theme() {
        let mut world = GridWorld::new();
        world.place(BlockPos::new(2, 0, 0), "amethyst_cluster");
        world.place(BlockPos::new(-2, 0, 0), "sculk");

        let resolver = resolver(vec![
            single_block_theme("sculk_theme", "sculk", 1).with_effects(plain_effects()),
            single_block_theme("amethyst_theme", "amethyst_cluster", 1)
                .with_effects(plain_effects()),
        ]);
        let result = resolver.resolve(&world, BlockPos::ORIGIN, &ring());
        assert_eq!(result.theme, Some(ThemeId::new("sculk_theme")));
        assert_eq!(result.power_of(&ThemeId::new("amethyst_theme")), 1);
    }

    #[test]
    fn effectless_theme_accumulates_but_never_dominates() {
        let mut world = GridWorld::new();
        for z in -2..=2 {
            world.place(BlockPos::new(2, 0, z), "torch");
        }
        world.place(BlockPos::new(-2, 0, 0), "bookshelf");

        let resolver = resolver(vec![
            single_block_theme("ambient", "torch", 1),
            bookshelf_theme("library"),
        ]);
        let result = resolver.resolve(&world, BlockPos::ORIGIN, &ring());
        assert_eq!(result.power_of(&ThemeId::new("ambient")), 5);
        assert_eq!(result.theme, Some(ThemeId::new("library")));
    }

    #[test]
    fn non_positive_power_never_dominates() {
        let mut world = GridWorld::new();
        world.place(BlockPos::new(2, 0, 0), "wither_rose");

        let resolver = resolver(vec![
            single_block_theme("withering", "wither_rose", -3).with_effects(plain_effects()),
        ]);
        let result = resolver.resolve(&world, BlockPos::ORIGIN, &ring());
        assert_eq!(result.theme, None);
        assert_eq!(result.power_of(&ThemeId::new("withering")), -3);
    }

    #[test]
    fn one_block_feeds_several_themes_once_each() {
        let mut world = GridWorld::new();
        world.place(BlockPos::new(2, 1, 2), "bookshelf");

        let resolver = resolver(vec![bookshelf_theme("library"), bookshelf_theme("archive")]);
        let sources = resolver.sources(&world, BlockPos::ORIGIN, &ring());
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].theme, ThemeId::new("library"));
        assert_eq!(sources[1].theme, ThemeId::new("archive"));
        assert!(sources.iter().all(|s| s.offset == BlockPos::new(2, 1, 2) && s.power == 1));
    }

    #[test]
    fn sources_follow_neighborhood_order() {
        let mut world = GridWorld::new();
        world.place(BlockPos::new(12, 64, 10), "bookshelf");
        world.place(BlockPos::new(8, 64, 10), "bookshelf");
        let anchor = BlockPos::new(10, 64, 10);

        let resolver = resolver(vec![bookshelf_theme("library")]);
        let offsets: Vec<BlockPos> = resolver
            .sources(&world, anchor, &ring())
            .into_iter()
            .map(|s| s.offset)
            .collect();
        assert_eq!(offsets, vec![BlockPos::new(-2, 0, 0), BlockPos::new(2, 0, 0)]);
    }
}
