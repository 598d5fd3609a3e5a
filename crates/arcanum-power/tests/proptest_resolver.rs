//! Property-based tests for the power resolver.
//!
//! Uses proptest to scatter provider blocks and blockers around an anchor,
//! then checks determinism and the dominance rules.

use arcanum_core::id::ThemeId;
use arcanum_power::block::BlockPos;
use arcanum_power::neighborhood::Neighborhood;
use arcanum_power::resolver::PowerResolver;
use arcanum_power::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

const KINDS: [&str; 4] = ["bookshelf", "sculk", "torch", "stone"];

/// For each ring offset: nothing, or one of `KINDS`. Plus blocked transmitters.
fn arb_world() -> impl Strategy<Value = GridWorld> {
    let ring = Neighborhood::enchanting_table();
    let count = ring.len();
    (
        proptest::collection::vec(proptest::option::of(0..KINDS.len()), count),
        proptest::collection::vec(any::<bool>(), count),
    )
        .prop_map(move |(cells, blocked)| {
            let mut world = GridWorld::new();
            for ((offset, cell), blocked) in ring.offsets().iter().zip(cells).zip(blocked) {
                if let Some(kind) = cell {
                    world.place(*offset, KINDS[kind]);
                }
                if blocked {
                    world.place(Neighborhood::transmitter(BlockPos::ORIGIN, *offset), "stone");
                }
            }
            world
        })
}

fn themed_resolver() -> PowerResolver {
    resolver_for(vec![
        bookshelf_theme("library"),
        single_block_theme("sculk", "sculk", 1).with_effects(plain_effects()),
        single_block_theme("ambient", "torch", 1),
    ])
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Two resolves over identical input are identical.
    #[test]
    fn resolve_is_deterministic(world in arb_world()) {
        let resolver = themed_resolver();
        let ring = Neighborhood::enchanting_table();
        let first = resolver.resolve(&world, BlockPos::ORIGIN, &ring);
        let second = resolver.resolve(&world, BlockPos::ORIGIN, &ring);
        prop_assert_eq!(first, second);
    }

    /// Per-theme totals are exactly the sum of the reported sources.
    #[test]
    fn totals_match_sources(world in arb_world()) {
        let resolver = themed_resolver();
        let ring = Neighborhood::enchanting_table();
        let result = resolver.resolve(&world, BlockPos::ORIGIN, &ring);
        let sources = resolver.sources(&world, BlockPos::ORIGIN, &ring);
        let summed: i32 = sources.iter().map(|s| s.power).sum();
        prop_assert_eq!(result.total_power(), summed);
        prop_assert!(sources.len() <= ring.len());
    }

    /// The winner has effects, positive power, and no effect theme beats it.
    #[test]
    fn winner_is_a_maximal_effect_theme(world in arb_world()) {
        let resolver = themed_resolver();
        let result = resolver.resolve(&world, BlockPos::ORIGIN, &Neighborhood::enchanting_table());
        let library = result.power_of(&ThemeId::new("library"));
        let sculk = result.power_of(&ThemeId::new("sculk"));
        match &result.theme {
            None => prop_assert!(library <= 0 && sculk <= 0),
            Some(theme) => {
                prop_assert_ne!(theme, &ThemeId::new("ambient"));
                let best = result.power_of(theme);
                prop_assert!(best > 0);
                prop_assert!(best >= library && best >= sculk);
                if library == sculk {
                    prop_assert_eq!(theme, &ThemeId::new("library"));
                }
            }
        }
    }
}
