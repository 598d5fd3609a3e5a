//! Arcanum Power -- themed power around an enchanting anchor.
//!
//! Blocks near an anchor feed power into themes. Each [`theme::Theme`] owns a
//! list of [`theme::PowerProvider`]s ("these blocks are worth this much"),
//! each optionally refined by [`bonus::PowerBonus`] rules that read block
//! state or an attached container. The [`resolver::PowerResolver`] sums power
//! per theme over a [`neighborhood::Neighborhood`] and reports the dominant
//! theme.
//!
//! # Design
//!
//! - The world is reached only through [`block::BlockQuery`]; nothing here
//!   owns world storage.
//! - A provider block counts only when the cell between it and the anchor
//!   transmits power.
//! - Within a theme a block feeds at most one provider (the first match).
//! - Themes without effects accumulate power but never dominate.
//! - Ties go to the theme registered first.
//! - Themes live in an immutable [`store::ThemeSnapshot`]; reloads swap the
//!   whole snapshot through [`store::ThemeStore`].
//!
//! ```rust
//! use std::sync::Arc;
//! use arcanum_core::id::{BlockId, ThemeId};
//! use arcanum_power::block::BlockPos;
//! use arcanum_power::neighborhood::Neighborhood;
//! use arcanum_power::resolver::PowerResolver;
//! use arcanum_power::store::ThemeSnapshotBuilder;
//! use arcanum_power::test_utils::{GridWorld, plain_effects};
//! use arcanum_power::theme::{PowerProvider, Theme};
//!
//! let mut builder = ThemeSnapshotBuilder::new();
//! builder
//!     .add_theme(
//!         Theme::new("library")
//!             .with_provider(PowerProvider::new([BlockId::new("bookshelf")], 1))
//!             .with_effects(plain_effects()),
//!     )
//!     .unwrap();
//! let resolver = PowerResolver::new(Arc::new(builder.build()));
//!
//! let mut world = GridWorld::new();
//! world.place(BlockPos::new(2, 0, 0), "bookshelf");
//! let result = resolver.resolve(&world, BlockPos::ORIGIN, &Neighborhood::enchanting_table());
//! assert_eq!(result.theme, Some(ThemeId::new("library")));
//! ```

pub mod block;
pub mod bonus;
pub mod neighborhood;
pub mod resolver;
pub mod store;
pub mod theme;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
