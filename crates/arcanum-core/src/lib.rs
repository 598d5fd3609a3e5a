//! Arcanum Core -- level-scaled formulas for data-driven enchantments.
//!
//! This crate holds the parts of the enchanting engine that do not depend on
//! the world: the formula language, the registry that decodes it from data,
//! and the collaborators formulas read from (configuration and randomness).
//!
//! # Key Types
//!
//! - [`formula::ValueExpr`] -- An immutable tree computing a number from an
//!   integer level. Built-in kinds are `constant` (a diminishing-returns
//!   series with an O(1) closed form), `polynomial`, `negate`,
//!   `probabilistic`, and `config_switch`.
//! - [`registry::FormulaRegistry`] -- Name → decoder table, frozen after
//!   [`registry::RegistryBuilder::build`]. Third-party kinds register here
//!   and decode into [`formula::ValueExpr::Extension`].
//! - [`config::ConfigLink`] -- A configuration property bound once when a
//!   `config_switch` is decoded.
//! - [`rng::RandomSource`] -- Caller-supplied randomness; [`rng::SimRng`]
//!   is the deterministic implementation.
//! - [`quantities::EnchantmentFormulas`] -- Named quantities per enchantment.
//!
//! # Decoding
//!
//! ```rust
//! use arcanum_core::config::MapConfigStore;
//! use arcanum_core::registry::{DecodeContext, FormulaRegistry};
//! use arcanum_core::rng::SimRng;
//!
//! let registry = FormulaRegistry::default();
//! let config = MapConfigStore::new();
//! let mut ctx = DecodeContext::new(&registry, &config);
//! let data = serde_json::json!({ "type": "constant", "base": 10, "decrement": 3, "floor": 1 });
//! let expr = ctx.decode(&data).unwrap();
//! assert_eq!(expr.evaluate(5, &mut SimRng::new(0)), 23.0);
//! ```

pub mod config;
pub mod formula;
pub mod id;
pub mod quantities;
pub mod registry;
pub mod rng;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
