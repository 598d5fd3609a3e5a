//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use serde_json::Value;

use crate::config::MapConfigStore;
use crate::formula::{FormulaError, ValueExpr};
use crate::registry::{DecodeContext, FormulaRegistry};
use crate::rng::RandomSource;

// ===========================================================================
// Random sources
// ===========================================================================

/// Replays a fixed list of samples, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    samples: Vec<f32>,
    draws: usize,
}

impl ScriptedRng {
    pub fn new(samples: Vec<f32>) -> Self {
        assert!(!samples.is_empty(), "ScriptedRng needs at least one sample");
        Self { samples, draws: 0 }
    }

    /// Number of samples handed out so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for ScriptedRng {
    fn next_uniform(&mut self) -> f32 {
        let sample = self.samples[self.draws % self.samples.len()];
        self.draws += 1;
        sample
    }
}

// ===========================================================================
// Formulas
// ===========================================================================

/// Decode `data` with the built-in registry and an empty config store.
pub fn decode_json(data: &Value) -> Result<ValueExpr, FormulaError> {
    let registry = FormulaRegistry::default();
    let config = MapConfigStore::new();
    DecodeContext::new(&registry, &config).decode(data)
}

// ===========================================================================
// Assertions
// ===========================================================================

/// Relative tolerance used when comparing series sums.
pub const TOLERANCE: f32 = 1.0e-4;

/// Whether `actual` is within [`TOLERANCE`] of `expected`, relative to
/// `max(1, |expected|)`.
pub fn approx_eq(actual: f32, expected: f32) -> bool {
    (actual - expected).abs() <= TOLERANCE * expected.abs().max(1.0)
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        approx_eq(actual, expected),
        "expected {expected}, got {actual}"
    );
}
