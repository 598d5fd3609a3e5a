//! Theme snapshots and the atomically swapped store that holds the active one.
//!
//! A [`ThemeSnapshot`] is built once from loaded data and never mutated. On a
//! data reload the host builds a fresh snapshot and hands it to
//! [`ThemeStore::replace`]; resolvers that already hold the previous `Arc`
//! finish against it undisturbed.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use arcanum_core::id::{EnchantmentId, ThemeId};
use tracing::{debug, info, warn};

use crate::resolver::PowerResolver;
use crate::theme::{EffectError, Theme};

/// A theme or assignment entry that was rejected while building a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    #[error("duplicate theme '{0}'")]
    DuplicateTheme(ThemeId),
    #[error("enchantment '{enchantment}' assigned to unknown theme '{theme}'")]
    UnknownTheme {
        enchantment: EnchantmentId,
        theme: ThemeId,
    },
    #[error("theme '{theme}' has invalid effects: {source}")]
    InvalidEffects {
        theme: ThemeId,
        #[source]
        source: EffectError,
    },
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects themes and assignments, then freezes into a [`ThemeSnapshot`].
#[derive(Debug, Default)]
pub struct ThemeSnapshotBuilder {
    themes: Vec<Theme>,
    index: HashMap<ThemeId, usize>,
    assignments: HashMap<EnchantmentId, usize>,
}

impl ThemeSnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one theme. Registration order is kept and later decides ties.
    pub fn add_theme(&mut self, theme: Theme) -> Result<(), ThemeError> {
        if self.index.contains_key(&theme.id) {
            return Err(ThemeError::DuplicateTheme(theme.id));
        }
        if let Some(effects) = &theme.effects {
            effects
                .validate()
                .map_err(|source| ThemeError::InvalidEffects {
                    theme: theme.id.clone(),
                    source,
                })?;
        }
        self.index.insert(theme.id.clone(), self.themes.len());
        self.themes.push(theme);
        Ok(())
    }

    /// Adds every theme, skipping and reporting the ones that are rejected.
    pub fn load_themes(&mut self, themes: Vec<Theme>) -> Vec<ThemeError> {
        let mut errors = Vec::new();
        for theme in themes {
            if let Err(err) = self.add_theme(theme) {
                warn!(error = %err, "skipping theme");
                errors.push(err);
            }
        }
        errors
    }

    /// Routes `enchantment` to `theme`. A later assignment replaces an
    /// earlier one.
    pub fn assign_theme(
        &mut self,
        enchantment: EnchantmentId,
        theme: ThemeId,
    ) -> Result<(), ThemeError> {
        let Some(&slot) = self.index.get(&theme) else {
            return Err(ThemeError::UnknownTheme { enchantment, theme });
        };
        if self.assignments.insert(enchantment.clone(), slot).is_some() {
            debug!(%enchantment, %theme, "theme assignment replaced");
        }
        Ok(())
    }

    pub fn contains(&self, theme: &ThemeId) -> bool {
        self.index.contains_key(theme)
    }

    pub fn build(self) -> ThemeSnapshot {
        let default = self.themes.iter().position(|theme| theme.default);
        ThemeSnapshot {
            themes: self.themes,
            index: self.index,
            assignments: self.assignments,
            default,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An immutable set of themes in registration order, plus assignments.
#[derive(Debug, Default)]
pub struct ThemeSnapshot {
    themes: Vec<Theme>,
    index: HashMap<ThemeId, usize>,
    assignments: HashMap<EnchantmentId, usize>,
    default: Option<usize>,
}

impl ThemeSnapshot {
    /// Themes in registration order.
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn get(&self, id: &ThemeId) -> Option<&Theme> {
        self.index.get(id).map(|&slot| &self.themes[slot])
    }

    /// Position of `id` in registration order.
    pub fn position(&self, id: &ThemeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// The assigned theme, else the first theme flagged `default`.
    pub fn theme_for(&self, enchantment: &EnchantmentId) -> Option<&Theme> {
        self.assignments
            .get(enchantment)
            .copied()
            .or(self.default)
            .map(|slot| &self.themes[slot])
    }

    pub fn default_theme(&self) -> Option<&Theme> {
        self.default.map(|slot| &self.themes[slot])
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Holds the active snapshot. Readers clone the `Arc`; reloads swap it.
#[derive(Debug, Default)]
pub struct ThemeStore {
    current: RwLock<Arc<ThemeSnapshot>>,
}

impl ThemeStore {
    pub fn new(snapshot: ThemeSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn snapshot(&self) -> Arc<ThemeSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Installs `snapshot` and returns the one it replaced.
    pub fn replace(&self, snapshot: ThemeSnapshot) -> Arc<ThemeSnapshot> {
        let next = Arc::new(snapshot);
        let themes = next.len();
        let assignments = next.assignment_count();
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, next);
        drop(guard);
        info!(themes, assignments, "theme snapshot replaced");
        previous
    }

    /// A resolver pinned to the current snapshot.
    pub fn resolver(&self) -> PowerResolver {
        PowerResolver::new(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::EffectSpec;

    fn effects() -> EffectSpec {
        EffectSpec {
            iterations: 1,
            chance_denominator: 16,
            particle: None,
            sound: None,
        }
    }

    #[test]
    fn themes_keep_registration_order() {
        let mut builder = ThemeSnapshotBuilder::new();
        let errors = builder.load_themes(vec![
            Theme::new("zeta"),
            Theme::new("alpha"),
            Theme::new("mid"),
        ]);
        assert!(errors.is_empty());
        let snapshot = builder.build();
        let ids: Vec<&str> = snapshot.themes().iter().map(|t| t.id.path()).collect();
        assert_eq!(ids, ["zeta", "alpha", "mid"]);
        assert_eq!(snapshot.position(&ThemeId::new("mid")), Some(2));
    }

    #[test]
    fn duplicate_theme_is_reported_and_first_kept() {
        let mut builder = ThemeSnapshotBuilder::new();
        let errors = builder.load_themes(vec![
            Theme::new("soul").with_effects(effects()),
            Theme::new("minecraft:soul"),
        ]);
        assert_eq!(errors, vec![ThemeError::DuplicateTheme(ThemeId::new("soul"))]);
        let snapshot = builder.build();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get(&ThemeId::new("soul")).unwrap().has_effects());
    }

    #[test]
    fn invalid_effects_reject_the_theme() {
        let mut builder = ThemeSnapshotBuilder::new();
        let mut bad = effects();
        bad.chance_denominator = 0;
        let errors = builder.load_themes(vec![Theme::new("broken").with_effects(bad)]);
        assert!(matches!(
            &errors[..],
            [ThemeError::InvalidEffects { source: EffectError::ChanceDenominator(0), .. }]
        ));
        assert!(builder.build().is_empty());
    }

    #[test]
    fn assignment_to_unknown_theme_fails() {
        let mut builder = ThemeSnapshotBuilder::new();
        builder.add_theme(Theme::new("soul")).unwrap();
        let err = builder
            .assign_theme(EnchantmentId::new("sharpness"), ThemeId::new("void"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "enchantment 'minecraft:sharpness' assigned to unknown theme 'minecraft:void'"
        );
        assert_eq!(builder.build().assignment_count(), 0);
    }

    #[test]
    fn theme_for_falls_back_to_default() {
        let mut builder = ThemeSnapshotBuilder::new();
        builder.add_theme(Theme::new("plain")).unwrap();
        builder.add_theme(Theme::new("vanilla").as_default()).unwrap();
        builder.add_theme(Theme::new("late_default").as_default()).unwrap();
        builder.add_theme(Theme::new("soul")).unwrap();
        builder
            .assign_theme(EnchantmentId::new("soul_speed"), ThemeId::new("soul"))
            .unwrap();
        let snapshot = builder.build();

        let assigned = snapshot.theme_for(&EnchantmentId::new("soul_speed")).unwrap();
        assert_eq!(assigned.id, ThemeId::new("soul"));
        let fallback = snapshot.theme_for(&EnchantmentId::new("mending")).unwrap();
        assert_eq!(fallback.id, ThemeId::new("vanilla"));
    }

    #[test]
    fn theme_for_without_default_is_none() {
        let mut builder = ThemeSnapshotBuilder::new();
        builder.add_theme(Theme::new("plain")).unwrap();
        let snapshot = builder.build();
        assert!(snapshot.theme_for(&EnchantmentId::new("mending")).is_none());
        assert!(snapshot.default_theme().is_none());
    }

    #[test]
    fn replace_returns_previous_snapshot() {
        let store = ThemeStore::default();
        let before = store.snapshot();
        assert!(before.is_empty());

        let mut builder = ThemeSnapshotBuilder::new();
        builder.add_theme(Theme::new("soul")).unwrap();
        let previous = store.replace(builder.build());

        assert!(Arc::ptr_eq(&before, &previous));
        assert!(before.is_empty());
        assert_eq!(store.snapshot().len(), 1);
    }
}
