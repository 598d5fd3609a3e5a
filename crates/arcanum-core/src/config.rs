//! External configuration properties and the link formulas hold to them.
//!
//! The engine does not own configuration. A [`ConfigStore`] supplied by the
//! host resolves fully-qualified keys to live [`ConfigProperty`] handles. A
//! [`ConfigLink`] performs that lookup exactly once; afterwards it reads the
//! property's current value on demand, or stays unbound for good.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A live configuration value owned by the host.
pub trait ConfigProperty: Send + Sync {
    /// The property's current value in string form.
    fn current(&self) -> String;
}

/// Shared handle to a host-owned property.
pub type PropertyHandle = Arc<dyn ConfigProperty>;

/// Resolves fully-qualified property keys.
pub trait ConfigStore {
    /// Look up a property handle, or `None` if the key is absent.
    fn lookup(&self, key: &str) -> Option<PropertyHandle>;

    /// Current string value of `key`, or `None` if absent.
    fn value(&self, key: &str) -> Option<String> {
        self.lookup(key).map(|property| property.current())
    }
}

/// Errors raised while binding a formula to a configuration property.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("config property '{key}' not found")]
    NotFound { key: String },
}

// ---------------------------------------------------------------------------
// ConfigLink
// ---------------------------------------------------------------------------

/// A property reference resolved once, at construction.
///
/// A failed bind is permanent: the link reports `None` for its whole
/// lifetime, even if the property appears in the store later.
#[derive(Clone)]
pub struct ConfigLink {
    key: String,
    handle: Option<PropertyHandle>,
}

impl ConfigLink {
    /// Resolve `key` against `store`.
    pub fn bind(store: &dyn ConfigStore, key: &str) -> Result<Self, BindError> {
        let handle = store.lookup(key).ok_or_else(|| BindError::NotFound {
            key: key.to_string(),
        })?;
        Ok(Self {
            key: key.to_string(),
            handle: Some(handle),
        })
    }

    /// A link that never resolves.
    pub fn unbound(key: &str) -> Self {
        Self {
            key: key.to_string(),
            handle: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    /// The bound property's current value.
    pub fn current(&self) -> Option<String> {
        self.handle.as_ref().map(|property| property.current())
    }
}

impl fmt::Debug for ConfigLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLink")
            .field("key", &self.key)
            .field("bound", &self.is_bound())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct StoredProperty(RwLock<String>);

impl ConfigProperty for StoredProperty {
    fn current(&self) -> String {
        match self.0.read() {
            Ok(value) => value.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// An in-memory [`ConfigStore`] whose values the host may change at runtime.
///
/// Updating an existing key writes through the shared handle, so links bound
/// before the update observe the new value on their next read.
#[derive(Debug, Default)]
pub struct MapConfigStore {
    properties: HashMap<String, Arc<StoredProperty>>,
}

impl MapConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key` to `value`, creating the property if needed.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.properties.get(key) {
            Some(property) => match property.0.write() {
                Ok(mut slot) => *slot = value,
                Err(poisoned) => *poisoned.into_inner() = value,
            },
            None => {
                self.properties
                    .insert(key.to_string(), Arc::new(StoredProperty(RwLock::new(value))));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl ConfigStore for MapConfigStore {
    fn lookup(&self, key: &str) -> Option<PropertyHandle> {
        self.properties
            .get(key)
            .map(|property| Arc::clone(property) as PropertyHandle)
    }
}
