use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace assumed when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Normalizes `path` or `namespace:path` into `namespace:path`.
fn normalize(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains(':') {
        raw.to_string()
    } else {
        format!("{DEFAULT_NAMESPACE}:{raw}")
    }
}

macro_rules! namespaced_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: &str) -> Self {
                Self(normalize(raw))
            }

            /// The full `namespace:path` form.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn namespace(&self) -> &str {
                self.0.split_once(':').map_or(DEFAULT_NAMESPACE, |(ns, _)| ns)
            }

            pub fn path(&self) -> &str {
                self.0.split_once(':').map_or(self.0.as_str(), |(_, path)| path)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self::new(&raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

namespaced_id! {
    /// Identifies a block type in the host world.
    BlockId
}

namespaced_id! {
    /// Identifies an item type stored in container inventories.
    ItemId
}

namespaced_id! {
    /// Identifies a theme in the active theme snapshot.
    ThemeId
}

namespaced_id! {
    /// Identifies an enchantment whose quantities and theme are data driven.
    EnchantmentId
}
