//! Flag names and the kinds of values they take.

use rustc_hash::FxHashMap;

use super::{FlagError, FlagState, FlagValue};

/// Marks regions whose edges players are told about when they come close.
pub const BORDER_VIEW_FLAG: &str = "regionborder-view";
/// Records the name of the player who created a region.
pub const CREATOR_FLAG: &str = "eregions-creator";
/// Records the name of the last player removed from a region.
pub const EXPELLED_FLAG: &str = "eregions-expelled";

/// The kind of value a flag holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// `allow` or `deny`.
    State,
    /// Free text.
    Text,
    /// A whole number.
    Integer,
    /// A decimal number.
    Double,
    /// `true` or `false`.
    Boolean,
}

/// State flags owners may toggle with `/eregion flag`.
pub const PLAYER_FLAGS: &[&str] = &[
    "pvp",
    "mob-damage",
    "creeper-explosion",
    "tnt",
    "fire-spread",
    "lava-fire",
    "lightning",
    "mob-spawning",
    "other-explosion",
    "enderman-grief",
    "ghast-fireball",
    "snow-fall",
    "snow-melt",
    "ice-form",
    "ice-melt",
    "frosted-ice-melt",
    "mushroom-growth",
    "leaf-decay",
    "grass-growth",
    "mycelium-spread",
    "vine-growth",
    "crop-growth",
    "soil-dry",
    "water-flow",
    "lava-flow",
    "chest-access",
    "use",
    "interact",
    "damage",
    "sleep",
    "item-drop",
    "item-pickup",
    "exp-drops",
    BORDER_VIEW_FLAG,
];

const EXTRA_FLAGS: &[(&str, FlagKind)] = &[
    ("build", FlagKind::State),
    ("block-break", FlagKind::State),
    ("block-place", FlagKind::State),
    ("entry", FlagKind::State),
    ("exit", FlagKind::State),
    ("greeting", FlagKind::Text),
    ("farewell", FlagKind::Text),
    ("greeting-title", FlagKind::Text),
    ("farewell-title", FlagKind::Text),
    ("deny-message", FlagKind::Text),
    ("heal-amount", FlagKind::Integer),
    ("heal-delay", FlagKind::Integer),
    ("feed-amount", FlagKind::Integer),
    ("walk-speed", FlagKind::Double),
    ("notify-enter", FlagKind::Boolean),
    ("notify-leave", FlagKind::Boolean),
    (CREATOR_FLAG, FlagKind::Text),
    (EXPELLED_FLAG, FlagKind::Text),
];

/// Known flags and how to parse their values.
#[derive(Debug, Clone)]
pub struct FlagRegistry {
    flags: FxHashMap<String, FlagKind>,
}

impl Default for FlagRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FlagRegistry {
    /// A registry holding the built-in flags and the plugin's own.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            flags: FxHashMap::default(),
        };
        for name in PLAYER_FLAGS {
            registry.register(name, FlagKind::State);
        }
        for (name, kind) in EXTRA_FLAGS {
            registry.register(name, *kind);
        }
        registry
    }

    /// Adds a flag. A name that is already known keeps its existing kind.
    pub fn register(&mut self, name: &str, kind: FlagKind) {
        if let Some(existing) = self.flags.get(name) {
            log::debug!("Flag '{name}' already registered as {existing:?}");
            return;
        }
        self.flags.insert(name.to_string(), kind);
    }

    /// The kind of a registered flag.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<FlagKind> {
        self.flags.get(name).copied()
    }

    /// Every known flag name, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.flags.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Parses a raw value for the named flag.
    ///
    /// # Errors
    /// Returns [`FlagError::UnknownFlag`] or [`FlagError::InvalidValue`].
    pub fn parse(&self, name: &str, raw: &str) -> Result<FlagValue, FlagError> {
        let kind = self
            .kind(name)
            .ok_or_else(|| FlagError::UnknownFlag(name.to_string()))?;
        let invalid = || FlagError::InvalidValue {
            flag: name.to_string(),
            value: raw.to_string(),
        };

        let raw = raw.trim();
        match kind {
            FlagKind::State => match raw.to_ascii_lowercase().as_str() {
                "allow" | "true" | "1" => Ok(FlagValue::State(FlagState::Allow)),
                "deny" | "false" | "0" => Ok(FlagValue::State(FlagState::Deny)),
                _ => Err(invalid()),
            },
            FlagKind::Text => Ok(FlagValue::Text(raw.to_string())),
            FlagKind::Integer => raw.parse().map(FlagValue::Integer).map_err(|_| invalid()),
            FlagKind::Double => raw.parse().map(FlagValue::Double).map_err(|_| invalid()),
            FlagKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(FlagValue::Boolean(true)),
                "false" | "no" | "off" => Ok(FlagValue::Boolean(false)),
                _ => Err(invalid()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_values() {
        let registry = FlagRegistry::with_defaults();
        for raw in ["allow", "TRUE", "1"] {
            assert_eq!(
                registry.parse("pvp", raw).ok(),
                Some(FlagValue::State(FlagState::Allow))
            );
        }
        for raw in ["deny", "false", "0"] {
            assert_eq!(
                registry.parse(BORDER_VIEW_FLAG, raw).ok(),
                Some(FlagValue::State(FlagState::Deny))
            );
        }
        assert!(matches!(
            registry.parse("pvp", "maybe"),
            Err(FlagError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_typed_values() {
        let registry = FlagRegistry::with_defaults();
        assert_eq!(
            registry.parse("greeting", " Welcome home ").ok(),
            Some(FlagValue::Text("Welcome home".into()))
        );
        assert_eq!(registry.parse("heal-amount", "4").ok(), Some(FlagValue::Integer(4)));
        assert!(registry.parse("heal-amount", "four").is_err());
        assert_eq!(
            registry.parse("notify-enter", "yes").ok(),
            Some(FlagValue::Boolean(true))
        );
    }

    #[test]
    fn test_unknown_flag() {
        let registry = FlagRegistry::with_defaults();
        assert!(matches!(
            registry.parse("fly", "allow"),
            Err(FlagError::UnknownFlag(name)) if name == "fly"
        ));
    }

    #[test]
    fn test_register_keeps_existing_kind() {
        let mut registry = FlagRegistry::with_defaults();
        registry.register(CREATOR_FLAG, FlagKind::State);
        assert_eq!(registry.kind(CREATOR_FLAG), Some(FlagKind::Text));
    }
}
