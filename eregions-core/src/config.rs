//! Plugin configuration.
//!
//! The configuration lives in a JSON5 file. When the file is missing the bundled default is
//! written out and used. Trigger command lines are parsed while loading, so a malformed line
//! is reported once at startup (or on reload) instead of every time the trigger fires.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::trigger::{ActionParseError, CommandAction};

/// The configuration written when none exists.
pub const DEFAULT_CONFIG: &str = include_str!("../../package-content/eregions_config.json5");

/// Name of the trigger whose settings drive boundary detection.
pub const BOUNDARY_ENTER: &str = "boundary-enter";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON5 or does not match the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json5::Error),
    /// The file parsed but holds values out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// General behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Logs every step of trigger execution.
    pub debug: bool,
    /// Gap between consecutive commands of one trigger, in milliseconds.
    pub command_delay_ms: u64,
    /// Gap between the follow-up messages after a selection completes, in milliseconds.
    pub message_delay_ms: u64,
    /// Switches boundary detection on or off as a whole.
    pub enable_boundary_detection: bool,
    /// Minimum ticks between two boundary checks for the same player.
    pub boundary_check_interval_ticks: u64,
    /// Longest region name accepted in chat.
    pub max_region_name_length: usize,
    /// Chat words that abort naming a region, matched ignoring case.
    pub cancel_words: Vec<String>,
    /// Command whose player runs are delayed by `visualizer_delay_ticks`.
    pub visualizer_command: String,
    /// Extra ticks before a visualiser command runs.
    pub visualizer_delay_ticks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            command_delay_ms: 100,
            message_delay_ms: 2500,
            enable_boundary_detection: true,
            boundary_check_interval_ticks: 20,
            max_region_name_length: 32,
            cancel_words: ["отмена", "cancel", "нет", "no"]
                .into_iter()
                .map(String::from)
                .collect(),
            visualizer_command: "svis".to_string(),
            visualizer_delay_ticks: 5,
        }
    }
}

/// Defaults applied to newly created regions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionDefaults {
    /// Priority given to new regions.
    pub default_priority: i32,
    /// `name=value` pairs.
    pub default_flags: Vec<String>,
    /// Sets `regionborder-view=allow` on creation.
    pub border_view_on_create: bool,
}

impl Default for RegionDefaults {
    fn default() -> Self {
        Self {
            default_priority: 0,
            default_flags: Vec::new(),
            border_view_on_create: true,
        }
    }
}

/// An ordered list of parsed command lines. Blank lines are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct TriggerCommands(Vec<CommandAction>);

impl TriggerCommands {
    /// The parsed actions, in configured order.
    #[must_use]
    pub fn actions(&self) -> &[CommandAction] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for TriggerCommands {
    type Error = ActionParseError;

    fn try_from(lines: Vec<String>) -> Result<Self, Self::Error> {
        lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| CommandAction::parse_command(line))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// A named command trigger.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerDefinition {
    /// The actions, in order.
    #[serde(default)]
    pub commands: TriggerCommands,
}

/// A trigger fired by boundary detection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundaryTriggerDefinition {
    /// Boundary detection fires this trigger only when set.
    pub enabled: bool,
    /// Detection distance in blocks.
    pub distance: f64,
    /// Minimum seconds between two firings for one player.
    pub cooldown: f64,
    /// The actions, in order. When absent, the `command_triggers` entry of the same name is
    /// used.
    pub commands: Option<TriggerCommands>,
}

impl Default for BoundaryTriggerDefinition {
    fn default() -> Self {
        Self {
            enabled: true,
            distance: 5.0,
            cooldown: 3.0,
            commands: None,
        }
    }
}

/// A configurable message.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageEntry {
    /// Text with `&` colour codes and `{placeholders}`.
    pub message: String,
    /// Disabled messages are not sent.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginConfig {
    /// General behaviour.
    pub settings: Settings,
    /// Defaults for new regions.
    pub worldguard: RegionDefaults,
    /// Triggers by name.
    pub command_triggers: FxHashMap<String, TriggerDefinition>,
    /// Boundary triggers by name. These win over `command_triggers` for `boundary-` names.
    pub boundary_triggers: FxHashMap<String, BoundaryTriggerDefinition>,
    /// Overrides of the built-in messages by key.
    pub messages: FxHashMap<String, MessageEntry>,
}

impl PluginConfig {
    /// Parses and validates a configuration document.
    ///
    /// # Errors
    /// Returns an error if the document does not parse or fails validation.
    pub fn from_json5(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json5::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges the schema cannot express.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid(message));

        if !(1..=64).contains(&self.settings.max_region_name_length) {
            return invalid("settings.max_region_name_length must be in range 1..64".into());
        }
        if self.settings.boundary_check_interval_ticks == 0 {
            return invalid("settings.boundary_check_interval_ticks must be at least 1".into());
        }
        if let Some(flag) = self
            .worldguard
            .default_flags
            .iter()
            .find(|flag| !flag.contains('='))
        {
            return invalid(format!(
                "worldguard.default_flags entry `{flag}` must look like name=value"
            ));
        }
        for (name, trigger) in &self.boundary_triggers {
            if !trigger.distance.is_finite() || trigger.distance < 0.0 {
                return invalid(format!(
                    "boundary_triggers.{name}.distance must be a non-negative number"
                ));
            }
            if !trigger.cooldown.is_finite() || trigger.cooldown < 0.0 {
                return invalid(format!(
                    "boundary_triggers.{name}.cooldown must be a non-negative number"
                ));
            }
        }
        Ok(())
    }

    /// Finds the actions of a trigger.
    ///
    /// Names starting with `boundary-` are looked up among the boundary triggers first, as long
    /// as the boundary entry lists commands.
    #[must_use]
    pub fn trigger_actions(&self, name: &str) -> Option<&[CommandAction]> {
        if name.starts_with("boundary-")
            && let Some(commands) = self
                .boundary_triggers
                .get(name)
                .and_then(|boundary| boundary.commands.as_ref())
        {
            return Some(commands.actions());
        }
        self.command_triggers
            .get(name)
            .map(|trigger| trigger.commands.actions())
    }

    /// The boundary-enter settings, or the defaults when not configured.
    #[must_use]
    pub fn boundary_enter(&self) -> BoundaryTriggerDefinition {
        self.boundary_triggers
            .get(BOUNDARY_ENTER)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the configured text of an enabled message.
    #[must_use]
    pub fn message(&self, key: &str) -> Option<&MessageEntry> {
        self.messages.get(key)
    }
}

/// The live configuration, swappable at runtime.
pub struct ConfigStore {
    current: ArcSwap<PluginConfig>,
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Wraps a configuration that is not backed by a file. Reloading keeps it unchanged.
    #[must_use]
    pub fn in_memory(config: PluginConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
            path: None,
        }
    }

    /// Loads the file at `path`, writing the bundled default first if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, written, parsed or validated.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let config = read_or_create(&path)?;
        Ok(Self {
            current: ArcSwap::from_pointee(config),
            path: Some(path),
        })
    }

    /// A snapshot of the current configuration.
    #[must_use]
    pub fn get(&self) -> Arc<PluginConfig> {
        self.current.load_full()
    }

    /// Re-reads the file and swaps it in. On error the previous configuration stays live.
    ///
    /// # Errors
    /// Returns the load error.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let config = read_or_create(path)?;
        self.current.store(Arc::new(config));
        Ok(())
    }

    /// Replaces the configuration directly.
    pub fn replace(&self, config: PluginConfig) {
        self.current.store(Arc::new(config));
    }
}

fn read_or_create(path: &Path) -> Result<PluginConfig, ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if path.exists() {
        let source = fs::read_to_string(path).map_err(io_error)?;
        return PluginConfig::from_json5(&source);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, DEFAULT_CONFIG).map_err(io_error)?;
    log::info!("Wrote default configuration to {}", path.display());
    PluginConfig::from_json5(DEFAULT_CONFIG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_default_is_valid() {
        let config = PluginConfig::from_json5(DEFAULT_CONFIG).expect("default config");
        assert!(config.trigger_actions("region-created").is_some());
        assert_eq!(config.settings.max_region_name_length, 32);
        assert!((config.boundary_enter().distance - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = PluginConfig::from_json5("{}").expect("empty config");
        assert_eq!(config.settings.command_delay_ms, 100);
        assert_eq!(config.settings.cancel_words.len(), 4);
        assert!(config.worldguard.border_view_on_create);
        let boundary = config.boundary_enter();
        assert!((boundary.cooldown - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_commands_dropped() {
        let config = PluginConfig::from_json5(
            r#"{ command_triggers: { "region-created": { commands: ["", "  ", "chat! hi"] } } }"#,
        )
        .expect("config");
        assert_eq!(
            config.trigger_actions("region-created"),
            Some(&[CommandAction::SendChat("hi".into())][..])
        );
    }

    #[test]
    fn test_malformed_duration_fails_at_load() {
        let result = PluginConfig::from_json5(
            r#"{ command_triggers: { "x": { commands: ["actionbar;soon! hi"] } } }"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = PluginConfig::from_json5("{ settings: { typo: true } }");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation() {
        let result = PluginConfig::from_json5(r#"{ worldguard: { default_flags: ["pvp"] } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result =
            PluginConfig::from_json5(r#"{ boundary_triggers: { "boundary-enter": { distance: -1 } } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_boundary_prefix_prefers_boundary_table() {
        let config = PluginConfig::from_json5(
            r#"{
                command_triggers: { "boundary-enter": { commands: ["chat! generic"] } },
                boundary_triggers: { "boundary-enter": { commands: ["chat! boundary"] } },
            }"#,
        )
        .expect("config");
        assert_eq!(
            config.trigger_actions(BOUNDARY_ENTER),
            Some(&[CommandAction::SendChat("boundary".into())][..])
        );
    }

    #[test]
    fn test_boundary_entry_without_commands_falls_back() {
        let config = PluginConfig::from_json5(
            r#"{
                command_triggers: { "boundary-enter": { commands: ["chat! generic"] } },
                boundary_triggers: { "boundary-enter": { distance: 8 } },
            }"#,
        )
        .expect("config");
        assert_eq!(
            config.trigger_actions(BOUNDARY_ENTER),
            Some(&[CommandAction::SendChat("generic".into())][..])
        );
        assert!((config.boundary_enter().distance - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_store_reload_keeps_previous_on_error() {
        let dir = std::env::temp_dir().join(format!("eregions-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("eregions_config.json5");

        let store = ConfigStore::load_or_create(&path).expect("create default");
        assert!(path.exists());

        fs::write(&path, "{ settings: { command_delay_ms: 500 } }").expect("write");
        store.reload().expect("reload");
        assert_eq!(store.get().settings.command_delay_ms, 500);

        fs::write(&path, "{ not json").expect("write");
        assert!(store.reload().is_err());
        assert_eq!(store.get().settings.command_delay_ms, 500);

        fs::remove_dir_all(dir).ok();
    }
}
