//! An in-process host that records everything sent through it.
//!
//! Compiled for the crate's own tests and, behind the `testing` feature, for integration
//! tests.

use std::sync::Arc;

use eregions_utils::PlayerId;
use eregions_utils::text::strip_formatting;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::command::sender::CommandSender;
use crate::config::{ConfigError, ConfigStore, DEFAULT_CONFIG, PluginConfig};
use crate::host::{
    CommandDispatch, ManualClock, PermissionOracle, PlayerDirectory, PlayerSnapshot,
    Presentation, TitleTimes,
};
use crate::permission;
use crate::plugin::ERegions;
use crate::region::MemoryRegionDirectory;
use crate::selection::MemorySelectionTool;

/// Something the plugin asked the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A chat line.
    Chat {
        /// Recipient.
        player: PlayerId,
        /// Formatted text.
        text: String,
    },
    /// An action bar. Empty text clears it.
    ActionBar {
        /// Recipient.
        player: PlayerId,
        /// Formatted text.
        text: String,
    },
    /// A title with subtitle.
    Title {
        /// Recipient.
        player: PlayerId,
        /// Upper line.
        title: String,
        /// Lower line.
        subtitle: String,
        /// Fade timings.
        times: TitleTimes,
    },
    /// A line to everyone.
    Broadcast(String),
    /// A line to the console.
    Console(String),
    /// A command run as a player.
    PlayerCommand {
        /// The acting player.
        player: PlayerId,
        /// The command, without a leading slash.
        line: String,
    },
    /// A command run as the console.
    ConsoleCommand(String),
}

/// A host whose players, permissions and output live in memory.
#[derive(Debug, Default)]
pub struct RecordingHost {
    default_world: String,
    players: Mutex<Vec<PlayerSnapshot>>,
    grants: Mutex<FxHashMap<PlayerId, Vec<String>>>,
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingHost {
    /// A host with nobody online.
    #[must_use]
    pub fn new(default_world: impl Into<String>) -> Self {
        Self {
            default_world: default_world.into(),
            ..Self::default()
        }
    }

    /// Brings a player online, replacing any previous snapshot.
    pub fn join(&self, player: PlayerSnapshot) {
        let mut players = self.players.lock();
        players.retain(|existing| existing.id != player.id);
        players.push(player);
    }

    /// Takes a player offline.
    pub fn leave(&self, player: PlayerId) {
        self.players.lock().retain(|existing| existing.id != player);
    }

    /// Changes an online player's snapshot.
    pub fn update(&self, player: PlayerId, change: impl FnOnce(&mut PlayerSnapshot)) {
        if let Some(snapshot) = self.players.lock().iter_mut().find(|p| p.id == player) {
            change(snapshot);
        }
    }

    /// Grants a node. `prefix.*` grants everything below `prefix`, `*` grants everything.
    pub fn grant(&self, player: PlayerId, node: &str) {
        self.grants
            .lock()
            .entry(player)
            .or_default()
            .push(node.to_string());
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    /// Takes and clears the recorded deliveries.
    pub fn take(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.deliveries.lock())
    }

    /// Chat lines sent to the player, without formatting codes.
    #[must_use]
    pub fn chat_lines(&self, player: PlayerId) -> Vec<String> {
        self.deliveries
            .lock()
            .iter()
            .filter_map(|delivery| match delivery {
                Delivery::Chat { player: to, text } if *to == player => {
                    Some(strip_formatting(text))
                }
                _ => None,
            })
            .collect()
    }

    fn record(&self, delivery: Delivery) {
        self.deliveries.lock().push(delivery);
    }
}

impl PlayerDirectory for RecordingHost {
    fn player(&self, id: PlayerId) -> Option<PlayerSnapshot> {
        self.players.lock().iter().find(|p| p.id == id).cloned()
    }

    fn player_by_name(&self, name: &str) -> Option<PlayerSnapshot> {
        self.players
            .lock()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn online_players(&self) -> Vec<PlayerSnapshot> {
        self.players.lock().clone()
    }

    fn default_world(&self) -> String {
        self.default_world.clone()
    }
}

impl PermissionOracle for RecordingHost {
    fn has_permission(&self, player: PlayerId, node: &str) -> bool {
        self.grants
            .lock()
            .get(&player)
            .is_some_and(|granted| granted.iter().any(|grant| permission::covers(grant, node)))
    }

    fn effective_permissions(&self, player: PlayerId) -> Vec<String> {
        self.grants.lock().get(&player).cloned().unwrap_or_default()
    }
}

impl Presentation for RecordingHost {
    fn send_chat(&self, player: PlayerId, text: &str) {
        self.record(Delivery::Chat {
            player,
            text: text.to_string(),
        });
    }

    fn send_action_bar(&self, player: PlayerId, text: &str) {
        self.record(Delivery::ActionBar {
            player,
            text: text.to_string(),
        });
    }

    fn send_title(&self, player: PlayerId, title: &str, subtitle: &str, times: TitleTimes) {
        self.record(Delivery::Title {
            player,
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            times,
        });
    }

    fn broadcast(&self, text: &str) {
        self.record(Delivery::Broadcast(text.to_string()));
    }

    fn send_console(&self, text: &str) {
        self.record(Delivery::Console(text.to_string()));
    }
}

impl CommandDispatch for RecordingHost {
    fn dispatch_as_player(&self, player: PlayerId, line: &str) -> bool {
        self.record(Delivery::PlayerCommand {
            player,
            line: line.to_string(),
        });
        true
    }

    fn dispatch_as_console(&self, line: &str) -> bool {
        self.record(Delivery::ConsoleCommand(line.to_string()));
        true
    }
}

/// A plugin running on a [`RecordingHost`] with in-memory regions, a manual clock and an
/// in-memory selection tool.
pub struct Harness {
    /// The recording host.
    pub host: Arc<RecordingHost>,
    /// The wall clock, advanced by hand.
    pub clock: Arc<ManualClock>,
    /// The selection tool.
    pub tool: Arc<MemorySelectionTool>,
    /// The plugin under test.
    pub plugin: ERegions,
}

impl Harness {
    /// The world players join into.
    pub const WORLD: &'static str = "world";

    /// A harness running `config`.
    #[must_use]
    pub fn new(config: PluginConfig) -> Self {
        let host = Arc::new(RecordingHost::new(Self::WORLD));
        let clock = Arc::new(ManualClock::new(1_000_000));
        let tool = Arc::new(MemorySelectionTool::new());
        let plugin = ERegions::new(
            host.clone(),
            clock.clone(),
            Arc::new(MemoryRegionDirectory::new()),
            tool.clone(),
            Arc::new(ConfigStore::in_memory(config)),
        );
        Self {
            host,
            clock,
            tool,
            plugin,
        }
    }

    /// A harness running the bundled default configuration.
    ///
    /// # Errors
    /// Fails only if the bundled configuration is broken.
    pub fn bundled() -> Result<Self, ConfigError> {
        Ok(Self::new(PluginConfig::from_json5(DEFAULT_CONFIG)?))
    }

    /// A harness whose configuration is parsed from `source`.
    ///
    /// # Errors
    /// Returns the configuration error.
    pub fn from_json5(source: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(PluginConfig::from_json5(source)?))
    }

    /// Brings a new player online with the given permission nodes.
    pub fn join(&self, name: &str, permissions: &[&str]) -> PlayerSnapshot {
        let player = PlayerSnapshot::new(PlayerId::random(), name, Self::WORLD);
        self.host.join(player.clone());
        for node in permissions {
            self.host.grant(player.id, node);
        }
        player
    }

    /// The player's current snapshot.
    #[must_use]
    pub fn snapshot(&self, player: PlayerId) -> Option<PlayerSnapshot> {
        self.host.player(player)
    }

    /// Runs `/eregion <line>` as the player, as they are now.
    pub fn command(&self, player: PlayerId, line: &str) {
        if let Some(snapshot) = self.snapshot(player) {
            self.plugin
                .handle_command(&CommandSender::Player(snapshot), line);
        }
    }

    /// Runs `/eregion <line>` from the console.
    pub fn console(&self, line: &str) {
        self.plugin.handle_command(&CommandSender::Console, line);
    }

    /// Runs `ticks` plugin ticks. The wall clock is left alone.
    pub fn run_ticks(&self, ticks: u64) {
        for _ in 0..ticks {
            self.plugin.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_grants() {
        let host = RecordingHost::new("world");
        let player = PlayerId::random();
        host.grant(player, "eregions.region.*");

        assert!(host.has_permission(player, "eregions.region.create"));
        assert!(!host.has_permission(player, "eregions.admin"));
        assert!(!host.has_permission(PlayerId::random(), "eregions.region.create"));
    }
}
